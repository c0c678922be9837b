// src/config.rs

pub mod store;

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::{common::templates::Templates, db::ProductRepository, services::ProductService};
pub use store::ConfigStore;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_POLICY_ID: i32 = 432;
pub const DEFAULT_RECEIPT_DAYS: i64 = 90;
pub const MAX_RECEIPT_DAYS: i64 = 36_500;

// Configurações do processo, lidas uma única vez na inicialização.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub config_file: PathBuf,
    pub policy_id: i32,
    pub receipt_days: i64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let config_file = env::var("CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let policy_id = match env::var("POLITICA_COMERCIAL") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("POLITICA_COMERCIAL inválida: {raw}"))?,
            Err(_) => DEFAULT_POLICY_ID,
        };

        let receipt_days = match env::var("DIAS_ENTRADAS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DIAS_ENTRADAS inválido: {raw}"))?,
            Err(_) => DEFAULT_RECEIPT_DAYS,
        };
        check_receipt_days(receipt_days)?;

        Ok(Self { bind_addr, config_file, policy_id, receipt_days })
    }
}

// O período das entradas precisa caber no calendário do `chrono`.
fn check_receipt_days(days: i64) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0..=MAX_RECEIPT_DAYS).contains(&days),
        "DIAS_ENTRADAS fora do intervalo 0..={MAX_RECEIPT_DAYS}: {days}"
    );
    Ok(())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            policy_id: DEFAULT_POLICY_ID,
            receipt_days: DEFAULT_RECEIPT_DAYS,
        }
    }
}

// O estado compartilhado, imutável, entregue a cada handler via `State`.
#[derive(Clone)]
pub struct AppState {
    pub config_store: ConfigStore,
    pub product_service: ProductService,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let templates = Templates::new().context("Falha ao compilar os templates HTML")?;

        // --- Monta o gráfico de dependências ---
        let config_store = ConfigStore::new(settings.config_file.clone());
        let product_repo = ProductRepository::new(settings.policy_id);
        let product_service = ProductService::new(product_repo, settings.receipt_days);

        tracing::info!(
            "Configuração de conexão em {} (política comercial {})",
            config_store.path().display(),
            settings.policy_id
        );

        Ok(Self {
            config_store,
            product_service,
            templates: Arc::new(templates),
        })
    }
}
