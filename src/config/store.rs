// src/config/store.rs

use std::path::{Path, PathBuf};

use crate::{
    common::error::AppError,
    models::connection::{ConfigFile, DatabaseConfig},
};

// Arquivo JSON com os parâmetros de conexão (`{"database": {...}}`).
// Lido a cada requisição e regravado inteiro pelo formulário /conexao.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lê o arquivo. Ausente, ilegível ou malformado => configuração vazia.
    pub async fn load(&self) -> ConfigFile {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ConfigFile::default(),
            Err(e) => {
                tracing::warn!("Não foi possível ler {}: {}", self.path.display(), e);
                return ConfigFile::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Arquivo de configuração inválido ({}): {}", self.path.display(), e);
            ConfigFile::default()
        })
    }

    // Sobrescreve o arquivo inteiro. Sem trava: o último a gravar vence.
    pub async fn save(&self, config: &ConfigFile) -> Result<(), AppError> {
        let body = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    pub async fn database(&self) -> Option<DatabaseConfig> {
        self.load().await.database
    }

    /// Troca só a seção `database`, mantendo o resto do arquivo.
    pub async fn update_database(&self, database: DatabaseConfig) -> Result<(), AppError> {
        let mut config = self.load().await;
        config.database = Some(database);
        self.save(&config).await?;

        tracing::info!("Configuração de conexão gravada em {}", self.path.display());
        Ok(())
    }
}
