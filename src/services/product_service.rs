// src/services/product_service.rs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::{ErpSession, ProductRepository, ProductSource},
    models::product::{
        LabelProduct, LabelRow, ProductDetail, ProductDetailRow, ProductOverview, ProductSummary,
        ReceiptWindow,
    },
    services::pricing,
};

// O fim do período vai até 23:59 do último dia.
const END_OF_DAY_MINUTES: i64 = 23 * 60 + 59;

#[derive(Debug, Clone)]
pub struct ProductService {
    repo: ProductRepository,
    receipt_days: i64,
}

impl ProductService {
    pub fn new(repo: ProductRepository, receipt_days: i64) -> Self {
        Self { repo, receipt_days }
    }

    /// Período padrão das entradas: os últimos `receipt_days` dias até hoje.
    pub fn default_window(&self, today: NaiveDate) -> ReceiptWindow {
        ReceiptWindow {
            start: today - TimeDelta::days(self.receipt_days),
            end: today,
        }
    }

    /// Aplica as datas do filtro, cada uma por conta própria. Data que não
    /// converte em `YYYY-MM-DD` mantém o padrão, sem erro.
    pub fn window_from_filter(
        &self,
        today: NaiveDate,
        start: Option<&str>,
        end: Option<&str>,
    ) -> ReceiptWindow {
        let default = self.default_window(today);
        ReceiptWindow {
            start: start.and_then(parse_date).unwrap_or(default.start),
            end: end.and_then(parse_date).unwrap_or(default.end),
        }
    }

    // Consultas desta requisição sobre a conexão aberta pelo handler.
    pub fn session<'c>(&'c self, conn: &'c mut PgConnection) -> ErpSession<'c> {
        self.repo.session(conn)
    }

    pub async fn search<S: ProductSource>(
        &self,
        source: &mut S,
        term: &str,
    ) -> Result<Vec<ProductSummary>, AppError> {
        let products = source.search_products(term).await?;
        tracing::debug!("Busca '{}': {} produto(s)", term, products.len());
        Ok(products)
    }

    // --- Tela do produto: preço + estoque + últimas entradas ---
    pub async fn overview<S: ProductSource>(
        &self,
        source: &mut S,
        code: i64,
        window: ReceiptWindow,
    ) -> Result<ProductOverview, AppError> {
        // 1. Preço na política; sem linha => 404
        let row = source
            .find_product_detail(code)
            .await?
            .ok_or(AppError::ProductNotFound { policy: source.policy_id() })?;

        // 2. Estoque físico e por lote
        let stock = source.list_stock(code).await?;

        // 3. Entradas no período
        let (from, until) = window_bounds(window);
        let receipts = source.list_receipts(code, from, until).await?;

        Ok(ProductOverview {
            product: build_detail(row),
            stock,
            receipts,
            window,
        })
    }

    pub async fn label<S: ProductSource>(&self, source: &mut S, code: i64) -> Result<LabelProduct, AppError> {
        let row = source.find_label(code).await?.ok_or(AppError::LabelNotFound)?;
        Ok(build_label(row))
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn window_bounds(window: ReceiptWindow) -> (NaiveDateTime, NaiveDateTime) {
    (
        window.start.and_time(NaiveTime::MIN),
        window.end.and_time(NaiveTime::MIN) + TimeDelta::minutes(END_OF_DAY_MINUTES),
    )
}

pub fn build_detail(row: ProductDetailRow) -> ProductDetail {
    let prices = pricing::resolve(&row.pricing);
    ProductDetail {
        code: row.code,
        description: row.description,
        manufacturer: row.manufacturer,
        unit: row.unit,
        ean: row.ean,
        price: prices.retail,
    }
}

// Na etiqueta preço ausente vira 0 e quantidade de atacado ausente (ou zero) vira 1.
pub fn build_label(row: LabelRow) -> LabelProduct {
    let prices = pricing::resolve(&row.pricing);
    let wholesale_min_qty = row
        .wholesale_min_qty
        .and_then(|qty| qty.trunc().to_i64())
        .filter(|qty| *qty != 0)
        .unwrap_or(1);

    LabelProduct {
        id: row.code,
        description: row.description,
        unit: row.unit,
        ean: row.ean,
        price_from: pricing::list_price(&row.pricing),
        price: prices.retail.unwrap_or(Decimal::ZERO),
        wholesale_min_qty,
        wholesale_price: prices.wholesale.unwrap_or(Decimal::ZERO),
    }
}
