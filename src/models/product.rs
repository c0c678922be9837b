// src/models/product.rs

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

// --- 1. Resultado da busca ---
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductSummary {
    pub code: i64,
    pub description: Option<String>,
    pub ean: Option<String>,
}

// --- 2. Entradas brutas da precificação ---
// As colunas vêm do registro de preço (PCXPR), do preço de venda do
// estabelecimento (PRXES) e da política comercial (POCOM).
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct PricingInputs {
    pub promo: Option<Decimal>,
    pub standard: Option<Decimal>,
    pub discount_a: Option<Decimal>,
    pub discount_b: Option<Decimal>,
    pub surcharge_pct: Option<Decimal>,
    pub auto_discount_pct: Option<Decimal>,
}

// Linha da consulta de detalhe (antes de resolver o preço)
#[derive(Debug, Clone, FromRow)]
pub struct ProductDetailRow {
    pub code: i64,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub unit: Option<String>,
    pub ean: Option<String>,
    #[sqlx(flatten)]
    pub pricing: PricingInputs,
}

// --- 3. Detalhe do produto ---
// O preço continua anulável: a cascata pode cair num preço padrão ausente.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub code: i64,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub unit: Option<String>,
    pub ean: Option<String>,
    pub price: Option<Decimal>,
}

// --- 4. Estoque (físico + lotes) ---
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockLine {
    pub lot_code: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub warehouse: Option<String>,
    pub location: Option<String>,
    // "Fisico" (PRLTL) ou "Lote" (PRLOT)
    pub origin: String,
}

// --- 5. Entradas (notas de compra) ---
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReceiptLine {
    pub movement_date: Option<NaiveDateTime>,
    pub document_number: Option<String>,
    pub document_type: Option<String>,
    pub lot_code: Option<String>,
    pub total_quantity: Option<Decimal>,
    pub supplier: Option<String>,
}

/// Janela de datas usada na consulta de entradas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReceiptWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// Tudo que a tela de produto precisa, montado numa única ida ao banco.
#[derive(Debug, Clone, Serialize)]
pub struct ProductOverview {
    pub product: ProductDetail,
    pub stock: Vec<StockLine>,
    pub receipts: Vec<ReceiptLine>,
    pub window: ReceiptWindow,
}

// --- 6. Etiqueta ---
#[derive(Debug, Clone, FromRow)]
pub struct LabelRow {
    pub code: i64,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub ean: Option<String>,
    pub wholesale_min_qty: Option<Decimal>,
    #[sqlx(flatten)]
    pub pricing: PricingInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelProduct {
    pub id: i64,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub ean: Option<String>,
    pub price_from: Decimal,      // "de": preço de tabela
    pub price: Decimal,           // "por": varejo
    pub wholesale_min_qty: i64,
    pub wholesale_price: Decimal, // atacado
}

/// Modelo de etiqueta: gôndola (varejo, com código de barras) ou atacado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelModel {
    Gondola,
    Atacado,
}

impl LabelModel {
    // Sem parâmetro => gôndola; qualquer outro valor => layout de atacado.
    pub fn from_param(modelo: Option<&str>) -> Self {
        match modelo {
            None | Some("gondola") => LabelModel::Gondola,
            Some(_) => LabelModel::Atacado,
        }
    }
}
