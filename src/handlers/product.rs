// src/handlers/product.rs

use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use chrono::Local;
use serde::Deserialize;
use tera::Context;

use crate::{
    common::error::AppError,
    config::AppState,
    db,
    models::product::ReceiptWindow,
};

// Filtro de período das entradas. Datas em `YYYY-MM-DD`; inválidas são ignoradas.
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptFilterForm {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

// GET /produto/{codigo}
pub async fn show_product(
    State(app_state): State<AppState>,
    Path(codigo): Path<i64>,
) -> Result<Html<String>, AppError> {
    let window = app_state.product_service.default_window(Local::now().date_naive());
    render_product(&app_state, codigo, window).await
}

// POST /produto/{codigo}
pub async fn filter_product(
    State(app_state): State<AppState>,
    Path(codigo): Path<i64>,
    Form(filter): Form<ReceiptFilterForm>,
) -> Result<Html<String>, AppError> {
    let window = app_state.product_service.window_from_filter(
        Local::now().date_naive(),
        filter.data_inicio.as_deref(),
        filter.data_fim.as_deref(),
    );
    render_product(&app_state, codigo, window).await
}

async fn render_product(
    app_state: &AppState,
    codigo: i64,
    window: ReceiptWindow,
) -> Result<Html<String>, AppError> {
    let mut conn = db::connect(&app_state.config_store).await?;
    let service = &app_state.product_service;
    let overview = service.overview(&mut service.session(&mut conn), codigo, window).await;
    // Fecha a conexão também quando a consulta falha
    db::close(conn).await;
    let overview = overview?;

    let mut context = Context::new();
    context.insert("produto", &overview.product);
    context.insert("estoque", &overview.stock);
    context.insert("entradas", &overview.receipts);
    context.insert("data_inicio", &overview.window.start.format("%Y-%m-%d").to_string());
    context.insert("data_fim", &overview.window.end.format("%Y-%m-%d").to_string());
    context.insert("data_atual", &Local::now().format("%d/%m/%Y %H:%M").to_string());

    app_state.templates.render("resultado_produto.html", &context)
}
