// src/handlers/label.rs

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use chrono::Local;
use serde::Deserialize;
use tera::Context;

use crate::{
    common::error::AppError,
    config::AppState,
    db,
    models::product::LabelModel,
    services::barcode_service,
};

#[derive(Debug, Default, Deserialize)]
pub struct LabelQuery {
    pub modelo: Option<String>,
}

// GET /etiqueta/{codigo}?modelo=gondola|atacado
pub async fn show_label(
    State(app_state): State<AppState>,
    Path(codigo): Path<i64>,
    Query(query): Query<LabelQuery>,
) -> Result<Html<String>, AppError> {
    let model = LabelModel::from_param(query.modelo.as_deref());

    let mut conn = db::connect(&app_state.config_store).await?;
    let service = &app_state.product_service;
    let label = service.label(&mut service.session(&mut conn), codigo).await;
    db::close(conn).await;
    let label = label?;

    // Código de barras só na etiqueta de gôndola
    let barcode_img = match model {
        LabelModel::Gondola => label.ean.as_deref().and_then(barcode_service::encode_base64),
        LabelModel::Atacado => None,
    };

    let mut context = Context::new();
    context.insert("produto", &label);
    context.insert("barcode_img", &barcode_img);
    context.insert("modelo", &model);
    context.insert("data_atual", &Local::now().format("%d/%m/%y %H:%M:%S").to_string());

    app_state.templates.render("etiqueta.html", &context)
}
