// src/handlers/search.rs

use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use tera::Context;

use crate::{
    common::error::AppError,
    config::AppState,
    db,
    models::product::ProductSummary,
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub termo_busca: String,
}

// GET /
pub async fn index() -> Redirect {
    Redirect::to("/buscar")
}

// GET /buscar
// Formulário vazio; ainda assim exige um banco acessível (senão vai para /conexao).
pub async fn search_page(State(app_state): State<AppState>) -> Result<Html<String>, AppError> {
    let conn = db::connect(&app_state.config_store).await?;
    db::close(conn).await;

    render(&app_state, "", &[])
}

// POST /buscar
pub async fn search_products(
    State(app_state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    let mut conn = db::connect(&app_state.config_store).await?;

    let term = form.termo_busca.trim();
    let results = if term.is_empty() {
        Ok(Vec::new())
    } else {
        let service = &app_state.product_service;
        service.search(&mut service.session(&mut conn), term).await
    };
    db::close(conn).await;
    let results = results?;

    render(&app_state, term, &results)
}

fn render(app_state: &AppState, term: &str, results: &[ProductSummary]) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("termo_busca", term);
    context.insert("resultados", results);
    app_state.templates.render("buscar_produto.html", &context)
}
