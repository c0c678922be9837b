// src/handlers/connection.rs

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use tera::Context;

use crate::{common::error::AppError, config::AppState, models::connection::DatabaseConfig};

// GET /conexao
// Mostra os dados gravados, senha inclusive (ferramenta interna de um operador só).
pub async fn show_connection(
    State(app_state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let database = app_state.config_store.database().await.unwrap_or_default();

    let mut context = Context::new();
    context.insert("config", &database);
    app_state.templates.render("conexao.html", &context)
}

// POST /conexao
pub async fn save_connection(
    State(app_state): State<AppState>,
    Form(payload): Form<DatabaseConfig>,
) -> Result<impl IntoResponse, AppError> {
    app_state.config_store.update_database(payload).await?;
    Ok(Redirect::to("/buscar"))
}
