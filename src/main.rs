//src/main.rs

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod models;
mod services;

use crate::config::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr.clone();
    let app_state = AppState::new(settings)?;

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::search::index))
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/conexao",
            get(handlers::connection::show_connection).post(handlers::connection::save_connection),
        )
        .route(
            "/buscar",
            get(handlers::search::search_page).post(handlers::search::search_products),
        )
        .route(
            "/produto/{codigo}",
            get(handlers::product::show_product).post(handlers::product::filter_product),
        )
        .route("/etiqueta/{codigo}", get(handlers::label::show_label))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use crate::models::connection::DatabaseConfig;

    fn app_with_config(dir: &tempfile::TempDir) -> (Router, AppState) {
        let settings = Settings {
            config_file: dir.path().join("config.json"),
            ..Settings::default()
        };
        let app_state = AppState::new(settings).unwrap();
        (build_router(app_state.clone()), app_state)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn assert_redirect(response: &Response, location: &str) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], location);
    }

    #[tokio::test]
    async fn root_redirects_to_search() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app_with_config(&dir);

        let response = app.oneshot(get("/")).await.unwrap();
        assert_redirect(&response, "/buscar");
    }

    #[tokio::test]
    async fn health_check() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app_with_config(&dir);

        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn search_without_config_redirects_to_connection_screen() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app_with_config(&dir);

        let response = app.clone().oneshot(get("/buscar")).await.unwrap();
        assert_redirect(&response, "/conexao");

        let response = app.oneshot(post_form("/buscar", "termo_busca=arroz")).await.unwrap();
        assert_redirect(&response, "/conexao");
    }

    #[tokio::test]
    async fn product_and_label_without_config_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app_with_config(&dir);

        let response = app.clone().oneshot(get("/produto/123")).await.unwrap();
        assert_redirect(&response, "/conexao");

        let response = app
            .clone()
            .oneshot(post_form("/produto/123", "data_inicio=not-a-date&data_fim="))
            .await
            .unwrap();
        assert_redirect(&response, "/conexao");

        let response = app.oneshot(get("/etiqueta/123?modelo=atacado")).await.unwrap();
        assert_redirect(&response, "/conexao");
    }

    #[tokio::test]
    async fn unreachable_database_redirects_to_connection_screen() {
        let dir = tempfile::tempdir().unwrap();
        let (app, app_state) = app_with_config(&dir);
        app_state
            .config_store
            .update_database(DatabaseConfig {
                server: "127.0.0.1:1".to_string(),
                database: "erp".to_string(),
                username: "consulta".to_string(),
                password: "segredo".to_string(),
            })
            .await
            .unwrap();

        let response = app.oneshot(get("/buscar")).await.unwrap();
        assert_redirect(&response, "/conexao");
    }

    #[tokio::test]
    async fn connection_form_saves_and_shows_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let (app, app_state) = app_with_config(&dir);

        let response = app
            .clone()
            .oneshot(post_form(
                "/conexao",
                "server=erp.local%3A5433&database=erp&username=consulta&password=s3nha",
            ))
            .await
            .unwrap();
        assert_redirect(&response, "/buscar");

        let stored = app_state.config_store.database().await.unwrap();
        assert_eq!(stored.server, "erp.local:5433");
        assert_eq!(stored.password, "s3nha");

        let response = app.oneshot(get("/conexao")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("erp.local:5433"));
        assert!(page.contains("s3nha"));
    }

    #[tokio::test]
    async fn connection_screen_renders_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app_with_config(&dir);

        let response = app.oneshot(get("/conexao")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("name=\"server\""));
    }
}
