// src/db/connection.rs

use std::time::Duration;

use sqlx::{
    postgres::{PgConnectOptions, PgConnection},
    ConnectOptions, Connection,
};

use crate::{common::error::AppError, config::ConfigStore, models::connection::DatabaseConfig};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const APPLICATION_NAME: &str = "consulta-precos";

/// Abre uma conexão nova com o banco configurado em `/conexao`.
///
/// Sem seção `database` => [`AppError::ConfigMissing`]; qualquer falha ao
/// conectar => [`AppError::ConnectionFailed`]. As duas levam o usuário de
/// volta à tela de conexão; o motivo só aparece no log.
pub async fn connect(store: &ConfigStore) -> Result<PgConnection, AppError> {
    let Some(database) = store.database().await else {
        tracing::debug!("Nenhuma conexão configurada em {}", store.path().display());
        return Err(AppError::ConfigMissing);
    };

    match tokio::time::timeout(CONNECT_TIMEOUT, connect_options(&database).connect()).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => {
            tracing::warn!("🔥 Falha ao conectar em {}/{}: {}", database.server, database.database, e);
            Err(AppError::ConnectionFailed)
        }
        Err(_) => {
            tracing::warn!("🔥 Tempo esgotado conectando em {}/{}", database.server, database.database);
            Err(AppError::ConnectionFailed)
        }
    }
}

// Fecha a conexão da requisição; erro no encerramento não interessa ao usuário.
pub async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!("Erro ao fechar conexão: {}", e);
    }
}

pub fn connect_options(database: &DatabaseConfig) -> PgConnectOptions {
    let (host, port) = split_server(&database.server);

    let mut options = PgConnectOptions::new()
        .host(host)
        .database(&database.database)
        .username(&database.username)
        .password(&database.password)
        .application_name(APPLICATION_NAME);

    if let Some(port) = port {
        options = options.port(port);
    }
    options
}

// Aceita "host", "host:porta" e o formato do SQL Server "host,porta".
fn split_server(server: &str) -> (&str, Option<u16>) {
    let server = server.trim();
    server
        .rsplit_once([',', ':'])
        .filter(|(host, _)| !host.contains(':'))
        .and_then(|(host, port)| port.trim().parse().ok().map(|port| (host.trim(), Some(port))))
        .unwrap_or((server, None))
}
