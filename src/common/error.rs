use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

// Para onde mandamos o usuário quando não há banco configurado/acessível.
pub const CONNECTION_SCREEN: &str = "/conexao";

// Taxonomia fechada de erros da aplicação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Conexão com o banco não configurada")]
    ConfigMissing,

    #[error("Falha ao conectar ao banco de dados")]
    ConnectionFailed,

    #[error("Produto sem precificação na política {policy}")]
    ProductNotFound { policy: i32 },

    #[error("Produto não encontrado")]
    LabelNotFound,

    #[error("Erro de banco de dados: {0}")]
    QueryFailed(#[from] sqlx::Error),

    #[error("Erro ao renderizar template: {0}")]
    Template(#[from] tera::Error),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Sem banco => volta para a tela de conexão, sem mensagem.
            AppError::ConfigMissing | AppError::ConnectionFailed => {
                Redirect::to(CONNECTION_SCREEN).into_response()
            }
            AppError::ProductNotFound { .. } | AppError::LabelNotFound => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }

            // O detalhe fica só no log; o usuário recebe uma mensagem genérica.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado ao processar a solicitação.",
                )
                    .into_response()
            }
        }
    }
}
