// src/models/connection.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Parâmetros de conexão, exatamente como o formulário /conexao envia.
// Campos ausentes no formulário viram string vazia.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Conteúdo do arquivo de configuração (`config.json`).
///
/// Só a seção `database` é interpretada; outras chaves de topo são
/// preservadas como estão quando o arquivo é regravado.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
