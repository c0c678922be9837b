// src/common/templates.rs

use std::collections::HashMap;

use axum::response::Html;
use tera::{Context, Tera, Value};

use crate::common::error::AppError;

// Templates embutidos no binário: o executável não depende do diretório de trabalho.
const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("conexao.html", include_str!("../../templates/conexao.html")),
    ("buscar_produto.html", include_str!("../../templates/buscar_produto.html")),
    ("resultado_produto.html", include_str!("../../templates/resultado_produto.html")),
    ("etiqueta.html", include_str!("../../templates/etiqueta.html")),
];

pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        tera.register_filter("moeda", moeda);
        tera.register_filter("quantidade", quantidade);

        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}

/// `{{ valor | moeda }}` => "R$ 1234,50". Nulo vira "-".
fn moeda(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String("-".to_string())),
        _ => {
            let number = as_f64(value, "moeda")?;
            Ok(Value::String(format!("R$ {}", format!("{number:.2}").replace('.', ","))))
        }
    }
}

// Quantidades inteiras sem casas decimais; fracionadas com até 3.
fn quantidade(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String("-".to_string())),
        _ => {
            let number = as_f64(value, "quantidade")?;
            let rounded = format!("{number:.3}");
            let text = match rounded.trim_end_matches('0').trim_end_matches('.') {
                "-0" => "0",
                trimmed => trimmed,
            };
            Ok(Value::String(text.replace('.', ",")))
        }
    }
}

fn as_f64(value: &Value, filter: &str) -> tera::Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| tera::Error::msg(format!("Filtro `{filter}`: número fora do intervalo"))),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| tera::Error::msg(format!("Filtro `{filter}`: valor não numérico `{s}`"))),
        other => Err(tera::Error::msg(format!("Filtro `{filter}`: tipo inesperado {other}"))),
    }
}
