// src/services/barcode_service.rs

use std::io::Cursor;

use barcoders::sym::{code128::Code128, ean13::EAN13};
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageOutputFormat};
use thiserror::Error;

// Geometria fixa da imagem: sem texto legível, só as barras.
const MODULE_WIDTH: u32 = 2;
const MODULE_HEIGHT: u32 = 80;
const QUIET_ZONE: u32 = 10;

// Code128 conjunto B (alfanumérico), prefixo exigido pelo barcoders.
const CODE128_SET_B: char = '\u{0181}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Ean13,
    Code128,
}

#[derive(Debug, Error)]
enum BarcodeError {
    #[error("valor não tem formato EAN-13")]
    NotEan,

    #[error("simbologia rejeitou o valor: {0}")]
    Symbology(String),

    #[error("dimensões de imagem inválidas")]
    Raster,

    #[error("falha ao gerar PNG: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
pub struct Barcode {
    pub symbology: Symbology,
    pub png: Vec<u8>,
}

impl Barcode {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }
}

/// Gera o código de barras do valor: EAN-13 quando o valor tem 12 ou 13
/// dígitos, senão (ou se o EAN-13 falhar) Code128. Vazio ou falha nas duas
/// simbologias => `None`.
pub fn render(value: &str) -> Option<Barcode> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(png) = encode_ean13(value) {
        return Some(Barcode { symbology: Symbology::Ean13, png });
    }

    match encode_code128(value) {
        Ok(png) => Some(Barcode { symbology: Symbology::Code128, png }),
        Err(e) => {
            tracing::warn!("Erro barcode ({}): {}", value, e);
            None
        }
    }
}

/// Mesma coisa que [`render`], já em base64 para `<img src="data:image/png;base64,...">`.
pub fn encode_base64(value: &str) -> Option<String> {
    render(value).map(|barcode| barcode.to_base64())
}

fn encode_ean13(value: &str) -> Result<Vec<u8>, BarcodeError> {
    if !matches!(value.len(), 12 | 13) || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(BarcodeError::NotEan);
    }

    // O dígito verificador é sempre recalculado a partir dos 12 primeiros.
    let symbol = EAN13::new(&value[..12]).map_err(|e| BarcodeError::Symbology(format!("{e:?}")))?;
    rasterize(&symbol.encode())
}

fn encode_code128(value: &str) -> Result<Vec<u8>, BarcodeError> {
    let data = format!("{CODE128_SET_B}{value}");
    let symbol = Code128::new(&data).map_err(|e| BarcodeError::Symbology(format!("{e:?}")))?;
    rasterize(&symbol.encode())
}

// Cada módulo "1" vira uma barra preta de MODULE_WIDTH px; margem branca dos dois lados.
fn rasterize(modules: &[u8]) -> Result<Vec<u8>, BarcodeError> {
    let width = modules.len() as u32 * MODULE_WIDTH + QUIET_ZONE * 2;
    let mut pixels = vec![255u8; (width * MODULE_HEIGHT) as usize];

    for (i, _) in modules.iter().enumerate().filter(|(_, bar)| **bar == 1) {
        let x0 = QUIET_ZONE + i as u32 * MODULE_WIDTH;
        for y in 0..MODULE_HEIGHT {
            for x in x0..x0 + MODULE_WIDTH {
                pixels[(y * width + x) as usize] = 0;
            }
        }
    }

    let image = GrayImage::from_raw(width, MODULE_HEIGHT, pixels).ok_or(BarcodeError::Raster)?;

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image).write_to(&mut png, ImageOutputFormat::Png)?;
    Ok(png.into_inner())
}
