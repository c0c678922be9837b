// src/services/pricing.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::product::PricingInputs;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// Preços resolvidos para um produto na política comercial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrices {
    pub retail: Option<Decimal>,
    pub wholesale: Option<Decimal>,
}

/// Arredondamento de duas casas com a mesma regra do `ROUND` do SQL
/// (meio para longe do zero).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Um valor só "vale" quando `ROUND(valor * 100, 2) > 0`.
pub fn is_set(value: Option<Decimal>) -> bool {
    value.is_some_and(|v| round2(v * HUNDRED) > Decimal::ZERO)
}

fn when_set(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| is_set(Some(*v)))
}

/// Aplica o primeiro modificador que vale, nesta ordem:
/// desconto do registro, acréscimo automático da política, desconto automático.
/// Nenhum vale => a própria base (ausente vira 0).
///
/// Sem promoção, o desconto do registro só vale se o preço padrão também vale;
/// acréscimo e desconto automático sobre preço padrão ausente dão ausente.
fn cascade(inputs: &PricingInputs, discount: Option<Decimal>) -> Option<Decimal> {
    let promo = when_set(inputs.promo);
    let base = promo.or(inputs.standard);
    let adjusted = |factor: Decimal| base.map(|b| round2(b * factor));

    let discount = when_set(discount).filter(|_| promo.is_some() || is_set(inputs.standard));

    if let Some(pct) = discount {
        adjusted(Decimal::ONE - pct / HUNDRED)
    } else if let Some(pct) = when_set(inputs.surcharge_pct) {
        adjusted(Decimal::ONE + pct / HUNDRED)
    } else if let Some(pct) = when_set(inputs.auto_discount_pct) {
        adjusted(Decimal::ONE - pct / HUNDRED)
    } else {
        Some(base.unwrap_or(Decimal::ZERO))
    }
}

/// Resolve o preço de varejo (desconto A) e de atacado (desconto B) a partir
/// da mesma base: promoção quando vale, senão o preço padrão.
pub fn resolve(inputs: &PricingInputs) -> ResolvedPrices {
    ResolvedPrices {
        retail: cascade(inputs, inputs.discount_a),
        wholesale: cascade(inputs, inputs.discount_b),
    }
}

/// Preço "de" da etiqueta: promoção positiva, senão preço padrão, senão 0.
pub fn list_price(inputs: &PricingInputs) -> Decimal {
    match inputs.promo {
        Some(promo) if promo > Decimal::ZERO => promo,
        _ => inputs.standard.unwrap_or(Decimal::ZERO),
    }
}
