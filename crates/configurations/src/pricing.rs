//! Pricing: pure arithmetic over loaded rows.
//!
//! Totals are computed fresh on every call from the current rows; nothing
//! here caches. All accumulation happens in integer cents.

use serde::Serialize;

use ausbau_catalog::ItemId;
use ausbau_core::{Cents, DomainResult};

/// One priced selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub item_id: ItemId,
    pub unit_price: Cents,
    pub quantity: u32,
    pub line_total: Cents,
}

/// `unit_price * (quantity ?? 1)`.
pub fn line_total(unit_price: Cents, quantity: Option<u32>) -> DomainResult<Cents> {
    unit_price.checked_mul(i64::from(quantity.unwrap_or(1)))
}

pub fn price_line(
    item_id: ItemId,
    unit_price: Cents,
    quantity: Option<u32>,
) -> DomainResult<PricedLine> {
    Ok(PricedLine {
        item_id,
        unit_price,
        quantity: quantity.unwrap_or(1),
        line_total: line_total(unit_price, quantity)?,
    })
}

/// Sum of all line totals. Order-independent by construction.
pub fn total(lines: &[PricedLine]) -> DomainResult<Cents> {
    lines
        .iter()
        .try_fold(Cents::ZERO, |acc, line| acc.checked_add(line.line_total))
}
