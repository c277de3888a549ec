//! `ausbau-catalog` — the option catalog: categories, items, variations and
//! year-scoped price tables.
//!
//! Everything here is pure data and pure functions; persistence lives in
//! `ausbau-infra`.

pub mod category;
pub mod item;
pub mod price_table;

pub use category::{Category, CategoryId, CategoryScope, wizard_order};
pub use item::{Item, ItemId, ItemVariation, ItemVariationId};
pub use price_table::{
    PriceTable, PriceTableEntry, PriceTableId, effective_price_table, resolve_unit_price,
};
