use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_core::{Cents, DomainError, DomainResult, impl_uuid_newtype};

use crate::item::{Item, ItemId, ItemVariation};

/// Price table identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTableId(Uuid);

impl_uuid_newtype!(PriceTableId, "PriceTableId");

/// A year-scoped set of per-item price overrides.
///
/// At most one active table per year is expected; resolution takes the
/// first active match and otherwise falls back to per-item base prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    pub id: PriceTableId,
    pub name: String,
    pub year: i32,
    pub active: bool,
}

impl PriceTable {
    pub fn new(name: impl Into<String>, year: i32, active: bool) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("price table name must not be empty"));
        }
        if !(2000..=2100).contains(&year) {
            return Err(DomainError::validation(format!(
                "price table year {year} out of range"
            )));
        }
        Ok(Self {
            id: PriceTableId::new(),
            name,
            year,
            active,
        })
    }
}

/// One override row: item → price, within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTableEntry {
    pub price_table_id: PriceTableId,
    pub item_id: ItemId,
    pub price: Cents,
}

/// Resolve the effective price table for a project created in `project_year`.
pub fn effective_price_table(tables: &[PriceTable], project_year: i32) -> Option<&PriceTable> {
    tables.iter().find(|t| t.active && t.year == project_year)
}

/// Unit price of a selection: base price (price-table override when present,
/// otherwise the item's own additional cost) plus the variation surcharge.
pub fn resolve_unit_price(
    item: &Item,
    variation: Option<&ItemVariation>,
    override_price: Option<Cents>,
) -> DomainResult<Cents> {
    let base = override_price.unwrap_or(item.additional_cost);
    match variation {
        Some(v) => base.checked_add(v.surcharge),
        None => Ok(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryId;

    fn table(year: i32, active: bool) -> PriceTable {
        PriceTable {
            id: PriceTableId::new(),
            name: format!("List {year}"),
            year,
            active,
        }
    }

    fn item(cost: i64) -> Item {
        Item::new(CategoryId::new(), "Tiles", Cents::new(cost)).unwrap()
    }

    #[test]
    fn resolution_requires_matching_year_and_active_flag() {
        let tables = vec![table(2024, false), table(2025, true), table(2024, true)];

        assert_eq!(effective_price_table(&tables, 2024).unwrap().year, 2024);
        assert!(effective_price_table(&tables, 2024).unwrap().active);
        assert!(effective_price_table(&tables, 2023).is_none());
    }

    #[test]
    fn no_active_table_means_no_override() {
        let tables = vec![table(2024, false)];
        assert!(effective_price_table(&tables, 2024).is_none());
    }

    #[test]
    fn unit_price_prefers_the_override() {
        let it = item(5000);
        let variation = ItemVariation::new(it.id, "Brushed", Cents::new(1000)).unwrap();

        assert_eq!(
            resolve_unit_price(&it, None, None).unwrap(),
            Cents::new(5000)
        );
        assert_eq!(
            resolve_unit_price(&it, Some(&variation), None).unwrap(),
            Cents::new(6000)
        );
        assert_eq!(
            resolve_unit_price(&it, Some(&variation), Some(Cents::new(4200))).unwrap(),
            Cents::new(5200)
        );
    }

    #[test]
    fn rejects_out_of_range_years() {
        assert!(PriceTable::new("List", 1999, true).is_err());
        assert!(PriceTable::new("List", 2101, true).is_err());
        assert!(PriceTable::new("List", 2026, true).is_ok());
    }
}
