use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_core::{Cents, DomainError, DomainResult, impl_uuid_newtype};

use crate::category::CategoryId;

/// Item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

/// Item variation identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemVariationId(Uuid);

impl_uuid_newtype!(ItemId, "ItemId");
impl_uuid_newtype!(ItemVariationId, "ItemVariationId");

/// A selectable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub name: String,
    /// Base price on top of the standard build.
    pub additional_cost: Cents,
    /// Selecting this item requires an explicit quantity (e.g. per-meter items).
    pub requires_quantity: bool,
    /// Selecting this item triggers an on-site consultation.
    pub consultation_required: bool,
    /// Part of the standard build (listed, priced at its base cost).
    pub is_standard: bool,
    /// Hidden from the wizard until this instant passes.
    pub hidden_until: Option<DateTime<Utc>>,
    /// Opaque pointer into the external image store.
    pub image_ref: Option<String>,
}

impl Item {
    pub fn new(
        category_id: CategoryId,
        name: impl Into<String>,
        additional_cost: Cents,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("item name must not be empty"));
        }
        if additional_cost.is_negative() {
            return Err(DomainError::validation("item cost must not be negative"));
        }
        Ok(Self {
            id: ItemId::new(),
            category_id,
            name,
            additional_cost,
            requires_quantity: false,
            consultation_required: false,
            is_standard: false,
            hidden_until: None,
            image_ref: None,
        })
    }

    /// Whether the item may appear in the wizard at `now`.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        match self.hidden_until {
            None => true,
            Some(gate) => gate <= now,
        }
    }
}

/// A variation of an item, carrying a surcharge on its base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVariation {
    pub id: ItemVariationId,
    pub item_id: ItemId,
    pub name: String,
    pub surcharge: Cents,
}

impl ItemVariation {
    pub fn new(item_id: ItemId, name: impl Into<String>, surcharge: Cents) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("variation name must not be empty"));
        }
        Ok(Self {
            id: ItemVariationId::new(),
            item_id,
            name,
            surcharge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item() -> Item {
        Item::new(CategoryId::new(), "Oak parquet", Cents::new(5000)).unwrap()
    }

    #[test]
    fn visible_without_a_gate() {
        assert!(item().is_visible(Utc::now()));
    }

    #[test]
    fn hidden_until_a_future_instant() {
        let now = Utc::now();
        let mut it = item();
        it.hidden_until = Some(now + Duration::days(7));
        assert!(!it.is_visible(now));

        it.hidden_until = Some(now - Duration::days(1));
        assert!(it.is_visible(now));
    }

    #[test]
    fn a_gate_that_just_passed_counts_as_visible() {
        let now = Utc::now();
        let mut it = item();
        it.hidden_until = Some(now);
        assert!(it.is_visible(now));
    }

    #[test]
    fn rejects_invalid_fields() {
        assert!(Item::new(CategoryId::new(), "", Cents::ZERO).is_err());
        assert!(Item::new(CategoryId::new(), "Tiles", Cents::new(-1)).is_err());
        assert!(ItemVariation::new(ItemId::new(), "  ", Cents::ZERO).is_err());
    }
}
