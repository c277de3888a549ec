//! Selected items within a configuration, and validation of a submitted
//! replacement list.
//!
//! Updates are wholesale: the submitted list replaces every existing row in
//! one transaction. Validation therefore runs over the complete list before
//! any write happens.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_catalog::{ItemId, ItemVariationId};
use ausbau_core::impl_uuid_newtype;
use ausbau_projects::{ProjectBathroomId, ProjectRoomId};

use crate::configuration::ConfigurationId;

/// Configuration item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationItemId(Uuid);

impl_uuid_newtype!(ConfigurationItemId, "ConfigurationItemId");

/// One selected item within a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationItem {
    pub id: ConfigurationItemId,
    pub configuration_id: ConfigurationId,
    pub item_id: ItemId,
    pub item_variation_id: Option<ItemVariationId>,
    /// Defaults to 1 for pricing when absent.
    pub quantity: Option<u32>,
    pub project_room_id: Option<ProjectRoomId>,
    pub project_bathroom_id: Option<ProjectBathroomId>,
}

impl ConfigurationItem {
    /// Materialize a validated submission entry as a fresh row.
    pub fn from_submission(configuration_id: ConfigurationId, entry: &SubmittedItem) -> Self {
        Self {
            id: ConfigurationItemId::new(),
            configuration_id,
            item_id: entry.item_id,
            item_variation_id: entry.item_variation_id,
            quantity: entry.quantity,
            project_room_id: entry.project_room_id,
            project_bathroom_id: entry.project_bathroom_id,
        }
    }

    /// Duplicate this row verbatim onto another configuration.
    pub fn duplicate_onto(&self, configuration_id: ConfigurationId) -> Self {
        Self {
            id: ConfigurationItemId::new(),
            configuration_id,
            item_id: self.item_id,
            item_variation_id: self.item_variation_id,
            quantity: self.quantity,
            project_room_id: self.project_room_id,
            project_bathroom_id: self.project_bathroom_id,
        }
    }
}

/// One entry of a submitted replacement list, taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedItem {
    pub item_id: ItemId,
    pub item_variation_id: Option<ItemVariationId>,
    pub quantity: Option<u32>,
    pub project_room_id: Option<ProjectRoomId>,
    pub project_bathroom_id: Option<ProjectBathroomId>,
}

/// What the validator needs to know about the surrounding world.
///
/// Assembled by the service layer from current catalog and project rows.
#[derive(Debug, Default)]
pub struct SubmissionContext {
    /// Known items and whether each requires an explicit quantity.
    pub items: HashMap<ItemId, ItemRule>,
    /// Variation → owning item.
    pub variations: HashMap<ItemVariationId, ItemId>,
    /// Rooms of the project being configured.
    pub rooms: HashSet<ProjectRoomId>,
    /// Bathrooms of the project being configured.
    pub bathrooms: HashSet<ProjectBathroomId>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ItemRule {
    pub requires_quantity: bool,
}

/// A field-level problem in a submitted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionError {
    /// Index of the offending entry in the submitted list.
    pub index: usize,
    pub field: &'static str,
    pub message: String,
}

impl SelectionError {
    fn new(index: usize, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            index,
            field,
            message: message.into(),
        }
    }
}

/// Validate a submitted replacement list against the current world.
///
/// Runs over the complete list and reports every problem; an error result
/// means nothing may be written.
pub fn validate_submission(
    entries: &[SubmittedItem],
    ctx: &SubmissionContext,
) -> Result<(), Vec<SelectionError>> {
    let mut errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match ctx.items.get(&entry.item_id) {
            None => {
                errors.push(SelectionError::new(
                    index,
                    "item_id",
                    format!("references an unknown item ({})", entry.item_id),
                ));
                // Without the item there is nothing meaningful to check below.
                continue;
            }
            Some(rule) => {
                if rule.requires_quantity && entry.quantity.is_none() {
                    errors.push(SelectionError::new(
                        index,
                        "quantity",
                        "this item requires an explicit quantity",
                    ));
                }
            }
        }

        if let Some(variation_id) = entry.item_variation_id {
            match ctx.variations.get(&variation_id) {
                None => errors.push(SelectionError::new(
                    index,
                    "item_variation_id",
                    format!("references an unknown variation ({variation_id})"),
                )),
                Some(owner) if *owner != entry.item_id => errors.push(SelectionError::new(
                    index,
                    "item_variation_id",
                    "variation belongs to a different item",
                )),
                Some(_) => {}
            }
        }

        if entry.quantity == Some(0) {
            errors.push(SelectionError::new(index, "quantity", "must be at least 1"));
        }

        if entry.project_room_id.is_some() && entry.project_bathroom_id.is_some() {
            errors.push(SelectionError::new(
                index,
                "project_room_id",
                "a selection targets a room or a bathroom, never both",
            ));
        }

        if let Some(room) = entry.project_room_id {
            if !ctx.rooms.contains(&room) {
                errors.push(SelectionError::new(
                    index,
                    "project_room_id",
                    "room does not belong to this project",
                ));
            }
        }

        if let Some(bathroom) = entry.project_bathroom_id {
            if !ctx.bathrooms.contains(&bathroom) {
                errors.push(SelectionError::new(
                    index,
                    "project_bathroom_id",
                    "bathroom does not belong to this project",
                ));
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(item: ItemId, requires_quantity: bool) -> SubmissionContext {
        let mut ctx = SubmissionContext::default();
        ctx.items.insert(item, ItemRule { requires_quantity });
        ctx
    }

    fn entry(item_id: ItemId) -> SubmittedItem {
        SubmittedItem {
            item_id,
            item_variation_id: None,
            quantity: None,
            project_room_id: None,
            project_bathroom_id: None,
        }
    }

    #[test]
    fn accepts_a_minimal_valid_entry() {
        let item = ItemId::new();
        let ctx = ctx_with(item, false);
        assert!(validate_submission(&[entry(item)], &ctx).is_ok());
    }

    #[test]
    fn unknown_item_fails_the_whole_list() {
        let known = ItemId::new();
        let ctx = ctx_with(known, false);

        let errors =
            validate_submission(&[entry(known), entry(ItemId::new())], &ctx).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 1);
        assert_eq!(errors[0].field, "item_id");
    }

    #[test]
    fn variation_must_belong_to_the_item() {
        let item_a = ItemId::new();
        let item_b = ItemId::new();
        let variation_of_b = ItemVariationId::new();

        let mut ctx = ctx_with(item_a, false);
        ctx.items.insert(item_b, ItemRule::default());
        ctx.variations.insert(variation_of_b, item_b);

        let mut e = entry(item_a);
        e.item_variation_id = Some(variation_of_b);
        let errors = validate_submission(&[e], &ctx).unwrap_err();
        assert_eq!(errors[0].field, "item_variation_id");
    }

    #[test]
    fn room_and_bathroom_are_mutually_exclusive() {
        let item = ItemId::new();
        let room = ProjectRoomId::new();
        let bathroom = ProjectBathroomId::new();

        let mut ctx = ctx_with(item, false);
        ctx.rooms.insert(room);
        ctx.bathrooms.insert(bathroom);

        let mut e = entry(item);
        e.project_room_id = Some(room);
        e.project_bathroom_id = Some(bathroom);
        let errors = validate_submission(&[e], &ctx).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "project_room_id");
    }

    #[test]
    fn rooms_of_other_projects_are_rejected() {
        let item = ItemId::new();
        let mut ctx = ctx_with(item, false);
        ctx.rooms.insert(ProjectRoomId::new());

        let mut e = entry(item);
        e.project_room_id = Some(ProjectRoomId::new());
        let errors = validate_submission(&[e], &ctx).unwrap_err();
        assert!(errors[0].message.contains("does not belong"));
    }

    #[test]
    fn quantity_rules() {
        let item = ItemId::new();
        let ctx = ctx_with(item, true);

        // Missing but required.
        let errors = validate_submission(&[entry(item)], &ctx).unwrap_err();
        assert_eq!(errors[0].field, "quantity");

        // Zero is never a quantity.
        let mut e = entry(item);
        e.quantity = Some(0);
        let errors = validate_submission(&[e], &ctx).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("at least 1")));

        let mut e = entry(item);
        e.quantity = Some(3);
        assert!(validate_submission(&[e], &ctx).is_ok());
    }

    #[test]
    fn duplication_preserves_every_reference() {
        let source = ConfigurationItem {
            id: ConfigurationItemId::new(),
            configuration_id: ConfigurationId::new(),
            item_id: ItemId::new(),
            item_variation_id: Some(ItemVariationId::new()),
            quantity: Some(4),
            project_room_id: Some(ProjectRoomId::new()),
            project_bathroom_id: None,
        };

        let target = ConfigurationId::new();
        let copy = source.duplicate_onto(target);

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.configuration_id, target);
        assert_eq!(copy.item_id, source.item_id);
        assert_eq!(copy.item_variation_id, source.item_variation_id);
        assert_eq!(copy.quantity, source.quantity);
        assert_eq!(copy.project_room_id, source.project_room_id);
        assert_eq!(copy.project_bathroom_id, source.project_bathroom_id);
    }

    #[test]
    fn reports_every_problem_in_one_pass() {
        let ctx = SubmissionContext::default();
        let mut bad = entry(ItemId::new());
        bad.quantity = Some(0);

        // Unknown item short-circuits the entry's remaining checks but not
        // the other entries'.
        let errors = validate_submission(&[bad.clone(), bad], &ctx).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
