//! Request/response DTOs and JSON mapping helpers.
//!
//! Request DTOs keep ids as strings and validate explicitly so a bad body
//! comes back as field-level errors with the original input echoed, not as
//! a bare deserialization failure.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use ausbau_catalog::{
    Category, CategoryId, CategoryScope, Item, ItemId, ItemVariation, ItemVariationId, PriceTable,
    PriceTableEntry, PriceTableId,
};
use ausbau_configurations::{Configuration, ConfigurationItem, SubmittedItem};
use ausbau_core::{Cents, CustomerId, DomainResult};
use ausbau_projects::{
    ConstructionProject, Customer, ProjectBathroom, ProjectBathroomId, ProjectDetails,
    ProjectRoom, ProjectRoomId,
};

use crate::app::errors::{ApiError, FieldError};
use crate::app::services::{ConfiguredLine, PricedConfigurationView, WizardCategory};

/// Upper bound on a single selection's quantity.
const MAX_QUANTITY: i64 = 9999;

fn echo<T: Serialize>(request: &T) -> serde_json::Value {
    serde_json::to_value(request).unwrap_or_default()
}

fn check_field<T>(
    result: DomainResult<T>,
    field: &str,
    fields: &mut Vec<FieldError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            fields.push(FieldError::new(field, err.to_string()));
            None
        }
    }
}

// -------------------------
// Customer-side requests
// -------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub facade_area_sqm: f64,
    #[serde(default)]
    pub balcony_meters: f64,
    #[serde(default)]
    pub balustrade_meters: f64,
}

impl CreateProjectRequest {
    pub fn into_domain(
        self,
        customer: CustomerId,
        now: DateTime<Utc>,
    ) -> Result<ConstructionProject, ApiError> {
        let input = echo(&self);
        let mut fields = Vec::new();

        for (field, value) in [
            ("facade_area_sqm", self.facade_area_sqm),
            ("balcony_meters", self.balcony_meters),
            ("balustrade_meters", self.balustrade_meters),
        ] {
            if !value.is_finite() || value < 0.0 {
                fields.push(FieldError::new(field, "must be a non-negative number"));
            }
        }
        if self.name.trim().is_empty() {
            fields.push(FieldError::new("name", "must not be empty"));
        }
        if !fields.is_empty() {
            return Err(ApiError::validation(fields, input));
        }

        let details = ProjectDetails {
            facade_area_sqm: self.facade_area_sqm,
            balcony_meters: self.balcony_meters,
            balustrade_meters: self.balustrade_meters,
        };
        ConstructionProject::new(customer, self.name, details, now).map_err(|e| {
            ApiError::validation(vec![FieldError::new("name", e.to_string())], input)
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

impl NameRequest {
    pub fn validated(self, label: &'static str) -> Result<String, ApiError> {
        let input = echo(&self);
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::validation(
                vec![FieldError::new("name", format!("{label} must not be empty"))],
                input,
            ));
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplaceItemsRequest {
    pub name: String,
    #[serde(default)]
    pub last_position: Option<String>,
    #[serde(default)]
    pub items: Vec<SubmittedItemRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmittedItemRequest {
    pub item_id: String,
    #[serde(default)]
    pub item_variation_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub project_room_id: Option<String>,
    #[serde(default)]
    pub project_bathroom_id: Option<String>,
}

impl ReplaceItemsRequest {
    /// Parse ids and ranges; referential checks against the catalog and the
    /// project happen afterwards in the domain validator.
    pub fn parse(&self) -> Result<(String, Option<String>, Vec<SubmittedItem>), ApiError> {
        let input = echo(self);
        let mut fields = Vec::new();

        let name = check_field(
            Configuration::validate_name(self.name.clone()),
            "name",
            &mut fields,
        );

        let mut entries = Vec::with_capacity(self.items.len());
        for (i, raw) in self.items.iter().enumerate() {
            let item_id = check_field(
                ItemId::from_str(&raw.item_id),
                &format!("items[{i}].item_id"),
                &mut fields,
            );

            let variation_id = match &raw.item_variation_id {
                None => None,
                Some(s) => check_field(
                    ItemVariationId::from_str(s),
                    &format!("items[{i}].item_variation_id"),
                    &mut fields,
                ),
            };

            let room_id = match &raw.project_room_id {
                None => None,
                Some(s) => check_field(
                    ProjectRoomId::from_str(s),
                    &format!("items[{i}].project_room_id"),
                    &mut fields,
                ),
            };

            let bathroom_id = match &raw.project_bathroom_id {
                None => None,
                Some(s) => check_field(
                    ProjectBathroomId::from_str(s),
                    &format!("items[{i}].project_bathroom_id"),
                    &mut fields,
                ),
            };

            let quantity = match raw.quantity {
                None => None,
                Some(q) if (1..=MAX_QUANTITY).contains(&q) => Some(q as u32),
                Some(_) => {
                    fields.push(FieldError::new(
                        format!("items[{i}].quantity"),
                        format!("must be between 1 and {MAX_QUANTITY}"),
                    ));
                    None
                }
            };

            if let Some(item_id) = item_id {
                entries.push(SubmittedItem {
                    item_id,
                    item_variation_id: variation_id,
                    quantity,
                    project_room_id: room_id,
                    project_bathroom_id: bathroom_id,
                });
            }
        }

        match (name, fields.is_empty()) {
            (Some(name), true) => Ok((name, self.last_position.clone(), entries)),
            _ => Err(ApiError::validation(fields, input)),
        }
    }
}

// -------------------------
// Admin requests
// -------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub scope: String,
    #[serde(default)]
    pub sort_order: i32,
}

impl CategoryRequest {
    pub fn into_domain(self, id: Option<CategoryId>) -> Result<Category, ApiError> {
        let input = echo(&self);
        let mut fields = Vec::new();

        let scope = check_field(CategoryScope::parse(&self.scope), "scope", &mut fields);
        let category = check_field(
            Category::new(self.name, scope.unwrap_or(CategoryScope::Room), self.sort_order),
            "name",
            &mut fields,
        );

        match (category, fields.is_empty()) {
            (Some(mut category), true) => {
                if let Some(id) = id {
                    category.id = id;
                }
                Ok(category)
            }
            _ => Err(ApiError::validation(fields, input)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemRequest {
    pub category_id: String,
    pub name: String,
    pub additional_cost_cents: i64,
    #[serde(default)]
    pub requires_quantity: bool,
    #[serde(default)]
    pub consultation_required: bool,
    #[serde(default)]
    pub is_standard: bool,
    #[serde(default)]
    pub hidden_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl ItemRequest {
    pub fn into_domain(self, id: Option<ItemId>) -> Result<Item, ApiError> {
        let input = echo(&self);
        let mut fields = Vec::new();

        let category_id = check_field(
            CategoryId::from_str(&self.category_id),
            "category_id",
            &mut fields,
        );
        let item = category_id.and_then(|category_id| {
            match Item::new(
                category_id,
                self.name.clone(),
                Cents::new(self.additional_cost_cents),
            ) {
                Ok(item) => Some(item),
                Err(e) => {
                    let field = if e.to_string().contains("cost") {
                        "additional_cost_cents"
                    } else {
                        "name"
                    };
                    fields.push(FieldError::new(field, e.to_string()));
                    None
                }
            }
        });

        match (item, fields.is_empty()) {
            (Some(mut item), true) => {
                if let Some(id) = id {
                    item.id = id;
                }
                item.requires_quantity = self.requires_quantity;
                item.consultation_required = self.consultation_required;
                item.is_standard = self.is_standard;
                item.hidden_until = self.hidden_until;
                item.image_ref = self.image_ref;
                Ok(item)
            }
            _ => Err(ApiError::validation(fields, input)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariationRequest {
    pub name: String,
    pub surcharge_cents: i64,
}

impl VariationRequest {
    pub fn into_domain(
        self,
        item_id: ItemId,
        id: Option<ItemVariationId>,
    ) -> Result<ItemVariation, ApiError> {
        let input = echo(&self);
        match ItemVariation::new(item_id, self.name, Cents::new(self.surcharge_cents)) {
            Ok(mut variation) => {
                if let Some(id) = id {
                    variation.id = id;
                }
                Ok(variation)
            }
            Err(e) => Err(ApiError::validation(
                vec![FieldError::new("name", e.to_string())],
                input,
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceTableRequest {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub active: bool,
}

impl PriceTableRequest {
    pub fn into_domain(self) -> Result<PriceTable, ApiError> {
        let input = echo(&self);
        PriceTable::new(self.name, self.year, self.active).map_err(|e| {
            let field = if e.to_string().contains("year") { "year" } else { "name" };
            ApiError::validation(vec![FieldError::new(field, e.to_string())], input)
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceEntryRequest {
    pub item_id: String,
    pub price_cents: i64,
}

impl PriceEntryRequest {
    pub fn into_domain(self, table: PriceTableId) -> Result<PriceTableEntry, ApiError> {
        let input = echo(&self);
        let mut fields = Vec::new();

        let item_id = check_field(ItemId::from_str(&self.item_id), "item_id", &mut fields);
        if self.price_cents < 0 {
            fields.push(FieldError::new("price_cents", "must not be negative"));
        }

        match (item_id, fields.is_empty()) {
            (Some(item_id), true) => Ok(PriceTableEntry {
                price_table_id: table,
                item_id,
                price: Cents::new(self.price_cents),
            }),
            _ => Err(ApiError::validation(fields, input)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
}

impl CreateCustomerRequest {
    pub fn into_domain(self, now: DateTime<Utc>) -> Result<Customer, ApiError> {
        let input = echo(&self);
        Customer::new(self.name, self.email, now).map_err(|e| {
            let field = if e.to_string().contains("email") { "email" } else { "name" };
            ApiError::validation(vec![FieldError::new(field, e.to_string())], input)
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl UpdateCustomerRequest {
    pub fn apply(self, mut customer: Customer) -> Result<Customer, ApiError> {
        let input = echo(&self);

        // Run the fields through the constructor so update and create share
        // one set of rules.
        let candidate = Customer::new(
            self.name.unwrap_or_else(|| customer.name.clone()),
            self.email.unwrap_or_else(|| customer.email.clone()),
            customer.created_at,
        )
        .map_err(|e| {
            let field = if e.to_string().contains("email") { "email" } else { "name" };
            ApiError::validation(vec![FieldError::new(field, e.to_string())], input)
        })?;

        customer.name = candidate.name;
        customer.email = candidate.email;
        if let Some(active) = self.active {
            customer.active = active;
        }
        Ok(customer)
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn customer_to_json(c: &Customer) -> serde_json::Value {
    json!({
        "id": c.id.to_string(),
        "name": c.name,
        "email": c.email,
        "active": c.active,
        "created_at": c.created_at,
    })
}

pub fn category_to_json(c: &Category) -> serde_json::Value {
    json!({
        "id": c.id.to_string(),
        "name": c.name,
        "scope": c.scope.as_str(),
        "sort_order": c.sort_order,
    })
}

pub fn item_to_json(i: &Item) -> serde_json::Value {
    json!({
        "id": i.id.to_string(),
        "category_id": i.category_id.to_string(),
        "name": i.name,
        "additional_cost_cents": i.additional_cost.amount(),
        "requires_quantity": i.requires_quantity,
        "consultation_required": i.consultation_required,
        "is_standard": i.is_standard,
        "hidden_until": i.hidden_until,
        "image_ref": i.image_ref,
    })
}

pub fn variation_to_json(v: &ItemVariation) -> serde_json::Value {
    json!({
        "id": v.id.to_string(),
        "item_id": v.item_id.to_string(),
        "name": v.name,
        "surcharge_cents": v.surcharge.amount(),
    })
}

pub fn price_table_to_json(t: &PriceTable) -> serde_json::Value {
    json!({
        "id": t.id.to_string(),
        "name": t.name,
        "year": t.year,
        "active": t.active,
    })
}

pub fn price_entry_to_json(e: &PriceTableEntry) -> serde_json::Value {
    json!({
        "price_table_id": e.price_table_id.to_string(),
        "item_id": e.item_id.to_string(),
        "price_cents": e.price.amount(),
    })
}

pub fn project_to_json(p: &ConstructionProject) -> serde_json::Value {
    json!({
        "id": p.id.to_string(),
        "customer_id": p.customer_id.to_string(),
        "name": p.name,
        "facade_area_sqm": p.details.facade_area_sqm,
        "balcony_meters": p.details.balcony_meters,
        "balustrade_meters": p.details.balustrade_meters,
        "created_at": p.created_at,
    })
}

pub fn room_to_json(r: &ProjectRoom) -> serde_json::Value {
    json!({ "id": r.id.to_string(), "project_id": r.project_id.to_string(), "name": r.name })
}

pub fn bathroom_to_json(b: &ProjectBathroom) -> serde_json::Value {
    json!({ "id": b.id.to_string(), "project_id": b.project_id.to_string(), "name": b.name })
}

pub fn configuration_to_json(c: &Configuration) -> serde_json::Value {
    json!({
        "id": c.id.to_string(),
        "project_id": c.project_id.to_string(),
        "name": c.name,
        "is_completed": c.is_completed,
        "is_locked": c.is_locked,
        "last_position": c.last_position,
        "created_at": c.created_at,
        "updated_at": c.updated_at,
    })
}

pub fn configuration_item_to_json(i: &ConfigurationItem) -> serde_json::Value {
    json!({
        "id": i.id.to_string(),
        "item_id": i.item_id.to_string(),
        "item_variation_id": i.item_variation_id.map(|v| v.to_string()),
        "quantity": i.quantity,
        "project_room_id": i.project_room_id.map(|r| r.to_string()),
        "project_bathroom_id": i.project_bathroom_id.map(|b| b.to_string()),
    })
}

fn configured_line_to_json(l: &ConfiguredLine) -> serde_json::Value {
    json!({
        "entry": configuration_item_to_json(&l.entry),
        "category": l.category_name,
        "item": l.item_name,
        "variation": l.variation_name,
        "location": l.location,
        "quantity": l.priced.quantity,
        "unit_price_cents": l.priced.unit_price.amount(),
        "unit_price": l.priced.unit_price.to_string(),
        "line_total_cents": l.priced.line_total.amount(),
        "line_total": l.priced.line_total.to_string(),
    })
}

pub fn priced_view_to_json(view: &PricedConfigurationView) -> serde_json::Value {
    json!({
        "configuration": configuration_to_json(&view.configuration),
        "lines": view.lines.iter().map(configured_line_to_json).collect::<Vec<_>>(),
        "total_cents": view.total.amount(),
        "total": view.total.to_string(),
    })
}

pub fn wizard_to_json(listing: &[WizardCategory]) -> serde_json::Value {
    json!({
        "categories": listing.iter().map(|section| json!({
            "id": section.category.id.to_string(),
            "name": section.category.name,
            "scope": section.category.scope.as_str(),
            "items": section.items.iter().map(|wi| json!({
                "id": wi.item.id.to_string(),
                "name": wi.item.name,
                "effective_price_cents": wi.effective_price.amount(),
                "effective_price": wi.effective_price.to_string(),
                "requires_quantity": wi.item.requires_quantity,
                "consultation_required": wi.item.consultation_required,
                "is_standard": wi.item.is_standard,
                "image_ref": wi.item.image_ref,
                "variations": wi.variations.iter().map(variation_to_json).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    })
}
