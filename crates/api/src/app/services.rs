//! Store wiring and the composite reads shared by several handlers.
//!
//! Handlers own the guard → validate → write sequence; what lives here is
//! the store selection (Postgres vs. in-memory) and the joined views
//! (priced configuration, wizard listing, export document) that more than
//! one route needs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use ausbau_catalog::{
    Category, CategoryId, Item, ItemId, ItemVariation, ItemVariationId, effective_price_table,
    resolve_unit_price, wizard_order,
};
use ausbau_configurations::{
    Configuration, ConfigurationId, ConfigurationItem, ItemRule, PricedLine, SubmissionContext,
    price_line, total,
};
use ausbau_core::{Cents, CustomerId};
use ausbau_export::{ConfigurationDocument, DocumentLine};
use ausbau_infra::{
    CatalogStore, ConfigurationStore, CustomerStore, InMemoryStore, PgStore, ProjectStore,
    StoreError,
};
use ausbau_projects::{ConstructionProject, ProjectId};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<dyn CustomerStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub configurations: Arc<dyn ConfigurationStore>,
}

impl AppServices {
    /// Dev/test wiring: everything on one mutex-guarded map store.
    pub fn in_memory() -> Self {
        Self::from_shared(Arc::new(InMemoryStore::new()))
    }

    /// Production wiring: one Postgres pool behind all four traits.
    pub async fn postgres(database_url: &str) -> Result<Self, StoreError> {
        Ok(Self::from_shared(Arc::new(
            PgStore::connect(database_url).await?,
        )))
    }

    fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: CustomerStore + CatalogStore + ProjectStore + ConfigurationStore + 'static,
    {
        Self {
            customers: store.clone(),
            catalog: store.clone(),
            projects: store.clone(),
            configurations: store,
        }
    }

    // ── single-row loads with 404 semantics ──────────────────────────────

    pub async fn load_project(&self, id: ProjectId) -> Result<ConstructionProject, ApiError> {
        self.projects
            .project(id)
            .await?
            .ok_or(ApiError::NotFound("project"))
    }

    pub async fn load_configuration(&self, id: ConfigurationId) -> Result<Configuration, ApiError> {
        self.configurations
            .configuration(id)
            .await?
            .ok_or(ApiError::NotFound("configuration"))
    }

    /// The token's subject must exist as an active account before it may
    /// create or list projects; everything else is ownership-gated anyway.
    pub async fn ensure_active_customer(&self, id: CustomerId) -> Result<(), ApiError> {
        match self.customers.customer(id).await? {
            Some(customer) if customer.active => Ok(()),
            _ => Err(ApiError::AccountInactive),
        }
    }

    // ── composite reads ──────────────────────────────────────────────────

    /// World knowledge for validating a submitted replacement list.
    pub async fn submission_context(
        &self,
        project: ProjectId,
    ) -> Result<SubmissionContext, ApiError> {
        let mut ctx = SubmissionContext::default();
        for item in self.catalog.items().await? {
            ctx.items.insert(
                item.id,
                ItemRule {
                    requires_quantity: item.requires_quantity,
                },
            );
        }
        for variation in self.catalog.variations().await? {
            ctx.variations.insert(variation.id, variation.item_id);
        }
        ctx.rooms = self
            .projects
            .rooms_of(project)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        ctx.bathrooms = self
            .projects
            .bathrooms_of(project)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();
        Ok(ctx)
    }

    /// Per-item price overrides of the project's effective price table.
    pub async fn price_overrides(
        &self,
        project: &ConstructionProject,
    ) -> Result<HashMap<ItemId, Cents>, ApiError> {
        let tables = self.catalog.price_tables().await?;
        let Some(table) = effective_price_table(&tables, project.creation_year()) else {
            return Ok(HashMap::new());
        };
        let entries = self.catalog.price_entries(table.id).await?;
        Ok(entries.into_iter().map(|e| (e.item_id, e.price)).collect())
    }

    /// Load and price a configuration from current rows. No caching: every
    /// call re-reads and re-sums.
    pub async fn price_configuration(
        &self,
        project: &ConstructionProject,
        configuration: &Configuration,
    ) -> Result<PricedConfigurationView, ApiError> {
        let entries = self.configurations.items_of(configuration.id).await?;

        let items: HashMap<ItemId, Item> = self
            .catalog
            .items()
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();
        let categories: HashMap<CategoryId, Category> = self
            .catalog
            .categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let variations: HashMap<ItemVariationId, ItemVariation> = self
            .catalog
            .variations()
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let overrides = self.price_overrides(project).await?;

        let room_names: HashMap<_, _> = self
            .projects
            .rooms_of(project.id)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();
        let bathroom_names: HashMap<_, _> = self
            .projects
            .bathrooms_of(project.id)
            .await?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect();

        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            let item = items.get(&entry.item_id).ok_or_else(|| {
                ApiError::Store(StoreError::backend(
                    "configuration references a missing item",
                ))
            })?;
            let variation = entry.item_variation_id.and_then(|id| variations.get(&id));
            let unit = resolve_unit_price(item, variation, overrides.get(&entry.item_id).copied())?;
            let priced = price_line(entry.item_id, unit, entry.quantity)?;

            let location = entry
                .project_room_id
                .and_then(|id| room_names.get(&id).cloned())
                .or_else(|| {
                    entry
                        .project_bathroom_id
                        .and_then(|id| bathroom_names.get(&id).cloned())
                });

            lines.push(ConfiguredLine {
                category_name: categories
                    .get(&item.category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                item_name: item.name.clone(),
                variation_name: variation.map(|v| v.name.clone()),
                location,
                priced,
                entry,
            });
        }

        let priced_lines: Vec<PricedLine> = lines.iter().map(|l| l.priced.clone()).collect();
        let grand_total = total(&priced_lines)?;

        Ok(PricedConfigurationView {
            configuration: configuration.clone(),
            lines,
            total: grand_total,
        })
    }

    /// Wizard listing: ordered categories with their currently visible
    /// items, variations and effective prices.
    pub async fn wizard_catalog(
        &self,
        project: &ConstructionProject,
        now: DateTime<Utc>,
    ) -> Result<Vec<WizardCategory>, ApiError> {
        let categories = wizard_order(self.catalog.categories().await?);
        let items = self.catalog.items().await?;
        let variations = self.catalog.variations().await?;
        let overrides = self.price_overrides(project).await?;

        let mut variations_by_item: HashMap<ItemId, Vec<ItemVariation>> = HashMap::new();
        for variation in variations {
            variations_by_item
                .entry(variation.item_id)
                .or_default()
                .push(variation);
        }

        let mut listing = Vec::with_capacity(categories.len());
        for category in categories {
            let category_items: Vec<WizardItem> = items
                .iter()
                .filter(|i| i.category_id == category.id && i.is_visible(now))
                .map(|item| WizardItem {
                    effective_price: overrides
                        .get(&item.id)
                        .copied()
                        .unwrap_or(item.additional_cost),
                    variations: variations_by_item.get(&item.id).cloned().unwrap_or_default(),
                    item: item.clone(),
                })
                .collect();
            listing.push(WizardCategory {
                category,
                items: category_items,
            });
        }
        Ok(listing)
    }

    /// Assemble the fully-resolved document handed to the PDF renderer.
    pub async fn export_document(
        &self,
        project: &ConstructionProject,
        configuration: &Configuration,
        generated_at: DateTime<Utc>,
    ) -> Result<ConfigurationDocument, ApiError> {
        let priced = self.price_configuration(project, configuration).await?;
        let rooms = self.projects.rooms_of(project.id).await?;
        let bathrooms = self.projects.bathrooms_of(project.id).await?;

        Ok(ConfigurationDocument {
            project_name: project.name.clone(),
            configuration_name: configuration.name.clone(),
            generated_at,
            facade_area_sqm: project.details.facade_area_sqm,
            balcony_meters: project.details.balcony_meters,
            balustrade_meters: project.details.balustrade_meters,
            room_count: rooms.len(),
            bathroom_count: bathrooms.len(),
            lines: priced
                .lines
                .iter()
                .map(|l| DocumentLine {
                    category: l.category_name.clone(),
                    item: l.item_name.clone(),
                    variation: l.variation_name.clone(),
                    quantity: l.priced.quantity,
                    location: l.location.clone(),
                    unit_price: l.priced.unit_price,
                    line_total: l.priced.line_total,
                })
                .collect(),
            total: priced.total,
        })
    }
}

/// A configuration with every line joined and priced, plus the total.
pub struct PricedConfigurationView {
    pub configuration: Configuration,
    pub lines: Vec<ConfiguredLine>,
    pub total: Cents,
}

pub struct ConfiguredLine {
    pub entry: ConfigurationItem,
    pub category_name: String,
    pub item_name: String,
    pub variation_name: Option<String>,
    pub location: Option<String>,
    pub priced: PricedLine,
}

/// One wizard section: a category and its listable items.
pub struct WizardCategory {
    pub category: Category,
    pub items: Vec<WizardItem>,
}

pub struct WizardItem {
    pub item: Item,
    pub effective_price: Cents,
    pub variations: Vec<ItemVariation>,
}
