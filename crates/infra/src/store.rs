//! Store traits the service layer depends on.
//!
//! Object-safe (`Arc<dyn …>`) so the HTTP wiring can swap Postgres for the
//! in-memory store without generics bleeding upward.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ausbau_catalog::{
    Category, CategoryId, Item, ItemId, ItemVariation, ItemVariationId, PriceTable,
    PriceTableEntry, PriceTableId,
};
use ausbau_configurations::{Configuration, ConfigurationId, ConfigurationItem};
use ausbau_core::CustomerId;
use ausbau_projects::{
    ConstructionProject, Customer, ProjectBathroom, ProjectId, ProjectRoom,
};

use crate::error::StoreResult;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()>;
    async fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    async fn customers(&self) -> StoreResult<Vec<Customer>>;
    async fn update_customer(&self, customer: &Customer) -> StoreResult<()>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, category: &Category) -> StoreResult<()>;
    async fn update_category(&self, category: &Category) -> StoreResult<()>;
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()>;
    async fn categories(&self) -> StoreResult<Vec<Category>>;

    async fn insert_item(&self, item: &Item) -> StoreResult<()>;
    async fn update_item(&self, item: &Item) -> StoreResult<()>;
    async fn delete_item(&self, id: ItemId) -> StoreResult<()>;
    async fn item(&self, id: ItemId) -> StoreResult<Option<Item>>;
    async fn items(&self) -> StoreResult<Vec<Item>>;

    async fn insert_variation(&self, variation: &ItemVariation) -> StoreResult<()>;
    async fn update_variation(&self, variation: &ItemVariation) -> StoreResult<()>;
    async fn delete_variation(&self, id: ItemVariationId) -> StoreResult<()>;
    async fn variations(&self) -> StoreResult<Vec<ItemVariation>>;

    async fn insert_price_table(&self, table: &PriceTable) -> StoreResult<()>;
    async fn set_price_table_active(&self, id: PriceTableId, active: bool) -> StoreResult<()>;
    async fn price_tables(&self) -> StoreResult<Vec<PriceTable>>;
    async fn upsert_price_entry(&self, entry: &PriceTableEntry) -> StoreResult<()>;
    async fn price_entries(&self, table: PriceTableId) -> StoreResult<Vec<PriceTableEntry>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_project(&self, project: &ConstructionProject) -> StoreResult<()>;
    async fn project(&self, id: ProjectId) -> StoreResult<Option<ConstructionProject>>;
    async fn projects_of(&self, customer: CustomerId) -> StoreResult<Vec<ConstructionProject>>;

    async fn insert_room(&self, room: &ProjectRoom) -> StoreResult<()>;
    async fn insert_bathroom(&self, bathroom: &ProjectBathroom) -> StoreResult<()>;
    async fn rooms_of(&self, project: ProjectId) -> StoreResult<Vec<ProjectRoom>>;
    async fn bathrooms_of(&self, project: ProjectId) -> StoreResult<Vec<ProjectBathroom>>;
}

#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Insert a configuration together with its item rows, atomically.
    /// Covers both fresh creation (empty list) and copying (duplicated list).
    async fn insert_configuration(
        &self,
        configuration: &Configuration,
        items: &[ConfigurationItem],
    ) -> StoreResult<()>;

    async fn configuration(&self, id: ConfigurationId) -> StoreResult<Option<Configuration>>;
    async fn configurations_of(&self, project: ProjectId) -> StoreResult<Vec<Configuration>>;
    async fn items_of(&self, configuration: ConfigurationId) -> StoreResult<Vec<ConfigurationItem>>;

    /// Wholesale item replacement: delete every existing row, insert the
    /// given list verbatim, update name and resume position — one
    /// transaction. A concurrent reader sees the old list or the new one,
    /// never a partial state.
    async fn replace_items(
        &self,
        configuration: ConfigurationId,
        name: &str,
        last_position: Option<&str>,
        items: &[ConfigurationItem],
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn lock_configuration(
        &self,
        configuration: ConfigurationId,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Delete the configuration; item rows cascade.
    async fn delete_configuration(&self, id: ConfigurationId) -> StoreResult<()>;
}
