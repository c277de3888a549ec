//! In-memory store for development and tests.
//!
//! One `Mutex` guards the whole state, so every mutation — including the
//! delete-then-insert of [`ConfigurationStore::replace_items`] — is a single
//! critical section and therefore atomic, mirroring the Postgres
//! transactions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ausbau_catalog::{
    Category, CategoryId, Item, ItemId, ItemVariation, ItemVariationId, PriceTable,
    PriceTableEntry, PriceTableId,
};
use ausbau_configurations::{Configuration, ConfigurationId, ConfigurationItem};
use ausbau_core::CustomerId;
use ausbau_projects::{
    ConstructionProject, Customer, ProjectBathroom, ProjectBathroomId, ProjectId, ProjectRoom,
    ProjectRoomId,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{CatalogStore, ConfigurationStore, CustomerStore, ProjectStore};

#[derive(Debug, Default)]
struct State {
    customers: HashMap<CustomerId, Customer>,
    categories: HashMap<CategoryId, Category>,
    items: HashMap<ItemId, Item>,
    variations: HashMap<ItemVariationId, ItemVariation>,
    price_tables: HashMap<PriceTableId, PriceTable>,
    price_entries: HashMap<(PriceTableId, ItemId), PriceTableEntry>,
    projects: HashMap<ProjectId, ConstructionProject>,
    rooms: HashMap<ProjectRoomId, ProjectRoom>,
    bathrooms: HashMap<ProjectBathroomId, ProjectBathroom>,
    configurations: HashMap<ConfigurationId, Configuration>,
    configuration_items: HashMap<ConfigurationId, Vec<ConfigurationItem>>,
}

/// Map-backed store; dev mode and the black-box test suite run on this.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked; the data
        // itself is still coherent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Lists come back in id order; v7 ids make that creation order.
fn sorted_by_id<K, T: Clone, S: Ord>(map: &HashMap<K, T>, key: impl Fn(&T) -> S) -> Vec<T> {
    let mut rows: Vec<T> = map.values().cloned().collect();
    rows.sort_by_key(|row| key(row));
    rows
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        let mut state = self.state();
        if state.customers.contains_key(&customer.id) {
            return Err(StoreError::conflict("customer id already exists"));
        }
        if state.customers.values().any(|c| c.email == customer.email) {
            return Err(StoreError::conflict("email already in use"));
        }
        state.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.state().customers.get(&id).cloned())
    }

    async fn customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(sorted_by_id(&self.state().customers, |c| *c.id.as_uuid()))
    }

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()> {
        let mut state = self.state();
        if !state.customers.contains_key(&customer.id) {
            return Err(StoreError::NotFound);
        }
        if state
            .customers
            .values()
            .any(|c| c.id != customer.id && c.email == customer.email)
        {
            return Err(StoreError::conflict("email already in use"));
        }
        state.customers.insert(customer.id, customer.clone());
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        let mut state = self.state();
        if state.categories.contains_key(&category.id) {
            return Err(StoreError::conflict("category id already exists"));
        }
        state.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> StoreResult<()> {
        let mut state = self.state();
        if !state.categories.contains_key(&category.id) {
            return Err(StoreError::NotFound);
        }
        state.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let mut state = self.state();
        if state.items.values().any(|i| i.category_id == id) {
            return Err(StoreError::conflict("category still has items"));
        }
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        Ok(sorted_by_id(&self.state().categories, |c| *c.id.as_uuid()))
    }

    async fn insert_item(&self, item: &Item) -> StoreResult<()> {
        let mut state = self.state();
        if !state.categories.contains_key(&item.category_id) {
            return Err(StoreError::conflict("item references an unknown category"));
        }
        if state.items.contains_key(&item.id) {
            return Err(StoreError::conflict("item id already exists"));
        }
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_item(&self, item: &Item) -> StoreResult<()> {
        let mut state = self.state();
        if !state.items.contains_key(&item.id) {
            return Err(StoreError::NotFound);
        }
        if !state.categories.contains_key(&item.category_id) {
            return Err(StoreError::conflict("item references an unknown category"));
        }
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
        let mut state = self.state();
        let referenced = state
            .configuration_items
            .values()
            .flatten()
            .any(|ci| ci.item_id == id);
        if referenced {
            return Err(StoreError::conflict(
                "item is referenced by configurations",
            ));
        }
        if state.items.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.variations.retain(|_, v| v.item_id != id);
        state.price_entries.retain(|(_, item), _| *item != id);
        Ok(())
    }

    async fn item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.state().items.get(&id).cloned())
    }

    async fn items(&self) -> StoreResult<Vec<Item>> {
        Ok(sorted_by_id(&self.state().items, |i| *i.id.as_uuid()))
    }

    async fn insert_variation(&self, variation: &ItemVariation) -> StoreResult<()> {
        let mut state = self.state();
        if !state.items.contains_key(&variation.item_id) {
            return Err(StoreError::conflict(
                "variation references an unknown item",
            ));
        }
        if state.variations.contains_key(&variation.id) {
            return Err(StoreError::conflict("variation id already exists"));
        }
        state.variations.insert(variation.id, variation.clone());
        Ok(())
    }

    async fn update_variation(&self, variation: &ItemVariation) -> StoreResult<()> {
        let mut state = self.state();
        if !state.variations.contains_key(&variation.id) {
            return Err(StoreError::NotFound);
        }
        state.variations.insert(variation.id, variation.clone());
        Ok(())
    }

    async fn delete_variation(&self, id: ItemVariationId) -> StoreResult<()> {
        let mut state = self.state();
        let referenced = state
            .configuration_items
            .values()
            .flatten()
            .any(|ci| ci.item_variation_id == Some(id));
        if referenced {
            return Err(StoreError::conflict(
                "variation is referenced by configurations",
            ));
        }
        state
            .variations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn variations(&self) -> StoreResult<Vec<ItemVariation>> {
        Ok(sorted_by_id(&self.state().variations, |v| *v.id.as_uuid()))
    }

    async fn insert_price_table(&self, table: &PriceTable) -> StoreResult<()> {
        let mut state = self.state();
        if state.price_tables.contains_key(&table.id) {
            return Err(StoreError::conflict("price table id already exists"));
        }
        state.price_tables.insert(table.id, table.clone());
        Ok(())
    }

    async fn set_price_table_active(&self, id: PriceTableId, active: bool) -> StoreResult<()> {
        let mut state = self.state();
        match state.price_tables.get_mut(&id) {
            Some(table) => {
                table.active = active;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn price_tables(&self) -> StoreResult<Vec<PriceTable>> {
        Ok(sorted_by_id(&self.state().price_tables, |t| *t.id.as_uuid()))
    }

    async fn upsert_price_entry(&self, entry: &PriceTableEntry) -> StoreResult<()> {
        let mut state = self.state();
        if !state.price_tables.contains_key(&entry.price_table_id) {
            return Err(StoreError::conflict(
                "entry references an unknown price table",
            ));
        }
        if !state.items.contains_key(&entry.item_id) {
            return Err(StoreError::conflict("entry references an unknown item"));
        }
        state
            .price_entries
            .insert((entry.price_table_id, entry.item_id), entry.clone());
        Ok(())
    }

    async fn price_entries(&self, table: PriceTableId) -> StoreResult<Vec<PriceTableEntry>> {
        let state = self.state();
        let mut rows: Vec<PriceTableEntry> = state
            .price_entries
            .values()
            .filter(|e| e.price_table_id == table)
            .cloned()
            .collect();
        rows.sort_by_key(|e| *e.item_id.as_uuid());
        Ok(rows)
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn insert_project(&self, project: &ConstructionProject) -> StoreResult<()> {
        let mut state = self.state();
        if !state.customers.contains_key(&project.customer_id) {
            return Err(StoreError::conflict(
                "project references an unknown customer",
            ));
        }
        if state.projects.contains_key(&project.id) {
            return Err(StoreError::conflict("project id already exists"));
        }
        state.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<ConstructionProject>> {
        Ok(self.state().projects.get(&id).cloned())
    }

    async fn projects_of(&self, customer: CustomerId) -> StoreResult<Vec<ConstructionProject>> {
        let state = self.state();
        let mut rows: Vec<ConstructionProject> = state
            .projects
            .values()
            .filter(|p| p.customer_id == customer)
            .cloned()
            .collect();
        rows.sort_by_key(|p| *p.id.as_uuid());
        Ok(rows)
    }

    async fn insert_room(&self, room: &ProjectRoom) -> StoreResult<()> {
        let mut state = self.state();
        if !state.projects.contains_key(&room.project_id) {
            return Err(StoreError::conflict("room references an unknown project"));
        }
        state.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn insert_bathroom(&self, bathroom: &ProjectBathroom) -> StoreResult<()> {
        let mut state = self.state();
        if !state.projects.contains_key(&bathroom.project_id) {
            return Err(StoreError::conflict(
                "bathroom references an unknown project",
            ));
        }
        state.bathrooms.insert(bathroom.id, bathroom.clone());
        Ok(())
    }

    async fn rooms_of(&self, project: ProjectId) -> StoreResult<Vec<ProjectRoom>> {
        let state = self.state();
        let mut rows: Vec<ProjectRoom> = state
            .rooms
            .values()
            .filter(|r| r.project_id == project)
            .cloned()
            .collect();
        rows.sort_by_key(|r| *r.id.as_uuid());
        Ok(rows)
    }

    async fn bathrooms_of(&self, project: ProjectId) -> StoreResult<Vec<ProjectBathroom>> {
        let state = self.state();
        let mut rows: Vec<ProjectBathroom> = state
            .bathrooms
            .values()
            .filter(|b| b.project_id == project)
            .cloned()
            .collect();
        rows.sort_by_key(|b| *b.id.as_uuid());
        Ok(rows)
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryStore {
    async fn insert_configuration(
        &self,
        configuration: &Configuration,
        items: &[ConfigurationItem],
    ) -> StoreResult<()> {
        let mut state = self.state();
        if !state.projects.contains_key(&configuration.project_id) {
            return Err(StoreError::conflict(
                "configuration references an unknown project",
            ));
        }
        if state.configurations.contains_key(&configuration.id) {
            return Err(StoreError::conflict("configuration id already exists"));
        }
        state
            .configurations
            .insert(configuration.id, configuration.clone());
        state
            .configuration_items
            .insert(configuration.id, items.to_vec());
        Ok(())
    }

    async fn configuration(&self, id: ConfigurationId) -> StoreResult<Option<Configuration>> {
        Ok(self.state().configurations.get(&id).cloned())
    }

    async fn configurations_of(&self, project: ProjectId) -> StoreResult<Vec<Configuration>> {
        let state = self.state();
        let mut rows: Vec<Configuration> = state
            .configurations
            .values()
            .filter(|c| c.project_id == project)
            .cloned()
            .collect();
        rows.sort_by_key(|c| *c.id.as_uuid());
        Ok(rows)
    }

    async fn items_of(&self, configuration: ConfigurationId) -> StoreResult<Vec<ConfigurationItem>> {
        Ok(self
            .state()
            .configuration_items
            .get(&configuration)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_items(
        &self,
        configuration: ConfigurationId,
        name: &str,
        last_position: Option<&str>,
        items: &[ConfigurationItem],
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state();
        let row = state
            .configurations
            .get_mut(&configuration)
            .ok_or(StoreError::NotFound)?;
        row.name = name.to_string();
        row.last_position = last_position.map(str::to_string);
        row.updated_at = updated_at;
        state
            .configuration_items
            .insert(configuration, items.to_vec());
        Ok(())
    }

    async fn lock_configuration(
        &self,
        configuration: ConfigurationId,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state();
        let row = state
            .configurations
            .get_mut(&configuration)
            .ok_or(StoreError::NotFound)?;
        if !row.is_locked {
            row.is_locked = true;
            row.is_completed = true;
            row.updated_at = updated_at;
        }
        Ok(())
    }

    async fn delete_configuration(&self, id: ConfigurationId) -> StoreResult<()> {
        let mut state = self.state();
        if state.configurations.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.configuration_items.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ausbau_projects::ProjectDetails;

    fn seeded() -> (InMemoryStore, Customer, ConstructionProject) {
        let store = InMemoryStore::new();
        let customer = Customer::new("Jonas Keller", "jonas@example.com", Utc::now()).unwrap();
        let project = ConstructionProject::new(
            customer.id,
            "Birkenweg 12",
            ProjectDetails::default(),
            Utc::now(),
        )
        .unwrap();
        (store, customer, project)
    }

    #[tokio::test]
    async fn duplicate_emails_conflict() {
        let (store, customer, _) = seeded();
        store.insert_customer(&customer).await.unwrap();

        let twin = Customer::new("Other", "jonas@example.com", Utc::now()).unwrap();
        assert!(matches!(
            store.insert_customer(&twin).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn replace_items_swaps_the_whole_list() {
        let (store, customer, project) = seeded();
        store.insert_customer(&customer).await.unwrap();
        store.insert_project(&project).await.unwrap();

        let config = Configuration::new(project.id, "Variant A", Utc::now()).unwrap();
        store.insert_configuration(&config, &[]).await.unwrap();

        let category = Category::new("Flooring", ausbau_catalog::CategoryScope::Room, 0).unwrap();
        store.insert_category(&category).await.unwrap();
        let item = Item::new(category.id, "Oak parquet", ausbau_core::Cents::new(5000)).unwrap();
        store.insert_item(&item).await.unwrap();

        let row = ConfigurationItem {
            id: ausbau_configurations::ConfigurationItemId::new(),
            configuration_id: config.id,
            item_id: item.id,
            item_variation_id: None,
            quantity: Some(2),
            project_room_id: None,
            project_bathroom_id: None,
        };
        store
            .replace_items(config.id, "Variant A", Some("step-2"), &[row.clone()], Utc::now())
            .await
            .unwrap();
        assert_eq!(store.items_of(config.id).await.unwrap(), vec![row]);

        store
            .replace_items(config.id, "Variant B", None, &[], Utc::now())
            .await
            .unwrap();
        assert!(store.items_of(config.id).await.unwrap().is_empty());

        let reloaded = store.configuration(config.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Variant B");
        assert_eq!(reloaded.last_position, None);
    }

    #[tokio::test]
    async fn deleting_a_configuration_cascades_to_items() {
        let (store, customer, project) = seeded();
        store.insert_customer(&customer).await.unwrap();
        store.insert_project(&project).await.unwrap();

        let config = Configuration::new(project.id, "Variant A", Utc::now()).unwrap();
        store.insert_configuration(&config, &[]).await.unwrap();
        store.delete_configuration(config.id).await.unwrap();

        assert!(store.configuration(config.id).await.unwrap().is_none());
        assert!(store.items_of(config.id).await.unwrap().is_empty());
        assert_eq!(
            store.delete_configuration(config.id).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn referenced_items_cannot_be_deleted() {
        let (store, customer, project) = seeded();
        store.insert_customer(&customer).await.unwrap();
        store.insert_project(&project).await.unwrap();

        let category = Category::new("Flooring", ausbau_catalog::CategoryScope::Room, 0).unwrap();
        store.insert_category(&category).await.unwrap();
        let item = Item::new(category.id, "Oak parquet", ausbau_core::Cents::new(5000)).unwrap();
        store.insert_item(&item).await.unwrap();

        let config = Configuration::new(project.id, "Variant A", Utc::now()).unwrap();
        let row = ConfigurationItem {
            id: ausbau_configurations::ConfigurationItemId::new(),
            configuration_id: config.id,
            item_id: item.id,
            item_variation_id: None,
            quantity: None,
            project_room_id: None,
            project_bathroom_id: None,
        };
        store.insert_configuration(&config, &[row]).await.unwrap();

        assert!(matches!(
            store.delete_item(item.id).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store.delete_category(category.id).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
