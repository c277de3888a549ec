//! Postgres-backed store implementation.
//!
//! Raw `sqlx::query` with manual row mapping; every multi-row mutation runs
//! inside an explicit transaction. Postgres error codes are folded into
//! [`StoreError`]: `23505` (unique violation) and `23503` (foreign key
//! violation) surface as conflicts, everything else as a backend error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use ausbau_catalog::{
    Category, CategoryId, CategoryScope, Item, ItemId, ItemVariation, ItemVariationId, PriceTable,
    PriceTableEntry, PriceTableId,
};
use ausbau_configurations::{
    Configuration, ConfigurationId, ConfigurationItem, ConfigurationItemId,
};
use ausbau_core::{Cents, CustomerId};
use ausbau_projects::{
    ConstructionProject, Customer, ProjectBathroom, ProjectBathroomId, ProjectDetails, ProjectId,
    ProjectRoom, ProjectRoomId,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{CatalogStore, ConfigurationStore, CustomerStore, ProjectStore};

/// Postgres store over a shared connection pool (`schema.sql` holds the DDL).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a fresh pool; used by the binary when `DATABASE_URL` is set.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

// ── row types ────────────────────────────────────────────────────────────

struct CustomerRow {
    id: uuid::Uuid,
    name: String,
    email: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CustomerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

struct CategoryRow {
    id: uuid::Uuid,
    name: String,
    scope: String,
    sort_order: i32,
}

impl<'r> FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            scope: row.try_get("scope")?,
            sort_order: row.try_get("sort_order")?,
        })
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = StoreError;

    fn try_from(row: CategoryRow) -> Result<Self, StoreError> {
        let scope = CategoryScope::parse(&row.scope)
            .map_err(|e| StoreError::backend(format!("corrupt category row: {e}")))?;
        Ok(Category {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            scope,
            sort_order: row.sort_order,
        })
    }
}

struct ItemRow {
    id: uuid::Uuid,
    category_id: uuid::Uuid,
    name: String,
    additional_cost_cents: i64,
    requires_quantity: bool,
    consultation_required: bool,
    is_standard: bool,
    hidden_until: Option<DateTime<Utc>>,
    image_ref: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            category_id: row.try_get("category_id")?,
            name: row.try_get("name")?,
            additional_cost_cents: row.try_get("additional_cost_cents")?,
            requires_quantity: row.try_get("requires_quantity")?,
            consultation_required: row.try_get("consultation_required")?,
            is_standard: row.try_get("is_standard")?,
            hidden_until: row.try_get("hidden_until")?,
            image_ref: row.try_get("image_ref")?,
        })
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: ItemId::from_uuid(row.id),
            category_id: CategoryId::from_uuid(row.category_id),
            name: row.name,
            additional_cost: Cents::new(row.additional_cost_cents),
            requires_quantity: row.requires_quantity,
            consultation_required: row.consultation_required,
            is_standard: row.is_standard,
            hidden_until: row.hidden_until,
            image_ref: row.image_ref,
        }
    }
}

struct ConfigurationRow {
    id: uuid::Uuid,
    project_id: uuid::Uuid,
    name: String,
    is_completed: bool,
    is_locked: bool,
    last_position: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ConfigurationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            name: row.try_get("name")?,
            is_completed: row.try_get("is_completed")?,
            is_locked: row.try_get("is_locked")?,
            last_position: row.try_get("last_position")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<ConfigurationRow> for Configuration {
    fn from(row: ConfigurationRow) -> Self {
        Configuration {
            id: ConfigurationId::from_uuid(row.id),
            project_id: ProjectId::from_uuid(row.project_id),
            name: row.name,
            is_completed: row.is_completed,
            is_locked: row.is_locked,
            last_position: row.last_position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

struct ConfigurationItemRow {
    id: uuid::Uuid,
    configuration_id: uuid::Uuid,
    item_id: uuid::Uuid,
    item_variation_id: Option<uuid::Uuid>,
    quantity: Option<i32>,
    project_room_id: Option<uuid::Uuid>,
    project_bathroom_id: Option<uuid::Uuid>,
}

impl<'r> FromRow<'r, PgRow> for ConfigurationItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            configuration_id: row.try_get("configuration_id")?,
            item_id: row.try_get("item_id")?,
            item_variation_id: row.try_get("item_variation_id")?,
            quantity: row.try_get("quantity")?,
            project_room_id: row.try_get("project_room_id")?,
            project_bathroom_id: row.try_get("project_bathroom_id")?,
        })
    }
}

impl From<ConfigurationItemRow> for ConfigurationItem {
    fn from(row: ConfigurationItemRow) -> Self {
        ConfigurationItem {
            id: ConfigurationItemId::from_uuid(row.id),
            configuration_id: ConfigurationId::from_uuid(row.configuration_id),
            item_id: ItemId::from_uuid(row.item_id),
            item_variation_id: row.item_variation_id.map(ItemVariationId::from_uuid),
            quantity: row.quantity.map(|q| q.max(0) as u32),
            project_room_id: row.project_room_id.map(ProjectRoomId::from_uuid),
            project_bathroom_id: row.project_bathroom_id.map(ProjectBathroomId::from_uuid),
        }
    }
}

// ── trait implementations ────────────────────────────────────────────────

#[async_trait]
impl CustomerStore for PgStore {
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, email, active, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.active)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }

    async fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, name, email, active, created_at FROM customers WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("customer", e))?;

        row.map(|r| CustomerRow::from_row(&r).map(Customer::from))
            .transpose()
            .map_err(|e| StoreError::backend(format!("corrupt customer row: {e}")))
    }

    async fn customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT id, name, email, active, created_at FROM customers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("customers", e))?;

        rows.iter()
            .map(|r| {
                CustomerRow::from_row(r)
                    .map(Customer::from)
                    .map_err(|e| StoreError::backend(format!("corrupt customer row: {e}")))
            })
            .collect()
    }

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET name = $2, email = $3, active = $4 WHERE id = $1",
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, name, scope, sort_order) VALUES ($1, $2, $3, $4)",
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(category.scope.as_str())
        .bind(category.sort_order)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, scope = $3, sort_order = $4 WHERE id = $1",
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(category.scope.as_str())
        .bind(category.sort_order)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, scope, sort_order FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("categories", e))?;

        rows.iter()
            .map(|r| {
                CategoryRow::from_row(r)
                    .map_err(|e| StoreError::backend(format!("corrupt category row: {e}")))
                    .and_then(Category::try_from)
            })
            .collect()
    }

    async fn insert_item(&self, item: &Item) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO items (id, category_id, name, additional_cost_cents, requires_quantity,
                                consultation_required, is_standard, hidden_until, image_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(item.id.as_uuid())
        .bind(item.category_id.as_uuid())
        .bind(&item.name)
        .bind(item.additional_cost.amount())
        .bind(item.requires_quantity)
        .bind(item.consultation_required)
        .bind(item.is_standard)
        .bind(item.hidden_until)
        .bind(&item.image_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;
        Ok(())
    }

    async fn update_item(&self, item: &Item) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE items SET category_id = $2, name = $3, additional_cost_cents = $4,
                              requires_quantity = $5, consultation_required = $6,
                              is_standard = $7, hidden_until = $8, image_ref = $9
             WHERE id = $1",
        )
        .bind(item.id.as_uuid())
        .bind(item.category_id.as_uuid())
        .bind(&item.name)
        .bind(item.additional_cost.amount())
        .bind(item.requires_quantity)
        .bind(item.consultation_required)
        .bind(item.is_standard)
        .bind(item.hidden_until)
        .bind(&item.image_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = sqlx::query(
            "SELECT id, category_id, name, additional_cost_cents, requires_quantity,
                    consultation_required, is_standard, hidden_until, image_ref
             FROM items WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("item", e))?;

        row.map(|r| ItemRow::from_row(&r).map(Item::from))
            .transpose()
            .map_err(|e| StoreError::backend(format!("corrupt item row: {e}")))
    }

    async fn items(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT id, category_id, name, additional_cost_cents, requires_quantity,
                    consultation_required, is_standard, hidden_until, image_ref
             FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("items", e))?;

        rows.iter()
            .map(|r| {
                ItemRow::from_row(r)
                    .map(Item::from)
                    .map_err(|e| StoreError::backend(format!("corrupt item row: {e}")))
            })
            .collect()
    }

    async fn insert_variation(&self, variation: &ItemVariation) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO item_variations (id, item_id, name, surcharge_cents)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(variation.id.as_uuid())
        .bind(variation.item_id.as_uuid())
        .bind(&variation.name)
        .bind(variation.surcharge.amount())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_variation", e))?;
        Ok(())
    }

    async fn update_variation(&self, variation: &ItemVariation) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE item_variations SET name = $2, surcharge_cents = $3 WHERE id = $1",
        )
        .bind(variation.id.as_uuid())
        .bind(&variation.name)
        .bind(variation.surcharge.amount())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_variation", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_variation(&self, id: ItemVariationId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM item_variations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_variation", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn variations(&self) -> StoreResult<Vec<ItemVariation>> {
        let rows = sqlx::query(
            "SELECT id, item_id, name, surcharge_cents FROM item_variations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("variations", e))?;

        rows.iter()
            .map(|r| -> StoreResult<ItemVariation> {
                Ok(ItemVariation {
                    id: ItemVariationId::from_uuid(
                        r.try_get("id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    item_id: ItemId::from_uuid(
                        r.try_get("item_id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    name: r
                        .try_get("name")
                        .map_err(|e| StoreError::backend(e.to_string()))?,
                    surcharge: Cents::new(
                        r.try_get("surcharge_cents")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                })
            })
            .collect()
    }

    async fn insert_price_table(&self, table: &PriceTable) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO price_tables (id, name, year, active) VALUES ($1, $2, $3, $4)",
        )
        .bind(table.id.as_uuid())
        .bind(&table.name)
        .bind(table.year)
        .bind(table.active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_price_table", e))?;
        Ok(())
    }

    async fn set_price_table_active(&self, id: PriceTableId, active: bool) -> StoreResult<()> {
        let result = sqlx::query("UPDATE price_tables SET active = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_price_table_active", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn price_tables(&self) -> StoreResult<Vec<PriceTable>> {
        let rows = sqlx::query("SELECT id, name, year, active FROM price_tables ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("price_tables", e))?;

        rows.iter()
            .map(|r| -> StoreResult<PriceTable> {
                Ok(PriceTable {
                    id: PriceTableId::from_uuid(
                        r.try_get("id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    name: r
                        .try_get("name")
                        .map_err(|e| StoreError::backend(e.to_string()))?,
                    year: r
                        .try_get("year")
                        .map_err(|e| StoreError::backend(e.to_string()))?,
                    active: r
                        .try_get("active")
                        .map_err(|e| StoreError::backend(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn upsert_price_entry(&self, entry: &PriceTableEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO price_table_entries (price_table_id, item_id, price_cents)
             VALUES ($1, $2, $3)
             ON CONFLICT (price_table_id, item_id)
             DO UPDATE SET price_cents = EXCLUDED.price_cents",
        )
        .bind(entry.price_table_id.as_uuid())
        .bind(entry.item_id.as_uuid())
        .bind(entry.price.amount())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_price_entry", e))?;
        Ok(())
    }

    async fn price_entries(&self, table: PriceTableId) -> StoreResult<Vec<PriceTableEntry>> {
        let rows = sqlx::query(
            "SELECT price_table_id, item_id, price_cents FROM price_table_entries
             WHERE price_table_id = $1 ORDER BY item_id",
        )
        .bind(table.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("price_entries", e))?;

        rows.iter()
            .map(|r| -> StoreResult<PriceTableEntry> {
                Ok(PriceTableEntry {
                    price_table_id: PriceTableId::from_uuid(
                        r.try_get("price_table_id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    item_id: ItemId::from_uuid(
                        r.try_get("item_id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    price: Cents::new(
                        r.try_get("price_cents")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn insert_project(&self, project: &ConstructionProject) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO construction_projects
                 (id, customer_id, name, facade_area_sqm, balcony_meters, balustrade_meters, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(project.id.as_uuid())
        .bind(project.customer_id.as_uuid())
        .bind(&project.name)
        .bind(project.details.facade_area_sqm)
        .bind(project.details.balcony_meters)
        .bind(project.details.balustrade_meters)
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_project", e))?;
        Ok(())
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<ConstructionProject>> {
        let row = sqlx::query(
            "SELECT id, customer_id, name, facade_area_sqm, balcony_meters, balustrade_meters, created_at
             FROM construction_projects WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("project", e))?;

        row.map(|r| project_from_row(&r)).transpose()
    }

    async fn projects_of(&self, customer: CustomerId) -> StoreResult<Vec<ConstructionProject>> {
        let rows = sqlx::query(
            "SELECT id, customer_id, name, facade_area_sqm, balcony_meters, balustrade_meters, created_at
             FROM construction_projects WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("projects_of", e))?;

        rows.iter().map(project_from_row).collect()
    }

    async fn insert_room(&self, room: &ProjectRoom) -> StoreResult<()> {
        sqlx::query("INSERT INTO project_rooms (id, project_id, name) VALUES ($1, $2, $3)")
            .bind(room.id.as_uuid())
            .bind(room.project_id.as_uuid())
            .bind(&room.name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_room", e))?;
        Ok(())
    }

    async fn insert_bathroom(&self, bathroom: &ProjectBathroom) -> StoreResult<()> {
        sqlx::query("INSERT INTO project_bathrooms (id, project_id, name) VALUES ($1, $2, $3)")
            .bind(bathroom.id.as_uuid())
            .bind(bathroom.project_id.as_uuid())
            .bind(&bathroom.name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_bathroom", e))?;
        Ok(())
    }

    async fn rooms_of(&self, project: ProjectId) -> StoreResult<Vec<ProjectRoom>> {
        let rows = sqlx::query(
            "SELECT id, project_id, name FROM project_rooms WHERE project_id = $1 ORDER BY id",
        )
        .bind(project.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("rooms_of", e))?;

        rows.iter()
            .map(|r| -> StoreResult<ProjectRoom> {
                Ok(ProjectRoom {
                    id: ProjectRoomId::from_uuid(
                        r.try_get("id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    project_id: ProjectId::from_uuid(
                        r.try_get("project_id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    name: r
                        .try_get("name")
                        .map_err(|e| StoreError::backend(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn bathrooms_of(&self, project: ProjectId) -> StoreResult<Vec<ProjectBathroom>> {
        let rows = sqlx::query(
            "SELECT id, project_id, name FROM project_bathrooms WHERE project_id = $1 ORDER BY id",
        )
        .bind(project.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("bathrooms_of", e))?;

        rows.iter()
            .map(|r| -> StoreResult<ProjectBathroom> {
                Ok(ProjectBathroom {
                    id: ProjectBathroomId::from_uuid(
                        r.try_get("id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    project_id: ProjectId::from_uuid(
                        r.try_get("project_id")
                            .map_err(|e| StoreError::backend(e.to_string()))?,
                    ),
                    name: r
                        .try_get("name")
                        .map_err(|e| StoreError::backend(e.to_string()))?,
                })
            })
            .collect()
    }
}

fn project_from_row(r: &PgRow) -> StoreResult<ConstructionProject> {
    let read = |e: sqlx::Error| StoreError::backend(format!("corrupt project row: {e}"));
    Ok(ConstructionProject {
        id: ProjectId::from_uuid(r.try_get("id").map_err(read)?),
        customer_id: CustomerId::from_uuid(r.try_get("customer_id").map_err(read)?),
        name: r.try_get("name").map_err(read)?,
        details: ProjectDetails {
            facade_area_sqm: r.try_get("facade_area_sqm").map_err(read)?,
            balcony_meters: r.try_get("balcony_meters").map_err(read)?,
            balustrade_meters: r.try_get("balustrade_meters").map_err(read)?,
        },
        created_at: r.try_get("created_at").map_err(read)?,
    })
}

#[async_trait]
impl ConfigurationStore for PgStore {
    #[instrument(skip(self, configuration, items), fields(configuration_id = %configuration.id, item_count = items.len()), err)]
    async fn insert_configuration(
        &self,
        configuration: &Configuration,
        items: &[ConfigurationItem],
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            "INSERT INTO configurations
                 (id, project_id, name, is_completed, is_locked, last_position, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(configuration.id.as_uuid())
        .bind(configuration.project_id.as_uuid())
        .bind(&configuration.name)
        .bind(configuration.is_completed)
        .bind(configuration.is_locked)
        .bind(&configuration.last_position)
        .bind(configuration.created_at)
        .bind(configuration.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_configuration", e))?;

        for item in items {
            insert_item_row(&mut tx, item).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn configuration(&self, id: ConfigurationId) -> StoreResult<Option<Configuration>> {
        let row = sqlx::query(
            "SELECT id, project_id, name, is_completed, is_locked, last_position, created_at, updated_at
             FROM configurations WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("configuration", e))?;

        row.map(|r| ConfigurationRow::from_row(&r).map(Configuration::from))
            .transpose()
            .map_err(|e| StoreError::backend(format!("corrupt configuration row: {e}")))
    }

    async fn configurations_of(&self, project: ProjectId) -> StoreResult<Vec<Configuration>> {
        let rows = sqlx::query(
            "SELECT id, project_id, name, is_completed, is_locked, last_position, created_at, updated_at
             FROM configurations WHERE project_id = $1 ORDER BY id",
        )
        .bind(project.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("configurations_of", e))?;

        rows.iter()
            .map(|r| {
                ConfigurationRow::from_row(r)
                    .map(Configuration::from)
                    .map_err(|e| StoreError::backend(format!("corrupt configuration row: {e}")))
            })
            .collect()
    }

    async fn items_of(&self, configuration: ConfigurationId) -> StoreResult<Vec<ConfigurationItem>> {
        let rows = sqlx::query(
            "SELECT id, configuration_id, item_id, item_variation_id, quantity,
                    project_room_id, project_bathroom_id
             FROM configuration_items WHERE configuration_id = $1 ORDER BY id",
        )
        .bind(configuration.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("items_of", e))?;

        rows.iter()
            .map(|r| {
                ConfigurationItemRow::from_row(r)
                    .map(ConfigurationItem::from)
                    .map_err(|e| StoreError::backend(format!("corrupt configuration item row: {e}")))
            })
            .collect()
    }

    #[instrument(skip(self, name, last_position, items), fields(configuration_id = %configuration, item_count = items.len()), err)]
    async fn replace_items(
        &self,
        configuration: ConfigurationId,
        name: &str,
        last_position: Option<&str>,
        items: &[ConfigurationItem],
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(
            "UPDATE configurations SET name = $2, last_position = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(configuration.as_uuid())
        .bind(name)
        .bind(last_position)
        .bind(updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("replace_items_update", e))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        }

        sqlx::query("DELETE FROM configuration_items WHERE configuration_id = $1")
            .bind(configuration.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("replace_items_delete", e))?;

        for item in items {
            insert_item_row(&mut tx, item).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(configuration_id = %configuration), err)]
    async fn lock_configuration(
        &self,
        configuration: ConfigurationId,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE configurations
             SET is_locked = TRUE, is_completed = TRUE,
                 updated_at = CASE WHEN is_locked THEN updated_at ELSE $2 END
             WHERE id = $1",
        )
        .bind(configuration.as_uuid())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("lock_configuration", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_configuration(&self, id: ConfigurationId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM configurations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_configuration", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

async fn insert_item_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    item: &ConfigurationItem,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO configuration_items
             (id, configuration_id, item_id, item_variation_id, quantity,
              project_room_id, project_bathroom_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(item.id.as_uuid())
    .bind(item.configuration_id.as_uuid())
    .bind(item.item_id.as_uuid())
    .bind(item.item_variation_id.as_ref().map(|v| *v.as_uuid()))
    .bind(item.quantity.map(|q| q as i32))
    .bind(item.project_room_id.as_ref().map(|r| *r.as_uuid()))
    .bind(item.project_bathroom_id.as_ref().map(|b| *b.as_uuid()))
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_configuration_item", e))?;
    Ok(())
}
