//! Admin-guard catalog management: categories, items, variations and price
//! tables.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use ausbau_catalog::{CategoryId, ItemId, ItemVariationId, PriceTableId};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors::ApiError};
use crate::context::{IdentityContext, require_admin};

pub fn router() -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", put(update_item).delete(delete_item))
        .route("/items/:id/variations", get(list_variations).post(create_variation))
        .route("/variations/:id", put(update_variation).delete(delete_variation))
        .route("/price-tables", get(list_price_tables).post(create_price_table))
        .route("/price-tables/:id/activate", post(activate_price_table))
        .route("/price-tables/:id/entries", get(list_price_entries).put(upsert_price_entry))
}

async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let categories = services.catalog.categories().await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "categories": categories.iter().map(dto::category_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(body): Json<dto::CategoryRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let category = body.into_domain(None)?;
    services.catalog.insert_category(&category).await?;
    Ok((StatusCode::CREATED, Json(dto::category_to_json(&category))).into_response())
}

async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CategoryRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: CategoryId = parse_id(&id, "category id")?;
    let category = body.into_domain(Some(id))?;
    services.catalog.update_category(&category).await?;
    Ok((StatusCode::OK, Json(dto::category_to_json(&category))).into_response())
}

async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: CategoryId = parse_id(&id, "category id")?;
    services.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let items = services.catalog.items().await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "items": items.iter().map(dto::item_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(body): Json<dto::ItemRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let item = body.into_domain(None)?;
    services.catalog.insert_item(&item).await?;
    Ok((StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response())
}

async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ItemRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: ItemId = parse_id(&id, "item id")?;
    let item = body.into_domain(Some(id))?;
    services.catalog.update_item(&item).await?;
    Ok((StatusCode::OK, Json(dto::item_to_json(&item))).into_response())
}

async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: ItemId = parse_id(&id, "item id")?;
    services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_variations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: ItemId = parse_id(&id, "item id")?;
    let variations: Vec<_> = services
        .catalog
        .variations()
        .await?
        .into_iter()
        .filter(|v| v.item_id == id)
        .collect();
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "variations": variations.iter().map(dto::variation_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_variation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::VariationRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let item_id: ItemId = parse_id(&id, "item id")?;
    services
        .catalog
        .item(item_id)
        .await?
        .ok_or(ApiError::NotFound("item"))?;

    let variation = body.into_domain(item_id, None)?;
    services.catalog.insert_variation(&variation).await?;
    Ok((StatusCode::CREATED, Json(dto::variation_to_json(&variation))).into_response())
}

async fn update_variation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::VariationRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: ItemVariationId = parse_id(&id, "variation id")?;
    let existing = services
        .catalog
        .variations()
        .await?
        .into_iter()
        .find(|v| v.id == id)
        .ok_or(ApiError::NotFound("variation"))?;

    let variation = body.into_domain(existing.item_id, Some(id))?;
    services.catalog.update_variation(&variation).await?;
    Ok((StatusCode::OK, Json(dto::variation_to_json(&variation))).into_response())
}

async fn delete_variation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: ItemVariationId = parse_id(&id, "variation id")?;
    services.catalog.delete_variation(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_price_tables(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let tables = services.catalog.price_tables().await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "price_tables": tables.iter().map(dto::price_table_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_price_table(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(body): Json<dto::PriceTableRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let table = body.into_domain()?;
    services.catalog.insert_price_table(&table).await?;
    Ok((StatusCode::CREATED, Json(dto::price_table_to_json(&table))).into_response())
}

async fn activate_price_table(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ActivateRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: PriceTableId = parse_id(&id, "price table id")?;
    services
        .catalog
        .set_price_table_active(id, body.active)
        .await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "active": body.active }))).into_response())
}

async fn list_price_entries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: PriceTableId = parse_id(&id, "price table id")?;
    let entries = services.catalog.price_entries(id).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "entries": entries.iter().map(dto::price_entry_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn upsert_price_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PriceEntryRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let table: PriceTableId = parse_id(&id, "price table id")?;
    let entry = body.into_domain(table)?;
    services.catalog.upsert_price_entry(&entry).await?;
    Ok((StatusCode::OK, Json(dto::price_entry_to_json(&entry))).into_response())
}
