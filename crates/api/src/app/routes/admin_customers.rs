//! Admin-guard customer account management.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::Utc;

use ausbau_core::CustomerId;

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors::ApiError};
use crate::context::{IdentityContext, require_admin};

pub fn router() -> Router {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/:id", put(update_customer))
}

async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let customers = services.customers.customers().await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "customers": customers.iter().map(dto::customer_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let customer = body.into_domain(Utc::now())?;
    services.customers.insert_customer(&customer).await?;
    Ok((StatusCode::CREATED, Json(dto::customer_to_json(&customer))).into_response())
}

async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCustomerRequest>,
) -> Result<Response, ApiError> {
    require_admin(&ctx)?;
    let id: CustomerId = parse_id(&id, "customer id")?;
    let existing = services
        .customers
        .customer(id)
        .await?
        .ok_or(ApiError::NotFound("customer"))?;

    let updated = body.apply(existing)?;
    services.customers.update_customer(&updated).await?;
    Ok((StatusCode::OK, Json(dto::customer_to_json(&updated))).into_response())
}
