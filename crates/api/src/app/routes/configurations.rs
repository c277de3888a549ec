use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;

use ausbau_configurations::{
    AccessMode, Configuration, ConfigurationId, ConfigurationItem, authorize, validate_submission,
};
use ausbau_export::render_pdf;
use ausbau_projects::{ConstructionProject, ProjectId};

use crate::app::errors::{ApiError, FieldError};
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::dto;
use crate::context::{IdentityContext, require_customer};

pub fn router() -> Router {
    Router::new()
        .route("/:id/configurations", get(list).post(create))
        .route("/:id/configurations/:cid", get(detail).delete(destroy))
        .route("/:id/configurations/:cid/items", put(replace_items))
        .route("/:id/configurations/:cid/lock", post(lock))
        .route("/:id/configurations/:cid/copy", post(copy))
        .route("/:id/configurations/:cid/export", get(export))
}

/// Load project + configuration and run the access guard once.
async fn load_pair(
    services: &AppServices,
    ctx: &IdentityContext,
    project_id: &str,
    configuration_id: &str,
    mode: AccessMode,
) -> Result<(ConstructionProject, Configuration), ApiError> {
    require_customer(ctx)?;
    let project_id: ProjectId = parse_id(project_id, "project id")?;
    let configuration_id: ConfigurationId = parse_id(configuration_id, "configuration id")?;

    let project = services.load_project(project_id).await?;
    let configuration = services.load_configuration(configuration_id).await?;
    authorize(&ctx.identity(), &project, Some(&configuration), mode)?;
    Ok((project, configuration))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_customer(&ctx)?;
    let project_id: ProjectId = parse_id(&id, "project id")?;
    let project = services.load_project(project_id).await?;
    authorize(&ctx.identity(), &project, None, AccessMode::Read)?;

    let configurations = services.configurations.configurations_of(project.id).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "configurations": configurations
                .iter()
                .map(dto::configuration_to_json)
                .collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::NameRequest>,
) -> Result<Response, ApiError> {
    require_customer(&ctx)?;
    let project_id: ProjectId = parse_id(&id, "project id")?;
    let project = services.load_project(project_id).await?;
    authorize(&ctx.identity(), &project, None, AccessMode::Mutate)?;

    let name = body.validated("configuration name")?;
    let configuration = Configuration::new(project.id, name, Utc::now())?;
    services
        .configurations
        .insert_configuration(&configuration, &[])
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(dto::configuration_to_json(&configuration)),
    )
        .into_response())
}

async fn detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (project, configuration) =
        load_pair(&services, &ctx, &id, &cid, AccessMode::Read).await?;

    let view = services.price_configuration(&project, &configuration).await?;
    Ok((StatusCode::OK, Json(dto::priced_view_to_json(&view))).into_response())
}

async fn replace_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path((id, cid)): Path<(String, String)>,
    Json(body): Json<dto::ReplaceItemsRequest>,
) -> Result<Response, ApiError> {
    let (project, configuration) =
        load_pair(&services, &ctx, &id, &cid, AccessMode::Mutate).await?;

    let (name, last_position, submitted) = body.parse()?;

    // Referential validation against current rows; nothing is written if
    // any entry fails.
    let context = services.submission_context(project.id).await?;
    validate_submission(&submitted, &context).map_err(|selection_errors| {
        let fields = selection_errors
            .into_iter()
            .map(|e| FieldError::new(format!("items[{}].{}", e.index, e.field), e.message))
            .collect();
        ApiError::validation(fields, serde_json::to_value(&body).unwrap_or_default())
    })?;

    let rows: Vec<ConfigurationItem> = submitted
        .iter()
        .map(|entry| ConfigurationItem::from_submission(configuration.id, entry))
        .collect();
    services
        .configurations
        .replace_items(
            configuration.id,
            &name,
            last_position.as_deref(),
            &rows,
            Utc::now(),
        )
        .await?;

    let configuration = services.load_configuration(configuration.id).await?;
    let view = services.price_configuration(&project, &configuration).await?;
    Ok((StatusCode::OK, Json(dto::priced_view_to_json(&view))).into_response())
}

async fn lock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (_project, configuration) =
        load_pair(&services, &ctx, &id, &cid, AccessMode::Lock).await?;

    services
        .configurations
        .lock_configuration(configuration.id, Utc::now())
        .await?;

    let configuration = services.load_configuration(configuration.id).await?;
    Ok((
        StatusCode::OK,
        Json(dto::configuration_to_json(&configuration)),
    )
        .into_response())
}

async fn copy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (_project, configuration) =
        load_pair(&services, &ctx, &id, &cid, AccessMode::Copy).await?;

    let fork = configuration.fork(Utc::now());
    let duplicates: Vec<ConfigurationItem> = services
        .configurations
        .items_of(configuration.id)
        .await?
        .iter()
        .map(|item| item.duplicate_onto(fork.id))
        .collect();
    services
        .configurations
        .insert_configuration(&fork, &duplicates)
        .await?;

    Ok((StatusCode::CREATED, Json(dto::configuration_to_json(&fork))).into_response())
}

async fn destroy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (_project, configuration) =
        load_pair(&services, &ctx, &id, &cid, AccessMode::Mutate).await?;

    services
        .configurations
        .delete_configuration(configuration.id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn export(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (project, configuration) =
        load_pair(&services, &ctx, &id, &cid, AccessMode::Read).await?;

    let document = services
        .export_document(&project, &configuration, Utc::now())
        .await?;
    let bytes = render_pdf(&document)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"configuration-{}.pdf\"", configuration.id),
            ),
        ],
        bytes,
    )
        .into_response())
}
