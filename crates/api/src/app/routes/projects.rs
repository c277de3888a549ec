use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use ausbau_configurations::{AccessMode, authorize};
use ausbau_projects::{ProjectBathroom, ProjectId, ProjectRoom};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors::ApiError};
use crate::context::{IdentityContext, require_customer};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:id", get(get_project))
        .route("/:id/rooms", post(create_room))
        .route("/:id/bathrooms", post(create_bathroom))
        .route("/:id/catalog", get(wizard_catalog))
}

async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
) -> Result<Response, ApiError> {
    let customer = require_customer(&ctx)?;
    services.ensure_active_customer(customer).await?;

    let projects = services.projects.projects_of(customer).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "projects": projects.iter().map(dto::project_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Json(body): Json<dto::CreateProjectRequest>,
) -> Result<Response, ApiError> {
    let customer = require_customer(&ctx)?;
    services.ensure_active_customer(customer).await?;

    let project = body.into_domain(customer, Utc::now())?;
    services.projects.insert_project(&project).await?;

    Ok((StatusCode::CREATED, Json(dto::project_to_json(&project))).into_response())
}

async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_customer(&ctx)?;
    let project_id: ProjectId = parse_id(&id, "project id")?;
    let project = services.load_project(project_id).await?;
    authorize(&ctx.identity(), &project, None, AccessMode::Read)?;

    let rooms = services.projects.rooms_of(project.id).await?;
    let bathrooms = services.projects.bathrooms_of(project.id).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "project": dto::project_to_json(&project),
            "rooms": rooms.iter().map(dto::room_to_json).collect::<Vec<_>>(),
            "bathrooms": bathrooms.iter().map(dto::bathroom_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response())
}

async fn create_room(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::NameRequest>,
) -> Result<Response, ApiError> {
    require_customer(&ctx)?;
    let project_id: ProjectId = parse_id(&id, "project id")?;
    let project = services.load_project(project_id).await?;
    authorize(&ctx.identity(), &project, None, AccessMode::Mutate)?;

    let name = body.validated("room name")?;
    let room = ProjectRoom::new(project.id, name)?;
    services.projects.insert_room(&room).await?;

    Ok((StatusCode::CREATED, Json(dto::room_to_json(&room))).into_response())
}

async fn create_bathroom(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::NameRequest>,
) -> Result<Response, ApiError> {
    require_customer(&ctx)?;
    let project_id: ProjectId = parse_id(&id, "project id")?;
    let project = services.load_project(project_id).await?;
    authorize(&ctx.identity(), &project, None, AccessMode::Mutate)?;

    let name = body.validated("bathroom name")?;
    let bathroom = ProjectBathroom::new(project.id, name)?;
    services.projects.insert_bathroom(&bathroom).await?;

    Ok((StatusCode::CREATED, Json(dto::bathroom_to_json(&bathroom))).into_response())
}

async fn wizard_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_customer(&ctx)?;
    let project_id: ProjectId = parse_id(&id, "project id")?;
    let project = services.load_project(project_id).await?;
    authorize(&ctx.identity(), &project, None, AccessMode::Read)?;

    let listing = services.wizard_catalog(&project, Utc::now()).await?;
    Ok((StatusCode::OK, Json(dto::wizard_to_json(&listing))).into_response())
}
