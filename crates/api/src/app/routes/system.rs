use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use ausbau_auth::ActingIdentity;

use crate::context::IdentityContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<IdentityContext>) -> impl IntoResponse {
    let (guard, id) = match ctx.identity() {
        ActingIdentity::Admin(id) => ("admin", id.to_string()),
        ActingIdentity::Customer(id) => ("customer", id.to_string()),
    };
    Json(serde_json::json!({ "guard": guard, "id": id }))
}
