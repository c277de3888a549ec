use axum::{Router, routing::get};

pub mod admin_catalog;
pub mod admin_customers;
pub mod common;
pub mod configurations;
pub mod projects;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/projects", projects::router().merge(configurations::router()))
        .nest("/admin", admin_catalog::router().merge(admin_customers::router()))
}
