//! Consistent error responses.
//!
//! Business-rule failures map onto a small JSON shape
//! (`{"error": code, "message": …}`); validation failures additionally carry
//! field-level detail and echo the submitted input back for re-display.
//! Wrong-guard sessions are redirected to their own home instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use ausbau_auth::Guard;
use ausbau_configurations::AccessError;
use ausbau_core::DomainError;
use ausbau_export::ExportError;
use ausbau_infra::StoreError;

/// One field-level problem in a submitted body.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Session of the wrong guard hit this route group; send it home.
    WrongGuard(Guard),

    /// Ownership or lock-state denial.
    Access(AccessError),

    /// Malformed input, with the original body echoed back.
    Validation {
        fields: Vec<FieldError>,
        input: serde_json::Value,
    },

    /// Malformed identifier in the path.
    InvalidId(String),

    /// Referenced resource does not exist.
    NotFound(&'static str),

    /// Token subject has no usable customer account behind it.
    AccountInactive,

    Domain(DomainError),
    Store(StoreError),
    Export(ExportError),
}

impl ApiError {
    pub fn validation(fields: Vec<FieldError>, input: serde_json::Value) -> Self {
        Self::Validation { fields, input }
    }

    pub fn invalid_id(what: impl Into<String>) -> Self {
        Self::InvalidId(what.into())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self::Access(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self::Export(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::WrongGuard(guard) => {
                let home = match guard {
                    Guard::Admin => "/admin",
                    Guard::Customer => "/",
                };
                Redirect::to(home).into_response()
            }

            ApiError::Access(err) => match err {
                AccessError::Locked => {
                    json_error(StatusCode::FORBIDDEN, "locked", err.to_string())
                }
                _ => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
            },

            ApiError::Validation { fields, input } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation_error",
                    "fields": fields,
                    "input": input,
                })),
            )
                .into_response(),

            ApiError::InvalidId(what) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_id", what)
            }

            ApiError::NotFound(what) => {
                json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
            }

            ApiError::AccountInactive => json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                "customer account is unknown or inactive",
            ),

            ApiError::Domain(err) => match err {
                DomainError::Validation(msg) => {
                    json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
                }
                DomainError::NotFound => {
                    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
                }
                DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
                other => json_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "invariant_violation",
                    other.to_string(),
                ),
            },

            ApiError::Store(err) => match err {
                StoreError::NotFound => {
                    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
                }
                StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
                StoreError::Backend(msg) => {
                    tracing::error!("store failure: {msg}");
                    json_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "store_error",
                        "storage backend failed",
                    )
                }
            },

            ApiError::Export(err) => {
                tracing::error!("export failure: {err}");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "export_error",
                    "document rendering failed",
                )
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
