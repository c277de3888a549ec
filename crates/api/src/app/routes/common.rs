use core::str::FromStr;

use ausbau_core::DomainError;

use crate::app::errors::ApiError;

/// Parse a path segment into a typed id; failures are a 400, not a 404.
pub fn parse_id<T>(raw: &str, what: &'static str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|_| ApiError::invalid_id(format!("invalid {what}")))
}
