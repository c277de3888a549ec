//! `ausbau-auth` — acting-identity and token boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Credential
//! checks happen outside the system; what arrives here is a signed token,
//! and what leaves is a typed [`ActingIdentity`].

pub mod claims;
pub mod identity;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::{ActingIdentity, Guard};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
