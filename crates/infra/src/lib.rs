//! `ausbau-infra` — persistence for the configurator.
//!
//! The domain crates stay IO-free; this crate provides the store traits the
//! service layer talks to, with two implementations:
//!
//! - [`PgStore`]: Postgres via `sqlx`, explicit transactions around every
//!   multi-row mutation (`schema.sql` holds the schema).
//! - [`InMemoryStore`]: a mutex-guarded map store for development and the
//!   black-box test suite; a single critical section gives the same
//!   atomicity the Postgres transactions do.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{CatalogStore, ConfigurationStore, CustomerStore, ProjectStore};
