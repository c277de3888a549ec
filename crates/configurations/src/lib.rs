//! `ausbau-configurations` — the configuration engine's decision logic.
//!
//! A configuration is a customer's saved set of item selections for one
//! construction project. This crate holds the pure parts: the access guard,
//! the draft → locked lifecycle, item-list validation and pricing. All IO
//! (transactions, row loading) lives behind the stores in `ausbau-infra`.

pub mod access;
pub mod configuration;
pub mod items;
pub mod pricing;

pub use access::{AccessError, AccessMode, authorize};
pub use configuration::{Configuration, ConfigurationId};
pub use items::{
    ConfigurationItem, ConfigurationItemId, ItemRule, SelectionError, SubmissionContext,
    SubmittedItem, validate_submission,
};
pub use pricing::{PricedLine, line_total, price_line, total};
