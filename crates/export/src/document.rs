use chrono::{DateTime, Utc};

use ausbau_core::Cents;

/// Everything the PDF layout needs, fully resolved.
///
/// No identifiers, no lookups: names and prices are already joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationDocument {
    pub project_name: String,
    pub configuration_name: String,
    pub generated_at: DateTime<Utc>,
    pub facade_area_sqm: f64,
    pub balcony_meters: f64,
    pub balustrade_meters: f64,
    pub room_count: usize,
    pub bathroom_count: usize,
    pub lines: Vec<DocumentLine>,
    pub total: Cents,
}

/// One row of the line-item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLine {
    pub category: String,
    pub item: String,
    pub variation: Option<String>,
    pub quantity: u32,
    /// Room or bathroom label, when the selection targets one.
    pub location: Option<String>,
    pub unit_price: Cents,
    pub line_total: Cents,
}
