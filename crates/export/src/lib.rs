//! `ausbau-export` — renders a priced configuration into a PDF document.
//!
//! The renderer is pure data → bytes: the service layer assembles a
//! [`ConfigurationDocument`] from loaded rows and the computed total, and
//! this crate lays it out with a fixed structure (header, project details,
//! line-item table, total footer).

pub mod document;
pub mod pdf;

pub use document::{ConfigurationDocument, DocumentLine};
pub use pdf::{ExportError, render_pdf};
