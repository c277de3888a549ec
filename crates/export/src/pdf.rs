//! PDF emission via `lopdf`.
//!
//! The layout is a fixed, text-only A4 document: a Helvetica title block on
//! the first page, then a Courier table so the padded columns line up.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use thiserror::Error;

use crate::document::{ConfigurationDocument, DocumentLine};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("pdf generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("pdf io failed: {0}")]
    Io(#[from] std::io::Error),
}

// A4 in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: f32 = 40.0;
const TOP_Y: f32 = 800.0;
const BODY_LEADING: f32 = 12.0;
const BODY_SIZE: f32 = 8.5;
const TITLE_SIZE: f32 = 16.0;
const BODY_LINES_PER_PAGE: usize = 60;

/// Render the document to PDF bytes.
pub fn render_pdf(doc: &ConfigurationDocument) -> Result<Vec<u8>, ExportError> {
    let body = body_lines(doc);

    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let helvetica_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let courier_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => helvetica_id,
            "F2" => courier_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for (page_no, chunk) in body.chunks(BODY_LINES_PER_PAGE).enumerate() {
        let content = page_content(doc, chunk, page_no == 0);
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)?;
    Ok(bytes)
}

/// All body lines in order: generation stamp, project details, table, footer.
fn body_lines(doc: &ConfigurationDocument) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Generated {}",
        doc.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(String::new());

    lines.push(format!("Facade area:        {:>10.2} sqm", doc.facade_area_sqm));
    lines.push(format!("Balcony:            {:>10.2} m", doc.balcony_meters));
    lines.push(format!("Balustrade:         {:>10.2} m", doc.balustrade_meters));
    lines.push(format!("Rooms:              {:>10}", doc.room_count));
    lines.push(format!("Bathrooms:          {:>10}", doc.bathroom_count));
    lines.push(String::new());

    lines.push(table_row(
        "Category",
        "Item",
        "Variation",
        "Qty",
        "Location",
        "Unit",
        "Total",
    ));
    lines.push("-".repeat(104));
    for line in &doc.lines {
        lines.push(item_row(line));
    }
    lines.push("-".repeat(104));
    lines.push(format!("{:>94} {:>9}", "Total", doc.total.to_string()));

    lines
}

fn item_row(line: &DocumentLine) -> String {
    table_row(
        &line.category,
        &line.item,
        line.variation.as_deref().unwrap_or("-"),
        &line.quantity.to_string(),
        line.location.as_deref().unwrap_or("-"),
        &line.unit_price.to_string(),
        &line.line_total.to_string(),
    )
}

fn table_row(
    category: &str,
    item: &str,
    variation: &str,
    qty: &str,
    location: &str,
    unit: &str,
    total: &str,
) -> String {
    format!(
        "{} {} {} {:>4} {} {:>9} {:>9}",
        pad(category, 16),
        pad(item, 22),
        pad(variation, 14),
        qty,
        pad(location, 14),
        unit,
        total,
    )
}

/// Pad or truncate to a fixed width so Courier columns align.
fn pad(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

/// Replace characters that would upset a PDF literal string.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '(' => '[',
            ')' => ']',
            '\\' => '/',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '?',
        })
        .collect()
}

fn page_content(doc: &ConfigurationDocument, body: &[String], first_page: bool) -> Content {
    let mut operations = Vec::new();
    let mut y = TOP_Y;

    if first_page {
        let title = format!("{} - {}", doc.configuration_name, doc.project_name);
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), TITLE_SIZE.into()]));
        operations.push(Operation::new("Td", vec![MARGIN_LEFT.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(sanitize(&title))],
        ));
        operations.push(Operation::new("ET", vec![]));
        y -= 2.0 * BODY_LEADING;
    }

    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F2".into(), BODY_SIZE.into()]));
    operations.push(Operation::new("TL", vec![BODY_LEADING.into()]));
    operations.push(Operation::new("Td", vec![MARGIN_LEFT.into(), y.into()]));
    for line in body {
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(sanitize(line))],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    Content { operations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ausbau_core::Cents;
    use chrono::TimeZone;
    use chrono::Utc;

    fn sample() -> ConfigurationDocument {
        ConfigurationDocument {
            project_name: "Birkenweg 12".into(),
            configuration_name: "Ground floor (v2)".into(),
            generated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            facade_area_sqm: 182.5,
            balcony_meters: 6.4,
            balustrade_meters: 3.2,
            room_count: 5,
            bathroom_count: 2,
            lines: vec![
                DocumentLine {
                    category: "Flooring".into(),
                    item: "Oak parquet".into(),
                    variation: Some("Brushed".into()),
                    quantity: 2,
                    location: Some("Living room".into()),
                    unit_price: Cents::new(6000),
                    line_total: Cents::new(12000),
                },
                DocumentLine {
                    category: "Sanitary".into(),
                    item: "Rain shower".into(),
                    variation: None,
                    quantity: 1,
                    location: Some("Bath 1".into()),
                    unit_price: Cents::new(45000),
                    line_total: Cents::new(45000),
                },
            ],
            total: Cents::new(57000),
        }
    }

    #[test]
    fn emits_a_pdf_byte_stream() {
        let bytes = render_pdf(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn content_carries_names_prices_and_total() {
        // Streams are written uncompressed, so the text survives verbatim.
        let bytes = render_pdf(&sample()).unwrap();
        let haystack = String::from_utf8_lossy(&bytes);
        for needle in [
            "Ground floor [v2] - Birkenweg 12",
            "Oak parquet",
            "Brushed",
            "Living room",
            "120.00",
            "570.00",
            "Generated 2026-03-14 09:30 UTC",
        ] {
            assert!(haystack.contains(needle), "missing {needle:?}");
        }
    }

    #[test]
    fn long_configurations_paginate() {
        let mut doc = sample();
        let line = doc.lines[0].clone();
        doc.lines = std::iter::repeat_with(|| line.clone()).take(300).collect();

        let bytes = render_pdf(&doc).unwrap();
        let haystack = String::from_utf8_lossy(&bytes);
        // Only page dictionaries carry /Parent.
        let pages = haystack.matches("/Parent").count();
        assert!(pages >= 2, "expected pagination, found {pages} page markers");
    }

    #[test]
    fn parenthesized_names_are_neutralized() {
        assert_eq!(sanitize("Var (A) \\ ü"), "Var [A] / ?");
    }
}
