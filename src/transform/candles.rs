//! Canonical rows → time-ordered chart records.

use super::datetime::{epoch_millis, infer_layout, Layout};
use crate::models::{CanonicalField, CanonicalRow, ChartRecord, Cell};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A cell that could not be converted. `row` is the 0-based data row index in
/// the input table (header excluded).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("row {row}: cannot parse '{value}' as a date/time")]
    Datetime { row: usize, value: String },

    #[error("row {row}: cannot parse '{value}' in column '{field}' as a number")]
    Number {
        row: usize,
        field: CanonicalField,
        value: String,
    },
}

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Strict price coercion: trimmed decimal text, finite values only.
/// "100" → 100.0 | " 99.5 " → 99.5 | "abc", "", "NaN" → None
pub fn parse_price(cell: &Cell) -> Option<f64> {
    let v = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Blank => return None,
    };
    v.is_finite().then_some(v)
}

fn price(row: usize, r: &CanonicalRow, field: CanonicalField) -> Result<f64, ParseError> {
    let cell = r.get(field);
    parse_price(cell).ok_or_else(|| ParseError::Number {
        row,
        field,
        value: cell.to_string(),
    })
}

// ── Transformer ───────────────────────────────────────────────────────────────

/// Build chart records from canonical rows, sorted by time.
///
/// The datetime layout is inferred from the first row and then held fixed.
/// Rows sharing a timestamp keep their input order.
pub fn to_chart_records(rows: &[CanonicalRow]) -> Result<Vec<ChartRecord>, ParseError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let sample = first.datetime.to_string();
    let layout: Layout = infer_layout(&sample).ok_or_else(|| ParseError::Datetime {
        row: 0,
        value: sample.clone(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, r) in rows.iter().enumerate() {
        let raw = r.datetime.to_string();
        let dt = layout
            .parse(&raw)
            .ok_or(ParseError::Datetime { row: i, value: raw })?;

        records.push(ChartRecord {
            x: epoch_millis(dt),
            y: [
                price(i, r, CanonicalField::Open)?,
                price(i, r, CanonicalField::High)?,
                price(i, r, CanonicalField::Low)?,
                price(i, r, CanonicalField::Close)?,
            ],
        });
    }

    // stable
    records.sort_by_key(|rec| rec.x);
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
