use serde::{Deserialize, Serialize};
use std::fmt;

// ── Raw table ─────────────────────────────────────────────────────────────────

/// A single cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    /// Build a cell from a CSV field: empty or whitespace-only → `Blank`.
    pub fn from_field(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Blank
        } else {
            Cell::Text(s.to_string())
        }
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Blank => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from_field(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

static BLANK: Cell = Cell::Blank;

/// Tabular input with arbitrary column names, one `Vec<Cell>` per row.
///
/// Headers are kept positionally so duplicate names survive decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `col`); short rows read as blank.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }
}

// ── Canonical schema ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Datetime,
    Open,
    High,
    Low,
    Close,
}

impl CanonicalField {
    /// Every required field, in reporting order.
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::Datetime,
        CanonicalField::Open,
        CanonicalField::High,
        CanonicalField::Low,
        CanonicalField::Close,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Datetime => "Datetime",
            CanonicalField::Open => "Open",
            CanonicalField::High => "High",
            CanonicalField::Low => "Low",
            CanonicalField::Close => "Close",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row after column reconciliation: the five required cells, unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub datetime: Cell,
    pub open: Cell,
    pub high: Cell,
    pub low: Cell,
    pub close: Cell,
}

impl CanonicalRow {
    pub fn get(&self, field: CanonicalField) -> &Cell {
        match field {
            CanonicalField::Datetime => &self.datetime,
            CanonicalField::Open => &self.open,
            CanonicalField::High => &self.high,
            CanonicalField::Low => &self.low,
            CanonicalField::Close => &self.close,
        }
    }
}

// ── Chart output ──────────────────────────────────────────────────────────────

/// Candlestick point in the shape the charting frontend expects:
/// `{"x": epoch_ms, "y": [open, high, low, close]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub x: i64,
    pub y: [f64; 4],
}
