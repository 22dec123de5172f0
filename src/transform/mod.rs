//! OHLC normalisation core: raw table → reconciled columns → chart records.
//!
//! ## Stages
//!
//! 1. [`schema::reconcile`] maps arbitrary headers (case-insensitive,
//!    `date`/`datetime` synonyms) onto `Datetime, Open, High, Low, Close`.
//! 2. [`candles::to_chart_records`] infers the datetime layout, converts to
//!    epoch milliseconds, coerces prices and stable-sorts by time.
//!
//! Pure and synchronous. Nothing here touches the filesystem or logs; callers
//! decide what to do with a [`TransformError`].

pub mod candles;
pub mod datetime;
pub mod schema;

use crate::models::{ChartRecord, RawTable};
use thiserror::Error;

pub use self::candles::ParseError;
pub use self::schema::SchemaError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Who is at fault for a failed request: the uploaded content, or the host
/// reading it. Transform errors are always `Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Client,
    Server,
}

impl TransformError {
    /// Both stages only ever reject the uploaded content.
    pub fn severity(&self) -> Severity {
        match self {
            TransformError::Schema(_) | TransformError::Parse(_) => Severity::Client,
        }
    }
}

/// Run the whole pipeline. Zero data rows is a valid, empty result.
pub fn transform(table: &RawTable) -> Result<Vec<ChartRecord>, TransformError> {
    let rows = schema::reconcile(table)?;
    let records = candles::to_chart_records(&rows)?;
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
