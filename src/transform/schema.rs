//! Column reconciliation: arbitrary CSV headers → the five canonical fields.

use crate::models::{CanonicalField, CanonicalRow, RawTable};
use std::fmt;
use thiserror::Error;

// ── Synonyms ──────────────────────────────────────────────────────────────────

/// Lowercased header → canonical field. Earlier entries take precedence when
/// two different synonyms of the same field are present (`datetime` beats
/// `date` regardless of column order).
const SYNONYMS: &[(&str, CanonicalField)] = &[
    ("datetime", CanonicalField::Datetime),
    ("date", CanonicalField::Datetime),
    ("open", CanonicalField::Open),
    ("high", CanonicalField::High),
    ("low", CanonicalField::Low),
    ("close", CanonicalField::Close),
];

fn synonym_rank(lower: &str) -> Option<(usize, CanonicalField)> {
    SYNONYMS
        .iter()
        .position(|(name, _)| *name == lower)
        .map(|i| (i, SYNONYMS[i].1))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("CSV must contain {} columns. Found: {}", quoted(.missing), bracketed(.found))]
    MissingColumns {
        missing: Vec<CanonicalField>,
        found: Vec<String>,
    },

    #[error("CSV has more than one column for '{field}': {}", bracketed(.columns))]
    DuplicateColumn {
        field: CanonicalField,
        columns: Vec<String>,
    },
}

fn quoted(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| format!("'{}'", f))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bracketed<T: fmt::Display>(items: &[T]) -> String {
    let inner = items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", inner)
}

// ── Reconciler ────────────────────────────────────────────────────────────────

/// Positions of the canonical fields inside a `RawTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub datetime: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
}

/// Work out which source column feeds each canonical field.
///
/// Unmapped columns are left alone. Missing fields are reported in canonical
/// order together with the post-rename header list.
pub fn map_columns(columns: &[String]) -> Result<ColumnMap, SchemaError> {
    // per field: (synonym rank, column index) of the current winner
    let mut slots: [Option<(usize, usize)>; 5] = [None; 5];
    let mut renamed: Vec<String> = Vec::with_capacity(columns.len());

    for (idx, name) in columns.iter().enumerate() {
        let lower = name.to_lowercase();
        let Some((rank, field)) = synonym_rank(&lower) else {
            renamed.push(lower);
            continue;
        };

        let slot = &mut slots[field as usize];
        match *slot {
            None => *slot = Some((rank, idx)),
            Some((cur_rank, cur_idx)) if cur_rank == rank => {
                return Err(SchemaError::DuplicateColumn {
                    field,
                    columns: vec![columns[cur_idx].clone(), name.clone()],
                });
            }
            Some((cur_rank, _)) if rank < cur_rank => *slot = Some((rank, idx)),
            Some(_) => {}
        }
        renamed.push(lower);
    }

    // Winners take the canonical name; losing synonyms keep their lowercase name.
    for (i, slot) in slots.iter().enumerate() {
        if let Some((_, idx)) = slot {
            renamed[*idx] = CanonicalField::ALL[i].to_string();
        }
    }

    let missing: Vec<CanonicalField> = CanonicalField::ALL
        .iter()
        .zip(slots.iter())
        .filter(|(_, slot)| slot.is_none())
        .map(|(field, _)| *field)
        .collect();

    match slots {
        [Some(d), Some(o), Some(h), Some(l), Some(c)] => Ok(ColumnMap {
            datetime: d.1,
            open: o.1,
            high: h.1,
            low: l.1,
            close: c.1,
        }),
        _ => Err(SchemaError::MissingColumns {
            missing,
            found: renamed,
        }),
    }
}

/// Reconcile a raw table into canonical rows, preserving row order.
pub fn reconcile(table: &RawTable) -> Result<Vec<CanonicalRow>, SchemaError> {
    let map = map_columns(&table.columns)?;

    let rows = (0..table.len())
        .map(|r| CanonicalRow {
            datetime: table.cell(r, map.datetime).clone(),
            open: table.cell(r, map.open).clone(),
            high: table.cell(r, map.high).clone(),
            low: table.cell(r, map.low).clone(),
            close: table.cell(r, map.close).clone(),
        })
        .collect();

    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_mapping() {
        let map = map_columns(&cols(&["DATE", "Open", "hIgH", "low", "Close"])).unwrap();
        assert_eq!(
            map,
            ColumnMap { datetime: 0, open: 1, high: 2, low: 3, close: 4 }
        );
    }

    #[test]
    fn test_extra_columns_pass_through() {
        let map = map_columns(&cols(&["volume", "close", "low", "high", "open", "datetime"]))
            .unwrap();
        assert_eq!(map.datetime, 5);
        assert_eq!(map.close, 1);
    }

    #[test]
    fn test_missing_close_is_reported() {
        let err = map_columns(&cols(&["date", "open", "high", "low"])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                missing: vec![CanonicalField::Close],
                found: cols(&["Datetime", "Open", "High", "Low"]),
            }
        );
        assert_eq!(
            err.to_string(),
            "CSV must contain 'Close' columns. Found: [Datetime, Open, High, Low]"
        );
    }

    #[test]
    fn test_missing_lists_exactly_the_absent_fields() {
        let err = map_columns(&cols(&["Time", "High", "Volume"])).unwrap_err();
        match err {
            SchemaError::MissingColumns { missing, found } => {
                assert_eq!(
                    missing,
                    vec![
                        CanonicalField::Datetime,
                        CanonicalField::Open,
                        CanonicalField::Low,
                        CanonicalField::Close,
                    ]
                );
                assert_eq!(found, cols(&["time", "High", "volume"]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_datetime_beats_date_in_either_order() {
        let a = map_columns(&cols(&["date", "datetime", "open", "high", "low", "close"])).unwrap();
        let b = map_columns(&cols(&["datetime", "date", "open", "high", "low", "close"])).unwrap();
        assert_eq!(a.datetime, 1);
        assert_eq!(b.datetime, 0);
    }

    #[test]
    fn test_losing_synonym_keeps_lowercase_name() {
        let err = map_columns(&cols(&["Date", "DateTime", "Open"])).unwrap_err();
        match err {
            SchemaError::MissingColumns { found, .. } => {
                assert_eq!(found, cols(&["date", "Datetime", "Open"]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_case_folded_duplicate_is_rejected() {
        let err = map_columns(&cols(&["date", "Open", "OPEN", "high", "low", "close"])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                field: CanonicalField::Open,
                columns: cols(&["Open", "OPEN"]),
            }
        );
        assert_eq!(
            err.to_string(),
            "CSV has more than one column for 'Open': [Open, OPEN]"
        );
    }

    #[test]
    fn test_reconcile_picks_cells_by_position() {
        let mut t = RawTable::new(cols(&["close", "note", "low", "high", "open", "date"]));
        t.push_row(vec!["4".into(), "x".into(), "3".into(), "2".into(), "1".into(), "d".into()]);
        let rows = reconcile(&t).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].open, Cell::from("1"));
        assert_eq!(rows[0].close, Cell::from("4"));
        assert_eq!(rows[0].datetime, Cell::from("d"));
    }
}
