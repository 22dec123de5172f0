//! Date/time layout inference.
//!
//! Files don't say which layout they use, so a sample value is matched against
//! an ordered list of candidates and the first hit is used for the whole file.

use chrono::{NaiveDate, NaiveDateTime};

/// A candidate chrono layout, with or without a time-of-day part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    DateTime(&'static str),
    Date(&'static str),
}

/// Candidates in priority order. `%y` comes before `%Y` in each family since
/// `%Y` happily reads "05" as year 5. Dashed two-digit years go ahead of ISO
/// for the same reason: "25-04-05" would otherwise be year 25.
pub const LAYOUTS: &[Layout] = &[
    // day first, dashed, two-digit year: "25-04-05 9:15"
    Layout::DateTime("%d-%m-%y %H:%M:%S"),
    Layout::DateTime("%d-%m-%y %H:%M"),
    Layout::Date("%d-%m-%y"),
    // ISO
    Layout::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    Layout::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::DateTime("%Y-%m-%d %H:%M"),
    Layout::DateTime("%Y-%m-%dT%H:%M"),
    Layout::Date("%Y-%m-%d"),
    // day first, two-digit year: "25/04/05 9:15"
    Layout::DateTime("%d/%m/%y %H:%M:%S"),
    Layout::DateTime("%d/%m/%y %H:%M"),
    Layout::Date("%d/%m/%y"),
    // day first, four-digit year
    Layout::DateTime("%d/%m/%Y %H:%M:%S"),
    Layout::DateTime("%d/%m/%Y %H:%M"),
    Layout::Date("%d/%m/%Y"),
    // US
    Layout::DateTime("%m/%d/%y %H:%M:%S"),
    Layout::DateTime("%m/%d/%y %H:%M"),
    Layout::Date("%m/%d/%y"),
    Layout::DateTime("%m/%d/%Y %H:%M:%S"),
    Layout::DateTime("%m/%d/%Y %H:%M"),
    Layout::Date("%m/%d/%Y"),
    Layout::DateTime("%Y/%m/%d %H:%M:%S"),
    Layout::DateTime("%Y/%m/%d %H:%M"),
    Layout::Date("%Y/%m/%d"),
    Layout::DateTime("%d-%m-%Y %H:%M:%S"),
    Layout::DateTime("%d-%m-%Y %H:%M"),
    Layout::Date("%d-%m-%Y"),
    // dotted
    Layout::DateTime("%d.%m.%y %H:%M:%S"),
    Layout::DateTime("%d.%m.%y %H:%M"),
    Layout::Date("%d.%m.%y"),
    Layout::DateTime("%d.%m.%Y %H:%M:%S"),
    Layout::DateTime("%d.%m.%Y %H:%M"),
    Layout::Date("%d.%m.%Y"),
    // investing.com and friends
    Layout::Date("%b %d, %Y"),
    Layout::Date("%d %b %y"),
    Layout::Date("%d %b %Y"),
    Layout::Date("%d-%b-%y"),
    Layout::Date("%d-%b-%Y"),
    Layout::Date("%Y%m%d"),
];

impl Layout {
    /// Parse `s` with this layout. Date-only layouts resolve to midnight.
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        match self {
            Layout::DateTime(p) => NaiveDateTime::parse_from_str(s, p).ok(),
            Layout::Date(p) => NaiveDate::parse_from_str(s, p)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }
}

/// First candidate layout that parses `sample`.
pub fn infer_layout(sample: &str) -> Option<Layout> {
    LAYOUTS.iter().copied().find(|l| l.parse(sample).is_some())
}

/// Naive wall-clock → epoch milliseconds, no zone shift.
pub fn epoch_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}
