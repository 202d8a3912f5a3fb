//! Freshness classification of ingredients by expiry date.
//!
//! This is the only place in Pantry that parses dates. Stored dates are free
//! text; anything that does not parse as `YYYY-MM-DD` classifies as
//! [`Freshness::Unknown`] and is rendered without a highlight.

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Date format expected for purchase and expiry dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of days ahead (inclusive) that counts as "expiring soon".
pub const EXPIRING_SOON_DAYS: u64 = 7;

/// Display category of an ingredient relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    ExpiringSoon,
    Expired,
    Unknown,
}

impl Freshness {
    pub fn label(self) -> &'static str {
        match self {
            Freshness::Fresh => "fresh",
            Freshness::ExpiringSoon => "expiring soon",
            Freshness::Expired => "expired",
            Freshness::Unknown => "-",
        }
    }

    /// Whether a renderer should draw attention to the row.
    pub fn is_highlighted(self) -> bool {
        matches!(self, Freshness::Expired | Freshness::ExpiringSoon)
    }
}

/// Parse a `YYYY-MM-DD` date, returning `None` for anything else.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Classify an expiry date against `today`.
///
/// - unparseable → `Unknown`
/// - before today → `Expired`
/// - today ..= today + 7 days → `ExpiringSoon`
/// - later → `Fresh`
pub fn classify(expiry_date: &str, today: NaiveDate) -> Freshness {
    let Some(expiry) = parse_date(expiry_date) else {
        return Freshness::Unknown;
    };

    if expiry < today {
        return Freshness::Expired;
    }

    let horizon = today
        .checked_add_days(Days::new(EXPIRING_SOON_DAYS))
        .unwrap_or(NaiveDate::MAX);
    if expiry <= horizon {
        Freshness::ExpiringSoon
    } else {
        Freshness::Fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_expired() {
        assert_eq!(classify("2024-01-01", day("2024-01-15")), Freshness::Expired);
        assert_eq!(classify("2024-01-14", day("2024-01-15")), Freshness::Expired);
    }

    #[test]
    fn test_expiring_soon() {
        assert_eq!(
            classify("2024-01-20", day("2024-01-15")),
            Freshness::ExpiringSoon
        );
    }

    #[test]
    fn test_fresh() {
        assert_eq!(classify("2024-02-01", day("2024-01-15")), Freshness::Fresh);
    }

    #[test]
    fn test_unparseable_is_unknown() {
        assert_eq!(classify("not-a-date", day("2024-01-15")), Freshness::Unknown);
        assert_eq!(classify("", day("1999-12-31")), Freshness::Unknown);
        assert_eq!(classify("2024-13-01", day("2024-01-15")), Freshness::Unknown);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let today = day("2024-01-15");
        assert_eq!(classify("2024-01-15", today), Freshness::ExpiringSoon);
        assert_eq!(classify("2024-01-22", today), Freshness::ExpiringSoon);
        assert_eq!(classify("2024-01-23", today), Freshness::Fresh);
    }

    #[test]
    fn test_window_crosses_month_end() {
        let today = day("2024-02-26");
        assert_eq!(classify("2024-03-04", today), Freshness::ExpiringSoon);
        assert_eq!(classify("2024-03-05", today), Freshness::Fresh);
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        assert_eq!(
            classify(" 2024-01-16 ", day("2024-01-15")),
            Freshness::ExpiringSoon
        );
    }

    #[test]
    fn test_highlight() {
        assert!(Freshness::Expired.is_highlighted());
        assert!(Freshness::ExpiringSoon.is_highlighted());
        assert!(!Freshness::Fresh.is_highlighted());
        assert!(!Freshness::Unknown.is_highlighted());
    }
}
