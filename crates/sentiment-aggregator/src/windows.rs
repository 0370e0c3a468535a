use chrono::{Days, NaiveDate};
use market_core::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open date range `[start, end)` covered by one news request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Every calendar day in the window, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d < end)
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

/// Split `[start, end)` into consecutive windows of `span_days`, the last one clipped to `end`.
pub fn date_windows(start: NaiveDate, end: NaiveDate, span_days: u32) -> Result<Vec<DateWindow>, MarketError> {
    if span_days == 0 {
        return Err(MarketError::InvalidRange("window span must be at least one day".to_string()));
    }

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let window_end = cursor
            .checked_add_days(Days::new(span_days as u64))
            .map_or(end, |d| d.min(end));
        windows.push(DateWindow { start: cursor, end: window_end });
        cursor = window_end;
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_week() {
        let windows = date_windows(d(2023, 1, 1), d(2023, 1, 8), 7).unwrap();
        assert_eq!(windows, vec![DateWindow { start: d(2023, 1, 1), end: d(2023, 1, 8) }]);
        assert_eq!(windows[0].days().count(), 7);
    }

    #[test]
    fn test_windows_are_contiguous_and_cover_range() {
        let start = d(2023, 1, 1);
        let end = d(2025, 4, 4);
        let windows = date_windows(start, end, 7).unwrap();

        assert_eq!(windows.first().unwrap().start, start);
        assert_eq!(windows.last().unwrap().end, end);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(windows.iter().all(|w| w.len_days() >= 1 && w.len_days() <= 7));

        let covered: i64 = windows.iter().map(|w| w.len_days()).sum();
        assert_eq!(covered, (end - start).num_days());
    }

    #[test]
    fn test_last_window_is_clipped() {
        let windows = date_windows(d(2024, 2, 25), d(2024, 3, 5), 7).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1], DateWindow { start: d(2024, 3, 3), end: d(2024, 3, 5) });
        assert_eq!(
            windows[0].days().collect::<Vec<_>>(),
            vec![d(2024, 2, 25), d(2024, 2, 26), d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1), d(2024, 3, 2)]
        );
    }

    #[test]
    fn test_empty_and_invalid_ranges() {
        assert!(date_windows(d(2023, 1, 8), d(2023, 1, 1), 7).unwrap().is_empty());
        assert!(date_windows(d(2023, 1, 1), d(2023, 1, 1), 7).unwrap().is_empty());
        assert!(date_windows(d(2023, 1, 1), d(2023, 1, 8), 0).is_err());
    }
}
