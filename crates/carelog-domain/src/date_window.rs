//! Inclusive date windows declared by the operator

use crate::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[start, end]` range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window; `start` must not be after `end`
    ///
    /// # Examples
    ///
    /// ```
    /// use carelog_domain::DateWindow;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 11, 14).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
    /// let window = DateWindow::new(start, end).unwrap();
    /// assert_eq!(window.days(), 2);
    /// assert!(DateWindow::new(end, start).is_err());
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window covering a single day
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// First day of the window
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the window (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let window = DateWindow::new(day(2024, 11, 14), day(2024, 11, 15)).unwrap();
        assert!(window.contains(day(2024, 11, 14)));
        assert!(window.contains(day(2024, 11, 15)));
        assert!(!window.contains(day(2024, 11, 13)));
        assert!(!window.contains(day(2024, 12, 1)));
    }

    #[test]
    fn test_display() {
        let window = DateWindow::new(day(2024, 11, 14), day(2024, 11, 15)).unwrap();
        assert_eq!(window.to_string(), "2024-11-14..2024-11-15");
    }

    #[test]
    fn test_single_day() {
        let window = DateWindow::single(day(2024, 2, 29));
        assert_eq!(window.days(), 1);
        assert!(window.contains(day(2024, 2, 29)));
    }

    proptest! {
        #[test]
        fn contains_matches_ordering(offset_a in 0i64..60, len in 0i64..30, offset_d in -10i64..100) {
            let base = day(2024, 1, 1);
            let start = base + chrono::Duration::days(offset_a);
            let end = start + chrono::Duration::days(len);
            let window = DateWindow::new(start, end).unwrap();
            let date = base + chrono::Duration::days(offset_d);
            prop_assert_eq!(window.contains(date), start <= date && date <= end);
            prop_assert_eq!(window.days(), len + 1);
        }
    }
}
