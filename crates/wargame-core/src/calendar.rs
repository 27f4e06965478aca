//! The global in-game calendar.
//!
//! The calendar is a single date that moves forward by exactly one day per
//! resolution cycle. It is created lazily at the configured epoch the
//! first time a cycle runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors that can occur during calendar operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The date cannot move past the last representable day.
    #[error("calendar overflow: cannot advance beyond {0}")]
    DateOverflow(NaiveDate),
}

/// The current in-game date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Date at creation.
    epoch: NaiveDate,
    /// Current date.
    date: NaiveDate,
}

impl Calendar {
    /// Create a calendar standing at `epoch`.
    pub const fn new(epoch: NaiveDate) -> Self {
        Self { epoch, date: epoch }
    }

    /// Restore a calendar from stored parts.
    pub const fn from_parts(epoch: NaiveDate, date: NaiveDate) -> Self {
        Self { epoch, date }
    }

    /// Current date.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date the calendar started at.
    pub const fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    /// Advance by one day. Returns the new date.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::DateOverflow`] at the end of the
    /// representable range. The date is unchanged on error.
    pub fn advance(&mut self) -> Result<NaiveDate, CalendarError> {
        self.date = self
            .date
            .succ_opt()
            .ok_or(CalendarError::DateOverflow(self.date))?;
        Ok(self.date)
    }

    /// Days from `earlier` to the current date.
    pub fn days_since(&self, earlier: NaiveDate) -> i64 {
        self.date.signed_duration_since(earlier).num_days()
    }

    /// Days since the epoch.
    pub fn days_elapsed(&self) -> i64 {
        self.days_since(self.epoch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(1100, 1, 1).unwrap()
    }

    #[test]
    fn advance_moves_one_day() {
        let mut calendar = Calendar::new(epoch());
        assert_eq!(
            calendar.advance().unwrap(),
            NaiveDate::from_ymd_opt(1100, 1, 2).unwrap()
        );
        assert_eq!(calendar.days_elapsed(), 1);
        assert_eq!(calendar.epoch(), epoch());
    }

    #[test]
    fn advance_crosses_month_end() {
        let mut calendar = Calendar::from_parts(
            epoch(),
            NaiveDate::from_ymd_opt(1100, 1, 31).unwrap(),
        );
        assert_eq!(
            calendar.advance().unwrap(),
            NaiveDate::from_ymd_opt(1100, 2, 1).unwrap()
        );
    }

    #[test]
    fn days_since_counts_whole_days() {
        let calendar = Calendar::from_parts(epoch(), NaiveDate::from_ymd_opt(1100, 1, 11).unwrap());
        assert_eq!(calendar.days_since(epoch()), 10);
        assert_eq!(calendar.days_since(calendar.date()), 0);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut calendar = Calendar::new(NaiveDate::MAX);
        assert_eq!(
            calendar.advance(),
            Err(CalendarError::DateOverflow(NaiveDate::MAX))
        );
        assert_eq!(calendar.date(), NaiveDate::MAX);
    }
}
