//! Geographic point and date window a temperature series is requested for.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First day of the default history window.
const DEFAULT_HISTORY_START: (i32, u32, u32) = (2000, 1, 1);

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64`. Values are not validated on construction;
/// [`crate::SeriesFetcher::fetch`] rejects out-of-range coordinates before any I/O.
///
/// # Examples
///
/// ```
/// use climate_anomaly::LatLon;
///
/// let oslo = LatLon(59.9139, 10.7522);
/// assert_eq!(oslo.0, 59.9139); // Latitude
/// assert_eq!(oslo.1, 10.7522); // Longitude
/// assert!(oslo.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(self) -> f64 {
        self.0
    }

    pub fn longitude(self) -> f64 {
        self.1
    }

    /// `true` when both components are finite and within [-90, 90] / [-180, 180].
    pub fn is_valid(self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-90.0..=90.0).contains(&self.0)
            && (-180.0..=180.0).contains(&self.1)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.0, self.1)
    }
}

/// An inclusive range of calendar days.
///
/// `start <= end` is expected; an inverted range is rejected when it is used
/// for a fetch rather than when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The default analysis window: 2000-01-01 up to and including `end`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use climate_anomaly::DateRange;
    ///
    /// let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    /// let range = DateRange::history_until(end);
    /// assert_eq!(range.start, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    /// assert_eq!(range.end, end);
    /// ```
    pub fn history_until(end: NaiveDate) -> Self {
        Self {
            start: default_history_start(),
            end,
        }
    }

    /// The default analysis window ending today (UTC).
    pub fn history_until_today() -> Self {
        Self::history_until(Utc::now().date_naive())
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

pub(crate) fn default_history_start() -> NaiveDate {
    let (year, month, day) = DEFAULT_HISTORY_START;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
