//! The anomaly summary handed to presentation code.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the latest observation sits below or above the historical mean.
///
/// A deviation of exactly zero counts as [`DeviationDirection::Higher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviationDirection {
    Lower,
    Higher,
}

impl DeviationDirection {
    pub(crate) fn of(deviation: f64) -> Self {
        if deviation < 0.0 {
            DeviationDirection::Lower
        } else {
            DeviationDirection::Higher
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationDirection::Lower => "lower",
            DeviationDirection::Higher => "higher",
        }
    }
}

impl fmt::Display for DeviationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the latest observation compares with the same calendar month in earlier years.
///
/// All temperatures are in degrees Celsius and rounded to two decimals. The
/// statistics behind them were computed at full precision, and so were
/// `is_normal` and `deviation_direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub latest_date: NaiveDate,
    pub latest_temperature: f64,
    /// Mean over the same-month baseline.
    pub mean_temperature: f64,
    /// Sample standard deviation (n - 1) over the baseline; 0 for a single value.
    pub std_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// `mean - 2 * std`
    pub lower_bound: f64,
    /// `mean + 2 * std`
    pub upper_bound: f64,
    /// `latest - mean`
    pub deviation_from_mean: f64,
    /// `100 * |deviation / mean|`, or `None` when the mean is exactly zero.
    pub deviation_from_mean_percentage: Option<f64>,
    pub deviation_direction: DeviationDirection,
    /// `lower_bound <= latest <= upper_bound`, both ends inclusive.
    pub is_normal: bool,
}
