//! Compares the latest observation of a series with the same calendar month in
//! every year the series covers.

use crate::analysis::error::AnalysisError;
use crate::analysis::stats::{round_to, SampleStats, RESULT_DECIMALS};
use crate::types::anomaly::{AnomalyResult, DeviationDirection};
use crate::types::series::TemperatureSeries;
use bon::Builder;
use chrono::Datelike;

/// Which observations make up the same-month baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Baseline {
    /// Every observation in the latest observation's calendar month, the latest one included.
    #[default]
    IncludeLatest,
    /// As [`Baseline::IncludeLatest`], minus the latest observation itself.
    ExcludeLatest,
}

/// Derives an [`AnomalyResult`] from a [`TemperatureSeries`].
///
/// The analyzer is pure: no I/O, no state between calls.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use climate_anomaly::{AnomalyAnalyzer, Baseline, DeviationDirection, TemperatureSeries};
///
/// let series = TemperatureSeries::from_readings(vec![
///     (NaiveDate::from_ymd_opt(2022, 7, 1).unwrap(), Some(18.0)),
///     (NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(), Some(20.0)),
///     (NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), Some(25.0)),
/// ]);
///
/// let result = AnomalyAnalyzer::default().analyze(&series).unwrap();
/// assert_eq!(result.mean_temperature, 21.0);
/// assert_eq!(result.deviation_direction, DeviationDirection::Higher);
///
/// let strict = AnomalyAnalyzer::builder().baseline(Baseline::ExcludeLatest).build();
/// assert_eq!(strict.analyze(&series).unwrap().mean_temperature, 19.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Builder)]
pub struct AnomalyAnalyzer {
    #[builder(default)]
    baseline: Baseline,
}

impl AnomalyAnalyzer {
    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    /// # Errors
    ///
    /// * [`AnalysisError::EmptySeries`] if `series` holds no observations.
    /// * [`AnalysisError::InsufficientHistory`] if the baseline for the latest
    ///   observation's month is empty, which can only happen with
    ///   [`Baseline::ExcludeLatest`].
    pub fn analyze(&self, series: &TemperatureSeries) -> Result<AnomalyResult, AnalysisError> {
        let observations = series.observations();
        let latest_index = observations
            .len()
            .checked_sub(1)
            .ok_or(AnalysisError::EmptySeries)?;
        let latest = observations[latest_index];
        let month = latest.date.month();

        let baseline: Vec<f64> = observations
            .iter()
            .enumerate()
            .filter(|(i, o)| {
                o.date.month() == month
                    && !(self.baseline == Baseline::ExcludeLatest && *i == latest_index)
            })
            .map(|(_, o)| o.temperature)
            .collect();
        let stats = SampleStats::from_values(&baseline)
            .ok_or(AnalysisError::InsufficientHistory { month })?;

        let lower_bound = stats.mean - 2.0 * stats.std;
        let upper_bound = stats.mean + 2.0 * stats.std;
        let is_normal = (lower_bound..=upper_bound).contains(&latest.temperature);

        let deviation = latest.temperature - stats.mean;
        let deviation_percentage =
            (stats.mean != 0.0).then(|| 100.0 * (deviation / stats.mean).abs());

        let round = |value: f64| round_to(value, RESULT_DECIMALS);
        Ok(AnomalyResult {
            latest_date: latest.date,
            latest_temperature: round(latest.temperature),
            mean_temperature: round(stats.mean),
            std_temperature: round(stats.std),
            min_temperature: round(stats.min),
            max_temperature: round(stats.max),
            lower_bound: round(lower_bound),
            upper_bound: round(upper_bound),
            deviation_from_mean: round(deviation),
            deviation_from_mean_percentage: deviation_percentage.map(round),
            deviation_direction: DeviationDirection::of(deviation),
            is_normal,
        })
    }
}

/// Analyzes `series` with the default [`Baseline::IncludeLatest`] policy.
///
/// # Errors
///
/// See [`AnomalyAnalyzer::analyze`].
pub fn analyze(series: &TemperatureSeries) -> Result<AnomalyResult, AnalysisError> {
    AnomalyAnalyzer::default().analyze(series)
}
