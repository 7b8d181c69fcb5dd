//! Daily temperature observations and the ordered series built from them.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// A single daily mean temperature, in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureObservation {
    /// Calendar day (UTC) the value applies to.
    pub date: NaiveDate,
    pub temperature: f64,
}

impl TemperatureObservation {
    pub fn new(date: NaiveDate, temperature: f64) -> Self {
        Self { date, temperature }
    }
}

/// An ordered sequence of daily observations, oldest first.
///
/// Readings without a usable temperature (missing, `NaN` or infinite) are dropped
/// while the series is built; they are never interpolated or zero-filled.
/// Observations are stable-sorted by date, so several observations sharing a date
/// keep the order they were supplied in. Series produced by
/// [`crate::SeriesFetcher`] never contain duplicate dates.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use climate_anomaly::TemperatureSeries;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
/// let series = TemperatureSeries::from_readings(vec![
///     (day(2), Some(4.5)),
///     (day(1), Some(3.0)),
///     (day(3), None),
/// ]);
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.first().unwrap().date, day(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "Vec<TemperatureObservation>",
    into = "Vec<TemperatureObservation>"
)]
pub struct TemperatureSeries {
    observations: Vec<TemperatureObservation>,
}

impl TemperatureSeries {
    pub fn new(observations: Vec<TemperatureObservation>) -> Self {
        let before = observations.len();
        let mut observations: Vec<TemperatureObservation> = observations
            .into_iter()
            .filter(|o| o.temperature.is_finite())
            .collect();
        if observations.len() != before {
            debug!(
                "Dropped {} observations without a finite temperature",
                before - observations.len()
            );
        }
        observations.sort_by_key(|o| o.date);
        Self { observations }
    }

    /// Builds a series from `(date, value)` pairs, dropping pairs without a value.
    pub fn from_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut missing = 0usize;
        let observations = readings
            .into_iter()
            .filter_map(|(date, value)| match value {
                Some(temperature) => Some(TemperatureObservation { date, temperature }),
                None => {
                    missing += 1;
                    None
                }
            })
            .collect::<Vec<_>>();
        if missing > 0 {
            debug!("Dropped {} readings with a missing temperature", missing);
        }
        Self::new(observations)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[TemperatureObservation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TemperatureObservation> {
        self.observations.iter()
    }

    pub fn first(&self) -> Option<&TemperatureObservation> {
        self.observations.first()
    }

    /// The most recent observation. When several share the latest date the one
    /// supplied last wins.
    pub fn latest(&self) -> Option<&TemperatureObservation> {
        self.observations.last()
    }

    /// Observations falling in calendar `month` (1-12) of any year.
    pub fn in_month(&self, month: u32) -> impl Iterator<Item = &TemperatureObservation> + '_ {
        self.observations
            .iter()
            .filter(move |o| o.date.month() == month)
    }

    pub fn into_observations(self) -> Vec<TemperatureObservation> {
        self.observations
    }
}

impl<'a> IntoIterator for &'a TemperatureSeries {
    type Item = &'a TemperatureObservation;
    type IntoIter = std::slice::Iter<'a, TemperatureObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl From<Vec<TemperatureObservation>> for TemperatureSeries {
    fn from(observations: Vec<TemperatureObservation>) -> Self {
        Self::new(observations)
    }
}

impl From<TemperatureSeries> for Vec<TemperatureObservation> {
    fn from(series: TemperatureSeries) -> Self {
        series.observations
    }
}

impl FromIterator<TemperatureObservation> for TemperatureSeries {
    fn from_iter<T: IntoIterator<Item = TemperatureObservation>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sorted_by_date() {
        let series = TemperatureSeries::new(vec![
            TemperatureObservation::new(date(2021, 5, 3), 1.0),
            TemperatureObservation::new(date(2020, 5, 3), 2.0),
            TemperatureObservation::new(date(2021, 1, 3), 3.0),
        ]);
        let dates: Vec<_> = series.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2020, 5, 3), date(2021, 1, 3), date(2021, 5, 3)]);
    }

    #[test]
    fn test_non_finite_dropped() {
        let series = TemperatureSeries::new(vec![
            TemperatureObservation::new(date(2021, 5, 1), f64::NAN),
            TemperatureObservation::new(date(2021, 5, 2), 7.0),
            TemperatureObservation::new(date(2021, 5, 3), f64::NEG_INFINITY),
        ]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().temperature, 7.0);
    }

    #[test]
    fn test_missing_readings_keep_dates() {
        let series = TemperatureSeries::from_readings(vec![
            (date(2021, 5, 1), Some(1.0)),
            (date(2021, 5, 2), None),
            (date(2021, 5, 3), Some(3.0)),
        ]);
        let pairs: Vec<_> = series.iter().map(|o| (o.date, o.temperature)).collect();
        assert_eq!(pairs, vec![(date(2021, 5, 1), 1.0), (date(2021, 5, 3), 3.0)]);
    }

    #[test]
    fn test_duplicate_dates_keep_input_order() {
        let series = TemperatureSeries::new(vec![
            TemperatureObservation::new(date(2021, 5, 3), 1.0),
            TemperatureObservation::new(date(2021, 5, 1), 0.0),
            TemperatureObservation::new(date(2021, 5, 3), 2.0),
        ]);
        assert_eq!(series.latest().unwrap().temperature, 2.0);
    }

    #[test]
    fn test_in_month() {
        let series = TemperatureSeries::new(vec![
            TemperatureObservation::new(date(2020, 3, 1), 1.0),
            TemperatureObservation::new(date(2020, 4, 1), 2.0),
            TemperatureObservation::new(date(2021, 3, 9), 3.0),
        ]);
        let march: Vec<_> = series.in_month(3).map(|o| o.temperature).collect();
        assert_eq!(march, vec![1.0, 3.0]);
        assert_eq!(series.in_month(12).count(), 0);
    }

    #[test]
    fn test_deserialize_sorts_by_date() {
        let json = r#"[
            {"date": "2024-05-02", "temperature": 30.0},
            {"date": "2024-05-01", "temperature": 10.0}
        ]"#;
        let series: TemperatureSeries = serde_json::from_str(json).unwrap();
        let dates: Vec<_> = series.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 2)]);
        assert_eq!(series.latest().unwrap().date, date(2024, 5, 2));
        assert_eq!(series.latest().unwrap().temperature, 30.0);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let series = TemperatureSeries::new(vec![TemperatureObservation::new(date(2024, 5, 1), 1.5)]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"date":"2024-05-01","temperature":1.5}]"#);
    }
}
