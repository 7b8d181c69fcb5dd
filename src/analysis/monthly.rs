use crate::analysis::stats::median;
use crate::types::series::TemperatureSeries;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Median daily temperature of one calendar month in one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMedian {
    pub year: i32,
    pub month: u32,
    pub median: f64,
    /// Number of daily observations the median was taken over.
    pub count: usize,
}

/// Median temperature for every (year, month) present in `series`, oldest first.
///
/// This is the year-by-month grid used to compare the same month across years.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use climate_anomaly::{monthly_medians, TemperatureSeries};
///
/// let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
/// let series = TemperatureSeries::from_readings(vec![
///     (day(1, 1), Some(1.0)),
///     (day(1, 2), Some(3.0)),
///     (day(2, 1), Some(5.0)),
/// ]);
/// let grid = monthly_medians(&series);
/// assert_eq!(grid.len(), 2);
/// assert_eq!(grid[0].median, 2.0);
/// assert_eq!(grid[1].month, 2);
/// ```
pub fn monthly_medians(series: &TemperatureSeries) -> Vec<MonthlyMedian> {
    let mut groups: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for observation in series {
        groups
            .entry((observation.date.year(), observation.date.month()))
            .or_default()
            .push(observation.temperature);
    }

    groups
        .into_iter()
        .filter_map(|((year, month), values)| {
            median(&values).map(|median| MonthlyMedian {
                year,
                month,
                median,
                count: values.len(),
            })
        })
        .collect()
}
