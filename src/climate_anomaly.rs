//! This module provides the main entry point: fetch the temperature history for a
//! place and analyze how its latest day compares with the same month in earlier years.
//! Places can be given as coordinates or looked up by city name.

use crate::analysis::analyzer::AnomalyAnalyzer;
use crate::archive::fetcher::SeriesFetcher;
use crate::cities::directory::CityDirectory;
use crate::error::AnomalyError;
use crate::types::anomaly::AnomalyResult;
use crate::types::location::{default_history_start, DateRange, LatLon};
use crate::types::series::TemperatureSeries;
use bon::bon;
use chrono::{NaiveDate, Utc};
use log::info;
use serde::Serialize;

/// Everything a caller needs to present one location: the series that was
/// analyzed and the resulting anomaly summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub location: LatLon,
    pub range: DateRange,
    pub series: TemperatureSeries,
    pub anomaly: AnomalyResult,
}

/// The main client: a [`SeriesFetcher`] and an [`AnomalyAnalyzer`] wired together.
///
/// Fetched series are memoized by the fetcher, so repeated reports for the same
/// place and window only hit the archive once.
///
/// # Examples
///
/// ```no_run
/// # use climate_anomaly::{AnomalyError, ClimateAnomaly, LatLon};
/// # fn main() -> Result<(), AnomalyError> {
/// let client = ClimateAnomaly::new()?;
/// let report = client
///     .for_location()
///     .location(LatLon(48.8566, 2.3522))
///     .call()?;
/// println!(
///     "{}: {}°C (normal range {}..{})",
///     report.anomaly.latest_date,
///     report.anomaly.latest_temperature,
///     report.anomaly.lower_bound,
///     report.anomaly.upper_bound
/// );
/// # Ok(())
/// # }
/// ```
pub struct ClimateAnomaly {
    fetcher: SeriesFetcher,
    analyzer: AnomalyAnalyzer,
}

#[bon]
impl ClimateAnomaly {
    /// Creates a client for the public Open-Meteo archive with default retry and
    /// baseline settings.
    ///
    /// # Errors
    ///
    /// Returns [`AnomalyError::Retrieval`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, AnomalyError> {
        Ok(Self::with_parts(
            SeriesFetcher::open_meteo()?,
            AnomalyAnalyzer::default(),
        ))
    }

    pub fn with_parts(fetcher: SeriesFetcher, analyzer: AnomalyAnalyzer) -> Self {
        Self { fetcher, analyzer }
    }

    pub fn fetcher(&self) -> &SeriesFetcher {
        &self.fetcher
    }

    pub fn analyzer(&self) -> &AnomalyAnalyzer {
        &self.analyzer
    }

    /// Fetches and analyzes the daily temperatures at a coordinate.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to analyze.
    /// * `.start(NaiveDate)`: Optional. First day of history. Defaults to 2000-01-01.
    /// * `.end(NaiveDate)`: Optional. Last day of history. Defaults to today (UTC).
    ///
    /// # Errors
    ///
    /// * [`AnomalyError::Retrieval`] if the series cannot be fetched.
    /// * [`AnomalyError::Analysis`] if the fetched series is empty.
    #[builder]
    pub fn for_location(
        &self,
        location: LatLon,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<AnomalyReport, AnomalyError> {
        let range = DateRange::new(
            start.unwrap_or_else(default_history_start),
            end.unwrap_or_else(|| Utc::now().date_naive()),
        );
        self.report(location, range)
    }

    /// Resolves a city through `directory`, then behaves like
    /// [`ClimateAnomaly::for_location`].
    ///
    /// # Arguments
    ///
    /// * `.directory(&dyn CityDirectory)`: **Required.** Where to look the city up.
    /// * `.city(&str)`: **Required.** Exact city name.
    /// * `.start(NaiveDate)` / `.end(NaiveDate)`: Optional, as for `for_location`.
    ///
    /// # Errors
    ///
    /// [`AnomalyError::CityLookup`] if the city is unknown or has no coordinates,
    /// otherwise as [`ClimateAnomaly::for_location`].
    #[builder]
    pub fn for_city(
        &self,
        directory: &dyn CityDirectory,
        city: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<AnomalyReport, AnomalyError> {
        let location = directory.locate(city)?;
        info!("Fetching weather data for {}", city);
        self.for_location()
            .location(location)
            .maybe_start(start)
            .maybe_end(end)
            .call()
    }

    fn report(&self, location: LatLon, range: DateRange) -> Result<AnomalyReport, AnomalyError> {
        let series = self.fetcher.fetch(location, range)?;
        let anomaly = self.analyzer.analyze(&series)?;
        Ok(AnomalyReport {
            location,
            range,
            series,
            anomaly,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::error::AnalysisError;
    use crate::archive::error::{RetrievalErrorKind, TransportError};
    use crate::archive::transport::{ArchiveTransport, HttpResponse};
    use crate::cities::directory::CityTable;
    use crate::cities::error::CityLookupError;
    use crate::types::anomaly::DeviationDirection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Answers every request with the same body and remembers the last query.
    struct FixedTransport {
        body: String,
        calls: AtomicUsize,
        last_query: Mutex<Vec<(String, String)>>,
    }

    impl FixedTransport {
        fn new(body: String) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
                last_query: Mutex::default(),
            })
        }

        fn query_value(&self, key: &str) -> Option<String> {
            self.last_query
                .lock()
                .unwrap()
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    impl ArchiveTransport for FixedTransport {
        fn get(&self, _url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() =
                query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            Ok(HttpResponse::new(200, self.body.clone()))
        }
    }

    /// 1-4 March 2024, with the 3rd missing.
    fn march_body() -> String {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        let times: Vec<i64> = (0..4).map(|i| start + i * 86_400).collect();
        serde_json::json!({
            "daily": { "time": times, "temperature_2m_mean": [0.0, 2.0, null, 7.0] }
        })
        .to_string()
    }

    fn client(transport: Arc<FixedTransport>) -> ClimateAnomaly {
        ClimateAnomaly::with_parts(
            SeriesFetcher::builder().transport(transport).build(),
            AnomalyAnalyzer::default(),
        )
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_for_location_report() {
        let transport = FixedTransport::new(march_body());
        let report = client(transport.clone())
            .for_location()
            .location(LatLon(30.0444, 31.2357))
            .start(march(1))
            .end(march(4))
            .call()
            .unwrap();

        assert_eq!(report.series.len(), 3);
        assert_eq!(report.range, DateRange::new(march(1), march(4)));
        assert_eq!(report.anomaly.latest_date, march(4));
        assert_eq!(report.anomaly.latest_temperature, 7.0);
        assert_eq!(report.anomaly.mean_temperature, 3.0);
        assert_eq!(report.anomaly.deviation_from_mean, 4.0);
        assert_eq!(report.anomaly.deviation_direction, DeviationDirection::Higher);
        assert_eq!(transport.query_value("start_date").as_deref(), Some("2024-03-01"));
        assert_eq!(transport.query_value("end_date").as_deref(), Some("2024-03-04"));
    }

    #[test]
    fn test_default_window_starts_in_2000() {
        let transport = FixedTransport::new(march_body());
        client(transport.clone())
            .for_location()
            .location(LatLon(30.0444, 31.2357))
            .call()
            .unwrap();

        assert_eq!(transport.query_value("start_date").as_deref(), Some("2000-01-01"));
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(transport.query_value("end_date"), Some(today));
    }

    #[test]
    fn test_for_city_resolves_and_memoizes() {
        let transport = FixedTransport::new(march_body());
        let client = client(transport.clone());
        let table = CityTable::from_json_str(
            r#"[{"city": "Cairo", "country": "Egypt", "latitude": 30.0444, "longitude": 31.2357}]"#,
        )
        .unwrap();

        let first = client
            .for_city()
            .directory(&table)
            .city("Cairo")
            .start(march(1))
            .end(march(4))
            .call()
            .unwrap();
        let second = client
            .for_location()
            .location(LatLon(30.0444, 31.2357))
            .start(march(1))
            .end(march(4))
            .call()
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.location, LatLon(30.0444, 31.2357));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.fetcher().cached_entries(), 1);
    }

    #[test]
    fn test_unknown_city() {
        let transport = FixedTransport::new(march_body());
        let err = client(transport.clone())
            .for_city()
            .directory(&CityTable::default())
            .city("Nowhere")
            .call()
            .unwrap_err();

        assert!(matches!(
            err,
            AnomalyError::CityLookup(CityLookupError::NotFound(_))
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_values_missing_is_empty_series() {
        let body = serde_json::json!({
            "daily": { "time": [1_709_251_200i64], "temperature_2m_mean": [null] }
        })
        .to_string();
        let err = client(FixedTransport::new(body))
            .for_location()
            .location(LatLon(0.0, 0.0))
            .start(march(1))
            .end(march(1))
            .call()
            .unwrap_err();

        assert!(matches!(err, AnomalyError::Analysis(AnalysisError::EmptySeries)));
    }

    #[test]
    fn test_inverted_range_is_invalid_request() {
        let err = client(FixedTransport::new(march_body()))
            .for_location()
            .location(LatLon(0.0, 0.0))
            .start(march(4))
            .end(march(1))
            .call()
            .unwrap_err();

        match err {
            AnomalyError::Retrieval(e) => assert_eq!(e.kind(), RetrievalErrorKind::InvalidRequest),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
