use crate::archive::cache::{round_coordinate, CacheKey, SeriesCache};
use crate::archive::error::RetrievalError;
use crate::archive::response::{DailyBlock, DAILY_METRIC};
use crate::archive::retry::{with_retry, RetryPolicy, Sleeper, ThreadSleeper};
use crate::archive::transport::{ArchiveTransport, HttpTransport};
use crate::types::location::{DateRange, LatLon};
use crate::types::series::TemperatureSeries;
use bon::bon;
use log::{debug, info};
use std::sync::Arc;

pub const OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Fetches daily mean temperature series from the Open-Meteo historical archive.
///
/// Every call is blocking. Transient failures are retried according to the
/// [`RetryPolicy`]; successful results are memoized per exact
/// (rounded coordinate, date range) for as long as the fetcher lives, so asking
/// twice for the same series costs one request. The memo sits above the retry
/// loop: only the final, successful outcome is stored.
///
/// Two threads missing the same key at the same moment will both hit the archive;
/// the first result to land is the one kept.
///
/// # Examples
///
/// ```no_run
/// use chrono::NaiveDate;
/// use climate_anomaly::{DateRange, LatLon, RetrievalError, SeriesFetcher};
///
/// # fn main() -> Result<(), RetrievalError> {
/// let fetcher = SeriesFetcher::open_meteo()?;
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
/// );
/// let series = fetcher.fetch(LatLon(52.52, 13.41), range)?;
/// println!("{} days", series.len());
/// # Ok(())
/// # }
/// ```
pub struct SeriesFetcher {
    transport: Arc<dyn ArchiveTransport>,
    sleeper: Arc<dyn Sleeper>,
    retry_policy: RetryPolicy,
    base_url: String,
    cache: SeriesCache,
}

#[bon]
impl SeriesFetcher {
    /// Creates a fetcher around an explicit transport.
    ///
    /// * `.transport(..)`: **Required.** Performs the HTTP GET.
    /// * `.retry_policy(..)`: Optional. Defaults to [`RetryPolicy::default`].
    /// * `.sleeper(..)`: Optional. Defaults to [`ThreadSleeper`].
    /// * `.base_url(..)`: Optional. Defaults to [`OPEN_METEO_ARCHIVE_URL`].
    #[builder]
    pub fn new(
        transport: Arc<dyn ArchiveTransport>,
        retry_policy: Option<RetryPolicy>,
        sleeper: Option<Arc<dyn Sleeper>>,
        #[builder(into)] base_url: Option<String>,
    ) -> Self {
        Self {
            transport,
            sleeper: sleeper.unwrap_or_else(|| Arc::new(ThreadSleeper)),
            retry_policy: retry_policy.unwrap_or_default(),
            base_url: base_url.unwrap_or_else(|| OPEN_METEO_ARCHIVE_URL.to_string()),
            cache: SeriesCache::default(),
        }
    }
}

impl SeriesFetcher {
    /// A fetcher talking to the public Open-Meteo archive with default retries.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn open_meteo() -> Result<Self, RetrievalError> {
        let transport = HttpTransport::new()?;
        Ok(Self::builder().transport(Arc::new(transport)).build())
    }

    /// Returns the daily mean temperatures at `location` for every day in `range`.
    ///
    /// Days the archive has no value for are left out of the series.
    ///
    /// # Errors
    ///
    /// * [`RetrievalError::InvalidRequest`] for a coordinate outside [-90, 90] /
    ///   [-180, 180], an inverted range, or a request the archive rejects with a
    ///   4xx status. Never retried.
    /// * [`RetrievalError::Transient`] when every attempt failed with a timeout,
    ///   connection error or retryable status.
    /// * [`RetrievalError::MalformedResponse`] when the archive answers with
    ///   something that is not a well-formed daily block.
    pub fn fetch(
        &self,
        location: LatLon,
        range: DateRange,
    ) -> Result<TemperatureSeries, RetrievalError> {
        validate(location, range)?;

        let key = CacheKey::new(location, range);
        if let Some(series) = self.cache.get(&key) {
            debug!("Cache hit for {} over {}", location, range);
            return Ok(series);
        }

        info!(
            "Cache miss for {} over {}. Requesting from archive.",
            location, range
        );
        let query = query_params(location, range);
        let body = with_retry(&self.retry_policy, self.sleeper.as_ref(), &self.base_url, || {
            self.transport.get(&self.base_url, &query)
        })?;

        let series = DailyBlock::from_json(&body)?.into_series()?;
        info!(
            "Fetched {} daily temperatures for {} over {}",
            series.len(),
            location,
            range
        );
        Ok(self.cache.insert(key, series))
    }

    /// Number of memoized series.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Forgets every memoized series.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

fn validate(location: LatLon, range: DateRange) -> Result<(), RetrievalError> {
    if !location.is_valid() {
        return Err(RetrievalError::InvalidRequest(format!(
            "coordinate {:?} is outside latitude [-90, 90] / longitude [-180, 180]",
            location
        )));
    }
    if !range.is_ordered() {
        return Err(RetrievalError::InvalidRequest(format!(
            "start date {} is after end date {}",
            range.start, range.end
        )));
    }
    Ok(())
}

fn query_params(location: LatLon, range: DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", round_coordinate(location.0).to_string()),
        ("longitude", round_coordinate(location.1).to_string()),
        ("start_date", range.start.format("%Y-%m-%d").to_string()),
        ("end_date", range.end.format("%Y-%m-%d").to_string()),
        ("daily", DAILY_METRIC.to_string()),
        ("timeformat", "unixtime".to_string()),
        ("timezone", "GMT".to_string()),
    ]
}
