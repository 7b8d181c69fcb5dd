//! Decoding of the archive's daily JSON payload.
//!
//! The archive is asked for `timeformat=unixtime`, so `daily.time` holds the UTC
//! instant (in seconds) each value starts at. Those instants are only used to
//! derive the block's start and interval and to check that they agree; the
//! timestamp of every row is then generated from `start + index * interval`.

use crate::archive::error::RetrievalError;
use crate::archive::transport::HttpResponse;
use crate::types::series::TemperatureSeries;
use chrono::{DateTime, NaiveDate};
use log::debug;
use serde::Deserialize;

pub(crate) const DAILY_METRIC: &str = "temperature_2m_mean";
pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    daily: Option<DailyPayload>,
}

#[derive(Debug, Deserialize)]
struct DailyPayload {
    #[serde(default)]
    time: Vec<i64>,
    #[serde(rename = "temperature_2m_mean", default)]
    values: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ArchiveRejection {
    reason: Option<String>,
}

/// A run of equally spaced values: `values[i]` covers
/// `[start + i * interval, start + (i + 1) * interval)`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DailyBlock {
    /// Unix seconds of the first value.
    pub start: i64,
    /// Unix seconds just past the last value.
    pub end: i64,
    /// Spacing between values, in seconds.
    pub interval: i64,
    pub values: Vec<Option<f64>>,
}

impl DailyBlock {
    pub(crate) fn from_json(body: &str) -> Result<Self, RetrievalError> {
        let response: ArchiveResponse = serde_json::from_str(body)
            .map_err(|e| RetrievalError::MalformedResponse(format!("invalid JSON: {e}")))?;

        if response.error {
            return Err(RetrievalError::MalformedResponse(
                response
                    .reason
                    .unwrap_or_else(|| "archive reported an error".to_string()),
            ));
        }

        let daily = response.daily.ok_or_else(|| {
            RetrievalError::MalformedResponse("response has no daily block".to_string())
        })?;
        Self::from_payload(daily)
    }

    fn from_payload(daily: DailyPayload) -> Result<Self, RetrievalError> {
        let DailyPayload { time, values } = daily;

        let Some(&start) = time.first() else {
            return Err(RetrievalError::MalformedResponse(
                "daily block contains no values".to_string(),
            ));
        };
        if time.len() != values.len() {
            return Err(RetrievalError::MalformedResponse(format!(
                "daily block has {} timestamps but {} {} values",
                time.len(),
                values.len(),
                DAILY_METRIC
            )));
        }

        let interval = match time.get(1) {
            Some(&second) => second.checked_sub(start).ok_or_else(|| {
                RetrievalError::MalformedResponse(format!(
                    "timestamps {start} and {second} are too far apart"
                ))
            })?,
            None => SECONDS_PER_DAY,
        };
        if interval <= 0 {
            return Err(RetrievalError::MalformedResponse(format!(
                "non-increasing timestamps (interval of {interval} s)"
            )));
        }
        if interval % SECONDS_PER_DAY != 0 {
            return Err(RetrievalError::MalformedResponse(format!(
                "interval of {interval} s is not a whole number of days"
            )));
        }

        let end = i64::try_from(values.len())
            .ok()
            .and_then(|count| interval.checked_mul(count))
            .and_then(|span| start.checked_add(span))
            .ok_or_else(|| {
                RetrievalError::MalformedResponse(format!(
                    "{} values of {interval} s starting at {start} run past the representable time range",
                    values.len()
                ))
            })?;
        let block = Self {
            start,
            end,
            interval,
            values,
        };
        if let Some((index, reported)) = block
            .timestamps()
            .zip(time.iter())
            .enumerate()
            .find_map(|(i, (expected, &reported))| (expected != reported).then_some((i, reported)))
        {
            return Err(RetrievalError::MalformedResponse(format!(
                "timestamp {reported} at index {index} breaks the {interval} s spacing"
            )));
        }
        Ok(block)
    }

    /// Unix seconds of every value, generated from start, end and interval.
    pub(crate) fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        (self.start..self.end).step_by(self.interval as usize)
    }

    /// Pairs each value with its UTC date and drops the rows without a value.
    pub(crate) fn into_series(self) -> Result<TemperatureSeries, RetrievalError> {
        let dates = self
            .timestamps()
            .map(|secs| {
                DateTime::from_timestamp(secs, 0)
                    .map(|dt| dt.date_naive())
                    .ok_or_else(|| {
                        RetrievalError::MalformedResponse(format!(
                            "timestamp {secs} is out of range"
                        ))
                    })
            })
            .collect::<Result<Vec<NaiveDate>, _>>()?;

        let total = dates.len();
        let series = TemperatureSeries::from_readings(dates.into_iter().zip(self.values));
        if series.len() < total {
            debug!(
                "{} of {} daily values were missing and dropped",
                total - series.len(),
                total
            );
        }
        Ok(series)
    }
}

/// Human readable reason for a rejected request: the archive's `reason` field
/// when the body carries one, the status code otherwise.
pub(crate) fn rejection_reason(response: &HttpResponse) -> String {
    serde_json::from_str::<ArchiveRejection>(&response.body)
        .ok()
        .and_then(|r| r.reason)
        .unwrap_or_else(|| format!("archive rejected the request with HTTP status {}", response.status))
}
