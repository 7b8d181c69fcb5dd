use crate::types::location::{DateRange, LatLon};
use crate::types::series::TemperatureSeries;
use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use std::collections::{hash_map::Entry, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Decimal places coordinates are rounded to before they are sent or cached.
pub(crate) const COORDINATE_DECIMALS: i32 = 4;

pub(crate) fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    (value * scale).round() / scale
}

/// Exact identity of a fetch: rounded coordinate plus both date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    latitude: OrderedFloat<f64>,
    longitude: OrderedFloat<f64>,
    start: NaiveDate,
    end: NaiveDate,
}

impl CacheKey {
    pub(crate) fn new(location: LatLon, range: DateRange) -> Self {
        Self {
            latitude: OrderedFloat(round_coordinate(location.0)),
            longitude: OrderedFloat(round_coordinate(location.1)),
            start: range.start,
            end: range.end,
        }
    }
}

/// Process-lifetime memo of fetched series. Nothing is ever evicted.
#[derive(Debug, Default)]
pub(crate) struct SeriesCache {
    entries: Mutex<HashMap<CacheKey, TemperatureSeries>>,
}

impl SeriesCache {
    // A panic while holding the lock cannot leave a half-written entry behind,
    // so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, TemperatureSeries>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<TemperatureSeries> {
        self.lock().get(key).cloned()
    }

    /// Stores `series` unless another caller got there first, and returns the
    /// series now held for `key`.
    pub(crate) fn insert(&self, key: CacheKey, series: TemperatureSeries) -> TemperatureSeries {
        match self.lock().entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(series).clone(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }
}
