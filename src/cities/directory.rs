//! Resolving city names to coordinates.
//!
//! The rest of the crate only needs [`CityDirectory::locate`]; [`CityTable`] is a
//! simple implementation reading a JSON array of [`CityRecord`]s, the format the
//! offline geocoding job produces.

use crate::cities::error::CityLookupError;
use crate::types::location::LatLon;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "climate_anomaly";
const CITY_TABLE_FILE_NAME: &str = "cities.json";

/// Looks up the coordinates of a city by name.
pub trait CityDirectory: Send + Sync {
    /// # Errors
    ///
    /// [`CityLookupError::NotFound`] if no city has this name,
    /// [`CityLookupError::MissingCoordinates`] if it was never geocoded.
    fn locate(&self, name: &str) -> Result<LatLon, CityLookupError>;

    /// All city names, sorted, without duplicates.
    fn city_names(&self) -> Vec<String>;
}

/// One row of the city table. Coordinates are absent where geocoding failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CityRecord {
    pub fn location(&self) -> Option<LatLon> {
        Some(LatLon(self.latitude?, self.longitude?))
    }
}

/// In-memory city table.
///
/// # Examples
///
/// ```
/// use climate_anomaly::{CityDirectory, CityTable, LatLon};
///
/// let table = CityTable::from_json_str(r#"[
///     {"city": "Oslo", "country": "Norway", "latitude": 59.9139, "longitude": 10.7522},
///     {"city": "Bergen", "country": "Norway", "latitude": 60.3913, "longitude": 5.3221}
/// ]"#).unwrap();
///
/// assert_eq!(table.locate("Oslo").unwrap(), LatLon(59.9139, 10.7522));
/// assert_eq!(table.city_names(), vec!["Bergen", "Oslo"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityTable {
    records: Vec<CityRecord>,
}

impl CityTable {
    pub fn new(records: Vec<CityRecord>) -> Self {
        Self { records }
    }

    /// # Errors
    ///
    /// Returns [`CityLookupError::ParseStr`] if `json` is not an array of city records.
    pub fn from_json_str(json: &str) -> Result<Self, CityLookupError> {
        let records = serde_json::from_str(json).map_err(CityLookupError::ParseStr)?;
        Ok(Self { records })
    }

    /// # Errors
    ///
    /// Returns [`CityLookupError::Read`] or [`CityLookupError::Parse`] if the file
    /// cannot be read or decoded.
    pub fn from_path(path: &Path) -> Result<Self, CityLookupError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CityLookupError::Read(path.to_path_buf(), e))?;
        let records: Vec<CityRecord> = serde_json::from_str(&json)
            .map_err(|e| CityLookupError::Parse(path.to_path_buf(), e))?;
        info!("Loaded {} cities from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// `<data dir>/climate_anomaly/cities.json`, e.g. `~/.local/share/climate_anomaly/cities.json` on Linux.
    ///
    /// # Errors
    ///
    /// Returns [`CityLookupError::DataDirResolution`] if the platform has no data directory.
    pub fn default_path() -> Result<PathBuf, CityLookupError> {
        dirs::data_dir()
            .map(|p| p.join(DATA_DIR_NAME).join(CITY_TABLE_FILE_NAME))
            .ok_or(CityLookupError::DataDirResolution)
    }

    /// Loads the table from [`CityTable::default_path`].
    ///
    /// # Errors
    ///
    /// See [`CityTable::default_path`] and [`CityTable::from_path`].
    pub fn load_default() -> Result<Self, CityLookupError> {
        Self::from_path(&Self::default_path()?)
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CityDirectory for CityTable {
    /// Uses the first record with exactly this name.
    fn locate(&self, name: &str) -> Result<LatLon, CityLookupError> {
        let record = self
            .records
            .iter()
            .find(|r| r.city == name)
            .ok_or_else(|| CityLookupError::NotFound(name.to_string()))?;
        debug!("Resolved {} to {}, {}", name, record.city, record.country);
        record
            .location()
            .ok_or_else(|| CityLookupError::MissingCoordinates(name.to_string()))
    }

    fn city_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.city.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}
