use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CityLookupError {
    #[error("Failed to determine data directory")]
    DataDirResolution,

    #[error("Failed to read city table '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse city table '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to parse city table")]
    ParseStr(#[source] serde_json::Error),

    #[error("No city named '{0}' in the directory")]
    NotFound(String),

    #[error("City '{0}' has no coordinates")]
    MissingCoordinates(String),
}
