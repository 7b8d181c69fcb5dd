mod analysis;
mod archive;
mod cities;
mod climate_anomaly;
mod error;
mod types;

pub use climate_anomaly::*;
pub use error::AnomalyError;

pub use archive::error::{RetrievalError, RetrievalErrorKind, TransportError, TransportErrorKind};
pub use archive::fetcher::{SeriesFetcher, OPEN_METEO_ARCHIVE_URL};
pub use archive::retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use archive::transport::{ArchiveTransport, HttpResponse, HttpTransport};

pub use analysis::analyzer::{analyze, AnomalyAnalyzer, Baseline};
pub use analysis::error::AnalysisError;
pub use analysis::monthly::{monthly_medians, MonthlyMedian};

pub use cities::directory::{CityDirectory, CityRecord, CityTable};
pub use cities::error::CityLookupError;

pub use types::anomaly::{AnomalyResult, DeviationDirection};
pub use types::location::{DateRange, LatLon};
pub use types::series::{TemperatureObservation, TemperatureSeries};
