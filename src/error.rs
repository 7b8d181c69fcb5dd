use crate::analysis::error::AnalysisError;
use crate::archive::error::RetrievalError;
use crate::cities::error::CityLookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnomalyError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    CityLookup(#[from] CityLookupError),
}
