use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Cannot analyze an empty temperature series")]
    EmptySeries,

    /// No baseline observations share the latest observation's calendar month.
    #[error("No historical observations for calendar month {month}")]
    InsufficientHistory { month: u32 },
}
