pub mod analyzer;
pub mod error;
pub mod monthly;
pub(crate) mod stats;
