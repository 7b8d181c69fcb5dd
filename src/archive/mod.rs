pub(crate) mod cache;
pub mod error;
pub mod fetcher;
pub(crate) mod response;
pub mod retry;
pub mod transport;
