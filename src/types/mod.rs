pub mod anomaly;
pub mod location;
pub mod series;
