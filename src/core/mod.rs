pub mod format;
pub mod range;
pub mod store;
pub mod timeseries;
