use async_trait::async_trait;
use crate::error::FetchResult;
use crate::models::SeriesBundle;

pub mod econdata;
pub mod memory;
pub mod transform_keys;

/// A backend that can resolve one series code into its observation bundle.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_series(&self, code: &str) -> FetchResult<SeriesBundle>;
}
