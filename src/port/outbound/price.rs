//! Price feed port.

use async_trait::async_trait;

use crate::domain::Prices;
use crate::error::Result;

/// Source of USD spot prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn prices(&self) -> Result<Prices>;
}
