pub mod vault_feed;

pub use vault_feed::VaultPriceFeed;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::SourceError;

/// A single remote price read, already converted to display units.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self) -> Result<Decimal, SourceError>;
}
