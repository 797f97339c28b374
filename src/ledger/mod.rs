pub mod auth;
pub mod sheet;

pub use sheet::SheetLedger;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::pipeline::Observation;

/// Append-only store for observations. The external table has no native
/// append primitive, rows are allocated by counting column A (see
/// `SheetLedger`).
#[async_trait]
pub trait ObservationLedger: Send + Sync {
    /// Writes one observation and, when a prior price existed, its percent
    /// change. The writes are independent remote calls; a failure aborts
    /// the remaining steps without rolling back the earlier ones.
    async fn append_observation(
        &self,
        observation: &Observation,
        change: Option<Decimal>,
    ) -> Result<(), LedgerError>;
}
