pub mod tracker;

pub use tracker::ChangeTracker;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::hub::{FeedMessage, SubscriberHub};
use crate::ledger::ObservationLedger;
use crate::oracle::PriceSource;
use crate::scheduler::Countdown;

/// One (price, timestamp) pair produced by a successful cycle
#[derive(Debug, Clone)]
pub struct Observation {
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn now(price: Decimal) -> Self {
        Self {
            price,
            observed_at: Utc::now(),
        }
    }
}

/// Orchestrates one fetch → broadcast → append cycle.
///
/// The broadcast and the ledger append are independent side effects of the
/// same observation: the broadcast always fires first and a ledger failure
/// can neither suppress nor delay it.
pub struct Pipeline {
    source: Arc<dyn PriceSource>,
    ledger: Arc<dyn ObservationLedger>,
    hub: Arc<SubscriberHub>,
    tracker: ChangeTracker,
    countdown: Arc<Countdown>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn PriceSource>,
        ledger: Arc<dyn ObservationLedger>,
        hub: Arc<SubscriberHub>,
        countdown: Arc<Countdown>,
    ) -> Self {
        Self {
            source,
            ledger,
            hub,
            tracker: ChangeTracker::new(),
            countdown,
        }
    }

    /// Runs one complete cycle. Never returns an error: every failure is
    /// contained here so the fetch driver keeps firing.
    pub async fn run_cycle(&self) {
        self.countdown.reset();
        self.hub.broadcast(&FeedMessage::updating());

        let price = match self.source.fetch_price().await {
            Ok(price) => price,
            Err(e) => {
                error!("❌ Price fetch failed: {e}");
                self.hub.broadcast(&FeedMessage::fetch_failed());
                return;
            }
        };

        let observation = Observation::now(price);
        let change = self.tracker.update(price);

        self.hub.broadcast(&FeedMessage::price(price));
        info!("💰 ETH exchange price: {price}");

        if let Err(e) = self.ledger.append_observation(&observation, change).await {
            error!("❌ Ledger append failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LedgerError, SourceError};
    use async_trait::async_trait;
    use axum::extract::ws::Message;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use tokio::sync::mpsc;

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Decimal, String>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Decimal, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        async fn fetch_price(&self) -> Result<Decimal, SourceError> {
            match self.responses.lock().pop_front() {
                Some(Ok(price)) => Ok(price),
                Some(Err(message)) => Err(SourceError::Malformed(message)),
                None => panic!("unscripted fetch"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingLedger {
        rows: Mutex<Vec<(Decimal, Option<String>)>>,
    }

    #[async_trait]
    impl ObservationLedger for RecordingLedger {
        async fn append_observation(
            &self,
            observation: &Observation,
            change: Option<Decimal>,
        ) -> Result<(), LedgerError> {
            self.rows
                .lock()
                .push((observation.price, change.map(|c| format!("{c}%"))));
            Ok(())
        }
    }

    fn pipeline_with(
        responses: Vec<Result<Decimal, String>>,
    ) -> (Pipeline, Arc<RecordingLedger>, mpsc::UnboundedReceiver<Message>) {
        let ledger = Arc::new(RecordingLedger::default());
        let hub = Arc::new(SubscriberHub::new());
        let (tx, rx) = mpsc::unbounded_channel();
        hub.register(tx);

        let pipeline = Pipeline::new(
            Arc::new(ScriptedSource::new(responses)),
            ledger.clone(),
            hub,
            Arc::new(Countdown::new(301)),
        );
        (pipeline, ledger, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<String> {
        let mut texts = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            texts.push(text);
        }
        texts
    }

    #[tokio::test]
    async fn test_two_cycle_feed() {
        let (pipeline, ledger, mut rx) =
            pipeline_with(vec![Ok(dec!(3200.50)), Ok(dec!(3250.75))]);

        pipeline.run_cycle().await;
        assert_eq!(
            drain(&mut rx),
            vec![
                r#"{"message":"Updating price..."}"#.to_string(),
                r#"{"price":3200.5}"#.to_string(),
            ]
        );

        pipeline.run_cycle().await;
        assert_eq!(
            drain(&mut rx),
            vec![
                r#"{"message":"Updating price..."}"#.to_string(),
                r#"{"price":3250.75}"#.to_string(),
            ]
        );

        let rows = ledger.rows.lock();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (dec!(3200.50), None));
        assert_eq!(rows[1], (dec!(3250.75), Some("1.57%".to_string())));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_state_untouched() {
        let (pipeline, ledger, mut rx) = pipeline_with(vec![
            Ok(dec!(3200.50)),
            Err("rpc down".to_string()),
        ]);

        pipeline.run_cycle().await;
        drain(&mut rx);

        pipeline.run_cycle().await;
        assert_eq!(
            drain(&mut rx),
            vec![
                r#"{"message":"Updating price..."}"#.to_string(),
                r#"{"error":"Failed to fetch price"}"#.to_string(),
            ]
        );

        // tracker still holds the cycle-1 price, nothing new appended
        assert_eq!(pipeline.tracker.last_price(), Some(dec!(3200.50)));
        assert_eq!(ledger.rows.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_failure_does_not_suppress_broadcast() {
        struct FailingLedger;

        #[async_trait]
        impl ObservationLedger for FailingLedger {
            async fn append_observation(
                &self,
                _observation: &Observation,
                _change: Option<Decimal>,
            ) -> Result<(), LedgerError> {
                Err(LedgerError::UnexpectedResponse("quota exceeded".to_string()))
            }
        }

        let hub = Arc::new(SubscriberHub::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx);

        let pipeline = Pipeline::new(
            Arc::new(ScriptedSource::new(vec![Ok(dec!(3200.50))])),
            Arc::new(FailingLedger),
            hub,
            Arc::new(Countdown::new(301)),
        );

        pipeline.run_cycle().await;

        // price broadcast happened and the tracker advanced despite the append failure
        assert_eq!(
            drain(&mut rx),
            vec![
                r#"{"message":"Updating price..."}"#.to_string(),
                r#"{"price":3200.5}"#.to_string(),
            ]
        );
        assert_eq!(pipeline.tracker.last_price(), Some(dec!(3200.50)));
    }

    #[tokio::test]
    async fn test_cycle_resets_countdown() {
        let (pipeline, _ledger, _rx) = pipeline_with(vec![Ok(dec!(100))]);
        pipeline.countdown.advance();
        pipeline.countdown.advance();
        assert_eq!(pipeline.countdown.remaining(), 281);

        pipeline.run_cycle().await;
        assert_eq!(pipeline.countdown.remaining(), 301);
    }
}
