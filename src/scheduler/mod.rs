pub mod countdown;

pub use countdown::Countdown;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::info;

use crate::pipeline::Pipeline;

/// Seconds between fetch cycles
pub const FETCH_INTERVAL_SECS: u64 = 301;
/// Seconds between countdown display ticks
const COUNTDOWN_TICK_SECS: u64 = 10;

/// Drives the feed's two periodic tasks: the fetch cycle and the cosmetic
/// countdown. Owns no business logic, only timing.
///
/// The fetch interval is assumed (not enforced) to exceed any single
/// cycle's duration, so cycles never overlap.
pub struct FeedScheduler {
    pipeline: Arc<Pipeline>,
    countdown: Arc<Countdown>,
}

impl FeedScheduler {
    pub fn new(pipeline: Arc<Pipeline>, countdown: Arc<Countdown>) -> Self {
        Self { pipeline, countdown }
    }

    /// Starts both drivers (runs in background). The fetch driver fires
    /// immediately, then every `FETCH_INTERVAL_SECS`; the countdown driver
    /// ticks independently every ten seconds. Neither task ever exits over
    /// a failed cycle.
    pub fn start(&self) -> (JoinHandle<()>, JoinHandle<()>) {
        let pipeline = self.pipeline.clone();
        let fetch_task = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(FETCH_INTERVAL_SECS));
            loop {
                ticker.tick().await;
                pipeline.run_cycle().await;
            }
        });

        let countdown = self.countdown.clone();
        let countdown_task = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(COUNTDOWN_TICK_SECS));
            loop {
                ticker.tick().await;
                info!("{} seconds until next price check...", countdown.remaining());
                countdown.advance();
            }
        });

        (fetch_task, countdown_task)
    }
}
