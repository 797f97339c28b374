use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::hub::SubscriberHub;
use crate::scheduler::Countdown;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<SubscriberHub>,
    pub countdown: Arc<Countdown>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "subscribers": state.hub.subscriber_count(),
        "next_check_in_secs": state.countdown.remaining(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let state = AppState {
            hub: Arc::new(SubscriberHub::new()),
            countdown: Arc::new(Countdown::new(301)),
        };

        let Json(body) = health_check(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["subscribers"], 0);
        assert_eq!(body["next_check_in_secs"], 301);
    }
}
