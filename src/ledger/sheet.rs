use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{auth, ObservationLedger};
use crate::error::LedgerError;
use crate::pipeline::Observation;

/// Spreadsheet holding the price history, fixed for this deployment
const SHEET_ID: &str = "1KXb7Gy_5FBa4OrKd4q8PVR8gPj4YHOPqOVLkt7raZQg";
/// Tab the observations land in
const TAB_NAME: &str = "ETH Price Feed";

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Appends observations to the sheet: timestamp in column A, price in
/// column B, percent change in column C. Rows are allocated by counting
/// populated cells in column A — a read-then-write sequence that relies on
/// this process being the table's only writer.
pub struct SheetLedger {
    client: Client,
    credentials_path: String,
}

impl SheetLedger {
    pub fn new(credentials_path: String) -> Self {
        Self {
            client: Client::new(),
            credentials_path,
        }
    }

    fn range_url(range: &str) -> String {
        // the range is a path segment and the tab name contains spaces
        let range = format!("'{TAB_NAME}'!{range}").replace(' ', "%20");
        format!("{SHEETS_BASE}/{SHEET_ID}/values/{range}")
    }

    /// Next free 1-based row. Idempotent between writes: two back-to-back
    /// reads with no intervening write return the same index.
    pub async fn next_row(&self, token: &str) -> Result<u32, LedgerError> {
        let response = self
            .client
            .get(Self::range_url("A:A"))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(LedgerError::UnexpectedResponse(format!(
                "values read returned {}",
                response.status()
            )));
        }

        let range: ValueRange = response.json().await?;
        Ok(next_row_index(&range.values))
    }

    async fn write_cell(
        &self,
        token: &str,
        range: &str,
        value: serde_json::Value,
    ) -> Result<(), LedgerError> {
        let response = self
            .client
            .put(Self::range_url(range))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&json!({ "values": [[value]] }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(LedgerError::UnexpectedResponse(format!(
                "values update for {range} returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Count of populated leading cells plus one.
fn next_row_index(values: &[Vec<serde_json::Value>]) -> u32 {
    values.len() as u32 + 1
}

/// Locale-style date + time, in the server's local timezone.
fn format_timestamp(observed_at: DateTime<Utc>) -> String {
    observed_at
        .with_timezone(&Local)
        .format("%-m/%-d/%Y %-I:%M:%S %p")
        .to_string()
}

#[async_trait]
impl ObservationLedger for SheetLedger {
    async fn append_observation(
        &self,
        observation: &Observation,
        change: Option<Decimal>,
    ) -> Result<(), LedgerError> {
        // credentials are re-read each cycle
        let token = auth::access_token(&self.client, &self.credentials_path).await?;

        // one allocation per cycle; all three writes target this row
        let row = self.next_row(&token).await?;
        debug!("Appending observation at sheet row {row}");

        let timestamp = format_timestamp(observation.observed_at);
        self.write_cell(&token, &format!("A{row}"), json!(timestamp))
            .await?;
        self.write_cell(&token, &format!("B{row}"), json!(observation.price))
            .await?;

        if let Some(change) = change {
            self.write_cell(&token, &format!("C{row}"), json!(format!("{change}%")))
                .await?;
            info!("Percentage change: {change}%");
        }

        Ok(())
    }
}
