use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sha3::{Digest, Keccak256};
use tracing::debug;

use super::PriceSource;
use crate::error::SourceError;

/// Vault price feed contract on the Avalanche C-Chain
const VAULT_PRICE_FEED: &str = "0x27e99387af40e5CA9CE21418552f15F02C8C57E7";
/// WETH.e, the token the feed is asked to price
const WETH: &str = "0x49D5c2BdFfac6CE2BFdB6640F4F80f226bc10bAB";
/// Solidity signature of the contract read
const GET_PRICE_V1: &str = "getPriceV1(address,bool,bool)";

/// The contract reports prices as integers scaled by 10^30; the first stage
/// strips 27 of those digits as an integer division.
const PRICE_SCALE: u128 = 10u128.pow(27);
/// Second fixed decimal shift from the scaled integer to display units.
const DISPLAY_DIVISOR: u32 = 1000;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<serde_json::Value>,
}

/// Reads the ETH price with one `eth_call` against a fixed contract.
pub struct VaultPriceFeed {
    client: Client,
    rpc_url: String,
}

impl VaultPriceFeed {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
        }
    }
}

#[async_trait]
impl PriceSource for VaultPriceFeed {
    async fn fetch_price(&self) -> Result<Decimal, SourceError> {
        let calldata = encode_get_price_call()?;

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": VAULT_PRICE_FEED, "data": format!("0x{}", hex::encode(&calldata)) },
                "latest",
            ],
        });

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;
        let body: RpcResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(SourceError::RpcError(error.to_string()));
        }
        let result = body
            .result
            .ok_or_else(|| SourceError::Malformed("missing result field".to_string()))?;

        let price = decode_price(&result)?;
        debug!("eth_call returned {result}, decoded price {price}");
        Ok(price)
    }
}

/// First four bytes of the Keccak-256 hash of the function signature.
fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// ABI-encodes `getPriceV1(weth, false, true)`: selector plus three
/// left-padded 32-byte words.
fn encode_get_price_call() -> Result<Vec<u8>, SourceError> {
    let token = hex::decode(WETH.trim_start_matches("0x"))
        .map_err(|e| SourceError::Malformed(format!("bad token address: {e}")))?;
    if token.len() != 20 {
        return Err(SourceError::Malformed("bad token address length".to_string()));
    }

    let mut data = Vec::with_capacity(4 + 32 * 3);
    data.extend_from_slice(&selector(GET_PRICE_V1));

    let mut address_word = [0u8; 32];
    address_word[12..].copy_from_slice(&token);
    data.extend_from_slice(&address_word);

    // maximise = false, include_amm_price = true
    data.extend_from_slice(&[0u8; 32]);
    let mut true_word = [0u8; 32];
    true_word[31] = 1;
    data.extend_from_slice(&true_word);

    Ok(data)
}

/// Decodes the returned 32-byte word and applies the two fixed scaling
/// stages: integer division by 10^27, then /1000 on the result.
fn decode_price(result: &str) -> Result<Decimal, SourceError> {
    let hex_str = result
        .strip_prefix("0x")
        .ok_or_else(|| SourceError::Malformed(format!("result is not hex: {result}")))?;
    let bytes = hex::decode(hex_str)
        .map_err(|e| SourceError::Malformed(format!("result is not hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(SourceError::Malformed(format!(
            "expected a 32-byte word, got {} bytes",
            bytes.len()
        )));
    }

    let (high, low) = bytes.split_at(16);
    if high.iter().any(|b| *b != 0) {
        return Err(SourceError::Malformed("price word out of range".to_string()));
    }
    let mut raw = [0u8; 16];
    raw.copy_from_slice(low);
    let raw = u128::from_be_bytes(raw);

    let scaled = u64::try_from(raw / PRICE_SCALE)
        .map_err(|_| SourceError::Malformed("scaled price out of range".to_string()))?;
    Ok(Decimal::from(scaled) / Decimal::from(DISPLAY_DIVISOR))
}
