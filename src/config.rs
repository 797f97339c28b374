use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bind_address: String,
    pub avalanche_rpc_url: String,
    pub credentials_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let port = std::env::var("PORT").unwrap_or_else(|_| "4033".to_string());

        Ok(Self {
            bind_address: format!("0.0.0.0:{}", port),
            avalanche_rpc_url: std::env::var("AVALANCHE_RPC_URL")
                .unwrap_or_else(|_| "https://api.avax.network/ext/bc/C/rpc".to_string()),
            credentials_path: std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .unwrap_or_else(|_| "./credentials.json".to_string()),
        })
    }
}
