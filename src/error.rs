use thiserror::Error;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Price source unavailable: {0}")]
    Source(#[from] SourceError),

    #[error("Ledger write failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors from the on-chain price read. Never retried inline, the next
/// scheduled cycle is the retry.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] reqwest::Error),

    #[error("RPC returned an error: {0}")]
    RpcError(String),

    #[error("Malformed price data: {0}")]
    Malformed(String),
}

/// Errors from the spreadsheet append protocol. Any of the independent
/// remote calls of one append may fail; already-written cells stay as they
/// are.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Credentials unavailable: {0}")]
    Credentials(String),

    #[error("Token exchange failed: {0}")]
    Auth(String),

    #[error("Sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected sheet response: {0}")]
    UnexpectedResponse(String),
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {:?}", error))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
