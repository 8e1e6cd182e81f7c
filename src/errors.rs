use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("Unknown token: {0:?}")]
    UnknownToken(String),
    #[error("Gas estimation failed: {0}")]
    EstimationFailure(String),
    #[error("Transaction generation failed: {0}")]
    GenerationFailure(String),
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),
    #[error("Failed to decode signed transaction: {0}")]
    Decode(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
