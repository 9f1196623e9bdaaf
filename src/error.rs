use thiserror::Error;

pub use crate::domain::error::{CurveError, LedgerError};
use crate::domain::summary::FailureKind;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("unknown network '{name}'")]
    UnknownNetwork { name: String },

    #[error("{operation} is only allowed on local networks, '{network}' is not tagged local")]
    NetworkNotLocal {
        network: String,
        operation: &'static str,
    },

    #[error("{0}")]
    Other(String),
}

/// Chain interaction errors surfaced by the chain client.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("no receipt for transaction {tx_hash} after {waited_secs}s")]
    ReceiptTimeout { tx_hash: String, waited_secs: u64 },

    #[error("creation transaction {tx_hash} returned no contract address")]
    MissingContractAddress { tx_hash: String },

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("event {event} not found in transaction {tx_hash}")]
    MissingEvent { event: &'static str, tx_hash: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("operator rejected {subject}")]
    UserRejected { subject: String },

    #[error("insufficient {token} balance: required {required}, available {available}")]
    InsufficientBalance {
        token: String,
        required: String,
        available: String,
    },

    #[error("verification failed: {0}")]
    Verification(String),

    #[error("artifact {name}: {reason}")]
    Artifact { name: String, reason: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify the error for run summaries.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) | Self::Curve(_) => FailureKind::Configuration,
            Self::Ledger(LedgerError::NotFound { .. }) => FailureKind::NotInitialized,
            Self::Ledger(LedgerError::Conflict { .. }) => FailureKind::Configuration,
            Self::UserRejected { .. } => FailureKind::UserRejected,
            Self::InsufficientBalance { .. } => FailureKind::InsufficientBalance,
            Self::Chain(ChainError::Rpc(_) | ChainError::ReceiptTimeout { .. }) | Self::Http(_) => {
                FailureKind::TransientRpcFailure
            }
            Self::Verification(_) => FailureKind::VerificationFailure,
            Self::Chain(_) | Self::Artifact { .. } | Self::Json(_) | Self::Io(_) | Self::Url(_) => {
                FailureKind::Other
            }
        }
    }
}

impl Error {
    /// Whether repeating the same request may succeed.
    ///
    /// A mined revert is final. Repeating it would only burn gas.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::TransientRpcFailure
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
