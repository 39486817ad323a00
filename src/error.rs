//! Error types for address tracking operations
//!
//! Precondition violations (no unlocked wallet) abort the triggering
//! operation. Per-address API failures are not errors at the registry
//! level: they become notifications and the batch continues.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddressesError {
    #[error("No wallet is unlocked")]
    NoActiveWallet,

    #[error("A derivation request is already outstanding for wallet {wallet} on {network}")]
    DerivationInProgress { wallet: String, network: String },

    #[error("Derivation error: {0}")]
    Derivation(String),

    #[error("Derivation worker stopped")]
    WorkerStopped,

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Invalid address hash: {0}")]
    InvalidAddressHash(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid wallet identity: {0}")]
    InvalidIdentity(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AddressesError>;
