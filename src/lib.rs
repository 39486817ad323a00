//! Wallet Addresses: multi-address tracking for an HD wallet
//!
//! This crate keeps the derived addresses of an unlocked wallet in sync
//! with an explorer backend. It persists per-address settings, tracks
//! pending transactions and reconciles them against confirmed history,
//! and polls addresses with outstanding transactions until they settle.
//!
//! # Architecture
//!
//! - **Addresses Registry**: owns the address collection of the active
//!   network and exposes query/update operations
//! - **Address Poller**: re-fetches addresses with pending transactions
//! - **Derivation Worker**: derives address/key pairs off the async tasks
//! - **Metadata Store**: persists labels, colors and the main flag
//! - **Explorer Client**: HTTP access to balances and transaction history
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wallet_addresses::{
//!     AddressPoller, AddressesRegistry, ExplorerClient, NetworkStatus, RegistryConfig,
//!     WalletSecret,
//! };
//!
//! let config = RegistryConfig::from_env();
//! let client = ExplorerClient::new(&config.network.explorer_api_host, config.page_limit);
//! let registry = Arc::new(
//!     AddressesRegistry::builder()
//!         .config(config)
//!         .client(Arc::new(client))
//!         .network_status(NetworkStatus::Online)
//!         .build()?,
//! );
//!
//! registry.unlock_wallet(WalletSecret::from_phrase("main", &words)?).await?;
//! let poller = AddressPoller::spawn(registry.clone());
//! ```

pub mod address;
pub mod client;
pub mod config;
pub mod derivation;
pub mod error;
pub mod notifications;
pub mod registry;
pub mod storage;

pub use address::{
    Address, AddressDetails, AddressSettings, Amount, ConfirmedTransaction, PendingTransaction,
    TransactionType, UnconfirmedTransaction,
};
pub use client::{ExplorerClient, RemoteDataClient};
pub use config::RegistryConfig;
pub use derivation::{Bip32Deriver, DerivationRequest, DerivationWorker, DerivedAddress, KeyDeriver};
pub use error::{AddressesError, ClientError, Result, StorageError};
pub use notifications::{Notification, NotificationLevel, Notifier};
pub use registry::{
    AddressBook, AddressPoller, AddressesRegistry, NetworkSettings, NetworkStatus, PollerHandle,
    RegistryBuilder,
};
pub use storage::{AddressMetadata, AddressMetadataStore, FileMetadataStore, WalletSecret};
