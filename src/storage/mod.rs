//! Storage and persistence layer
//!
//! - Address metadata store (file system)
//! - Unlocked wallet secret
//! - Data models

mod file_system;
mod keys;
mod models;

pub use file_system::FileMetadataStore;
pub use keys::WalletSecret;
pub use models::AddressMetadata;

use crate::address::AddressSettings;
use crate::error::StorageError;

/// Persistence of per-address settings keyed by wallet identity
pub trait AddressMetadataStore: Send + Sync {
    /// All stored entries of a wallet, ordered by derivation index
    fn load(&self, identity: &str) -> Result<Vec<AddressMetadata>, StorageError>;

    /// Insert or replace the entry for `index`
    fn store(
        &self,
        identity: &str,
        index: u32,
        settings: &AddressSettings,
    ) -> Result<(), StorageError>;
}
