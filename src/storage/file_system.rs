use std::fs;
use std::path::PathBuf;

use super::models::AddressMetadata;
use super::AddressMetadataStore;
use crate::address::AddressSettings;
use crate::error::StorageError;

const METADATA_FILE: &str = "addresses.json";

/// Address metadata persisted as JSON under `<base>/<identity>/addresses.json`
#[derive(Clone)]
pub struct FileMetadataStore {
    base_path: PathBuf,
}

impl FileMetadataStore {
    /// Create a store under the default base directory ("./wallets")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./wallets"),
        }
    }

    /// Create a store with custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn wallet_dir(&self, identity: &str) -> Result<PathBuf, StorageError> {
        let valid = !identity.is_empty()
            && identity != "."
            && identity != ".."
            && !identity.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::InvalidIdentity(identity.to_string()));
        }
        Ok(self.base_path.join(identity))
    }

    fn write_all(&self, identity: &str, entries: &[AddressMetadata]) -> Result<(), StorageError> {
        let dir = self.wallet_dir(identity)?;
        fs::create_dir_all(&dir)?;

        // Atomic replace
        let path = dir.join(METADATA_FILE);
        let tmp = dir.join(format!("{}.tmp", METADATA_FILE));
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Delete all stored metadata of a wallet
    pub fn delete(&self, identity: &str) -> Result<(), StorageError> {
        let dir = self.wallet_dir(identity)?;
        if dir.exists() {
            log::warn!("Deleting address metadata directory: {:?}", dir);
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

impl Default for FileMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressMetadataStore for FileMetadataStore {
    fn load(&self, identity: &str) -> Result<Vec<AddressMetadata>, StorageError> {
        let path = self.wallet_dir(identity)?.join(METADATA_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        let mut entries: Vec<AddressMetadata> = serde_json::from_str(&contents)?;
        entries.sort_by_key(|entry| entry.index);
        Ok(entries)
    }

    fn store(
        &self,
        identity: &str,
        index: u32,
        settings: &AddressSettings,
    ) -> Result<(), StorageError> {
        let mut entries = self.load(identity)?;
        let entry = AddressMetadata::new(index, settings);

        match entries.iter_mut().find(|existing| existing.index == index) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        entries.sort_by_key(|entry| entry.index);

        self.write_all(identity, &entries)?;
        log::debug!("Stored metadata for address #{} of wallet '{}'", index, identity);
        Ok(())
    }
}
