use std::sync::Arc;

use super::addresses::AddressesRegistry;
use super::context::NetworkStatus;
use crate::client::RemoteDataClient;
use crate::config::RegistryConfig;
use crate::derivation::{Bip32Deriver, DerivationWorker, KeyDeriver};
use crate::error::AddressesError;
use crate::notifications::Notifier;
use crate::storage::{AddressMetadataStore, FileMetadataStore};

/// Assembles a registry from its collaborators; anything not provided
/// falls back to the configuration-driven default
#[derive(Default)]
pub struct RegistryBuilder {
    config: Option<RegistryConfig>,
    client: Option<Arc<dyn RemoteDataClient>>,
    store: Option<Arc<dyn AddressMetadataStore>>,
    deriver: Option<Arc<dyn KeyDeriver>>,
    notifier: Option<Notifier>,
    status: Option<NetworkStatus>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn client(mut self, client: Arc<dyn RemoteDataClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn store(mut self, store: Arc<dyn AddressMetadataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn deriver(mut self, deriver: Arc<dyn KeyDeriver>) -> Self {
        self.deriver = Some(deriver);
        self
    }

    pub fn notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Initial network status (default: uninitialized)
    pub fn network_status(mut self, status: NetworkStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Build the registry. Spawns the derivation worker, so this must run
    /// inside a tokio runtime.
    pub fn build(self) -> Result<AddressesRegistry, AddressesError> {
        let config = self.config.unwrap_or_default();
        let client = self
            .client
            .ok_or_else(|| AddressesError::Config("a remote data client is required".to_string()))?;
        let store = self.store.unwrap_or_else(|| {
            Arc::new(FileMetadataStore::new_with_base_dir(config.data_dir.clone()))
        });
        let deriver = self
            .deriver
            .unwrap_or_else(|| Arc::new(Bip32Deriver::new(config.address_groups)));
        let worker = DerivationWorker::spawn(deriver);

        log::debug!(
            "Building address registry for {} ({} groups, poll every {:?})",
            config.network.name,
            config.address_groups,
            config.poll_interval
        );

        Ok(AddressesRegistry::from_parts(
            config,
            client,
            store,
            worker,
            self.notifier.unwrap_or_default(),
            self.status.unwrap_or(NetworkStatus::Uninitialized),
        ))
    }
}

impl AddressesRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }
}
