//! Addresses registry
//!
//! Owns every tracked address of the unlocked wallet on the active network,
//! keeps them in sync with the explorer and reconciles pending transactions
//! against confirmed history.
//!
//! State locks are never held across an `.await`: fetches work on copied
//! inputs and their results are applied afterwards, only if the registry
//! generation has not moved in the meantime.

use bitcoin::secp256k1::rand;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

use super::book::AddressBook;
use super::context::{NetworkSettings, NetworkStatus};
use super::reconcile::reconcile;
use crate::address::{Address, AddressSettings, PendingTransaction};
use crate::client::RemoteDataClient;
use crate::config::RegistryConfig;
use crate::derivation::{DerivationRequest, DerivationWorker};
use crate::error::{AddressesError, ClientError, Result};
use crate::notifications::Notifier;
use crate::storage::{AddressMetadataStore, WalletSecret};

pub(super) struct RegistryState {
    pub(super) book: AddressBook,
    pub(super) network: NetworkSettings,
    pub(super) status: NetworkStatus,
    pub(super) wallet: Option<WalletSecret>,
    pub(super) initialized: bool,
}

pub struct AddressesRegistry {
    config: RegistryConfig,
    client: Arc<dyn RemoteDataClient>,
    store: Arc<dyn AddressMetadataStore>,
    worker: DerivationWorker,
    notifier: Notifier,
    state: RwLock<RegistryState>,
    /// Bumped on every context switch and on teardown
    generation: AtomicU64,
    /// Bumped on every change to the address collection
    revision: watch::Sender<u64>,
    loading: AtomicUsize,
    derivations: Mutex<HashSet<(String, String)>>,
    /// Bumped whenever an outstanding derivation is released
    released: watch::Sender<u64>,
}

/// Marks a `(wallet, network)` derivation as outstanding until dropped
struct DerivationGuard<'a> {
    in_flight: &'a Mutex<HashSet<(String, String)>>,
    released: &'a watch::Sender<u64>,
    key: (String, String),
}

impl Drop for DerivationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
        self.released.send_modify(|count| *count = count.wrapping_add(1));
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn random_color() -> String {
    let [r, g, b] = rand::random::<[u8; 3]>();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

impl AddressesRegistry {
    pub(super) fn from_parts(
        config: RegistryConfig,
        client: Arc<dyn RemoteDataClient>,
        store: Arc<dyn AddressMetadataStore>,
        worker: DerivationWorker,
        notifier: Notifier,
        status: NetworkStatus,
    ) -> Self {
        let (revision, _) = watch::channel(0u64);
        let (released, _) = watch::channel(0u64);
        let state = RegistryState {
            book: AddressBook::new(),
            network: config.network.clone(),
            status,
            wallet: None,
            initialized: false,
        };

        Self {
            config,
            client,
            store,
            worker,
            notifier,
            state: RwLock::new(state),
            generation: AtomicU64::new(0),
            revision,
            loading: AtomicUsize::new(0),
            derivations: Mutex::new(HashSet::new()),
            released,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Apply `update` unless the context changed since `generation` was read
    fn apply<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut RegistryState),
    {
        {
            let mut state = self.write();
            if self.current_generation() != generation {
                log::debug!("Dropping result from stale generation {}", generation);
                return false;
            }
            update(&mut state);
        }
        self.bump_revision();
        true
    }

    /// Clear every address of the previous context, then switch context
    fn reset_with<F>(&self, switch: F)
    where
        F: FnOnce(&mut RegistryState),
    {
        {
            let mut state = self.write();
            self.generation.fetch_add(1, Ordering::SeqCst);
            state.book.clear();
            state.initialized = false;
            switch(&mut state);
        }
        self.bump_revision();
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn network(&self) -> NetworkSettings {
        self.read().network.clone()
    }

    pub fn network_status(&self) -> NetworkStatus {
        self.read().status
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    /// Receiver notified on every change to the address collection
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn active_wallet(&self) -> Result<WalletSecret> {
        self.read().wallet.clone().ok_or(AddressesError::NoActiveWallet)
    }

    /// Unlocked wallet together with the generation it belongs to
    fn active_context(&self) -> Result<(WalletSecret, u64)> {
        let state = self.read();
        let wallet = state.wallet.clone().ok_or(AddressesError::NoActiveWallet)?;
        Ok((wallet, self.current_generation()))
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Address on the current network
    pub fn get_address(&self, hash: &str) -> Option<Address> {
        let state = self.read();
        state.book.get(hash, &state.network.name).cloned()
    }

    /// Every address on the current network, ordered by index
    pub fn addresses(&self) -> Vec<Address> {
        let state = self.read();
        state
            .book
            .for_network(&state.network.name)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn main_address(&self) -> Option<Address> {
        self.addresses().into_iter().find(|address| address.is_main())
    }

    /// Addresses with pending transactions on the current network and the
    /// wallet addresses those transactions pay to
    pub fn addresses_to_poll(&self) -> Vec<String> {
        let state = self.read();
        state.book.poll_set(&state.network.name)
    }

    // ============================================================================
    // Updates
    // ============================================================================

    /// Upsert an address under the current network
    pub fn set_address(&self, mut address: Address) {
        {
            let mut state = self.write();
            address.network = state.network.name.clone();
            state.book.insert(address);
        }
        self.bump_revision();
    }

    fn persist_settings(&self, wallet: &WalletSecret, index: u32, settings: &AddressSettings) -> Result<()> {
        if wallet.is_passphrase_derived() {
            log::debug!("Passphrase wallet: settings of address #{} kept in memory only", index);
            return Ok(());
        }
        self.store.store(wallet.identity(), index, settings)?;
        Ok(())
    }

    /// Persist a newly derived address, track it and fetch its data
    pub async fn save_new_address(&self, address: Address) -> Result<()> {
        let (wallet, generation) = self.active_context()?;
        self.save_new_address_in(&wallet, generation, address).await?;
        Ok(())
    }

    /// Save `address` for `wallet` unless the context moved past
    /// `generation`. Returns whether the address was saved.
    async fn save_new_address_in(
        &self,
        wallet: &WalletSecret,
        generation: u64,
        mut address: Address,
    ) -> Result<bool> {
        if self.current_generation() != generation {
            log::debug!("Context changed, not saving address #{}", address.index);
            return Ok(false);
        }
        self.persist_settings(wallet, address.index, &address.settings)?;

        let hash = address.hash.clone();
        let index = address.index;
        let short_hash = address.short_hash();
        let inserted = self.apply(generation, |state| {
            address.network = state.network.name.clone();
            state.book.insert(address);
        });
        if !inserted {
            return Ok(false);
        }

        log::info!("Saved new address #{} ({})", index, short_hash);
        self.fetch_addresses_data(&[hash]).await;
        Ok(true)
    }

    /// Persist and apply new settings. Marking an address as main takes the
    /// flag away from the previous main address.
    pub fn update_address_settings(&self, hash: &str, settings: AddressSettings) -> Result<()> {
        let wallet = self.active_wallet()?;

        let (index, demoted) = {
            let state = self.read();
            let network = &state.network.name;
            let address = state
                .book
                .get(hash, network)
                .ok_or_else(|| AddressesError::AddressNotFound(hash.to_string()))?;

            let demoted: Vec<(String, u32, AddressSettings)> = if settings.is_main {
                state
                    .book
                    .for_network(network)
                    .into_iter()
                    .filter(|other| other.hash != hash && other.is_main())
                    .map(|other| {
                        let mut other_settings = other.settings.clone();
                        other_settings.is_main = false;
                        (other.hash.clone(), other.index, other_settings)
                    })
                    .collect()
            } else {
                Vec::new()
            };

            (address.index, demoted)
        };

        self.persist_settings(&wallet, index, &settings)?;
        for (_, other_index, other_settings) in &demoted {
            self.persist_settings(&wallet, *other_index, other_settings)?;
        }

        {
            let mut state = self.write();
            let network = state.network.name.clone();
            for (other_hash, _, other_settings) in demoted {
                if let Some(other) = state.book.get_mut(&other_hash, &network) {
                    other.settings = other_settings;
                }
            }
            if let Some(address) = state.book.get_mut(hash, &network) {
                address.settings = settings;
            }
        }
        self.bump_revision();
        Ok(())
    }

    /// Track a transaction this wallet just sent (or is about to receive)
    pub fn register_pending_transaction(&self, mut tx: PendingTransaction) -> Result<()> {
        {
            let mut state = self.write();
            let network = state.network.name.clone();
            tx.network = network.clone();

            let owner = if state.book.contains(&tx.from_address, &network) {
                tx.from_address.clone()
            } else if state.book.contains(&tx.to_address, &network) {
                tx.to_address.clone()
            } else {
                return Err(AddressesError::AddressNotFound(tx.from_address.clone()));
            };

            if let Some(address) = state.book.get_mut(&owner, &network) {
                log::info!("Tracking pending {:?} {} on {}", tx.tx_type, tx.tx_id, address.short_hash());
                address.transactions.track_pending(tx);
                reconcile(address);
            }
        }
        self.bump_revision();
        Ok(())
    }

    // ============================================================================
    // Remote data
    // ============================================================================

    /// Re-fetch data of every address on the current network
    pub async fn refresh_addresses_data(&self) {
        let hashes: Vec<String> = self.addresses().into_iter().map(|a| a.hash).collect();
        self.fetch_addresses_data(&hashes).await;
    }

    /// Fetch details, history and unconfirmed transactions for each address.
    /// A failure only affects its own address; the rest of the batch goes on.
    pub async fn fetch_addresses_data(&self, hashes: &[String]) {
        if hashes.is_empty() {
            return;
        }

        let (network, status) = {
            let state = self.read();
            (state.network.name.clone(), state.status)
        };
        if status.is_transitional() {
            log::debug!("Network {} is {:?}, skipping fetch", network, status);
            return;
        }
        if status == NetworkStatus::Offline {
            self.notifier.offline();
            return;
        }

        let generation = self.current_generation();
        let _loading = LoadingGuard::new(&self.loading);

        let fetches = hashes
            .iter()
            .map(|hash| self.fetch_address_data(hash, &network, generation));
        let results = futures::future::join_all(fetches).await;

        for (hash, result) in hashes.iter().zip(results) {
            if let Err(e) = result {
                if self.current_generation() == generation {
                    self.notifier
                        .alert(format!("Could not fetch data of address {}: {}", hash, e));
                }
            }
        }
    }

    async fn fetch_address_data(
        &self,
        hash: &str,
        network: &str,
        generation: u64,
    ) -> std::result::Result<(), ClientError> {
        let details = self.client.fetch_address_details(hash).await?;
        let confirmed = self.client.fetch_address_confirmed_transactions(hash).await?;
        let unconfirmed = self.client.fetch_address_unconfirmed_transactions(hash).await?;

        self.apply(generation, |state| match state.book.get_mut(hash, network) {
            Some(address) => {
                address.details = details;
                address.transactions.merge_latest(confirmed);
                for tx in unconfirmed {
                    address.transactions.track_pending(tx.into_pending(network));
                }
                reconcile(address);
            }
            None => log::debug!("Address {} no longer tracked, dropping fetched data", hash),
        });
        Ok(())
    }

    /// Load the next page of confirmed history of one address
    pub async fn fetch_address_transactions_next_page(&self, hash: &str) -> Result<()> {
        let (network, status, page) = {
            let state = self.read();
            let address = state
                .book
                .get(hash, &state.network.name)
                .ok_or_else(|| AddressesError::AddressNotFound(hash.to_string()))?;
            (
                state.network.name.clone(),
                state.status,
                address.transactions.loaded_page + 1,
            )
        };
        if status.is_transitional() {
            return Ok(());
        }
        if status == NetworkStatus::Offline {
            self.notifier.offline();
            return Ok(());
        }

        let generation = self.current_generation();
        let _loading = LoadingGuard::new(&self.loading);

        match self
            .client
            .fetch_address_confirmed_transactions_page(hash, page)
            .await
        {
            Ok(transactions) => {
                self.apply(generation, |state| {
                    if let Some(address) = state.book.get_mut(hash, &network) {
                        address.transactions.append_page(page, transactions);
                    }
                });
            }
            Err(e) => {
                if self.current_generation() == generation {
                    self.notifier.alert(format!(
                        "Could not load page {} of address {}: {}",
                        page, hash, e
                    ));
                }
            }
        }
        Ok(())
    }

    // ============================================================================
    // Derivation
    // ============================================================================

    /// Reserve the derivation slot of `(wallet, network)` until the guard drops
    fn claim_derivation(&self, wallet: &WalletSecret, network: &str) -> Result<DerivationGuard<'_>> {
        let key = (wallet.identity().to_string(), network.to_string());
        {
            let mut in_flight = self.derivations.lock().unwrap_or_else(|e| e.into_inner());
            if !in_flight.insert(key.clone()) {
                return Err(AddressesError::DerivationInProgress {
                    wallet: key.0,
                    network: key.1,
                });
            }
        }
        Ok(DerivationGuard {
            in_flight: &self.derivations,
            released: &self.released,
            key,
        })
    }

    /// Derive one new address in every group that has none yet and is not
    /// listed in `skip_groups`, then save each of them
    pub async fn generate_one_address_per_group(
        &self,
        label_prefix: Option<&str>,
        color: Option<&str>,
        skip_groups: &[u8],
    ) -> Result<Vec<Address>> {
        let (wallet, generation, network, used_groups, used_indexes) = {
            let state = self.read();
            let wallet = state.wallet.clone().ok_or(AddressesError::NoActiveWallet)?;
            let existing = state.book.for_network(&state.network.name);
            let groups: HashSet<u8> = existing.iter().map(|a| a.group).collect();
            let indexes: Vec<u32> = existing.iter().map(|a| a.index).collect();
            (
                wallet,
                self.current_generation(),
                state.network.name.clone(),
                groups,
                indexes,
            )
        };

        let groups: Vec<u8> = (0..self.config.address_groups)
            .filter(|group| !skip_groups.contains(group) && !used_groups.contains(group))
            .collect();
        if groups.is_empty() {
            log::debug!("Every group already has an address");
            return Ok(Vec::new());
        }

        let _guard = self.claim_derivation(&wallet, &network)?;
        let request = DerivationRequest::Groups {
            groups,
            skip_indexes: used_indexes,
        };
        log::debug!("Submitting derivation request {:?}", request);
        let derived = self.worker.derive(wallet.clone(), request).await?;

        let mut saved = Vec::with_capacity(derived.len());
        for d in derived {
            if self.current_generation() != generation {
                log::debug!("Context changed during generation, discarding remaining addresses");
                break;
            }
            let settings = AddressSettings {
                label: label_prefix.map(|prefix| format!("{} {}", prefix, d.group)),
                color: Some(color.map(str::to_string).unwrap_or_else(random_color)),
                is_main: false,
            };
            let mut address =
                Address::new(d.hash, d.public_key, d.private_key, d.index, d.group, settings);
            address.network = network.clone();
            if self.save_new_address_in(&wallet, generation, address.clone()).await? {
                saved.push(address);
            }
        }

        log::info!("Generated {} address(es), one per group", saved.len());
        Ok(saved)
    }

    // ============================================================================
    // Context
    // ============================================================================

    /// Load the wallet's stored addresses, or create the default one.
    ///
    /// A no-op while the network is settling or once initialized for the
    /// current context. If an initialization for the same wallet and network
    /// is outstanding, waits for it to finish and checks again.
    pub async fn initialize(&self) -> Result<()> {
        loop {
            let mut released = self.released.subscribe();
            match self.try_initialize().await {
                Err(AddressesError::DerivationInProgress { wallet, network }) => {
                    log::debug!("Waiting for outstanding derivation of '{}' on {}", wallet, network);
                    if released.changed().await.is_err() {
                        return Ok(());
                    }
                }
                result => return result,
            }
        }
    }

    async fn try_initialize(&self) -> Result<()> {
        let (wallet, network, status, initialized, generation) = {
            let state = self.read();
            (
                state.wallet.clone(),
                state.network.name.clone(),
                state.status,
                state.initialized,
                self.current_generation(),
            )
        };
        let wallet = wallet.ok_or(AddressesError::NoActiveWallet)?;
        if status.is_transitional() {
            log::debug!("Network {} is {:?}, initialization deferred", network, status);
            return Ok(());
        }
        if initialized {
            return Ok(());
        }

        let _guard = self.claim_derivation(&wallet, &network)?;
        let stored = self.store.load(wallet.identity())?;
        let indexes: Vec<u32> = if stored.is_empty() {
            vec![0]
        } else {
            stored.iter().map(|entry| entry.index).collect()
        };
        let derived = self
            .worker
            .derive(wallet.clone(), DerivationRequest::Indexes { indexes })
            .await?;

        if stored.is_empty() {
            let Some(d) = derived.into_iter().next() else {
                return Err(AddressesError::Derivation("no default address derived".to_string()));
            };
            let settings = AddressSettings {
                label: None,
                color: Some(random_color()),
                is_main: true,
            };
            let address = Address::new(d.hash, d.public_key, d.private_key, d.index, d.group, settings);

            if !self.save_new_address_in(&wallet, generation, address).await? {
                return Ok(());
            }
            if self.apply(generation, |state| state.initialized = true) {
                log::info!("Created default address for wallet '{}'", wallet.identity());
            }
            return Ok(());
        }

        let mut hashes = Vec::with_capacity(derived.len());
        let applied = self.apply(generation, |state| {
            for d in derived {
                let settings = stored
                    .iter()
                    .find(|entry| entry.index == d.index)
                    .map(|entry| entry.settings())
                    .unwrap_or_default();
                let mut address =
                    Address::new(d.hash, d.public_key, d.private_key, d.index, d.group, settings);
                address.network = network.clone();
                hashes.push(address.hash.clone());
                state.book.insert(address);
            }
            state.initialized = true;
        });
        if !applied {
            return Ok(());
        }

        log::info!(
            "Restored {} address(es) of wallet '{}' on {}",
            hashes.len(),
            wallet.identity(),
            network
        );
        self.fetch_addresses_data(&hashes).await;
        Ok(())
    }

    /// Switch to another wallet; the previous wallet's addresses are dropped
    pub async fn unlock_wallet(&self, secret: WalletSecret) -> Result<()> {
        log::info!("Unlocking wallet '{}'", secret.identity());
        self.reset_with(|state| state.wallet = Some(secret));
        self.initialize().await
    }

    pub fn lock_wallet(&self) {
        log::info!("Locking wallet");
        self.reset_with(|state| state.wallet = None);
    }

    /// Apply new network settings. Different settings clear all address
    /// state before re-initializing.
    pub async fn set_network(&self, settings: NetworkSettings, status: NetworkStatus) -> Result<()> {
        let unchanged_previous = {
            let mut state = self.write();
            (state.network == settings).then(|| std::mem::replace(&mut state.status, status))
        };

        let previous = match unchanged_previous {
            Some(previous) => previous,
            None => {
                log::info!("Switching network to {} ({:?})", settings.name, status);
                self.reset_with(|state| {
                    state.network = settings;
                    state.status = status;
                });
                NetworkStatus::Uninitialized
            }
        };
        self.after_status_change(previous).await
    }

    /// Update the connection status of the current network
    pub async fn set_network_status(&self, status: NetworkStatus) -> Result<()> {
        let previous = {
            let mut state = self.write();
            std::mem::replace(&mut state.status, status)
        };
        if previous != status {
            log::info!("Network status {:?} -> {:?}", previous, status);
        }
        self.after_status_change(previous).await
    }

    async fn after_status_change(&self, previous: NetworkStatus) -> Result<()> {
        let (has_wallet, status, initialized) = {
            let state = self.read();
            (state.wallet.is_some(), state.status, state.initialized)
        };
        if !has_wallet || status.is_transitional() {
            return Ok(());
        }
        if !initialized {
            return self.initialize().await;
        }
        if status == NetworkStatus::Online && previous != NetworkStatus::Online {
            self.refresh_addresses_data().await;
        }
        Ok(())
    }

    /// Drop results of every fetch still in flight
    pub fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        log::debug!("Registry torn down; in-flight results will be discarded");
    }
}
