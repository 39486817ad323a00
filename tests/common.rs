//! Common test utilities for address registry integration tests
//!
//! This module provides shared test infrastructure including:
//! - A scriptable remote data client that records every call
//! - An in-memory metadata store
//! - A deriver that records the requests it serves
//! - Registry construction helpers

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use tokio::sync::Semaphore;

use wallet_addresses::{
    Address, AddressDetails, AddressMetadata, AddressMetadataStore, AddressSettings,
    AddressesRegistry, Bip32Deriver, ClientError, ConfirmedTransaction, DerivationRequest,
    DerivedAddress, KeyDeriver, NetworkStatus, RegistryConfig, RemoteDataClient, StorageError,
    UnconfirmedTransaction, WalletSecret,
};

pub const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn wallet(name: &str) -> WalletSecret {
    WalletSecret::from_phrase(name, PHRASE).unwrap()
}

/// Remote data client whose answers are set per address by the test
#[derive(Default)]
pub struct MockClient {
    details: Mutex<HashMap<String, AddressDetails>>,
    pages: Mutex<HashMap<String, Vec<Vec<ConfirmedTransaction>>>>,
    unconfirmed: Mutex<HashMap<String, Vec<UnconfirmedTransaction>>>,
    failing: Mutex<Vec<String>>,
    calls: Mutex<HashMap<String, usize>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_balance(&self, hash: &str, balance: u128, locked_balance: u128) {
        let mut details = self.details.lock().unwrap();
        let entry = details.entry(hash.to_string()).or_default();
        entry.balance = balance;
        entry.locked_balance = locked_balance;
    }

    /// Replace the confirmed history; `pages[0]` is the newest page
    pub fn set_pages(&self, hash: &str, pages: Vec<Vec<ConfirmedTransaction>>) {
        self.pages.lock().unwrap().insert(hash.to_string(), pages);
    }

    pub fn set_unconfirmed(&self, hash: &str, txs: Vec<UnconfirmedTransaction>) {
        self.unconfirmed.lock().unwrap().insert(hash.to_string(), txs);
    }

    pub fn fail(&self, hash: &str) {
        self.failing.lock().unwrap().push(hash.to_string());
    }

    /// Hold every details request until `release` is called
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(1024);
        }
    }

    /// Number of details requests made for `hash`
    pub fn calls(&self, hash: &str) -> usize {
        self.calls.lock().unwrap().get(hash).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn check(&self, hash: &str) -> Result<(), ClientError> {
        if self.failing.lock().unwrap().iter().any(|h| h == hash) {
            return Err(ClientError::Status {
                status: 503,
                url: format!("mock://{}", hash),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteDataClient for MockClient {
    async fn fetch_address_details(&self, hash: &str) -> Result<AddressDetails, ClientError> {
        *self.calls.lock().unwrap().entry(hash.to_string()).or_default() += 1;

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        self.check(hash)?;
        let mut details = self
            .details
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .unwrap_or_default();
        details.tx_number = self
            .pages
            .lock()
            .unwrap()
            .get(hash)
            .map(|pages| pages.iter().map(Vec::len).sum::<usize>() as u64)
            .unwrap_or(0);
        Ok(details)
    }

    async fn fetch_address_confirmed_transactions_page(
        &self,
        hash: &str,
        page: u32,
    ) -> Result<Vec<ConfirmedTransaction>, ClientError> {
        self.check(hash)?;
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(hash)
            .and_then(|pages| pages.get(page.saturating_sub(1) as usize).cloned())
            .unwrap_or_default())
    }

    async fn fetch_address_unconfirmed_transactions(
        &self,
        hash: &str,
    ) -> Result<Vec<UnconfirmedTransaction>, ClientError> {
        self.check(hash)?;
        Ok(self
            .unconfirmed
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .unwrap_or_default())
    }
}

/// Metadata store kept in memory
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<AddressMetadata>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_entries(identity: &str, entries: Vec<AddressMetadata>) -> Arc<Self> {
        let store = Self::default();
        store.entries.lock().unwrap().insert(identity.to_string(), entries);
        Arc::new(store)
    }

    /// Make every `store` call fail until switched off again
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn entries(&self, identity: &str) -> Vec<AddressMetadata> {
        self.entries
            .lock()
            .unwrap()
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }
}

impl AddressMetadataStore for MemoryStore {
    fn load(&self, identity: &str) -> Result<Vec<AddressMetadata>, StorageError> {
        Ok(self.entries(identity))
    }

    fn store(
        &self,
        identity: &str,
        index: u32,
        settings: &AddressSettings,
    ) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        let mut entries = self.entries.lock().unwrap();
        let wallet = entries.entry(identity.to_string()).or_default();
        wallet.retain(|entry| entry.index != index);
        wallet.push(AddressMetadata::new(index, settings));
        wallet.sort_by_key(|entry| entry.index);
        Ok(())
    }
}

/// Real derivation that remembers every request it served
pub struct CountingDeriver {
    inner: Bip32Deriver,
    requests: Mutex<Vec<DerivationRequest>>,
    held: Mutex<bool>,
    gate: Condvar,
}

impl CountingDeriver {
    pub fn new(groups: u8) -> Arc<Self> {
        Arc::new(Self {
            inner: Bip32Deriver::new(groups),
            requests: Mutex::new(Vec::new()),
            held: Mutex::new(false),
            gate: Condvar::new(),
        })
    }

    /// Block every derivation after it is recorded, until `release`
    pub fn hold(&self) {
        *self.held.lock().unwrap() = true;
    }

    pub fn release(&self) {
        *self.held.lock().unwrap() = false;
        self.gate.notify_all();
    }

    pub fn requests(&self) -> Vec<DerivationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl KeyDeriver for CountingDeriver {
    fn derive(
        &self,
        secret: &WalletSecret,
        request: &DerivationRequest,
    ) -> Result<Vec<DerivedAddress>, wallet_addresses::AddressesError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut held = self.held.lock().unwrap();
        while *held {
            held = self.gate.wait(held).unwrap();
        }
        drop(held);
        self.inner.derive(secret, request)
    }
}

/// Registry wired to test doubles
pub struct Harness {
    pub registry: Arc<AddressesRegistry>,
    pub client: Arc<MockClient>,
    pub store: Arc<MemoryStore>,
    pub deriver: Arc<CountingDeriver>,
}

impl Harness {
    pub fn new(status: NetworkStatus) -> Self {
        Self::with_store(status, MemoryStore::new())
    }

    pub fn with_store(status: NetworkStatus, store: Arc<MemoryStore>) -> Self {
        init_logging();
        let config = RegistryConfig::default();
        let client = MockClient::new();
        let deriver = CountingDeriver::new(config.address_groups);

        let registry = AddressesRegistry::builder()
            .config(config)
            .client(client.clone())
            .store(store.clone())
            .deriver(deriver.clone())
            .network_status(status)
            .build()
            .unwrap();

        Self {
            registry: Arc::new(registry),
            client,
            store,
            deriver,
        }
    }
}

/// Address inserted without derivation
pub fn plain_address(hash: &str, index: u32, balance: u128) -> Address {
    let mut address = Address::new(hash, "pk", "sk", index, 0, AddressSettings::default());
    address.details.balance = balance;
    address.available_balance = balance as i128;
    address
}

pub fn confirmed(hash: &str) -> ConfirmedTransaction {
    ConfirmedTransaction {
        hash: hash.to_string(),
        block_hash: Some("block".to_string()),
        timestamp: 1,
        inputs: Vec::new(),
        outputs: Vec::new(),
        amount: None,
    }
}
