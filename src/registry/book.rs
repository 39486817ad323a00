use std::collections::{BTreeSet, HashMap};

use crate::address::Address;

/// Address states keyed by `(hash, network)`; the same hash holds an
/// independent state per network
#[derive(Debug, Default, Clone)]
pub struct AddressBook {
    entries: HashMap<(String, String), Address>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert under the address's own network
    pub fn insert(&mut self, address: Address) -> Option<Address> {
        let key = (address.hash.clone(), address.network.clone());
        self.entries.insert(key, address)
    }

    pub fn get(&self, hash: &str, network: &str) -> Option<&Address> {
        self.entries.get(&(hash.to_string(), network.to_string()))
    }

    pub fn get_mut(&mut self, hash: &str, network: &str) -> Option<&mut Address> {
        self.entries.get_mut(&(hash.to_string(), network.to_string()))
    }

    pub fn contains(&self, hash: &str, network: &str) -> bool {
        self.get(hash, network).is_some()
    }

    /// Addresses of one network, ordered by derivation index
    pub fn for_network(&self, network: &str) -> Vec<&Address> {
        let mut addresses: Vec<_> = self
            .entries
            .values()
            .filter(|address| address.network == network)
            .collect();
        addresses.sort_by_key(|address| address.index);
        addresses
    }

    pub fn for_network_mut<'a>(
        &'a mut self,
        network: &'a str,
    ) -> impl Iterator<Item = &'a mut Address> + 'a {
        self.entries
            .values_mut()
            .filter(move |address| address.network == network)
    }

    /// Addresses with pending transactions, plus wallet addresses those
    /// transactions are headed to
    pub fn poll_set(&self, network: &str) -> Vec<String> {
        let mut hashes = BTreeSet::new();

        for address in self.for_network(network) {
            for tx in &address.transactions.pending {
                hashes.insert(address.hash.clone());
                if self.contains(&tx.to_address, network) {
                    hashes.insert(tx.to_address.clone());
                }
            }
        }

        hashes.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
