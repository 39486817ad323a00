use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv};
use bitcoin::secp256k1::{PublicKey, Secp256k1};
use bitcoin::Network;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::address::group_of_bytes;
use crate::error::AddressesError;
use crate::storage::WalletSecret;

type Blake2b256 = Blake2b<U32>;

/// Account-level path; address `i` lives at `<path>/i`
pub const DERIVATION_PATH: &str = "m/44'/1234'/0'/0";

/// Upper bound on indexes scanned while searching for group addresses
const MAX_GROUP_SCAN: u32 = 10_000;

/// What a derivation job should produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivationRequest {
    /// Derive exactly these indexes
    Indexes { indexes: Vec<u32> },
    /// Derive the first unused index landing in each of `groups`
    Groups {
        groups: Vec<u8>,
        skip_indexes: Vec<u32>,
    },
}

/// Derived address/key tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub hash: String,
    pub public_key: String,
    pub private_key: String,
    pub index: u32,
    pub group: u8,
}

/// Seed → address derivation; runs on the blocking pool
pub trait KeyDeriver: Send + Sync {
    fn derive(
        &self,
        secret: &WalletSecret,
        request: &DerivationRequest,
    ) -> Result<Vec<DerivedAddress>, AddressesError>;
}

/// BIP32 derivation along [`DERIVATION_PATH`], address hash is the
/// blake2b-256 digest of the compressed public key
pub struct Bip32Deriver {
    total_groups: u8,
}

impl Bip32Deriver {
    pub fn new(total_groups: u8) -> Self {
        Self {
            total_groups: total_groups.max(1),
        }
    }

    fn account_key(&self, secret: &WalletSecret) -> Result<Xpriv, AddressesError> {
        let secp = Secp256k1::new();
        let master = Xpriv::new_master(Network::Bitcoin, &secret.seed())
            .map_err(|e| AddressesError::Derivation(e.to_string()))?;
        let path = DerivationPath::from_str(DERIVATION_PATH)
            .map_err(|e| AddressesError::Derivation(e.to_string()))?;
        master
            .derive_priv(&secp, &path)
            .map_err(|e| AddressesError::Derivation(e.to_string()))
    }

    fn derive_at(&self, account: &Xpriv, index: u32) -> Result<DerivedAddress, AddressesError> {
        let secp = Secp256k1::new();
        let child = ChildNumber::from_normal_idx(index)
            .map_err(|e| AddressesError::Derivation(e.to_string()))?;
        let key = account
            .derive_priv(&secp, &[child])
            .map_err(|e| AddressesError::Derivation(e.to_string()))?;

        let public_key = PublicKey::from_secret_key(&secp, &key.private_key).serialize();
        let hash = Blake2b256::digest(public_key);

        Ok(DerivedAddress {
            hash: hex::encode(hash),
            public_key: hex::encode(public_key),
            private_key: hex::encode(key.private_key.secret_bytes()),
            index,
            group: group_of_bytes(&hash, self.total_groups),
        })
    }
}

impl KeyDeriver for Bip32Deriver {
    fn derive(
        &self,
        secret: &WalletSecret,
        request: &DerivationRequest,
    ) -> Result<Vec<DerivedAddress>, AddressesError> {
        let account = self.account_key(secret)?;

        match request {
            DerivationRequest::Indexes { indexes } => indexes
                .iter()
                .map(|index| self.derive_at(&account, *index))
                .collect(),
            DerivationRequest::Groups {
                groups,
                skip_indexes,
            } => {
                let mut wanted: BTreeSet<u8> = groups.iter().copied().collect();
                let mut derived = Vec::with_capacity(wanted.len());

                for index in 0..MAX_GROUP_SCAN {
                    if wanted.is_empty() {
                        break;
                    }
                    if skip_indexes.contains(&index) {
                        continue;
                    }
                    let address = self.derive_at(&account, index)?;
                    if wanted.remove(&address.group) {
                        derived.push(address);
                    }
                }

                if !wanted.is_empty() {
                    return Err(AddressesError::Derivation(format!(
                        "no address found for groups {:?} within {} indexes",
                        wanted, MAX_GROUP_SCAN
                    )));
                }

                derived.sort_by_key(|address| address.group);
                Ok(derived)
            }
        }
    }
}
