//! Key derivation
//!
//! - `deriver.rs` - seed → address/key tuples (BIP32 + blake2b)
//! - `worker.rs` - request/response worker on the blocking pool

mod deriver;
mod worker;

pub use deriver::{Bip32Deriver, DerivationRequest, DerivedAddress, KeyDeriver, DERIVATION_PATH};
pub use worker::DerivationWorker;
