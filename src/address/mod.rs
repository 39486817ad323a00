//! Address entity and its transaction records
//!
//! - Address identity, settings and on-chain details
//! - Pending / confirmed transaction bucket
//! - Address group assignment

pub mod amount;
mod entity;
pub mod group;
mod transactions;

pub use amount::Amount;
pub use entity::{Address, AddressDetails, AddressSettings};
pub use group::{group_of_bytes, group_of_hash};
pub use transactions::{
    ConfirmedTransaction, PendingTransaction, TransactionBucket, TransactionIo, TransactionType,
    UnconfirmedTransaction,
};
