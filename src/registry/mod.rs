//! Address registry core
//!
//! - `addresses.rs` - the registry: queries, updates, fetching, initialization
//! - `book.rs` - `(hash, network)`-keyed address collection
//! - `reconcile.rs` - pending vs. confirmed reconciliation
//! - `poller.rs` - pending transaction polling loop
//! - `context.rs` - network settings and status
//! - `builder.rs` - collaborator wiring

mod addresses;
mod book;
mod builder;
mod context;
mod poller;
pub mod reconcile;

pub use addresses::AddressesRegistry;
pub use book::AddressBook;
pub use builder::RegistryBuilder;
pub use context::{NetworkSettings, NetworkStatus};
pub use poller::{AddressPoller, PollerHandle};
