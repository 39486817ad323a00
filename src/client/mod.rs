//! Remote data access
//!
//! The registry only talks to the explorer through [`RemoteDataClient`];
//! [`ExplorerClient`] is the HTTP implementation.

mod explorer;

pub use explorer::ExplorerClient;

use async_trait::async_trait;

use crate::address::{AddressDetails, ConfirmedTransaction, UnconfirmedTransaction};
use crate::error::ClientError;

#[async_trait]
pub trait RemoteDataClient: Send + Sync {
    /// Balance, locked balance and transaction count
    async fn fetch_address_details(&self, hash: &str) -> Result<AddressDetails, ClientError>;

    /// One page (1-based) of confirmed history, newest first
    async fn fetch_address_confirmed_transactions_page(
        &self,
        hash: &str,
        page: u32,
    ) -> Result<Vec<ConfirmedTransaction>, ClientError>;

    /// Transactions touching the address that are still in the mempool
    async fn fetch_address_unconfirmed_transactions(
        &self,
        hash: &str,
    ) -> Result<Vec<UnconfirmedTransaction>, ClientError>;

    /// Latest page of confirmed history
    async fn fetch_address_confirmed_transactions(
        &self,
        hash: &str,
    ) -> Result<Vec<ConfirmedTransaction>, ClientError> {
        self.fetch_address_confirmed_transactions_page(hash, 1).await
    }
}
