use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::RemoteDataClient;
use crate::address::amount::{self, Amount};
use crate::address::{AddressDetails, ConfirmedTransaction, UnconfirmedTransaction};
use crate::error::ClientError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    #[serde(with = "amount::string")]
    balance: Amount,
    #[serde(with = "amount::string")]
    locked_balance: Amount,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    version: String,
}

/// Explorer backend HTTP client
#[derive(Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
    page_limit: u32,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, page_limit: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(format!("{}: {}", url, e)))
    }

    /// Explorer version, used as a reachability probe
    pub async fn fetch_version(&self) -> Result<String, ClientError> {
        let info: InfoResponse = self.get_json("/infos").await?;
        Ok(info.version)
    }

    pub async fn is_online(&self) -> bool {
        match self.fetch_version().await {
            Ok(version) => {
                log::debug!("Explorer {} reachable (version {})", self.base_url, version);
                true
            }
            Err(e) => {
                log::warn!("Explorer {} unreachable: {}", self.base_url, e);
                false
            }
        }
    }
}

#[async_trait]
impl RemoteDataClient for ExplorerClient {
    async fn fetch_address_details(&self, hash: &str) -> Result<AddressDetails, ClientError> {
        let balance: BalanceResponse = self
            .get_json(&format!("/addresses/{}/balance", hash))
            .await?;
        let tx_number: u64 = self
            .get_json(&format!("/addresses/{}/total-transactions", hash))
            .await?;

        Ok(AddressDetails {
            balance: balance.balance,
            locked_balance: balance.locked_balance,
            tx_number,
        })
    }

    async fn fetch_address_confirmed_transactions_page(
        &self,
        hash: &str,
        page: u32,
    ) -> Result<Vec<ConfirmedTransaction>, ClientError> {
        self.get_json(&format!(
            "/addresses/{}/transactions?page={}&limit={}",
            hash,
            page.max(1),
            self.page_limit
        ))
        .await
    }

    async fn fetch_address_unconfirmed_transactions(
        &self,
        hash: &str,
    ) -> Result<Vec<UnconfirmedTransaction>, ClientError> {
        self.get_json(&format!("/addresses/{}/unconfirmed-transactions", hash))
            .await
    }
}
