//! Transaction records attached to an address

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::amount::{self, Amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Transfer,
    Sweep,
    Consolidation,
}

impl TransactionType {
    /// Sweeps and consolidations spend an amount only known once confirmed
    pub fn consumes_whole_balance(&self) -> bool {
        matches!(self, TransactionType::Sweep | TransactionType::Consolidation)
    }
}

/// Locally tracked transaction that is not confirmed yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub tx_id: String,
    pub from_address: String,
    pub to_address: String,
    /// Milliseconds since the unix epoch
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub network: String,
    #[serde(default, with = "amount::option_string")]
    pub amount: Option<Amount>,
}

impl PendingTransaction {
    pub fn transfer(
        tx_id: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        amount: Amount,
        network: impl Into<String>,
    ) -> Self {
        Self {
            tx_id: tx_id.into(),
            from_address: from_address.into(),
            to_address: to_address.into(),
            timestamp: Utc::now().timestamp_millis(),
            tx_type: TransactionType::Transfer,
            network: network.into(),
            amount: Some(amount),
        }
    }

    pub fn sweep(
        tx_id: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        network: impl Into<String>,
    ) -> Self {
        Self {
            tx_id: tx_id.into(),
            from_address: from_address.into(),
            to_address: to_address.into(),
            timestamp: Utc::now().timestamp_millis(),
            tx_type: TransactionType::Sweep,
            network: network.into(),
            amount: None,
        }
    }

    pub fn is_outgoing_from(&self, hash: &str) -> bool {
        self.from_address == hash
    }
}

/// Input or output of a confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIo {
    pub address: String,
    #[serde(with = "amount::string")]
    pub amount: Amount,
}

/// Confirmed transaction as reported by the explorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedTransaction {
    pub hash: String,
    #[serde(default)]
    pub block_hash: Option<String>,
    pub timestamp: i64,
    #[serde(default)]
    pub inputs: Vec<TransactionIo>,
    #[serde(default)]
    pub outputs: Vec<TransactionIo>,
    #[serde(default, with = "amount::option_string")]
    pub amount: Option<Amount>,
}

impl ConfirmedTransaction {
    /// True when every input and output belongs to `hash`
    pub fn is_self_transfer(&self, hash: &str) -> bool {
        !self.inputs.is_empty()
            && self.inputs.iter().all(|io| io.address == hash)
            && self.outputs.iter().all(|io| io.address == hash)
    }
}

/// Unconfirmed transaction as reported by the explorer mempool endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnconfirmedTransaction {
    pub hash: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub from_address: String,
    pub to_address: String,
    pub timestamp: i64,
    #[serde(default, with = "amount::option_string")]
    pub amount: Option<Amount>,
}

impl UnconfirmedTransaction {
    pub fn into_pending(self, network: &str) -> PendingTransaction {
        PendingTransaction {
            tx_id: self.hash,
            from_address: self.from_address,
            to_address: self.to_address,
            timestamp: self.timestamp,
            tx_type: self.tx_type,
            network: network.to_string(),
            amount: self.amount,
        }
    }
}

/// Confirmed and pending transactions of one address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBucket {
    pub confirmed: Vec<ConfirmedTransaction>,
    pub pending: Vec<PendingTransaction>,
    /// Highest confirmed-history page merged so far (0 = none)
    pub loaded_page: u32,
}

impl TransactionBucket {
    /// Merge a freshly fetched first page: unseen transactions go in front
    pub fn merge_latest(&mut self, latest: Vec<ConfirmedTransaction>) {
        let fresh: Vec<_> = latest
            .into_iter()
            .filter(|tx| !self.confirmed.iter().any(|known| known.hash == tx.hash))
            .collect();
        if !fresh.is_empty() {
            self.confirmed.splice(0..0, fresh);
        }
        self.loaded_page = self.loaded_page.max(1);
    }

    /// Append an older page; an empty page leaves the bucket untouched
    pub fn append_page(&mut self, page: u32, older: Vec<ConfirmedTransaction>) {
        if older.is_empty() {
            return;
        }
        for tx in older {
            if !self.confirmed.iter().any(|known| known.hash == tx.hash) {
                self.confirmed.push(tx);
            }
        }
        self.loaded_page = self.loaded_page.max(page);
    }

    /// Track an unconfirmed transaction unless it is already known
    pub fn track_pending(&mut self, tx: PendingTransaction) -> bool {
        let known = self.pending.iter().any(|p| p.tx_id == tx.tx_id)
            || self.confirmed.iter().any(|c| c.hash == tx.tx_id);
        if known {
            return false;
        }
        self.pending.push(tx);
        true
    }
}
