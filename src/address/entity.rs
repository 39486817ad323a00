use serde::{Deserialize, Serialize};

use super::amount::{self, Amount};
use super::transactions::{ConfirmedTransaction, TransactionBucket};

/// User-editable address metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub is_main: bool,
}

/// On-chain state reported by the explorer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    #[serde(with = "amount::string")]
    pub balance: Amount,
    #[serde(with = "amount::string")]
    pub locked_balance: Amount,
    pub tx_number: u64,
}

/// One derived address of a wallet and its live state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub hash: String,
    pub public_key: String,
    pub private_key: String,
    pub index: u32,
    pub group: u8,
    /// Network this address state belongs to; stamped by the registry
    pub network: String,
    pub settings: AddressSettings,
    pub details: AddressDetails,
    pub transactions: TransactionBucket,
    /// Balance minus value locked in pending outgoing transactions
    pub available_balance: i128,
}

impl Address {
    pub fn new(
        hash: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        index: u32,
        group: u8,
        settings: AddressSettings,
    ) -> Self {
        Self {
            hash: hash.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
            index,
            group,
            network: String::new(),
            settings,
            details: AddressDetails::default(),
            transactions: TransactionBucket::default(),
            available_balance: 0,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.settings.label.as_deref()
    }

    pub fn is_main(&self) -> bool {
        self.settings.is_main
    }

    pub fn has_pending(&self) -> bool {
        !self.transactions.pending.is_empty()
    }

    /// Confirmed history without transactions that only move funds within
    /// this address
    pub fn visible_transactions(&self) -> impl Iterator<Item = &ConfirmedTransaction> {
        self.transactions
            .confirmed
            .iter()
            .filter(move |tx| !tx.is_self_transfer(&self.hash))
    }

    /// Short form used in notifications and logs
    pub fn short_hash(&self) -> String {
        let chars: Vec<char> = self.hash.chars().collect();
        if chars.len() <= 12 {
            return self.hash.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{}…{}", head, tail)
    }
}
