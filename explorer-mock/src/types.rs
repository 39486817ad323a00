/// Explorer API response types
///
/// These match the explorer backend format (camelCase, amounts as decimal
/// strings) so clients can consume them transparently.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub version: String,
}

/// Response from /addresses/{address}/balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: String,
    pub locked_balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Transfer,
    Sweep,
    Consolidation,
}

/// Entry of /addresses/{address}/unconfirmed-transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnconfirmedTx {
    pub hash: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub from_address: String,
    pub to_address: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxIo {
    pub address: String,
    pub amount: String,
}

/// Entry of /addresses/{address}/transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedTx {
    pub hash: String,
    pub block_hash: String,
    pub timestamp: i64,
    pub inputs: Vec<TxIo>,
    pub outputs: Vec<TxIo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

// ============================================================================
// MOCK HELPER TYPES (not part of the explorer API)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBalanceRequest {
    pub balance: String,
    #[serde(default)]
    pub locked_balance: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub hash: String,
    pub block_hash: String,
}
