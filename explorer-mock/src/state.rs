/// In-memory chain state behind the mock explorer
///
/// Balances are set directly; unconfirmed transactions move into the
/// confirmed history (newest first) when confirmed, adjusting balances.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::*;

#[derive(Default)]
struct Inner {
    balances: HashMap<String, (u128, u128)>,
    confirmed: Vec<ConfirmedTx>,
    unconfirmed: Vec<UnconfirmedTx>,
    failing: HashSet<String>,
    requests: HashMap<String, u64>,
    blocks: u64,
}

#[derive(Default)]
pub struct ExplorerState {
    inner: RwLock<Inner>,
}

fn parse_amount(raw: &str) -> anyhow::Result<u128> {
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid amount '{}': {}", raw, e))
}

impl ExplorerState {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_balance(&self, address: &str, balance: u128, locked_balance: u128) {
        self.write()
            .balances
            .insert(address.to_string(), (balance, locked_balance));
    }

    pub fn balance(&self, address: &str) -> (u128, u128) {
        self.read().balances.get(address).copied().unwrap_or((0, 0))
    }

    pub fn add_unconfirmed(&self, tx: UnconfirmedTx) {
        log::info!("Mempool += {} ({} -> {})", tx.hash, tx.from_address, tx.to_address);
        self.write().unconfirmed.push(tx);
    }

    /// Mine a pending transaction. Sweeps and consolidations move the whole
    /// sender balance.
    pub fn confirm(&self, hash: &str) -> anyhow::Result<ConfirmResponse> {
        let mut inner = self.write();
        let position = inner
            .unconfirmed
            .iter()
            .position(|tx| tx.hash == hash)
            .ok_or_else(|| anyhow::anyhow!("Unknown unconfirmed transaction: {}", hash))?;
        let tx = inner.unconfirmed.remove(position);

        let (sender_balance, sender_locked) = inner
            .balances
            .get(&tx.from_address)
            .copied()
            .unwrap_or((0, 0));
        let amount = match (&tx.kind, &tx.amount) {
            (TxKind::Transfer, Some(raw)) => parse_amount(raw)?,
            (TxKind::Transfer, None) => 0,
            _ => sender_balance.saturating_sub(sender_locked),
        };

        inner.balances.insert(
            tx.from_address.clone(),
            (sender_balance.saturating_sub(amount), sender_locked),
        );
        let receiver = inner.balances.entry(tx.to_address.clone()).or_insert((0, 0));
        receiver.0 = receiver.0.saturating_add(amount);

        inner.blocks += 1;
        let block_hash = format!("{:064x}", inner.blocks);
        inner.confirmed.insert(
            0,
            ConfirmedTx {
                hash: tx.hash.clone(),
                block_hash: block_hash.clone(),
                timestamp: tx.timestamp,
                inputs: vec![TxIo {
                    address: tx.from_address.clone(),
                    amount: amount.to_string(),
                }],
                outputs: vec![TxIo {
                    address: tx.to_address.clone(),
                    amount: amount.to_string(),
                }],
                amount: Some(amount.to_string()),
            },
        );

        log::info!("Confirmed {} in block #{}", tx.hash, inner.blocks);
        Ok(ConfirmResponse {
            hash: tx.hash,
            block_hash,
        })
    }

    /// Make every address endpoint fail for `address`
    pub fn set_failing(&self, address: &str, failing: bool) {
        let mut inner = self.write();
        if failing {
            inner.failing.insert(address.to_string());
        } else {
            inner.failing.remove(address);
        }
    }

    pub fn is_failing(&self, address: &str) -> bool {
        self.read().failing.contains(address)
    }

    pub fn record_request(&self, address: &str) {
        *self.write().requests.entry(address.to_string()).or_default() += 1;
    }

    /// Address endpoint hits so far
    pub fn request_count(&self, address: &str) -> u64 {
        self.read().requests.get(address).copied().unwrap_or(0)
    }

    pub fn transactions(&self, address: &str, page: usize, limit: usize) -> Vec<ConfirmedTx> {
        let touches = |tx: &&ConfirmedTx| {
            tx.inputs.iter().any(|io| io.address == address)
                || tx.outputs.iter().any(|io| io.address == address)
        };
        self.read()
            .confirmed
            .iter()
            .filter(touches)
            .skip(page.saturating_sub(1) * limit)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn total_transactions(&self, address: &str) -> usize {
        self.transactions(address, 1, usize::MAX).len()
    }

    pub fn unconfirmed(&self, address: &str) -> Vec<UnconfirmedTx> {
        self.read()
            .unconfirmed
            .iter()
            .filter(|tx| tx.from_address == address || tx.to_address == address)
            .cloned()
            .collect()
    }
}
