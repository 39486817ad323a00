//! Pending vs. confirmed reconciliation
//!
//! Pure functions over an address's transaction bucket. Running them again
//! on unchanged inputs yields unchanged outputs.

use crate::address::{Address, AddressDetails, Amount, ConfirmedTransaction, PendingTransaction};

fn signed(amount: Amount) -> i128 {
    i128::try_from(amount).unwrap_or(i128::MAX)
}

/// Pending transactions whose id has no match in `confirmed`
pub fn reconcile_pending(
    pending: &[PendingTransaction],
    confirmed: &[ConfirmedTransaction],
) -> Vec<PendingTransaction> {
    pending
        .iter()
        .filter(|tx| !confirmed.iter().any(|c| c.hash == tx.tx_id))
        .cloned()
        .collect()
}

/// Spendable balance of `hash` once its outgoing pending transactions land.
///
/// Incoming pending transactions never count. A pending sweep or
/// consolidation consumes everything.
pub fn available_balance(details: &AddressDetails, hash: &str, pending: &[PendingTransaction]) -> i128 {
    let mut available = signed(details.balance.saturating_sub(details.locked_balance));

    for tx in pending.iter().filter(|tx| tx.is_outgoing_from(hash)) {
        if tx.tx_type.consumes_whole_balance() {
            return 0;
        }
        available = available.saturating_sub(tx.amount.map(signed).unwrap_or(0));
    }

    available
}

/// Drop confirmed pending transactions and recompute the available balance
pub fn reconcile(address: &mut Address) {
    let pending = reconcile_pending(&address.transactions.pending, &address.transactions.confirmed);
    let removed = address.transactions.pending.len() - pending.len();
    if removed > 0 {
        log::debug!(
            "{} pending transaction(s) of {} confirmed",
            removed,
            address.short_hash()
        );
    }

    address.available_balance = available_balance(&address.details, &address.hash, &pending);
    address.transactions.pending = pending;
}
