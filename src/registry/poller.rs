//! Pending transaction polling
//!
//! While any address of the current network has pending transactions, the
//! poller re-fetches exactly those addresses (and the wallet addresses they
//! pay to) every interval. With nothing pending it holds no timer and waits
//! for the next change to the address collection.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::addresses::AddressesRegistry;

pub struct AddressPoller;

impl AddressPoller {
    /// Start polling at the registry's configured interval
    pub fn spawn(registry: Arc<AddressesRegistry>) -> PollerHandle {
        let interval = registry.config().poll_interval;
        Self::spawn_with_interval(registry, interval)
    }

    pub fn spawn_with_interval(registry: Arc<AddressesRegistry>, interval: Duration) -> PollerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(run(registry, interval, token.clone()));
        PollerHandle {
            token,
            task: Some(task),
        }
    }
}

/// Stops the poller when shut down or dropped
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the timer and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Address poller ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run(registry: Arc<AddressesRegistry>, interval: Duration, token: CancellationToken) {
    let mut changes = registry.subscribe_changes();
    log::debug!("Address poller started");

    loop {
        if registry.addresses_to_poll().is_empty() {
            tokio::select! {
                _ = token.cancelled() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        log::debug!("Pending transactions outstanding, polling every {:?}", interval);
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("Address poller stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let targets = registry.addresses_to_poll();
                    if targets.is_empty() {
                        log::debug!("No pending transactions left, polling paused");
                        break;
                    }
                    log::debug!("Polling {} address(es) with pending transactions", targets.len());
                    tokio::select! {
                        _ = token.cancelled() => {
                            log::debug!("Address poller stopped during fetch");
                            return;
                        }
                        _ = registry.fetch_addresses_data(&targets) => {}
                    }
                }
            }
        }

        changes.borrow_and_update();
    }

    log::debug!("Address poller stopped");
}
