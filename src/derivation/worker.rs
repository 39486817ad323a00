//! Off-task key derivation
//!
//! Jobs are submitted over a channel and answered through a oneshot, so
//! every request has exactly one completion and overlapping requests never
//! share a callback slot.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::deriver::{DerivationRequest, DerivedAddress, KeyDeriver};
use crate::error::AddressesError;
use crate::storage::WalletSecret;

const QUEUE_DEPTH: usize = 16;

type Reply = oneshot::Sender<Result<Vec<DerivedAddress>, AddressesError>>;

struct DerivationJob {
    secret: WalletSecret,
    request: DerivationRequest,
    reply: Reply,
}

/// Handle to the derivation task; cheap to clone
#[derive(Clone)]
pub struct DerivationWorker {
    sender: mpsc::Sender<DerivationJob>,
}

impl DerivationWorker {
    /// Spawn the worker loop on the current tokio runtime
    pub fn spawn(deriver: Arc<dyn KeyDeriver>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<DerivationJob>(QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let DerivationJob {
                    secret,
                    request,
                    reply,
                } = job;
                let deriver = deriver.clone();

                let result =
                    tokio::task::spawn_blocking(move || deriver.derive(&secret, &request))
                        .await
                        .unwrap_or_else(|e| Err(AddressesError::Derivation(e.to_string())));

                if reply.send(result).is_err() {
                    log::debug!("Derivation result dropped: requester went away");
                }
            }
            log::debug!("Derivation worker stopped");
        });

        Self { sender }
    }

    pub async fn derive(
        &self,
        secret: WalletSecret,
        request: DerivationRequest,
    ) -> Result<Vec<DerivedAddress>, AddressesError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(DerivationJob {
                secret,
                request,
                reply,
            })
            .await
            .map_err(|_| AddressesError::WorkerStopped)?;

        response.await.map_err(|_| AddressesError::WorkerStopped)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::Bip32Deriver;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[tokio::test]
    async fn test_overlapping_requests_get_their_own_reply() {
        let worker = DerivationWorker::spawn(Arc::new(Bip32Deriver::new(4)));
        let secret = WalletSecret::from_phrase("w", PHRASE).unwrap();

        let (a, b) = tokio::join!(
            worker.derive(secret.clone(), DerivationRequest::Indexes { indexes: vec![0] }),
            worker.derive(secret.clone(), DerivationRequest::Indexes { indexes: vec![5, 6] }),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].index, 0);
        assert_eq!(b.iter().map(|d| d.index).collect::<Vec<_>>(), vec![5, 6]);
    }

    struct FailingDeriver;

    impl KeyDeriver for FailingDeriver {
        fn derive(
            &self,
            _secret: &WalletSecret,
            _request: &DerivationRequest,
        ) -> Result<Vec<DerivedAddress>, AddressesError> {
            Err(AddressesError::Derivation("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_errors_are_forwarded() {
        let worker = DerivationWorker::spawn(Arc::new(FailingDeriver));
        let secret = WalletSecret::from_phrase("w", PHRASE).unwrap();
        let result = worker
            .derive(secret, DerivationRequest::Indexes { indexes: vec![0] })
            .await;
        assert!(matches!(result, Err(AddressesError::Derivation(_))));
    }
}
