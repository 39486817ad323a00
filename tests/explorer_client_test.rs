/// End-to-end tests of the explorer HTTP client against the in-memory
/// explorer mock server
mod common;

use std::sync::Arc;

use common::*;
use explorer_mock::{spawn_test_server, ExplorerState, TxKind, UnconfirmedTx};
use wallet_addresses::{
    AddressesRegistry, ClientError, ExplorerClient, NetworkStatus, RemoteDataClient,
    TransactionType,
};

const A: &str = "a1a1a1a1a1a1a1a1";
const B: &str = "b2b2b2b2b2b2b2b2";

async fn setup(page_limit: u32) -> (Arc<ExplorerState>, ExplorerClient) {
    init_logging();
    let state = Arc::new(ExplorerState::new());
    let addr = spawn_test_server(state.clone()).await.unwrap();
    let client = ExplorerClient::new(format!("http://{}", addr), page_limit);
    (state, client)
}

fn transfer(hash: &str, from: &str, to: &str, amount: u128) -> UnconfirmedTx {
    UnconfirmedTx {
        hash: hash.to_string(),
        kind: TxKind::Transfer,
        from_address: from.to_string(),
        to_address: to.to_string(),
        timestamp: 1_700_000_000_000,
        amount: Some(amount.to_string()),
    }
}

#[tokio::test]
async fn test_reachability_probe() {
    let (_state, client) = setup(20).await;
    assert_eq!(
        client.fetch_version().await.unwrap(),
        explorer_mock::handlers::MOCK_VERSION
    );
    assert!(client.is_online().await);

    let unreachable = ExplorerClient::new("http://127.0.0.1:1", 20);
    assert!(!unreachable.is_online().await);
}

#[tokio::test]
async fn test_fetch_address_details() {
    let (state, client) = setup(20).await;
    state.set_balance(A, u128::MAX, 100);

    let details = client.fetch_address_details(A).await.unwrap();
    assert_eq!(details.balance, u128::MAX);
    assert_eq!(details.locked_balance, 100);
    assert_eq!(details.tx_number, 0);
}

#[tokio::test]
async fn test_unconfirmed_then_confirmed() {
    let (state, client) = setup(20).await;
    state.set_balance(A, 100, 0);
    state.add_unconfirmed(transfer("tx1", A, B, 30));

    let unconfirmed = client.fetch_address_unconfirmed_transactions(A).await.unwrap();
    assert_eq!(unconfirmed.len(), 1);
    assert_eq!(unconfirmed[0].tx_type, TransactionType::Transfer);
    assert_eq!(unconfirmed[0].amount, Some(30));
    assert_eq!(client.fetch_address_unconfirmed_transactions(B).await.unwrap().len(), 1);

    state.confirm("tx1").unwrap();

    assert!(client.fetch_address_unconfirmed_transactions(A).await.unwrap().is_empty());
    let confirmed = client.fetch_address_confirmed_transactions(A).await.unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].hash, "tx1");
    assert!(confirmed[0].block_hash.is_some());
    assert_eq!(confirmed[0].inputs[0].address, A);
    assert_eq!(confirmed[0].outputs[0].amount, 30);
    assert_eq!(client.fetch_address_details(A).await.unwrap().tx_number, 1);
}

#[tokio::test]
async fn test_confirmed_history_pages() {
    let (state, client) = setup(2).await;
    state.set_balance(A, 100, 0);
    for i in 0..3 {
        let hash = format!("tx{}", i);
        state.add_unconfirmed(transfer(&hash, A, B, 1));
        state.confirm(&hash).unwrap();
    }

    let first = client.fetch_address_confirmed_transactions_page(A, 1).await.unwrap();
    let second = client.fetch_address_confirmed_transactions_page(A, 2).await.unwrap();
    let third = client.fetch_address_confirmed_transactions_page(A, 3).await.unwrap();

    assert_eq!(first.iter().map(|t| t.hash.as_str()).collect::<Vec<_>>(), vec!["tx2", "tx1"]);
    assert_eq!(second.len(), 1);
    assert!(third.is_empty());
}

#[tokio::test]
async fn test_failing_address_reports_status() {
    let (state, client) = setup(20).await;
    state.set_failing(A, true);

    let err = client.fetch_address_details(A).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503, .. }));
    assert!(client.fetch_address_details(B).await.is_ok());
}

#[tokio::test]
async fn test_registry_reconciles_through_explorer() {
    let (state, client) = setup(20).await;
    let registry = AddressesRegistry::builder()
        .client(Arc::new(client))
        .store(MemoryStore::new())
        .network_status(NetworkStatus::Online)
        .build()
        .unwrap();

    registry.set_address(plain_address(A, 0, 0));
    state.set_balance(A, 100, 0);
    state.add_unconfirmed(transfer("tx1", A, B, 30));

    registry.fetch_addresses_data(&[A.to_string()]).await;
    let address = registry.get_address(A).unwrap();
    assert_eq!(address.details.balance, 100);
    assert_eq!(address.transactions.pending.len(), 1);
    assert_eq!(address.available_balance, 70);
    assert_eq!(registry.addresses_to_poll(), vec![A.to_string()]);

    state.confirm("tx1").unwrap();
    registry.fetch_addresses_data(&[A.to_string()]).await;

    let address = registry.get_address(A).unwrap();
    assert!(address.transactions.pending.is_empty());
    assert_eq!(address.details.balance, 70);
    assert_eq!(address.available_balance, 70);
    assert_eq!(address.visible_transactions().count(), 1);
    assert!(registry.addresses_to_poll().is_empty());
    assert_eq!(state.request_count(A), 8);
}
