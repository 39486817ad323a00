use anyhow::Context;
use std::env;
use std::sync::Arc;
use wallet_addresses::{
    AddressPoller, AddressesRegistry, ExplorerClient, NetworkStatus, RegistryConfig, WalletSecret,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => RegistryConfig::from_toml_file(std::path::Path::new(&path))?,
        Err(_) => RegistryConfig::from_env(),
    };

    let wallet_name = env::var("WALLET_NAME").unwrap_or_else(|_| "default".to_string());
    let words = env::var("WALLET_MNEMONIC").context("WALLET_MNEMONIC environment variable not set")?;
    let mut secret = WalletSecret::from_phrase(wallet_name, &words)?;
    if let Ok(passphrase) = env::var("WALLET_PASSPHRASE") {
        secret = secret.with_passphrase(passphrase);
    }

    let client = ExplorerClient::new(&config.network.explorer_api_host, config.page_limit);
    let registry = Arc::new(
        AddressesRegistry::builder()
            .config(config.clone())
            .client(Arc::new(client.clone()))
            .network_status(NetworkStatus::Connecting)
            .build()?,
    );

    let mut notifications = registry.notifier().subscribe();
    tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            log::debug!("notification: {:?}", notification);
        }
    });

    log::info!("Watching addresses of '{}' on {}", secret.identity(), config.network.name);
    registry.unlock_wallet(secret).await?;

    let status = if client.is_online().await {
        NetworkStatus::Online
    } else {
        NetworkStatus::Offline
    };
    registry.set_network_status(status).await?;

    let poller = AddressPoller::spawn(registry.clone());
    let mut changes = registry.subscribe_changes();

    tokio::select! {
        _ = shutdown_signal() => {}
        _ = async {
            while changes.changed().await.is_ok() {
                log_snapshot(&registry);
            }
        } => {}
    }

    poller.shutdown().await;
    registry.teardown();
    Ok(())
}

fn log_snapshot(registry: &AddressesRegistry) {
    for address in registry.addresses() {
        log::info!(
            "#{} {} [group {}{}] balance={} available={} pending={}",
            address.index,
            address.short_hash(),
            address.group,
            if address.is_main() { ", main" } else { "" },
            address.details.balance,
            address.available_balance,
            address.transactions.pending.len(),
        );
    }
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
