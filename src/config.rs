/// Registry configuration from environment variables or a TOML file
///
/// Controls the active network, explorer endpoint, polling cadence and the
/// number of address groups. Defaults to mainnet.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AddressesError;
use crate::registry::NetworkSettings;

/// Interval between polls of addresses with pending transactions
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Number of address groups on the default network
pub const DEFAULT_ADDRESS_GROUPS: u8 = 4;

/// Confirmed transactions fetched per page
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Active network settings (name, node and explorer hosts)
    pub network: NetworkSettings,
    /// Interval of the pending-transaction polling loop
    pub poll_interval: Duration,
    /// Total number of address groups on the network
    pub address_groups: u8,
    /// Page size for confirmed transaction history
    pub page_limit: u32,
    /// Base directory of the address metadata store
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    network: Option<String>,
    explorer_url: Option<String>,
    node_url: Option<String>,
    poll_interval_ms: Option<u64>,
    address_groups: Option<u8>,
    page_limit: Option<u32>,
    data_dir: Option<PathBuf>,
}

impl RegistryConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `NETWORK_NAME`: "mainnet" (default), "testnet" or "devnet"
    /// - `EXPLORER_URL`: explorer API endpoint (defaults per network)
    /// - `NODE_URL`: full node endpoint (defaults per network)
    /// - `POLL_INTERVAL_MS`: pending-transaction poll interval (2000)
    /// - `ADDRESS_GROUPS`: number of address groups (4)
    /// - `WALLET_DATA_DIR`: metadata store directory ("./wallets")
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Track addresses against a local explorer mock
    /// NETWORK_NAME=devnet EXPLORER_URL=http://localhost:9090 cargo run
    /// ```
    pub fn from_env() -> Self {
        let network_name = env::var("NETWORK_NAME")
            .unwrap_or_else(|_| "mainnet".to_string())
            .to_lowercase();

        let mut network = Self::network_defaults(&network_name);

        if let Ok(url) = env::var("EXPLORER_URL") {
            network.explorer_api_host = url;
        }
        log::info!("📡 Explorer URL: {}", network.explorer_api_host);

        if let Ok(url) = env::var("NODE_URL") {
            network.node_host = url;
        }
        log::info!("🔗 Node URL: {}", network.node_host);

        let poll_interval_ms = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        let address_groups = env::var("ADDRESS_GROUPS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|groups| *groups > 0)
            .unwrap_or(DEFAULT_ADDRESS_GROUPS);

        let data_dir = env::var("WALLET_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./wallets"));

        Self {
            network,
            poll_interval: Duration::from_millis(poll_interval_ms),
            address_groups,
            page_limit: DEFAULT_PAGE_LIMIT,
            data_dir,
        }
    }

    /// Load configuration from a TOML file; missing keys take the defaults
    pub fn from_toml_file(path: &Path) -> Result<Self, AddressesError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AddressesError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, AddressesError> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| AddressesError::Config(e.to_string()))?;

        let network_name = file.network.unwrap_or_else(|| "mainnet".to_string());
        let mut network = Self::network_defaults(&network_name.to_lowercase());
        if let Some(url) = file.explorer_url {
            network.explorer_api_host = url;
        }
        if let Some(url) = file.node_url {
            network.node_host = url;
        }

        let address_groups = file.address_groups.unwrap_or(DEFAULT_ADDRESS_GROUPS);
        if address_groups == 0 {
            return Err(AddressesError::Config(
                "address_groups must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            network,
            poll_interval: Duration::from_millis(
                file.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            address_groups,
            page_limit: file.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            data_dir: file.data_dir.unwrap_or_else(|| PathBuf::from("./wallets")),
        })
    }

    /// Known endpoints per network name
    pub fn network_defaults(name: &str) -> NetworkSettings {
        match name {
            "testnet" => {
                log::info!("🧪 Using TESTNET network");
                NetworkSettings::new(
                    "testnet",
                    "https://node.testnet.alephium.org",
                    "https://backend.testnet.alephium.org",
                )
            }
            "devnet" => {
                log::info!("🔧 Using DEVNET network");
                NetworkSettings::new("devnet", "http://localhost:22973", "http://localhost:9090")
            }
            "mainnet" | "" => {
                log::info!("🌐 Using MAINNET network");
                NetworkSettings::new(
                    "mainnet",
                    "https://node.mainnet.alephium.org",
                    "https://backend.mainnet.alephium.org",
                )
            }
            other => {
                log::warn!("⚠️  Unknown network '{}', defaulting to mainnet", other);
                Self::network_defaults("mainnet")
            }
        }
    }
}

impl Default for RegistryConfig {
    /// Default configuration (mainnet)
    fn default() -> Self {
        Self {
            network: NetworkSettings::new(
                "mainnet",
                "https://node.mainnet.alephium.org",
                "https://backend.mainnet.alephium.org",
            ),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            address_groups: DEFAULT_ADDRESS_GROUPS,
            page_limit: DEFAULT_PAGE_LIMIT,
            data_dir: PathBuf::from("./wallets"),
        }
    }
}
