use serde::{Deserialize, Serialize};

/// Endpoints of one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub name: String,
    pub node_host: String,
    pub explorer_api_host: String,
}

impl NetworkSettings {
    pub fn new(
        name: impl Into<String>,
        node_host: impl Into<String>,
        explorer_api_host: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            node_host: node_host.into(),
            explorer_api_host: explorer_api_host.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    Uninitialized,
    Connecting,
    Online,
    Offline,
}

impl NetworkStatus {
    /// No fetch or initialization happens while the network settles
    pub fn is_transitional(&self) -> bool {
        matches!(self, NetworkStatus::Uninitialized | NetworkStatus::Connecting)
    }
}
