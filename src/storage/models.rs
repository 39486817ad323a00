//! Data models for address metadata storage

use serde::{Deserialize, Serialize};

use crate::address::AddressSettings;

/// Persisted metadata of one derived address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressMetadata {
    pub index: u32,
    pub is_main: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl AddressMetadata {
    pub fn new(index: u32, settings: &AddressSettings) -> Self {
        Self {
            index,
            is_main: settings.is_main,
            label: settings.label.clone(),
            color: settings.color.clone(),
        }
    }

    pub fn settings(&self) -> AddressSettings {
        AddressSettings {
            label: self.label.clone(),
            color: self.color.clone(),
            is_main: self.is_main,
        }
    }
}
