use bip39::Mnemonic;
use std::fmt;

use crate::error::AddressesError;

/// An unlocked wallet: its mnemonic, optional passphrase and the identity
/// its address metadata is stored under
#[derive(Clone)]
pub struct WalletSecret {
    name: String,
    mnemonic: Mnemonic,
    passphrase: Option<String>,
}

impl WalletSecret {
    pub fn new(name: impl Into<String>, mnemonic: Mnemonic) -> Self {
        Self {
            name: name.into(),
            mnemonic,
            passphrase: None,
        }
    }

    /// Import a wallet from an existing mnemonic phrase
    pub fn from_phrase(name: impl Into<String>, words: &str) -> Result<Self, AddressesError> {
        let mnemonic = Mnemonic::parse(words)
            .map_err(|e| AddressesError::InvalidMnemonic(e.to_string()))?;
        Ok(Self::new(name, mnemonic))
    }

    /// Wallets derived with a passphrase are hidden wallets: their address
    /// settings are never written to disk
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        let passphrase = passphrase.into();
        self.passphrase = (!passphrase.is_empty()).then_some(passphrase);
        self
    }

    pub fn identity(&self) -> &str {
        &self.name
    }

    pub fn is_passphrase_derived(&self) -> bool {
        self.passphrase.is_some()
    }

    /// BIP39 seed (64 bytes) including the passphrase, if any
    pub fn seed(&self) -> [u8; 64] {
        self.mnemonic
            .to_seed(self.passphrase.as_deref().unwrap_or(""))
    }
}

impl fmt::Debug for WalletSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSecret")
            .field("name", &self.name)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_passphrase_changes_seed() {
        let plain = WalletSecret::from_phrase("w", PHRASE).unwrap();
        let hidden = plain.clone().with_passphrase("secret");

        assert!(!plain.is_passphrase_derived());
        assert!(hidden.is_passphrase_derived());
        assert_ne!(plain.seed(), hidden.seed());
    }

    #[test]
    fn test_empty_passphrase_is_plain() {
        let secret = WalletSecret::from_phrase("w", PHRASE).unwrap().with_passphrase("");
        assert!(!secret.is_passphrase_derived());
    }

    #[test]
    fn test_invalid_phrase_rejected() {
        assert!(matches!(
            WalletSecret::from_phrase("w", "not a mnemonic"),
            Err(AddressesError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let secret = WalletSecret::from_phrase("w", PHRASE).unwrap().with_passphrase("pw");
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("abandon"));
        assert!(!printed.contains("pw\""));
    }
}
