//! Address group assignment
//!
//! The group of an address is derived from its public key hash: a djb2
//! hash over the bytes (forced odd), folded into one byte by xor-ing its
//! four bytes, modulo the number of groups on the network.

use crate::error::AddressesError;

fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(5381u32, |hash, byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(*byte as u32)
    })
}

fn xor_byte(value: u32) -> u8 {
    value
        .to_be_bytes()
        .iter()
        .fold(0u8, |acc, byte| acc ^ byte)
}

/// Group of a raw public key hash
pub fn group_of_bytes(hash: &[u8], total_groups: u8) -> u8 {
    let hint = djb2(hash) | 1;
    xor_byte(hint) % total_groups.max(1)
}

/// Group of a hex-encoded address hash
pub fn group_of_hash(hash: &str, total_groups: u8) -> Result<u8, AddressesError> {
    let bytes = hex::decode(hash).map_err(|e| {
        AddressesError::InvalidAddressHash(format!("{}: {}", hash, e))
    })?;
    if bytes.is_empty() {
        return Err(AddressesError::InvalidAddressHash(
            "empty address hash".to_string(),
        ));
    }
    Ok(group_of_bytes(&bytes, total_groups))
}
