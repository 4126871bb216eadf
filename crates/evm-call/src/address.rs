use alloy_primitives::Address;

use crate::error::AddressError;

/// Checks that `address` has the account-address shape: `0x` followed by
/// exactly 40 hex digits. Case is not interpreted; EIP-55 checksums are not
/// verified here.
pub fn validate_shape(address: &str) -> Result<(), AddressError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or(AddressError::MissingPrefix)?;

    if hex_part.len() != 40 {
        return Err(AddressError::InvalidLength(hex_part.len()));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::NonHex);
    }

    Ok(())
}

/// Returns `true` when `address` passes [`validate_shape`].
pub fn is_address_shape(address: &str) -> bool {
    validate_shape(address).is_ok()
}

/// Parses a shape-valid address string into its 20 bytes.
pub fn parse_address(address: &str) -> Result<Address, AddressError> {
    validate_shape(address)?;

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(&address[2..], &mut bytes).map_err(|_| AddressError::NonHex)?;
    Ok(Address::from(bytes))
}

/// Renders an address in EIP-55 mixed-case form.
pub fn checksum_address(address: &str) -> Result<String, AddressError> {
    Ok(parse_address(address)?.to_checksum(None))
}
