use ethers::types::Address;
use ethers::utils::to_checksum;

use crate::helpers::strip_hex_prefix;
use crate::prelude::*;

const ADDRESS_HEX_LEN: usize = 40;

/// Syntactic address check with EIP-55 verification for mixed-case input.
///
/// All-lowercase and all-uppercase forms are accepted without a checksum.
pub fn is_valid_address(address: &str) -> bool {
    let body = strip_hex_prefix(address);
    if body.len() != ADDRESS_HEX_LEN || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    match hex::decode(body) {
        Ok(bytes) => to_checksum(&Address::from_slice(&bytes), None)[2..] == *body,
        Err(_) => false,
    }
}

pub fn parse_address(address: &str) -> Result<Address> {
    let trimmed = address.trim();
    if !is_valid_address(trimmed) {
        return Err(Error::InvalidAddress(address.to_string()));
    }
    hex::decode(strip_hex_prefix(trimmed))
        .map(|bytes| Address::from_slice(&bytes))
        .map_err(|_| Error::InvalidAddress(address.to_string()))
}

/// Hex payload check used for calldata display. Empty input is valid.
pub fn is_valid_hex(data: &str) -> bool {
    let body = data.strip_prefix("0x").unwrap_or(data);
    body.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_accepts_single_case_addresses() {
        assert!(is_valid_address(&CHECKSUMMED.to_lowercase()));
        assert!(is_valid_address(&format!(
            "0x{}",
            CHECKSUMMED[2..].to_uppercase()
        )));
        assert!(is_valid_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
    }

    #[test]
    fn test_mixed_case_requires_valid_checksum() {
        assert!(is_valid_address(CHECKSUMMED));
        assert!(is_valid_address("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"));
        assert!(!is_valid_address("0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        assert!(!is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea"));
        assert!(!is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaedff"));
        assert!(!is_valid_address("0xzaaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_valid_address("vitalik.eth"));
    }

    #[test]
    fn test_parse_address_round_trips_checksum() {
        let address = parse_address(&CHECKSUMMED.to_lowercase()).unwrap();
        assert_eq!(to_checksum(&address, None), CHECKSUMMED);
        assert!(matches!(
            parse_address("0x1234"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_hex_payloads() {
        assert!(is_valid_hex(""));
        assert!(is_valid_hex("0x"));
        assert!(is_valid_hex("0xa9059cbb"));
        assert!(is_valid_hex("A9059CBB"));
        assert!(!is_valid_hex("0xg0"));
    }
}
