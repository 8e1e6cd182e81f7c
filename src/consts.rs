use ethers::types::{Address, H160};

/// Exchange contract that allowance drafts approve by default.
pub const DEFAULT_ALLOWANCE_SPENDER: &str = "0x7cB57B5A97eAbe94205C07890BE4c1aD31E486A8";

pub const DEFAULT_GAS_LIMIT: &str = "21000";
pub const DEFAULT_GAS_PRICE_GWEI: &str = "21";

/// Seconds the confirm action stays disabled.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5000;

/// Sentinel accepted by allowance edits meaning "the whole balance".
pub const EVERYTHING: &str = "everything";

pub const MAINNET_CHAIN_ID: u64 = 1;
pub const MAINNET_UNIT: &str = "ETH";

pub const DAI_MAINNET: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const USDC_MAINNET: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

const DEFAULT_ALLOWANCE_SPENDER_BYTES: [u8; 20] = [
    0x7c, 0xb5, 0x7b, 0x5a, 0x97, 0xea, 0xbe, 0x94, 0x20, 0x5c, 0x07, 0x89, 0x0b, 0xe4, 0xc1,
    0xad, 0x31, 0xe4, 0x86, 0xa8,
];

/// [`DEFAULT_ALLOWANCE_SPENDER`] as an [`Address`].
pub fn default_allowance_spender() -> Address {
    H160(DEFAULT_ALLOWANCE_SPENDER_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::to_checksum;

    #[test]
    fn test_default_allowance_spender_matches_checksummed_constant() {
        assert_eq!(
            to_checksum(&default_allowance_spender(), None),
            DEFAULT_ALLOWANCE_SPENDER
        );
    }
}
