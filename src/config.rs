use std::path::Path;
use std::time::Duration;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::consts::{
    default_allowance_spender, DEFAULT_COUNTDOWN_SECS, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_GWEI,
    DEFAULT_NOTIFICATION_DURATION_MS, DEFAULT_TICK_INTERVAL_MS, MAINNET_CHAIN_ID, MAINNET_UNIT,
};
use crate::prelude::*;
use crate::units::{to_base_units, Amount, Token, Unit};

/// Path of a JSON [`EngineConfig`].
pub const CONFIG_PATH_ENV: &str = "TX_DRAFTING_CONFIG";
/// Overrides [`EngineConfig::gas_price_gwei`].
pub const GAS_PRICE_ENV: &str = "TX_DRAFTING_GAS_PRICE_GWEI";

/// The chain transactions are drafted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    /// Native currency symbol shown next to amounts, e.g. `ETH`.
    pub unit: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "ETH".to_string(),
            chain_id: MAINNET_CHAIN_ID,
            unit: MAINNET_UNIT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Gas limit of a fresh draft, before any estimate arrives.
    pub default_gas_limit: String,
    pub gas_price_gwei: String,
    pub countdown_secs: u32,
    pub tick_interval_ms: u64,
    pub notification_duration_ms: u64,
    pub allowance_spender: Address,
    pub network: NetworkConfig,
    pub tokens: Vec<Token>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_gas_limit: DEFAULT_GAS_LIMIT.to_string(),
            gas_price_gwei: DEFAULT_GAS_PRICE_GWEI.to_string(),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            notification_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
            allowance_spender: default_allowance_spender(),
            network: NetworkConfig::default(),
            tokens: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Loads from [`CONFIG_PATH_ENV`] when set, then applies [`GAS_PRICE_ENV`].
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(gas_price) = std::env::var(GAS_PRICE_ENV) {
            config.gas_price_gwei = gas_price;
            config.validate()?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.gas_price_wei()?;
        if self.default_gas_limit.trim().parse::<u64>().is_err() {
            return Err(Error::Config(format!(
                "defaultGasLimit {:?} is not an integer",
                self.default_gas_limit
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tickIntervalMs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn gas_price_wei(&self) -> Result<U256> {
        to_base_units(&Amount::new(self.gas_price_gwei.as_str(), Unit::gwei()))
            .map_err(|e| Error::Config(format!("gasPriceGwei: {e}")))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}
