use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use log::{debug, info, warn};

use super::components::{DraftKind, PendingEstimate, Readiness, TransactionDraft, UnsignedTxFields};
use crate::collaborators::TokenRegistry;
use crate::config::EngineConfig;
use crate::consts::EVERYTHING;
use crate::erc20::{encode_approve, encode_transfer};
use crate::gas::format_gas_limit;
use crate::prelude::*;
use crate::query::{self, QueryMap, QueryPreset};
use crate::units::{to_base_units, Amount, Denomination, Unit};
use crate::validators::parse_address;

/// Balances in display units, used to resolve the `everything` allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    pub native: String,
    pub tokens: HashMap<String, String>,
}

/// Sole owner of the draft. Every mutation bumps `revision`, which is what
/// in-flight estimates are checked against.
pub struct DraftStore {
    draft: TransactionDraft,
    revision: u64,
    closed: bool,
    default_gas_limit: String,
    allowance_spender: Address,
    registry: Arc<dyn TokenRegistry>,
    balances: Balances,
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore")
            .field("draft", &self.draft)
            .field("revision", &self.revision)
            .field("closed", &self.closed)
            .finish()
    }
}

impl DraftStore {
    pub fn new(config: &EngineConfig, registry: Arc<dyn TokenRegistry>, balances: Balances) -> Self {
        Self {
            draft: TransactionDraft::new(&config.default_gas_limit),
            revision: 0,
            closed: false,
            default_gas_limit: config.default_gas_limit.clone(),
            allowance_spender: config.allowance_spender,
            registry,
            balances,
        }
    }

    /// Creates the store and applies the link preset in `query`, if any
    /// recognised key is present.
    pub fn with_query(
        config: &EngineConfig,
        registry: Arc<dyn TokenRegistry>,
        balances: Balances,
        query: &QueryMap,
    ) -> (Self, Option<PendingEstimate>) {
        let mut store = Self::new(config, registry, balances);
        let pending = store.apply_query(query);
        (store, pending)
    }

    /// Applies a link preset to the live draft. Queries without any
    /// recognised key leave the store untouched.
    pub fn apply_query(&mut self, query: &QueryMap) -> Option<PendingEstimate> {
        let preset = query::parse(query);
        if preset.is_empty() {
            return None;
        }
        self.apply_preset(preset)
    }

    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn readiness(&self) -> Readiness {
        self.draft.readiness()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_balances(&mut self, balances: Balances) {
        self.balances = balances;
    }

    /// `ether`, `gwei` and `wei` are native; anything else must be a
    /// registered token symbol.
    pub fn resolve_unit(&self, symbol: &str) -> Result<Unit> {
        if let Some(denomination) = Denomination::from_symbol(symbol) {
            return Ok(Unit::Native(denomination));
        }
        self.registry
            .resolve(symbol.trim())
            .map(Unit::Token)
            .ok_or_else(|| Error::UnknownToken(symbol.to_string()))
    }

    fn apply_preset(&mut self, preset: QueryPreset) -> Option<PendingEstimate> {
        let mut next = self.draft.clone();
        next.has_query_string = true;
        next.read_only = preset.read_only;
        next.kind = DraftKind::Transfer;

        if let Some(to) = preset.to {
            next.recipient = to.trim().to_string();
        }
        if let Some(value) = preset.value {
            next.amount_value = value.trim().to_string();
        }
        if let Some(symbol) = preset.unit {
            match self.resolve_unit(&symbol) {
                Ok(unit) => next.amount_unit = unit,
                Err(e) => warn!("ignoring link preset unit: {e}"),
            }
        }
        if let Some(gas_limit) = preset.gas_limit {
            next.gas_limit = gas_limit.trim().to_string();
        }
        match preset.data {
            Some(data) => next.calldata = data.trim().to_string(),
            None => next.calldata = transfer_calldata(&next),
        }

        info!(
            "applied link preset: to={:?} value={:?} unit={} read_only={}",
            next.recipient,
            next.amount_value,
            next.amount_unit.symbol(),
            next.read_only
        );
        self.commit(next, false)
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.draft.read_only {
            return Err(Error::InvalidState("draft is read-only".to_string()));
        }
        Ok(())
    }

    /// New transfer target. Token units get `transfer` calldata; native
    /// units keep `data` as given. A manually edited gas limit survives.
    pub fn set_recipient_and_amount(
        &mut self,
        recipient: &str,
        amount: &str,
        unit: &str,
        data: Option<&str>,
    ) -> Result<Option<PendingEstimate>> {
        self.ensure_editable()?;
        let unit = self.resolve_unit(unit)?;

        let mut next = self.draft.clone();
        next.kind = DraftKind::Transfer;
        next.recipient = recipient.trim().to_string();
        next.amount_value = amount.trim().to_string();
        next.amount_unit = unit;
        next.calldata = match (&next.amount_unit, data) {
            (Unit::Token(_), _) => transfer_calldata(&next),
            (Unit::Native(_), Some(data)) => data.trim().to_string(),
            (Unit::Native(_), None) => String::new(),
        };
        // An applied estimate stays valid for as long as its inputs do
        if !next.gas_limit_was_manually_edited
            && next.estimate_inputs() != self.draft.estimate_inputs()
        {
            next.gas_limit = self.default_gas_limit.clone();
        }

        Ok(self.commit(next, false))
    }

    /// Direct gas edit. Permanently disables automatic estimates for this
    /// draft.
    pub fn set_gas_limit(&mut self, gas_limit: &str) -> Result<()> {
        self.ensure_editable()?;
        let mut next = self.draft.clone();
        next.gas_limit = gas_limit.trim().to_string();
        next.gas_limit_was_manually_edited = true;
        self.commit(next, true);
        Ok(())
    }

    /// Approve `amount` of `unit` to the configured spender. `everything`
    /// resolves to the full balance. Unknown tokens are rejected with the
    /// draft left untouched.
    pub fn set_allowance_amount(
        &mut self,
        amount: &str,
        unit: &str,
    ) -> Result<Option<PendingEstimate>> {
        self.ensure_editable()?;
        let unit = self.resolve_unit(unit)?;

        let amount = if amount.trim() == EVERYTHING {
            match &unit {
                Unit::Native(_) => self.balances.native.clone(),
                Unit::Token(token) => self
                    .balances
                    .tokens
                    .get(&token.symbol)
                    .cloned()
                    .ok_or_else(|| Error::UnknownToken(token.symbol.clone()))?,
            }
        } else {
            amount.trim().to_string()
        };

        let raw = to_base_units(&Amount::new(amount.as_str(), unit.clone())).unwrap_or_default();

        let mut next = self.draft.clone();
        next.kind = DraftKind::Approve;
        next.recipient = unit
            .token()
            .map(|token| to_checksum(&token.address, None))
            .unwrap_or_default();
        next.calldata = encode_approve(self.allowance_spender, raw);
        next.allow_amount = amount;
        next.allow_unit = unit;

        Ok(self.commit(next, false))
    }

    pub fn set_sell_amount(&mut self, amount: &str, unit: &str) -> Result<()> {
        self.ensure_editable()?;
        let unit = self.resolve_unit(unit)?;
        let mut next = self.draft.clone();
        next.sell_amount = amount.trim().to_string();
        next.sell_unit = unit;
        self.commit(next, false);
        Ok(())
    }

    pub fn set_buy_amount(&mut self, amount: &str, unit: &str) -> Result<()> {
        self.ensure_editable()?;
        let unit = self.resolve_unit(unit)?;
        let mut next = self.draft.clone();
        next.buy_amount = amount.trim().to_string();
        next.buy_unit = unit;
        self.commit(next, false);
        Ok(())
    }

    /// Applies an estimate only if nothing changed since `pending` was
    /// issued. Returns whether `gas_limit` was updated.
    pub fn apply_estimate(&mut self, pending: &PendingEstimate, gas_limit: U256) -> bool {
        if self.closed {
            debug!("dropping estimate {gas_limit}: store closed");
            return false;
        }
        if pending.revision != self.revision {
            debug!(
                "dropping stale estimate {gas_limit}: issued at revision {}, now {}",
                pending.revision, self.revision
            );
            return false;
        }
        if self.draft.gas_limit_was_manually_edited {
            debug!("dropping estimate {gas_limit}: gas limit was edited manually");
            return false;
        }

        let unit = match self.draft.kind {
            DraftKind::Transfer => &self.draft.amount_unit,
            DraftKind::Approve => &self.draft.allow_unit,
        };
        self.draft.gas_limit = format_gas_limit(gas_limit, unit);
        self.revision += 1;
        debug!("gas limit set to {} at revision {}", self.draft.gas_limit, self.revision);
        true
    }

    /// Makes every outstanding estimate a no-op on arrival.
    pub fn close(&mut self) {
        self.closed = true;
        self.revision += 1;
    }

    pub fn unsigned_fields(
        &self,
        from: Address,
        gas_price: U256,
        chain_id: u64,
    ) -> Result<UnsignedTxFields> {
        let (to, value, data) = self.draft.call_target()?;
        let gas_limit = U256::from_dec_str(self.draft.gas_limit.trim())
            .map_err(|_| Error::InvalidAmount(format!("gas limit {:?}", self.draft.gas_limit)))?;

        Ok(UnsignedTxFields {
            to,
            from,
            value,
            gas_limit,
            gas_price,
            data,
            chain_id,
        })
    }

    fn commit(&mut self, next: TransactionDraft, manual_gas_edit: bool) -> Option<PendingEstimate> {
        let changed = self.draft.estimate_inputs() != next.estimate_inputs();
        self.draft = next;
        self.revision += 1;

        if manual_gas_edit
            || !changed
            || self.draft.gas_limit_was_manually_edited
            || !self.draft.is_valid()
        {
            return None;
        }

        debug!("estimate requested at revision {}", self.revision);
        Some(PendingEstimate {
            revision: self.revision,
            draft: self.draft.clone(),
        })
    }
}

/// `transfer` calldata for a token draft; empty for native units or an
/// unparseable recipient. An incomplete amount encodes as zero.
fn transfer_calldata(draft: &TransactionDraft) -> String {
    let Unit::Token(_) = &draft.amount_unit else {
        return draft.calldata.clone();
    };
    match parse_address(&draft.recipient) {
        Ok(recipient) => {
            let raw = to_base_units(&Amount::new(
                draft.amount_value.as_str(),
                draft.amount_unit.clone(),
            ))
            .unwrap_or_default();
            encode_transfer(recipient, raw)
        }
        Err(_) => String::new(),
    }
}
