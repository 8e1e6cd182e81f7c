use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Signature, TransactionRequest, U256};
use serde::{Deserialize, Serialize};

use crate::helpers::{encode_hex, strip_hex_prefix};
use crate::prelude::*;
use crate::units::{is_positive_amount, to_base_units, Amount, Unit};
use crate::validators::{is_valid_address, parse_address};

/// What the draft's calldata asks the destination to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftKind {
    /// Native transfer to `recipient`, or a token `transfer` when the amount
    /// unit is a token.
    #[default]
    Transfer,
    /// Token `approve`; `recipient` holds the token contract.
    Approve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Empty,
    Partial,
    Valid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub recipient: String,
    pub amount_value: String,
    pub amount_unit: Unit,
    pub gas_limit: String,
    pub gas_limit_was_manually_edited: bool,
    pub calldata: String,
    pub read_only: bool,
    pub has_query_string: bool,
    pub kind: DraftKind,

    pub allow_amount: String,
    pub allow_unit: Unit,
    // Exchange order legs, carried for the order form only
    pub sell_amount: String,
    pub sell_unit: Unit,
    pub buy_amount: String,
    pub buy_unit: Unit,
}

impl TransactionDraft {
    pub fn new(default_gas_limit: &str) -> Self {
        Self {
            recipient: String::new(),
            amount_value: String::new(),
            amount_unit: Unit::ether(),
            gas_limit: default_gas_limit.to_string(),
            gas_limit_was_manually_edited: false,
            calldata: String::new(),
            read_only: false,
            has_query_string: false,
            kind: DraftKind::Transfer,
            allow_amount: String::new(),
            allow_unit: Unit::ether(),
            sell_amount: String::new(),
            sell_unit: Unit::ether(),
            buy_amount: String::new(),
            buy_unit: Unit::ether(),
        }
    }

    /// The amount validity is judged on: the allowance for approvals, the
    /// transfer amount otherwise.
    pub fn active_amount(&self) -> &str {
        match self.kind {
            DraftKind::Transfer => &self.amount_value,
            DraftKind::Approve => &self.allow_amount,
        }
    }

    pub fn readiness(&self) -> Readiness {
        if is_valid_address(self.recipient.trim()) && is_positive_amount(self.active_amount()) {
            Readiness::Valid
        } else if self.recipient.trim().is_empty()
            && self.active_amount().trim().is_empty()
            && self.calldata.is_empty()
        {
            Readiness::Empty
        } else {
            Readiness::Partial
        }
    }

    pub fn is_valid(&self) -> bool {
        self.readiness() == Readiness::Valid
    }

    /// Fields whose change re-triggers gas estimation.
    pub(crate) fn estimate_inputs(&self) -> (&str, &str, &Unit, &str) {
        (
            &self.recipient,
            &self.amount_value,
            &self.amount_unit,
            &self.calldata,
        )
    }

    /// Destination, value and payload the draft resolves to on the wire.
    ///
    /// A token transfer goes to the token contract with zero value; a native
    /// transfer or an approval goes to `recipient`.
    pub fn call_target(&self) -> Result<(Address, U256, Bytes)> {
        let data = self.calldata_bytes()?;
        match (&self.kind, &self.amount_unit) {
            (DraftKind::Transfer, Unit::Token(token)) => Ok((token.address, U256::zero(), data)),
            (DraftKind::Transfer, unit @ Unit::Native(_)) => {
                let to = parse_address(&self.recipient)?;
                let value = to_base_units(&Amount::new(self.amount_value.as_str(), unit.clone()))?;
                Ok((to, value, data))
            }
            (DraftKind::Approve, _) => Ok((parse_address(&self.recipient)?, U256::zero(), data)),
        }
    }

    pub fn calldata_bytes(&self) -> Result<Bytes> {
        hex::decode(strip_hex_prefix(self.calldata.trim()))
            .map(Bytes::from)
            .map_err(|e| Error::InvalidState(format!("calldata {:?}: {e}", self.calldata)))
    }
}

/// Snapshot of the draft at the moment a gas estimate was requested. Its
/// result only applies while the store is still at `revision`.
#[derive(Debug, Clone)]
pub struct PendingEstimate {
    pub(crate) revision: u64,
    pub draft: TransactionDraft,
}

impl PendingEstimate {
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Finalized fields handed to the node for building and signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTxFields {
    pub to: Address,
    pub from: Address,
    pub value: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

impl UnsignedTxFields {
    pub fn into_typed(self) -> TypedTransaction {
        TransactionRequest::new()
            .to(self.to)
            .from(self.from)
            .value(self.value)
            .gas(self.gas_limit)
            .gas_price(self.gas_price)
            .data(self.data)
            .chain_id(self.chain_id)
            .into()
    }
}

/// Unsigned and signed RLP encodings of a built transaction, `0x`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub raw_tx: String,
    pub signed_tx: String,
}

impl SignedTransaction {
    pub fn from_signed(tx: &TypedTransaction, signature: &Signature) -> Self {
        Self {
            raw_tx: encode_hex(tx.rlp()),
            signed_tx: encode_hex(tx.rlp_signed(signature)),
        }
    }
}
