use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, U256};
use ethers::utils::rlp::Rlp;

use crate::collaborators::TokenRegistry;
use crate::config::NetworkConfig;
use crate::draft::SignedTransaction;
use crate::erc20::{decode_call, Erc20Call};
use crate::helpers::{encode_hex, strip_hex_prefix};
use crate::prelude::*;
use crate::units::{format_decimal, Denomination, Token};

/// Display fields recovered from a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub to_address: Option<Address>,
    /// Address recovered from the signature.
    pub signer: Address,
    /// Transaction value in ether.
    pub value: String,
    /// Gas price in gwei.
    pub gas_price: String,
    pub gas_limit: U256,
    pub nonce: U256,
    /// `0x`-prefixed payload, empty when none is attached.
    pub data: String,
    pub token: Option<Token>,
    /// Token symbol for token operations, the network unit otherwise.
    pub symbol: String,
    pub token_call: Option<Erc20Call>,
    /// `transfer`/`approve` amount in the token's display units.
    pub token_amount: Option<String>,
}

impl DecodedTransaction {
    pub fn is_token_operation(&self) -> bool {
        self.token.is_some()
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Decodes `signed_tx` and classifies it against the token registry: a
/// destination that is a registered token contract makes it a token
/// operation.
pub fn decode_signed_transaction(
    signed: &SignedTransaction,
    registry: &dyn TokenRegistry,
    network: &NetworkConfig,
) -> Result<DecodedTransaction> {
    let bytes = hex::decode(strip_hex_prefix(signed.signed_tx.trim()))
        .map_err(|e| Error::Decode(format!("signed transaction is not hex: {e}")))?;
    if bytes.is_empty() {
        return Err(Error::Decode("signed transaction is empty".to_string()));
    }

    let rlp = Rlp::new(&bytes);
    let (tx, signature) =
        TypedTransaction::decode_signed(&rlp).map_err(|e| Error::Decode(e.to_string()))?;
    let signer = signature
        .recover(tx.sighash())
        .map_err(|e| Error::Decode(e.to_string()))?;

    let to_address = tx.to().and_then(|to| to.as_address().copied());
    let value = tx.value().copied().unwrap_or_default();
    let gas_price = tx.gas_price().unwrap_or_default();
    let data = tx.data().map(|d| d.to_vec()).unwrap_or_default();

    let token = to_address.and_then(|address| registry.find_by_address(&address));
    let token_call = token.as_ref().and_then(|_| decode_call(&data));
    let token_amount = match (&token, &token_call) {
        (Some(token), Some(call)) => Some(format_decimal(call.amount(), token.decimals)?),
        _ => None,
    };
    let symbol = match &token {
        Some(token) => token.symbol.clone(),
        None => network.unit.clone(),
    };

    Ok(DecodedTransaction {
        to_address,
        signer,
        value: format_decimal(value, Denomination::Ether.decimals())?,
        gas_price: format_decimal(gas_price, Denomination::Gwei.decimals())?,
        gas_limit: tx.gas().copied().unwrap_or_default(),
        nonce: tx.nonce().copied().unwrap_or_default(),
        data: if data.is_empty() {
            String::new()
        } else {
            encode_hex(&data)
        },
        token,
        symbol,
        token_call,
        token_amount,
    })
}
