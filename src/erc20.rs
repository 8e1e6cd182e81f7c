//! ERC-20 call data for `transfer` and `approve`.
//!
//! Layout is the standard ABI one: a 4-byte selector (the first bytes of the
//! keccak256 of the canonical signature) followed by one 32-byte word per
//! argument. Addresses are left-padded into bytes 12..32 of their word and
//! amounts are big-endian.

use ethers::types::{Address, U256};
use ethers::utils::keccak256;
use lazy_static::lazy_static;

use crate::helpers::encode_hex;

pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";
pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";

const WORD: usize = 32;
/// Selector plus two argument words.
const TWO_ARG_CALL_LEN: usize = 4 + 2 * WORD;

lazy_static! {
    pub static ref TRANSFER_SELECTOR: [u8; 4] = selector(TRANSFER_SIGNATURE);
    pub static ref APPROVE_SELECTOR: [u8; 4] = selector(APPROVE_SIGNATURE);
}

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn encode_call(selector: &[u8; 4], address: &Address, amount: U256) -> String {
    let mut data = Vec::with_capacity(TWO_ARG_CALL_LEN);
    data.extend_from_slice(selector);
    data.extend_from_slice(&address_word(address));
    data.extend_from_slice(&uint_word(amount));
    encode_hex(data)
}

/// `approve(spender, amount)` call data as `0x`-prefixed lowercase hex.
pub fn encode_approve(spender: Address, amount: U256) -> String {
    encode_call(&APPROVE_SELECTOR, &spender, amount)
}

/// `transfer(recipient, amount)` call data as `0x`-prefixed lowercase hex.
pub fn encode_transfer(recipient: Address, amount: U256) -> String {
    encode_call(&TRANSFER_SELECTOR, &recipient, amount)
}

/// A recognised ERC-20 call recovered from call data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erc20Call {
    Transfer { to: Address, amount: U256 },
    Approve { spender: Address, amount: U256 },
}

impl Erc20Call {
    pub fn amount(&self) -> U256 {
        match self {
            Erc20Call::Transfer { amount, .. } | Erc20Call::Approve { amount, .. } => *amount,
        }
    }

    pub fn counterparty(&self) -> Address {
        match self {
            Erc20Call::Transfer { to, .. } => *to,
            Erc20Call::Approve { spender, .. } => *spender,
        }
    }
}

/// Recovers a `transfer` or `approve` call. Anything else, including words
/// whose address padding is not zero, yields `None`.
pub fn decode_call(data: &[u8]) -> Option<Erc20Call> {
    if data.len() < TWO_ARG_CALL_LEN {
        return None;
    }
    let (selector, args) = data.split_at(4);
    let address_arg = &args[..WORD];
    if address_arg[..WORD - 20].iter().any(|b| *b != 0) {
        return None;
    }
    let address = Address::from_slice(&address_arg[WORD - 20..]);
    let amount = U256::from_big_endian(&args[WORD..2 * WORD]);

    if selector == TRANSFER_SELECTOR.as_slice() {
        Some(Erc20Call::Transfer {
            to: address,
            amount,
        })
    } else if selector == APPROVE_SELECTOR.as_slice() {
        Some(Erc20Call::Approve {
            spender: address,
            amount,
        })
    } else {
        None
    }
}
