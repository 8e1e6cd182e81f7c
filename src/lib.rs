mod collaborators;
mod config;
mod confirm;
mod consts;
mod draft;
mod erc20;
mod errors;
mod gas;
mod helpers;
pub mod prelude;
mod query;
mod session;
mod units;
mod validators;

pub use collaborators::{
    LocalWalletSigner, LogNotifier, NodeClient, NotificationLevel, Notifier, ProviderNode,
    StaticTokenRegistry, TokenRegistry, Wallet,
};
pub use config::{EngineConfig, NetworkConfig, CONFIG_PATH_ENV, GAS_PRICE_ENV};
pub use confirm::{
    decode_signed_transaction, ConfirmationGate, ConfirmationSession, ConfirmationState,
    Countdown, DecodedTransaction, GateState,
};
pub use consts::{
    DAI_MAINNET, DEFAULT_ALLOWANCE_SPENDER, DEFAULT_COUNTDOWN_SECS, DEFAULT_GAS_LIMIT,
    EVERYTHING, MAINNET_CHAIN_ID, USDC_MAINNET,
};
pub use draft::{
    Balances, DraftKind, DraftStore, PendingEstimate, Readiness, SignedTransaction,
    TransactionDraft, UnsignedTxFields,
};
pub use erc20::{decode_call, encode_approve, encode_transfer, Erc20Call};
pub use errors::Error;
pub use gas::{format_gas_limit, GasEstimationCoordinator};
pub use query::{get_param, parse as parse_query, parse_query_string, QueryMap, QueryPreset};
pub use session::{Collaborators, SendSession};
pub use units::{
    canonical_amount, convert, format_decimal, from_base_units, is_positive_amount,
    parse_decimal, to_base_units, Amount, Denomination, Token, Unit,
};
pub use validators::{is_valid_address, is_valid_hex, parse_address};
