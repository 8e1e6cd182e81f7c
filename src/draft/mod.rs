mod components;
mod store;

pub use components::{
    DraftKind, PendingEstimate, Readiness, SignedTransaction, TransactionDraft, UnsignedTxFields,
};
pub use store::{Balances, DraftStore};
