//! Contracts for the collaborators the engine is wired to: the wallet that
//! signs, the node that estimates and builds, the token registry and the
//! notification sink.

mod ethers_adapters;
mod notifier;
mod registry;

pub use ethers_adapters::{LocalWalletSigner, ProviderNode};
pub use notifier::{LogNotifier, NotificationLevel, Notifier};
pub use registry::{StaticTokenRegistry, TokenRegistry};

use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature, U256};

use crate::draft::{SignedTransaction, UnsignedTxFields};
use crate::prelude::Result;

#[async_trait]
pub trait Wallet: Send + Sync {
    /// Fails with [`crate::Error::WalletUnavailable`].
    async fn get_address(&self) -> Result<Address>;

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature>;
}

#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fails with [`crate::Error::EstimationFailure`].
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256>;

    /// Builds and signs a transaction from finalized draft fields. Fails with
    /// [`crate::Error::GenerationFailure`] carrying a human-readable message.
    async fn generate_transaction(
        &self,
        fields: UnsignedTxFields,
        wallet: &dyn Wallet,
    ) -> Result<SignedTransaction>;
}
