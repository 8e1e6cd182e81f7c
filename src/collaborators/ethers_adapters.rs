use std::str::FromStr;

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature, U256};

use super::{NodeClient, Wallet};
use crate::draft::{SignedTransaction, UnsignedTxFields};
use crate::prelude::*;

/// [`Wallet`] backed by an in-memory ethers [`LocalWallet`].
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    wallet: LocalWallet,
}

impl LocalWalletSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    pub fn from_private_key(private_key: &str, chain_id: u64) -> Result<Self> {
        let wallet = LocalWallet::from_str(private_key)
            .map_err(|e| Error::WalletUnavailable(e.to_string()))?;
        Ok(Self::new(wallet.with_chain_id(chain_id)))
    }

    pub fn inner(&self) -> &LocalWallet {
        &self.wallet
    }
}

#[async_trait]
impl Wallet for LocalWalletSigner {
    async fn get_address(&self) -> Result<Address> {
        Ok(self.wallet.address())
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature> {
        self.wallet
            .sign_transaction(tx)
            .await
            .map_err(|e| Error::WalletUnavailable(e.to_string()))
    }
}

/// [`NodeClient`] over any ethers [`Middleware`]. The nonce comes from the
/// node's pending transaction count for the sender.
#[derive(Debug, Clone)]
pub struct ProviderNode<M> {
    client: M,
}

impl<M: Middleware> ProviderNode<M> {
    pub fn new(client: M) -> Self {
        Self { client }
    }
}

impl ProviderNode<Provider<Http>> {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        Provider::<Http>::try_from(rpc_url)
            .map(Self::new)
            .map_err(|e| Error::Config(format!("{rpc_url}: {e}")))
    }
}

#[async_trait]
impl<M> NodeClient for ProviderNode<M>
where
    M: Middleware + 'static,
{
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256> {
        self.client
            .estimate_gas(tx, None)
            .await
            .map_err(|e| Error::EstimationFailure(e.to_string()))
    }

    async fn generate_transaction(
        &self,
        fields: UnsignedTxFields,
        wallet: &dyn Wallet,
    ) -> Result<SignedTransaction> {
        let nonce = self
            .client
            .get_transaction_count(fields.from, None)
            .await
            .map_err(|e| Error::GenerationFailure(e.to_string()))?;

        let mut tx = fields.into_typed();
        tx.set_nonce(nonce);
        let signature = wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| Error::GenerationFailure(e.to_string()))?;

        Ok(SignedTransaction::from_signed(&tx, &signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::TransactionRequest;

    // Key was randomly generated for testing and shouldn't be used with any real funds
    const TEST_KEY: &str = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";

    #[tokio::test]
    async fn test_local_wallet_signer_reports_address_and_signs() {
        let signer = LocalWalletSigner::from_private_key(TEST_KEY, 1).unwrap();
        let address = signer.get_address().await.unwrap();
        assert_eq!(address, signer.inner().address());

        let tx: TypedTransaction = TransactionRequest::new()
            .to(Address::repeat_byte(0x11))
            .value(1u64)
            .gas(21_000u64)
            .gas_price(1u64)
            .nonce(0u64)
            .chain_id(1u64)
            .into();
        let signature = signer.sign_transaction(&tx).await.unwrap();
        assert_eq!(signature.recover(tx.sighash()).unwrap(), address);
    }

    #[test]
    fn test_rejects_bad_private_key() {
        assert!(matches!(
            LocalWalletSigner::from_private_key("not-a-key", 1),
            Err(Error::WalletUnavailable(_))
        ));
    }
}
