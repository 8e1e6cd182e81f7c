//! Asynchronous gas estimation guarded against stale responses.

use std::sync::{Arc, Mutex};

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{TransactionRequest, U256};
use log::{debug, warn};

use crate::collaborators::{NodeClient, Wallet};
use crate::draft::{DraftStore, PendingEstimate, TransactionDraft};
use crate::helpers::lock;
use crate::prelude::*;
use crate::units::Unit;

const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Nodes report one past the intrinsic cost for plain native transfers;
/// that case is rounded back to 21000.
pub fn format_gas_limit(limit: U256, unit: &Unit) -> String {
    if unit.is_native() && limit == U256::from(NATIVE_TRANSFER_GAS + 1) {
        return NATIVE_TRANSFER_GAS.to_string();
    }
    limit.to_string()
}

#[derive(Clone)]
pub struct GasEstimationCoordinator {
    node: Arc<dyn NodeClient>,
    wallet: Arc<dyn Wallet>,
}

impl GasEstimationCoordinator {
    pub fn new(node: Arc<dyn NodeClient>, wallet: Arc<dyn Wallet>) -> Self {
        Self { node, wallet }
    }

    /// The transaction an estimate is requested for: no gas fields set.
    pub async fn provisional_transaction(&self, draft: &TransactionDraft) -> Result<TypedTransaction> {
        let from = self.wallet.get_address().await?;
        let (to, value, data) = draft.call_target()?;
        Ok(TransactionRequest::new()
            .from(from)
            .to(to)
            .value(value)
            .data(data)
            .into())
    }

    pub async fn estimate(&self, pending: &PendingEstimate) -> Result<U256> {
        let tx = self
            .provisional_transaction(&pending.draft)
            .await
            .map_err(|e| Error::EstimationFailure(e.to_string()))?;
        self.node.estimate_gas(&tx).await.map_err(|e| match e {
            Error::EstimationFailure(_) => e,
            other => Error::EstimationFailure(other.to_string()),
        })
    }

    /// Estimates for `pending` and hands the result to the store, which
    /// drops it if the draft moved on. Failures keep the previous gas limit.
    pub async fn refresh(&self, store: &Mutex<DraftStore>, pending: PendingEstimate) -> bool {
        match self.estimate(&pending).await {
            Ok(gas_limit) => {
                let applied = lock(store).apply_estimate(&pending, gas_limit);
                debug!(
                    "estimate {gas_limit} for revision {} applied: {applied}",
                    pending.revision()
                );
                applied
            }
            Err(e) => {
                warn!("skipping gas estimate for revision {}: {e}", pending.revision());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StaticTokenRegistry;
    use crate::config::EngineConfig;
    use crate::draft::{Balances, SignedTransaction, UnsignedTxFields};
    use crate::units::Token;
    use async_trait::async_trait;
    use ethers::types::{Address, NameOrAddress, Signature};

    const RECIPIENT: &str = "0x1234567890123456789012345678901234567890";

    struct FixedWallet;

    #[async_trait]
    impl Wallet for FixedWallet {
        async fn get_address(&self) -> Result<Address> {
            Ok(Address::repeat_byte(0x01))
        }

        async fn sign_transaction(&self, _tx: &TypedTransaction) -> Result<Signature> {
            Err(Error::WalletUnavailable("read-only test wallet".to_string()))
        }
    }

    struct FixedNode(Result<U256>);

    #[async_trait]
    impl NodeClient for FixedNode {
        async fn estimate_gas(&self, _tx: &TypedTransaction) -> Result<U256> {
            self.0.clone()
        }

        async fn generate_transaction(
            &self,
            _fields: UnsignedTxFields,
            _wallet: &dyn Wallet,
        ) -> Result<SignedTransaction> {
            Err(Error::GenerationFailure("not supported".to_string()))
        }
    }

    fn dai() -> Token {
        Token {
            symbol: "DAI".to_string(),
            address: Address::repeat_byte(0xda),
            decimals: 18,
        }
    }

    fn store() -> Mutex<DraftStore> {
        let registry = Arc::new(StaticTokenRegistry::new(vec![dai()]));
        Mutex::new(DraftStore::new(
            &EngineConfig::default(),
            registry,
            Balances::default(),
        ))
    }

    fn coordinator(result: Result<U256>) -> GasEstimationCoordinator {
        GasEstimationCoordinator::new(Arc::new(FixedNode(result)), Arc::new(FixedWallet))
    }

    #[test]
    fn test_format_gas_limit() {
        assert_eq!(format_gas_limit(U256::from(21_001u64), &Unit::ether()), "21000");
        assert_eq!(format_gas_limit(U256::from(21_001u64), &Unit::Token(dai())), "21001");
        assert_eq!(format_gas_limit(U256::from(52_000u64), &Unit::ether()), "52000");
    }

    #[tokio::test]
    async fn test_provisional_token_transfer_targets_contract() {
        let store = store();
        let pending = lock(&store)
            .set_recipient_and_amount(RECIPIENT, "1", "DAI", None)
            .unwrap()
            .unwrap();
        let tx = coordinator(Ok(U256::zero()))
            .provisional_transaction(&pending.draft)
            .await
            .unwrap();

        assert_eq!(tx.to(), Some(&NameOrAddress::Address(dai().address)));
        assert_eq!(tx.value(), Some(&U256::zero()));
        assert_eq!(tx.from(), Some(&Address::repeat_byte(0x01)));
        assert_eq!(tx.data().map(|d| d.len()), Some(68));
        assert!(tx.gas().is_none());
    }

    #[tokio::test]
    async fn test_refresh_applies_current_estimate() {
        let store = store();
        let pending = lock(&store)
            .set_recipient_and_amount(RECIPIENT, "1", "ether", None)
            .unwrap()
            .unwrap();
        assert!(coordinator(Ok(U256::from(30_000u64))).refresh(&store, pending).await);
        assert_eq!(lock(&store).draft().gas_limit, "30000");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_gas_limit() {
        let store = store();
        let pending = lock(&store)
            .set_recipient_and_amount(RECIPIENT, "1", "ether", None)
            .unwrap()
            .unwrap();
        let failing = coordinator(Err(Error::EstimationFailure("execution reverted".to_string())));
        assert!(!failing.refresh(&store, pending).await);
        assert_eq!(lock(&store).draft().gas_limit, "21000");
    }
}
