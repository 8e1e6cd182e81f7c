//! Composition root for the send flow.
//!
//! A [`SendSession`] wires the draft store to the node, the wallet, the token
//! registry and the notifier. Edits apply synchronously; any estimate they
//! request runs as a spawned task whose result the store accepts only if the
//! draft is unchanged when it lands.

use std::sync::{Arc, Mutex};

use ethers::types::U256;
use futures_util::future::join_all;
use log::{debug, error, info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::collaborators::{NodeClient, NotificationLevel, Notifier, TokenRegistry, Wallet};
use crate::config::EngineConfig;
use crate::confirm::{ConfirmationSession, DecodedTransaction};
use crate::draft::{Balances, DraftStore, PendingEstimate, Readiness, SignedTransaction, TransactionDraft};
use crate::gas::GasEstimationCoordinator;
use crate::helpers::lock;
use crate::prelude::*;
use crate::query::QueryMap;

/// External collaborators a session is built from.
#[derive(Clone)]
pub struct Collaborators {
    pub wallet: Arc<dyn Wallet>,
    pub node: Arc<dyn NodeClient>,
    pub registry: Arc<dyn TokenRegistry>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct SendSession {
    store: Arc<Mutex<DraftStore>>,
    coordinator: GasEstimationCoordinator,
    collaborators: Collaborators,
    config: EngineConfig,
    runtime: Handle,
    estimates: Vec<JoinHandle<bool>>,
    started: bool,
    show_allow: bool,
    transaction: Option<SignedTransaction>,
    confirmation: Option<ConfirmationSession>,
}

impl SendSession {
    /// Must be called from within a tokio runtime; estimates are spawned on
    /// it.
    pub fn new(collaborators: Collaborators, config: EngineConfig, balances: Balances) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|e| Error::InvalidState(format!("no tokio runtime: {e}")))?;
        let store = DraftStore::new(&config, collaborators.registry.clone(), balances);
        let coordinator =
            GasEstimationCoordinator::new(collaborators.node.clone(), collaborators.wallet.clone());

        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            coordinator,
            collaborators,
            config,
            runtime,
            estimates: Vec::new(),
            started: false,
            show_allow: false,
            transaction: None,
            confirmation: None,
        })
    }

    /// Applies the link preset in `query`. Only the first call has any
    /// effect.
    pub fn start(&mut self, query: &QueryMap) {
        if self.started {
            debug!("session already started, ignoring query");
            return;
        }
        self.started = true;

        let pending = lock(&self.store).apply_query(query);
        self.schedule(pending);
    }

    /// Aborts outstanding estimates, closes the store and cancels any
    /// confirmation in progress.
    pub fn stop(&mut self) {
        for handle in self.estimates.drain(..) {
            handle.abort();
        }
        lock(&self.store).close();
        if let Some(mut confirmation) = self.confirmation.take() {
            confirmation.cancel();
        }
    }

    pub fn draft(&self) -> TransactionDraft {
        lock(&self.store).draft().clone()
    }

    pub fn readiness(&self) -> Readiness {
        lock(&self.store).readiness()
    }

    pub fn revision(&self) -> u64 {
        lock(&self.store).revision()
    }

    pub fn set_balances(&self, balances: Balances) {
        lock(&self.store).set_balances(balances);
    }

    pub fn set_recipient_and_amount(
        &mut self,
        recipient: &str,
        amount: &str,
        unit: &str,
        data: Option<&str>,
    ) -> Result<()> {
        let pending = lock(&self.store).set_recipient_and_amount(recipient, amount, unit, data)?;
        self.schedule(pending);
        Ok(())
    }

    pub fn set_gas_limit(&mut self, gas_limit: &str) -> Result<()> {
        lock(&self.store).set_gas_limit(gas_limit)
    }

    /// Unknown tokens leave the draft untouched and are not reported to
    /// the user.
    pub fn set_allowance_amount(&mut self, amount: &str, unit: &str) -> Result<()> {
        let pending = match lock(&self.store).set_allowance_amount(amount, unit) {
            Ok(pending) => pending,
            Err(e) => {
                debug!("allowance edit dropped: {e}");
                return Err(e);
            }
        };
        self.schedule(pending);
        Ok(())
    }

    pub fn set_sell_amount(&mut self, amount: &str, unit: &str) -> Result<()> {
        lock(&self.store).set_sell_amount(amount, unit)
    }

    pub fn set_buy_amount(&mut self, amount: &str, unit: &str) -> Result<()> {
        lock(&self.store).set_buy_amount(amount, unit)
    }

    /// Reveals the allowance form.
    pub fn to_allow(&mut self) {
        self.show_allow = true;
    }

    pub fn show_allow(&self) -> bool {
        self.show_allow
    }

    fn schedule(&mut self, pending: Option<PendingEstimate>) {
        self.estimates.retain(|handle| !handle.is_finished());
        let Some(pending) = pending else {
            return;
        };
        let coordinator = self.coordinator.clone();
        let store = self.store.clone();
        self.estimates.push(
            self.runtime
                .spawn(async move { coordinator.refresh(&store, pending).await }),
        );
    }

    /// Waits for every estimate issued so far to land or be dropped.
    pub async fn settle(&mut self) {
        let handles: Vec<_> = self.estimates.drain(..).collect();
        join_all(handles).await;
    }

    /// Builds and signs the current draft. A failure is reported once at
    /// `danger` level and leaves the draft untouched for a retry.
    pub async fn generate_transaction(&mut self) -> Result<SignedTransaction> {
        match self.try_generate().await {
            Ok(transaction) => {
                info!("generated transaction {}", transaction.signed_tx);
                self.transaction = Some(transaction.clone());
                Ok(transaction)
            }
            Err(e) => {
                let message = match &e {
                    Error::GenerationFailure(message) => message.clone(),
                    other => other.to_string(),
                };
                error!("transaction generation failed: {message}");
                self.collaborators.notifier.notify(
                    NotificationLevel::Danger,
                    &message,
                    Some(self.config.notification_duration()),
                );
                Err(e)
            }
        }
    }

    async fn try_generate(&self) -> Result<SignedTransaction> {
        let from = self.collaborators.wallet.get_address().await?;
        let gas_price: U256 = self.config.gas_price_wei()?;
        let fields = lock(&self.store).unsigned_fields(from, gas_price, self.config.network.chain_id)?;

        self.collaborators
            .node
            .generate_transaction(fields, self.collaborators.wallet.as_ref())
            .await
            .map_err(|e| match e {
                Error::GenerationFailure(_) => e,
                other => Error::GenerationFailure(other.to_string()),
            })
    }

    pub fn transaction(&self) -> Option<&SignedTransaction> {
        self.transaction.as_ref()
    }

    /// Opens confirmation for the generated transaction. Returns `Ok(false)`
    /// when nothing has been generated yet.
    pub async fn open_confirmation(&mut self) -> Result<bool> {
        let Some(transaction) = self.transaction.clone() else {
            return Ok(false);
        };
        if let Some(mut previous) = self.confirmation.take() {
            previous.cancel();
        }

        let confirmation = ConfirmationSession::start(
            transaction,
            self.collaborators.wallet.as_ref(),
            self.collaborators.registry.as_ref(),
            &self.config,
            self.collaborators.notifier.as_ref(),
        )
        .await?;
        self.confirmation = Some(confirmation);
        Ok(true)
    }

    pub fn confirmation(&self) -> Option<&ConfirmationSession> {
        self.confirmation.as_ref()
    }

    pub fn cancel_confirmation(&mut self) {
        if let Some(mut confirmation) = self.confirmation.take() {
            confirmation.cancel();
        }
    }

    /// Returns the signed transaction for broadcast once the confirmation
    /// gate is ready. Earlier calls do nothing.
    pub fn confirm(&mut self) -> Option<(SignedTransaction, DecodedTransaction)> {
        let confirmed = self.confirmation.as_mut()?.confirm()?;
        self.confirmation = None;
        Some(confirmed)
    }
}

impl Drop for SendSession {
    fn drop(&mut self) {
        for handle in self.estimates.drain(..) {
            handle.abort();
        }
    }
}
