//! Timed confirmation of a signed transaction.

mod decoder;
mod gate;

pub use decoder::{decode_signed_transaction, DecodedTransaction};
pub use gate::{ConfirmationGate, GateState};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ethers::types::Address;
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::collaborators::{NotificationLevel, Notifier, TokenRegistry, Wallet};
use crate::config::EngineConfig;
use crate::draft::SignedTransaction;
use crate::helpers::lock;
use crate::prelude::*;

/// Owns the countdown task. Stopping or dropping it aborts the task, so no
/// tick lands after the gate has been abandoned.
#[derive(Debug)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn start(gate: Arc<Mutex<ConfirmationGate>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let mut state = lock(&gate);
                if !state.tick() || state.state() != GateState::CountingDown {
                    debug!("countdown finished in state {:?}", state.state());
                    break;
                }
                debug!("{}s left before confirm", state.seconds_remaining());
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationState {
    pub from_address: Address,
    pub seconds_remaining: u32,
    pub decoded: DecodedTransaction,
}

/// A signed transaction under review. Dropping the session cancels its
/// countdown.
#[derive(Debug)]
pub struct ConfirmationSession {
    signed: SignedTransaction,
    decoded: DecodedTransaction,
    from_address: Address,
    gate: Arc<Mutex<ConfirmationGate>>,
    countdown: Countdown,
    notification_duration: Duration,
}

impl ConfirmationSession {
    /// Decodes `signed`, resolves the sending address and starts the
    /// countdown. Failures are reported through `notifier` once.
    pub async fn start(
        signed: SignedTransaction,
        wallet: &dyn Wallet,
        registry: &dyn TokenRegistry,
        config: &EngineConfig,
        notifier: &dyn Notifier,
    ) -> Result<Self> {
        let prepared = Self::prepare(&signed, wallet, registry, config).await;
        let (decoded, from_address) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                notifier.notify(
                    NotificationLevel::Danger,
                    &e.to_string(),
                    Some(config.notification_duration()),
                );
                return Err(e);
            }
        };

        let gate = Arc::new(Mutex::new(ConfirmationGate::new(config.countdown_secs)));
        let countdown = Countdown::start(gate.clone(), config.tick_interval());
        info!(
            "confirming {} {} to {:?} from {from_address:?}",
            decoded.value, decoded.symbol, decoded.to_address
        );

        Ok(Self {
            signed,
            decoded,
            from_address,
            gate,
            countdown,
            notification_duration: config.notification_duration(),
        })
    }

    async fn prepare(
        signed: &SignedTransaction,
        wallet: &dyn Wallet,
        registry: &dyn TokenRegistry,
        config: &EngineConfig,
    ) -> Result<(DecodedTransaction, Address)> {
        let decoded = decode_signed_transaction(signed, registry, &config.network)?;
        let from_address = wallet_address(wallet).await?;
        Ok((decoded, from_address))
    }

    /// Re-resolves the sending address after the wallet changed. On failure
    /// the previous address is kept and `notifier` is told once.
    pub async fn reload_wallet(
        &mut self,
        wallet: &dyn Wallet,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        match wallet_address(wallet).await {
            Ok(address) => {
                debug!("confirmation wallet reloaded: {address:?}");
                self.from_address = address;
                Ok(())
            }
            Err(e) => {
                notifier.notify(
                    NotificationLevel::Danger,
                    &e.to_string(),
                    Some(self.notification_duration),
                );
                Err(e)
            }
        }
    }

    pub fn signed(&self) -> &SignedTransaction {
        &self.signed
    }

    pub fn decoded(&self) -> &DecodedTransaction {
        &self.decoded
    }

    pub fn from_address(&self) -> Address {
        self.from_address
    }

    pub fn seconds_remaining(&self) -> u32 {
        lock(&self.gate).seconds_remaining()
    }

    pub fn gate_state(&self) -> GateState {
        lock(&self.gate).state()
    }

    pub fn can_confirm(&self) -> bool {
        lock(&self.gate).can_confirm()
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn snapshot(&self) -> ConfirmationState {
        ConfirmationState {
            from_address: self.from_address,
            seconds_remaining: self.seconds_remaining(),
            decoded: self.decoded.clone(),
        }
    }

    /// Hands back the signed transaction once the gate is ready; `None`
    /// while counting down or after cancellation.
    pub fn confirm(&mut self) -> Option<(SignedTransaction, DecodedTransaction)> {
        let confirmed = lock(&self.gate).confirm();
        if !confirmed {
            return None;
        }
        self.countdown.stop();
        info!("transaction confirmed by {:?}", self.from_address);
        Some((self.signed.clone(), self.decoded.clone()))
    }

    pub fn cancel(&mut self) -> bool {
        let cancelled = lock(&self.gate).cancel();
        self.countdown.stop();
        cancelled
    }
}

async fn wallet_address(wallet: &dyn Wallet) -> Result<Address> {
    wallet.get_address().await.map_err(|e| match e {
        Error::WalletUnavailable(_) => e,
        other => Error::WalletUnavailable(other.to_string()),
    })
}
