use std::sync::Arc;

use log::info;
use tx_drafting::prelude::Result;
use tx_drafting::{
    Balances, Collaborators, EngineConfig, LocalWalletSigner, LogNotifier, ProviderNode,
    SendSession, StaticTokenRegistry,
};

const RPC_URL_ENV: &str = "TX_DRAFTING_RPC_URL";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = EngineConfig::from_env()?;
    let rpc_url =
        std::env::var(RPC_URL_ENV).unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());

    // Key was randomly generated for testing and shouldn't be used with any real funds
    let wallet = LocalWalletSigner::from_private_key(
        "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e",
        config.network.chain_id,
    )?;

    let collaborators = Collaborators {
        wallet: Arc::new(wallet),
        node: Arc::new(ProviderNode::connect(&rpc_url)?),
        registry: Arc::new(StaticTokenRegistry::new(config.tokens.clone())),
        notifier: Arc::new(LogNotifier),
    };
    let countdown = config.countdown_secs;
    let tick = config.tick_interval();
    let mut session = SendSession::new(collaborators, config, Balances::default())?;

    session.set_recipient_and_amount(
        "0x1234567890123456789012345678901234567890",
        "0.01",
        "ether",
        None,
    )?;
    session.settle().await;
    info!("draft: {:#?}", session.draft());

    let signed = session.generate_transaction().await?;
    info!("signed: {}", signed.signed_tx);

    if !session.open_confirmation().await? {
        return Ok(());
    }
    tokio::time::sleep(tick * (countdown + 1)).await;

    match session.confirm() {
        Some((signed, decoded)) => {
            info!("confirmed {} {} to {:?}", decoded.value, decoded.symbol, decoded.to_address);
            println!("{}", signed.signed_tx);
        }
        None => info!("confirmation not ready"),
    }
    session.stop();
    Ok(())
}
