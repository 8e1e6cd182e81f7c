use std::sync::Arc;

use log::info;
use tx_drafting::prelude::Result;
use tx_drafting::{
    parse_query_string, Balances, DraftStore, EngineConfig, StaticTokenRegistry, Token,
    TransactionDraft, DAI_MAINNET, USDC_MAINNET,
};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = EngineConfig::from_env()?;
    let mut tokens = config.tokens.clone();
    if tokens.is_empty() {
        tokens = vec![
            Token {
                symbol: "DAI".to_string(),
                address: DAI_MAINNET.parse().unwrap(),
                decimals: 18,
            },
            Token {
                symbol: "USDC".to_string(),
                address: USDC_MAINNET.parse().unwrap(),
                decimals: 6,
            },
        ];
    }
    let registry = Arc::new(StaticTokenRegistry::new(tokens));

    // e.g. "to=0x1234567890123456789012345678901234567890&value=1.5&tokenSymbol=DAI"
    let query = std::env::args().nth(1).unwrap_or_default();
    let query = parse_query_string(&query);
    info!(
        "link preset keys: {:?}",
        query.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
    );

    let (mut store, pending) =
        DraftStore::with_query(&config, registry, Balances::default(), &query);
    println!("📝 Draft from link preset");
    print_draft(store.draft());
    println!("  Estimate requested: {}", pending.is_some());

    println!("\n✅ Approving 100 USDC to the default spender");
    match store.set_allowance_amount("100", "USDC") {
        Ok(_) => print_draft(store.draft()),
        Err(e) => println!("  Skipped: {e}"),
    }

    Ok(())
}

fn print_draft(draft: &TransactionDraft) {
    println!("  Kind: {:?}", draft.kind);
    println!("  Recipient: {}", draft.recipient);
    println!("  Amount: {} {}", draft.amount_value, draft.amount_unit.symbol());
    println!("  Allowance: {} {}", draft.allow_amount, draft.allow_unit.symbol());
    println!("  Gas Limit: {}", draft.gas_limit);
    println!("  Calldata: {}", draft.calldata);
    println!("  Read Only: {}", draft.read_only);
    println!("  Readiness: {:?}", draft.readiness());
}
