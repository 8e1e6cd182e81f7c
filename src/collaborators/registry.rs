use ethers::types::Address;

use crate::units::Token;

pub trait TokenRegistry: Send + Sync {
    /// Exact, case-sensitive symbol lookup.
    fn resolve(&self, symbol: &str) -> Option<Token>;

    fn find_by_address(&self, address: &Address) -> Option<Token>;

    fn tokens(&self) -> Vec<Token>;
}

/// Registry over a fixed token list, usually [`crate::EngineConfig::tokens`].
#[derive(Debug, Clone, Default)]
pub struct StaticTokenRegistry {
    tokens: Vec<Token>,
}

impl StaticTokenRegistry {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl TokenRegistry for StaticTokenRegistry {
    fn resolve(&self, symbol: &str) -> Option<Token> {
        self.tokens.iter().find(|t| t.symbol == symbol).cloned()
    }

    fn find_by_address(&self, address: &Address) -> Option<Token> {
        self.tokens.iter().find(|t| &t.address == address).cloned()
    }

    fn tokens(&self) -> Vec<Token> {
        let mut tokens = self.tokens.clone();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StaticTokenRegistry {
        StaticTokenRegistry::new(vec![
            Token {
                symbol: "USDC".to_string(),
                address: Address::repeat_byte(0xaf),
                decimals: 6,
            },
            Token {
                symbol: "DAI".to_string(),
                address: Address::repeat_byte(0xda),
                decimals: 18,
            },
        ])
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = registry();
        assert_eq!(registry.resolve("DAI").unwrap().decimals, 18);
        assert!(registry.resolve("dai").is_none());
        assert!(registry.resolve("MKR").is_none());
    }

    #[test]
    fn test_find_by_address_and_sorted_listing() {
        let registry = registry();
        let usdc = registry.find_by_address(&Address::repeat_byte(0xaf)).unwrap();
        assert_eq!(usdc.symbol, "USDC");
        assert!(registry.find_by_address(&Address::zero()).is_none());

        let symbols: Vec<_> = registry.tokens().into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["DAI", "USDC"]);
    }
}
