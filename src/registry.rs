// Chain and token registry
// Static network metadata and well-known token addresses for the chains
// the router quotes on
//
// Numan Thabit 2025 Nov

use serde::Serialize;

pub const NATIVE_TOKEN: &str = "0x0000000000000000000000000000000000000000";
/// How the 1inch API spells the native currency.
pub const NATIVE_MARKER: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
/// Stand-in hop used when a chain has no registered hub tokens left to route through.
pub const PLACEHOLDER_HOP: &str = "0x...";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub key: &'static str,
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub native_currency: NativeCurrency,
    pub layer_zero_chain_id: u32,
}

const ETHER: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

const MATIC: NativeCurrency = NativeCurrency {
    name: "MATIC",
    symbol: "MATIC",
    decimals: 18,
};

pub const CHAINS: &[ChainInfo] = &[
    ChainInfo {
        key: "ethereum",
        chain_id: 1,
        name: "Ethereum",
        rpc_url: "https://eth.llamarpc.com",
        explorer_url: "https://etherscan.io",
        native_currency: ETHER,
        layer_zero_chain_id: 101,
    },
    ChainInfo {
        key: "polygon",
        chain_id: 137,
        name: "Polygon",
        rpc_url: "https://polygon.llamarpc.com",
        explorer_url: "https://polygonscan.com",
        native_currency: MATIC,
        layer_zero_chain_id: 109,
    },
    ChainInfo {
        key: "base",
        chain_id: 8453,
        name: "Base",
        rpc_url: "https://base.llamarpc.com",
        explorer_url: "https://basescan.org",
        native_currency: ETHER,
        layer_zero_chain_id: 184,
    },
    ChainInfo {
        key: "arbitrum",
        chain_id: 42161,
        name: "Arbitrum One",
        rpc_url: "https://arbitrum.llamarpc.com",
        explorer_url: "https://arbiscan.io",
        native_currency: ETHER,
        layer_zero_chain_id: 110,
    },
    ChainInfo {
        key: "optimism",
        chain_id: 10,
        name: "Optimism",
        rpc_url: "https://optimism.llamarpc.com",
        explorer_url: "https://optimistic.etherscan.io",
        native_currency: ETHER,
        layer_zero_chain_id: 111,
    },
    ChainInfo {
        key: "sepolia",
        chain_id: 11155111,
        name: "Ethereum Sepolia",
        rpc_url: "https://sepolia.llamarpc.com",
        explorer_url: "https://sepolia.etherscan.io",
        native_currency: ETHER,
        layer_zero_chain_id: 40161,
    },
    ChainInfo {
        key: "polygonMumbai",
        chain_id: 80001,
        name: "Polygon Mumbai",
        rpc_url: "https://polygon-mumbai.llamarpc.com",
        explorer_url: "https://mumbai.polygonscan.com",
        native_currency: MATIC,
        layer_zero_chain_id: 40109,
    },
    ChainInfo {
        key: "baseSepolia",
        chain_id: 84532,
        name: "Base Sepolia",
        rpc_url: "https://base-sepolia.llamarpc.com",
        explorer_url: "https://sepolia.basescan.org",
        native_currency: ETHER,
        layer_zero_chain_id: 40184,
    },
];

/// (chain id, symbol, address, decimals)
const COMMON_TOKENS: &[(u64, &str, &str, u8)] = &[
    (1, "USDC", "0xA0b86a33E6441b8C4C8C0E1234567890abcdef12", 6),
    (1, "USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7", 6),
    (1, "WETH", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18),
    (137, "USDC", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", 6),
    (137, "USDT", "0xc2132D05D31c914a87C6611C10748AEb04B58e8F", 6),
    (137, "WMATIC", "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270", 18),
    (42161, "USDC", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", 6),
    (42161, "USDT", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", 6),
    (42161, "WETH", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", 18),
    (10, "USDC", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85", 6),
    (10, "USDT", "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58", 6),
    (10, "WETH", "0x4200000000000000000000000000000000000006", 18),
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

pub fn chain(chain_id: u64) -> Option<&'static ChainInfo> {
    CHAINS.iter().find(|c| c.chain_id == chain_id)
}

pub fn token_address(chain_id: u64, symbol: &str) -> Option<&'static str> {
    COMMON_TOKENS
        .iter()
        .find(|(id, sym, _, _)| *id == chain_id && sym.eq_ignore_ascii_case(symbol))
        .map(|(_, _, addr, _)| *addr)
}

/// Decimals of a token the registry knows on `chain_id`. The zero address
/// and the 1inch `0xEeee…` marker both mean the native currency.
pub fn token_decimals(chain_id: u64, address: &str) -> Option<u8> {
    let info = chain(chain_id)?;
    if address.eq_ignore_ascii_case(NATIVE_TOKEN) || address.eq_ignore_ascii_case(NATIVE_MARKER) {
        return Some(info.native_currency.decimals);
    }
    COMMON_TOKENS
        .iter()
        .find(|(id, _, addr, _)| *id == chain_id && addr.eq_ignore_ascii_case(address))
        .map(|(_, _, _, decimals)| *decimals)
        .or_else(|| {
            supported_tokens(chain_id)
                .into_iter()
                .find(|t| t.address.eq_ignore_ascii_case(address))
                .map(|t| t.decimals)
        })
}

/// Registered tokens for a chain, in declaration order; used as intermediate hops.
pub fn hub_tokens(chain_id: u64) -> Vec<&'static str> {
    COMMON_TOKENS
        .iter()
        .filter(|(id, _, _, _)| *id == chain_id)
        .map(|(_, _, addr, _)| *addr)
        .collect()
}

/// Tokens offered for selection on a chain: the native currency everywhere,
/// plus the major stablecoins and wrapped ether on Ethereum mainnet.
pub fn supported_tokens(chain_id: u64) -> Vec<TokenInfo> {
    let Some(info) = chain(chain_id) else {
        return Vec::new();
    };

    let mut tokens = vec![TokenInfo {
        address: NATIVE_TOKEN.to_string(),
        symbol: info.native_currency.symbol.to_string(),
        name: info.native_currency.name.to_string(),
        decimals: info.native_currency.decimals,
    }];

    if chain_id == 1 {
        for (address, symbol, name, decimals) in [
            ("0xA0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", "USD Coin", 6),
            ("0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", "Tether USD", 6),
            ("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH", "Wrapped Ether", 18),
        ] {
            tokens.push(TokenInfo {
                address: address.to_string(),
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals,
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        assert_eq!(chain(42161).map(|c| c.name), Some("Arbitrum One"));
        assert_eq!(chain(8453).map(|c| c.layer_zero_chain_id), Some(184));
        assert!(chain(999).is_none());
    }

    #[test]
    fn token_lookup_ignores_case() {
        assert_eq!(
            token_address(137, "wmatic"),
            Some("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270")
        );
        assert!(token_address(8453, "USDC").is_none());
        assert_eq!(hub_tokens(10).len(), 3);
        assert!(hub_tokens(8453).is_empty());
    }

    #[test]
    fn decimals_follow_the_token() {
        assert_eq!(token_decimals(1, NATIVE_TOKEN), Some(18));
        assert_eq!(token_decimals(137, NATIVE_MARKER), Some(18));
        assert_eq!(token_decimals(1, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), Some(6));
        assert_eq!(token_decimals(1, "0xA0b86a33E6441b8C4C8C0E1234567890abcdef12"), Some(6));
        assert_eq!(token_decimals(42161, "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"), Some(18));
        assert_eq!(token_decimals(1, "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"), None);
        assert_eq!(token_decimals(999, NATIVE_TOKEN), None);
    }

    #[test]
    fn supported_tokens_per_chain() {
        let mainnet = supported_tokens(1);
        assert_eq!(mainnet.len(), 4);
        assert_eq!(mainnet[0].address, NATIVE_TOKEN);
        assert_eq!(mainnet[0].symbol, "ETH");

        let polygon = supported_tokens(137);
        assert_eq!(polygon.len(), 1);
        assert_eq!(polygon[0].symbol, "MATIC");

        assert!(supported_tokens(12345).is_empty());
    }
}
