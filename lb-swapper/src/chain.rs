//! Supported chains, their deployments, and the tokens known on them

use std::{fs, path::Path, str::FromStr};

use alloy_primitives::{hex, Address};
use clap::ValueEnum;
use serde::Deserialize;

use crate::{
    error::{SwapError, SwapResult},
    types::Token,
};

// -------------
// | Constants |
// -------------

/// The Liquidity Book v2.1 router, deployed at the same address on Avalanche
/// and Fuji
pub const LB_ROUTER_ADDRESS: Address =
    Address::new(hex!("0xb4315e873dBcf96Ffd0acd8EA43f689D8c20fB30"));
/// The Liquidity Book v2.1 quoter, deployed at the same address on Avalanche
/// and Fuji
pub const LB_QUOTER_ADDRESS: Address =
    Address::new(hex!("0xd76019A16606FDa4651f636D9751f500Ed776250"));

/// WAVAX on Avalanche C-Chain
const AVALANCHE_WAVAX: Address = Address::new(hex!("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7"));
/// USDC on Avalanche C-Chain
const AVALANCHE_USDC: Address = Address::new(hex!("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"));
/// USDT on Avalanche C-Chain
const AVALANCHE_USDT: Address = Address::new(hex!("0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7"));

/// WAVAX on Fuji
const FUJI_WAVAX: Address = Address::new(hex!("0xd00ae08403B9bbb9124bB305C09058E32C39A48c"));
/// The Trader Joe test USDC on Fuji
const FUJI_USDC: Address = Address::new(hex!("0xB6076C93701D6a07266c31066B298AeC6dd65c2d"));
/// The Trader Joe test USDT on Fuji
const FUJI_USDT: Address = Address::new(hex!("0xAb231A5744C8E6c45481754928cCfFFFD4aa0732"));

// ---------
// | Chain |
// ---------

/// A chain with a Liquidity Book v2.1 deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Chain {
    /// Avalanche C-Chain mainnet
    Avalanche,
    /// Avalanche Fuji testnet
    Fuji,
}

impl Chain {
    /// The EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Avalanche => 43114,
            Chain::Fuji => 43113,
        }
    }

    /// The wrapped native asset
    pub fn wrapped_native(&self) -> Token {
        let address = match self {
            Chain::Avalanche => AVALANCHE_WAVAX,
            Chain::Fuji => FUJI_WAVAX,
        };
        Token::new(self.chain_id(), address, 18, "WAVAX", "Wrapped AVAX")
    }

    /// The tokens known on the chain without a token file, wrapped native first
    pub fn default_tokens(&self) -> Vec<Token> {
        let (usdc, usdt) = match self {
            Chain::Avalanche => (AVALANCHE_USDC, AVALANCHE_USDT),
            Chain::Fuji => (FUJI_USDC, FUJI_USDT),
        };

        vec![
            self.wrapped_native(),
            Token::new(self.chain_id(), usdc, 6, "USDC", "USD Coin"),
            Token::new(self.chain_id(), usdt, 6, "USDT", "Tether USD"),
        ]
    }
}

// -------------
// | TokenList |
// -------------

/// A token entry in a token file
#[derive(Debug, Deserialize)]
struct TokenEntry {
    /// The token contract
    address: Address,
    /// The token's decimals
    decimals: u8,
    /// The ticker
    symbol: String,
    /// The human readable name
    #[serde(default)]
    name: String,
}

/// The tokens the swapper can resolve by symbol or address on one chain
#[derive(Debug, Clone)]
pub struct TokenList {
    /// The chain the tokens live on
    chain_id: u64,
    /// The known tokens, in insertion order
    tokens: Vec<Token>,
}

impl TokenList {
    /// The default token list of a chain
    pub fn for_chain(chain: Chain) -> Self {
        Self { chain_id: chain.chain_id(), tokens: chain.default_tokens() }
    }

    /// Add the tokens from a JSON file holding an array of
    /// `{ address, decimals, symbol, name }` entries
    pub fn extend_from_file(&mut self, path: &Path) -> SwapResult<()> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SwapError::config(format!("reading {}: {e}", path.display())))?;
        self.extend_from_json(&contents)
    }

    /// Add the tokens from a JSON array of token entries
    ///
    /// An entry whose address is already known replaces the existing token
    pub fn extend_from_json(&mut self, json: &str) -> SwapResult<()> {
        let entries: Vec<TokenEntry> = serde_json::from_str(json).map_err(SwapError::parse)?;
        for entry in entries {
            let token = Token::new(
                self.chain_id,
                entry.address,
                entry.decimals,
                &entry.symbol,
                &entry.name,
            );

            match self.tokens.iter_mut().find(|known| **known == token) {
                Some(known) => *known = token,
                None => self.tokens.push(token),
            }
        }

        Ok(())
    }

    /// Resolve a token by contract address or case-insensitive symbol
    pub fn resolve(&self, symbol_or_address: &str) -> SwapResult<Token> {
        let needle = symbol_or_address.trim();
        let found = match Address::from_str(needle) {
            Ok(address) => self.tokens.iter().find(|token| token.address == address),
            Err(_) => self.tokens.iter().find(|token| token.symbol.eq_ignore_ascii_case(needle)),
        };

        found.cloned().ok_or_else(|| SwapError::config(format!("unknown token: {needle}")))
    }

    /// Resolve a comma separated list of tokens
    pub fn resolve_all(&self, list: &str) -> SwapResult<Vec<Token>> {
        list.split(',').filter(|s| !s.trim().is_empty()).map(|s| self.resolve(s)).collect()
    }
}
