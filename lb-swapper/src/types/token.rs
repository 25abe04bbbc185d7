//! Token identities and amounts denominated in them

use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use alloy_primitives::{utils::parse_units, Address, U256};
use bigdecimal::{
    num_bigint::{BigInt, Sign},
    BigDecimal,
};

use crate::error::{SwapError, SwapResult};

/// The number of significant digits used when displaying amounts
pub const DISPLAY_SIGNIFICANT_DIGITS: u64 = 6;

// ---------
// | Token |
// ---------

/// An ERC20 token deployed on a specific chain
///
/// Two tokens are equal when they share a chain and a contract address,
/// regardless of metadata
#[derive(Debug, Clone)]
pub struct Token {
    /// The chain the token is deployed on
    pub chain_id: u64,
    /// The token contract
    pub address: Address,
    /// The number of decimals in one whole unit of the token
    pub decimals: u8,
    /// The ticker
    pub symbol: String,
    /// The human readable name
    pub name: String,
}

impl Token {
    /// Create a new token
    pub fn new(chain_id: u64, address: Address, decimals: u8, symbol: &str, name: &str) -> Self {
        Self { chain_id, address, decimals, symbol: symbol.to_string(), name: name.to_string() }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

// ---------------
// | TokenAmount |
// ---------------

/// An amount of a token, in the token's smallest unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    /// The token the amount is denominated in
    token: Token,
    /// The amount in atoms
    raw: U256,
}

impl TokenAmount {
    /// Create a new amount from atoms
    pub fn new(token: Token, raw: U256) -> Self {
        Self { token, raw }
    }

    /// Parse a user-facing decimal string, e.g. `"0.01"`, using exactly the
    /// token's declared precision
    ///
    /// Signs and fractional digits beyond the token's decimals are rejected
    /// rather than rounded
    pub fn parse(token: &Token, value: &str) -> SwapResult<Self> {
        let value = value.trim();
        if value.is_empty() || value == "." {
            return Err(SwapError::parse("empty amount"));
        }

        if value.starts_with('-') || value.starts_with('+') {
            return Err(SwapError::parse(format!("amount must be unsigned: {value}")));
        }

        if let Some((_, fraction)) = value.split_once('.') {
            if fraction.len() > token.decimals as usize {
                return Err(SwapError::parse(format!(
                    "{value} has more than {} fractional digits for {}",
                    token.decimals, token.symbol
                )));
            }
        }

        let parsed = parse_units(value, token.decimals).map_err(SwapError::parse)?;
        Ok(Self::new(token.clone(), parsed.get_absolute()))
    }

    /// The token the amount is denominated in
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The amount in atoms
    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// The amount in whole units of the token
    pub fn to_decimal(&self) -> BigDecimal {
        to_big_decimal(self.raw, self.token.decimals as i64)
    }

    /// The exact decimal representation, without trailing zeros
    pub fn to_exact(&self) -> String {
        self.to_decimal().normalized().to_plain_string()
    }

    /// The decimal representation rounded to the given significant digits
    pub fn to_significant(&self, digits: u64) -> String {
        to_significant(&self.to_decimal(), digits)
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_significant(DISPLAY_SIGNIFICANT_DIGITS), self.token)
    }
}

// -----------
// | Helpers |
// -----------

/// Interpret an unsigned integer as a decimal with the given scale
pub fn to_big_decimal(raw: U256, scale: i64) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &raw.to_be_bytes::<32>());
    BigDecimal::new(digits, scale)
}

/// Round a decimal to the given number of significant digits for display
pub fn to_significant(value: &BigDecimal, digits: u64) -> String {
    value.with_prec(digits).normalized().to_plain_string()
}
