//! Routes through the pair graph

use std::fmt::Display;

use alloy_primitives::Address;
use itertools::Itertools;

use crate::{
    error::{SwapError, SwapResult},
    types::Token,
};

/// An ordered path of tokens from the input token to the output token, passing
/// through zero or more intermediate base tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The tokens along the path, input first
    tokens: Vec<Token>,
}

impl Route {
    /// Create a route from its token path
    pub fn new(tokens: Vec<Token>) -> SwapResult<Self> {
        if tokens.len() < 2 {
            return Err(SwapError::config("a route needs at least two tokens"));
        }

        if !tokens.iter().all_unique() {
            return Err(SwapError::config("a route may not revisit a token"));
        }

        Ok(Self { tokens })
    }

    /// The token being sold
    pub fn input(&self) -> &Token {
        &self.tokens[0]
    }

    /// The token being bought
    pub fn output(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// The tokens along the path
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The token addresses along the path
    pub fn addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|token| token.address).collect()
    }

    /// The number of pairs traversed
    pub fn hops(&self) -> usize {
        self.tokens.len() - 1
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.iter().join(" -> "))
    }
}
