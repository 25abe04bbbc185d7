//! Route enumeration and quoting
//!
//! The workflow consumes routing through the [`RouteProvider`] trait; whether
//! the provider quotes routes sequentially or concurrently is its own concern,
//! the workflow only relies on all quotes being available once `get_trades`
//! returns.

use async_trait::async_trait;

use crate::{
    error::SwapResult,
    types::{Route, Token, TokenAmount, Trade, TradeType},
};

pub mod quoter;
pub mod routes;

use routes::{create_all_routes, create_all_token_pairs};

/// The parameters of a pricing request
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    /// The fixed amount; the input amount for exact-in trades, the output
    /// amount for exact-out trades
    pub amount: TokenAmount,
    /// Which side of the trade is fixed
    pub trade_type: TradeType,
    /// Whether the input is paid in the native asset
    pub is_native_in: bool,
    /// Whether the output is paid out in the native asset
    pub is_native_out: bool,
}

/// A source of candidate routes and per-route quotes
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Enumerate the candidate routes from `input` to `output` through `bases`
    fn create_routes(
        &self,
        input: &Token,
        output: &Token,
        bases: &[Token],
        max_hops: usize,
    ) -> Vec<Route> {
        let pairs = create_all_token_pairs(input, output, bases);
        create_all_routes(&pairs, input, output, max_hops)
    }

    /// Quote the request along each route, returning one trade per route that
    /// produced a usable quote
    async fn get_trades(&self, routes: &[Route], request: &QuoteRequest)
        -> SwapResult<Vec<Trade>>;
}
