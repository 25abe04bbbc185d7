//! A route provider backed by the Liquidity Book quoter contract

use std::{sync::Arc, time::Duration};

use alloy::{network::TransactionBuilder, rpc::types::TransactionRequest};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::{
    abis::ILBQuoter::{findBestPathFromAmountInCall, findBestPathFromAmountOutCall, Quote},
    chain_client::{errors::ChainClientError, ChainClient},
    error::SwapResult,
    helpers::{retry_with_backoff, RetryConfig},
    routing::{QuoteRequest, RouteProvider},
    types::{Route, TokenAmount, Trade, TradeType},
};

/// Quotes routes by calling the quoter contract once per route, concurrently
#[derive(Clone)]
pub struct LbQuoterProvider {
    /// The client used for read-only calls
    client: Arc<dyn ChainClient>,
    /// The address of the quoter contract
    quoter_address: Address,
    /// The bound on a single quoter call
    call_timeout: Duration,
    /// The retry policy for quoter calls
    retry: RetryConfig,
}

impl LbQuoterProvider {
    /// Create a new provider
    pub fn new(
        client: Arc<dyn ChainClient>,
        quoter_address: Address,
        call_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self { client, quoter_address, call_timeout, retry }
    }

    /// Quote a single route, returning `None` if the route has no liquidity
    async fn quote_route(
        &self,
        route: &Route,
        request: &QuoteRequest,
    ) -> Result<Option<Trade>, ChainClientError> {
        let amount: u128 = request
            .amount
            .raw()
            .try_into()
            .map_err(|_| ChainClientError::abi("quote amount overflows uint128"))?;

        let path = route.addresses();
        let calldata = match request.trade_type {
            TradeType::ExactIn => {
                findBestPathFromAmountInCall { route: path, amountIn: amount }.abi_encode()
            },
            TradeType::ExactOut => {
                findBestPathFromAmountOutCall { route: path, amountOut: amount }.abi_encode()
            },
        };

        let tx = TransactionRequest::default().with_to(self.quoter_address).with_input(calldata);
        let (client, tx, call_timeout) = (&self.client, &tx, self.call_timeout);
        let output = retry_with_backoff(
            &self.retry,
            "quoter call",
            ChainClientError::is_transient,
            || async move {
                tokio::time::timeout(call_timeout, client.call(tx))
                    .await
                    .map_err(|_| ChainClientError::rpc("quoter call timed out"))?
            },
        )
        .await?;

        // Both quoter methods return the same `Quote` struct
        let quote = match request.trade_type {
            TradeType::ExactIn => findBestPathFromAmountInCall::abi_decode_returns(&output)?,
            TradeType::ExactOut => findBestPathFromAmountOutCall::abi_decode_returns(&output)?,
        };

        Ok(trade_from_quote(route, request, quote))
    }
}

#[async_trait]
impl RouteProvider for LbQuoterProvider {
    #[instrument(skip_all, fields(routes = routes.len(), amount = %request.amount))]
    async fn get_trades(
        &self,
        routes: &[Route],
        request: &QuoteRequest,
    ) -> SwapResult<Vec<Trade>> {
        let quote_futures = routes.iter().map(|route| async move {
            let quote_res = self.quote_route(route, request).await;
            (route, quote_res)
        });
        let quote_results = join_all(quote_futures).await;

        let mut trades = Vec::new();
        for (route, quote_res) in quote_results {
            match quote_res {
                Ok(Some(trade)) => {
                    info!("{route} quoted {}", trade.quoted_amount());
                    trades.push(trade);
                },
                Ok(None) => warn!("{route} has insufficient liquidity"),
                Err(e) => warn!("Error quoting {route}: {e}"),
            }
        }

        Ok(trades)
    }
}

// -----------
// | Helpers |
// -----------

/// Convert a quoter response into a trade, discarding quotes for routes that
/// lack a pair or liquidity at some hop
fn trade_from_quote(route: &Route, request: &QuoteRequest, quote: Quote) -> Option<Trade> {
    let hops = route.hops();
    let well_formed = quote.pairs.len() == hops
        && quote.binSteps.len() == hops
        && quote.versions.len() == hops
        && quote.amounts.len() == hops + 1;
    if !well_formed || quote.pairs.iter().any(|pair| pair.is_zero()) {
        return None;
    }

    if quote.amounts.iter().any(|amount| *amount == 0) {
        return None;
    }

    let amount_in = U256::from(quote.amounts[0]);
    let amount_out = U256::from(quote.amounts[hops]);
    let without_slippage = match request.trade_type {
        TradeType::ExactIn => quote.virtualAmountsWithoutSlippage.last().copied(),
        TradeType::ExactOut => quote.virtualAmountsWithoutSlippage.first().copied(),
    }
    .map(U256::from)
    .unwrap_or_default();

    Some(Trade {
        route: route.clone(),
        trade_type: request.trade_type,
        input_amount: TokenAmount::new(route.input().clone(), amount_in),
        output_amount: TokenAmount::new(route.output().clone(), amount_out),
        pairs: quote.pairs,
        bin_steps: quote.binSteps,
        versions: quote.versions,
        fees: quote.fees,
        quoted_amount_without_slippage: without_slippage,
        is_native_in: request.is_native_in,
        is_native_out: request.is_native_out,
    })
}
