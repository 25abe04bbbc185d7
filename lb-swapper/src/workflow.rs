//! The end to end swap: quote every route, pick the best trade, approve the
//! router if needed, then swap

use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use tracing::{info, instrument};

use crate::{
    allowance::AllowanceManager,
    chain_client::{ChainClient, TxReceipt},
    error::{SwapError, SwapResult},
    executor::SwapExecutor,
    helpers::{unix_now, RetryConfig},
    instructions::SwapInstructions,
    reporter::{report, ReportLine},
    routing::{QuoteRequest, RouteProvider},
    selector::choose_best,
    types::{Token, TokenAmount, Trade, TradeOptions, TradeType},
};

/// The static configuration of a swap run
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// The Liquidity Book router
    pub router_address: Address,
    /// The chain's wrapped native token
    pub wrapped_native: Token,
    /// The intermediate tokens routes may pass through
    pub bases: Vec<Token>,
    /// The maximum number of pairs in a route
    pub max_hops: usize,
    /// Treat the wrapped native token as a plain ERC20 rather than paying or
    /// receiving the native asset
    pub use_wrapped: bool,
    /// The bound on quoting all routes, which must outlast a single route's
    /// retried quoter calls
    pub quote_timeout: Duration,
    /// The bound on waiting for each transaction to be mined
    pub confirmation_timeout: Duration,
    /// The interval between receipt polls
    pub poll_interval: Duration,
    /// The retry policy for read-only calls
    pub retry: RetryConfig,
}

/// The trade the user asked for
#[derive(Debug, Clone)]
pub struct TradeParams {
    /// The token sold
    pub input: Token,
    /// The token bought
    pub output: Token,
    /// The fixed amount as a decimal string, of the input for exact-in trades
    /// and of the output for exact-out trades
    pub amount: String,
    /// Which side of the trade is fixed
    pub trade_type: TradeType,
    /// Slippage, deadline, and recipient preferences
    pub options: TradeOptions,
}

/// The result of a completed swap
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    /// The trade executed
    pub trade: Trade,
    /// The quote summary of the trade
    pub report: Vec<ReportLine>,
    /// The approval receipt, if an approval was needed
    pub approval: Option<TxReceipt>,
    /// The swap receipt
    pub swap: TxReceipt,
}

/// Runs swaps against injected chain and routing collaborators
#[derive(Clone)]
pub struct SwapWorkflow {
    /// The source of quotes
    route_provider: Arc<dyn RouteProvider>,
    /// The chain the swap is sent to
    client: Arc<dyn ChainClient>,
    /// The run configuration
    config: WorkflowConfig,
    /// Approves the router before swapping
    allowance: AllowanceManager,
    /// Submits the swap
    executor: SwapExecutor,
}

impl SwapWorkflow {
    /// Create a new workflow
    pub fn new(
        route_provider: Arc<dyn RouteProvider>,
        client: Arc<dyn ChainClient>,
        config: WorkflowConfig,
    ) -> Self {
        let allowance = AllowanceManager::new(
            client.clone(),
            config.confirmation_timeout,
            config.poll_interval,
            config.retry.clone(),
        );
        let executor =
            SwapExecutor::new(client.clone(), config.confirmation_timeout, config.poll_interval);

        Self { route_provider, client, config, allowance, executor }
    }

    /// Whether `token` moves as the native asset rather than its wrapped form
    fn is_native(&self, token: &Token) -> bool {
        !self.config.use_wrapped && *token == self.config.wrapped_native
    }

    /// Quote every candidate route and return the best trade
    #[instrument(skip_all, fields(input = %params.input, output = %params.output))]
    pub async fn best_trade(&self, params: &TradeParams) -> SwapResult<Trade> {
        if params.input == params.output {
            return Err(SwapError::config("input and output tokens are the same"));
        }

        let fixed_token = match params.trade_type {
            TradeType::ExactIn => &params.input,
            TradeType::ExactOut => &params.output,
        };
        let amount = TokenAmount::parse(fixed_token, &params.amount)?;
        if amount.is_zero() {
            return Err(SwapError::parse("amount must be positive"));
        }

        let routes = self.route_provider.create_routes(
            &params.input,
            &params.output,
            &self.config.bases,
            self.config.max_hops,
        );
        info!("quoting {} routes for {amount}", routes.len());
        if routes.is_empty() {
            return Err(SwapError::NoViableRoute);
        }

        let request = QuoteRequest {
            amount,
            trade_type: params.trade_type,
            is_native_in: self.is_native(&params.input),
            is_native_out: self.is_native(&params.output),
        };
        let trades = tokio::time::timeout(
            self.config.quote_timeout,
            self.route_provider.get_trades(&routes, &request),
        )
        .await
        .map_err(|_| SwapError::QuoteTimeout)??;

        choose_best(trades, params.trade_type == TradeType::ExactIn)
    }

    /// Run the swap end to end
    ///
    /// Steps run strictly in order and stop at the first failure; the swap is
    /// only submitted once any required approval has been mined
    pub async fn run(&self, params: &TradeParams) -> SwapResult<SwapOutcome> {
        let trade = self.best_trade(params).await?;
        let report = report(&trade);
        for line in &report {
            info!("{line}");
        }

        let instructions = SwapInstructions::from_trade(&trade, &params.options, unix_now())?;
        instructions.validate(unix_now())?;
        info!("swapping through {}", instructions.method_name());

        let account = self.client.signer_address();
        let router = self.config.router_address;
        let approval = self
            .allowance
            .ensure_allowance(
                trade.input_amount.token(),
                account,
                router,
                instructions.required_allowance().unwrap_or_default(),
                trade.is_native_in,
            )
            .await?;

        let swap = self.executor.execute(&instructions, router, account).await?;
        info!("swap {:#x} confirmed", swap.tx_hash);

        Ok(SwapOutcome { trade, report, approval, swap })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;
    use crate::{
        chain_client::errors::ChainClientError,
        routing::{quoter::LbQuoterProvider, routes::DEFAULT_MAX_HOPS},
        test_helpers::{
            mock_quote, mock_trade, usdc, usdt, wavax, MockChainClient, MockEvent,
            MockRouteProvider,
        },
        types::Route,
    };

    const ROUTER: Address = Address::repeat_byte(0x42);

    fn config(use_wrapped: bool) -> WorkflowConfig {
        WorkflowConfig {
            router_address: ROUTER,
            wrapped_native: wavax(),
            bases: vec![wavax(), usdc(), usdt()],
            max_hops: DEFAULT_MAX_HOPS,
            use_wrapped,
            quote_timeout: Duration::from_millis(500),
            confirmation_timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(5),
            retry: RetryConfig::no_retry(),
        }
    }

    fn params(input: Token, output: Token, amount: &str) -> TradeParams {
        TradeParams {
            input,
            output,
            amount: amount.to_string(),
            trade_type: TradeType::ExactIn,
            options: TradeOptions {
                allowed_slippage_bps: 50,
                ttl_secs: 3600,
                recipient: Address::repeat_byte(0x5e),
                fee_on_transfer: false,
            },
        }
    }

    /// A workflow quoting through the quoter contract on the mock chain
    fn quoter_workflow(client: &MockChainClient, use_wrapped: bool) -> SwapWorkflow {
        let provider = LbQuoterProvider::new(
            Arc::new(client.clone()),
            client.quoter_address(),
            Duration::from_millis(50),
            RetryConfig::no_retry(),
        );
        SwapWorkflow::new(Arc::new(provider), Arc::new(client.clone()), config(use_wrapped))
    }

    /// Quote USDT -> WAVAX directly and through USDC, the direct route paying more
    fn quote_usdt_to_wavax(client: &MockChainClient) {
        let direct = Route::new(vec![usdt(), wavax()]).unwrap();
        let via_usdc = Route::new(vec![usdt(), usdc(), wavax()]).unwrap();
        client.set_quote(&direct, Some(mock_quote(&direct, vec![10_000, 400_000_000_000_000])));
        client.set_quote(
            &via_usdc,
            Some(mock_quote(&via_usdc, vec![10_000, 9_990, 399_000_000_000_000])),
        );
    }

    #[tokio::test]
    async fn usdt_to_native_approves_then_swaps() {
        let client = MockChainClient::new();
        quote_usdt_to_wavax(&client);

        let outcome =
            quoter_workflow(&client, false).run(&params(usdt(), wavax(), "0.01")).await.unwrap();

        assert_eq!(outcome.trade.route.tokens(), &[usdt(), wavax()]);
        assert_eq!(outcome.trade.input_amount.raw(), U256::from(10_000u64));
        assert!(outcome.approval.is_some());
        assert!(outcome.swap.success);
        assert_eq!(
            client.tx_events(),
            vec![
                MockEvent::Sent("approve"),
                MockEvent::Confirmed("approve"),
                MockEvent::Sent("swapExactTokensForNATIVE"),
                MockEvent::Confirmed("swapExactTokensForNATIVE"),
            ]
        );
    }

    #[tokio::test]
    async fn wrapped_output_swaps_tokens_for_tokens() {
        let client = MockChainClient::new();
        quote_usdt_to_wavax(&client);

        quoter_workflow(&client, true).run(&params(usdt(), wavax(), "0.01")).await.unwrap();
        assert_eq!(client.sent_methods(), vec!["approve", "swapExactTokensForTokens"]);
    }

    #[tokio::test]
    async fn native_input_skips_approval() {
        let client = MockChainClient::new();
        let direct = Route::new(vec![wavax(), usdt()]).unwrap();
        client.set_quote(
            &direct,
            Some(mock_quote(&direct, vec![500_000_000_000_000_000, 12_000_000])),
        );

        let outcome =
            quoter_workflow(&client, false).run(&params(wavax(), usdt(), "0.5")).await.unwrap();
        assert!(outcome.approval.is_none());
        assert_eq!(client.sent_methods(), vec!["swapExactNATIVEForTokens"]);
    }

    #[tokio::test]
    async fn failed_approval_stops_the_swap() {
        let client = MockChainClient::new();
        client.set_approve_revert("ERC20: insufficient balance");
        quote_usdt_to_wavax(&client);

        let err =
            quoter_workflow(&client, false).run(&params(usdt(), wavax(), "0.01")).await.unwrap_err();
        assert!(matches!(err, SwapError::ApprovalRejected(_)));
        assert_eq!(client.send_count(), 0);
    }

    #[tokio::test]
    async fn unreadable_approval_receipt_stops_with_unknown_outcome() {
        let client = MockChainClient::new();
        quote_usdt_to_wavax(&client);
        client.fail_receipt_polls(vec![ChainClientError::rpc("502 bad gateway"); 1_000]);

        let err =
            quoter_workflow(&client, false).run(&params(usdt(), wavax(), "0.01")).await.unwrap_err();
        assert!(matches!(err, SwapError::ApprovalTimeout { .. }));
        assert!(err.is_outcome_unknown());
        assert_eq!(client.sent_methods(), vec!["approve"]);
    }

    #[tokio::test]
    async fn unquoted_routes_are_not_viable() {
        let client = MockChainClient::new();
        let err =
            quoter_workflow(&client, false).run(&params(usdt(), wavax(), "0.01")).await.unwrap_err();
        assert_eq!(err, SwapError::NoViableRoute);
        assert_eq!(client.send_count(), 0);
    }

    #[tokio::test]
    async fn hanging_route_is_dropped_and_direct_route_wins() {
        let client = MockChainClient::new();
        quote_usdt_to_wavax(&client);
        client.hang_quote(&Route::new(vec![usdt(), usdc(), wavax()]).unwrap());

        let retry = RetryConfig {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(10),
        };
        let provider = LbQuoterProvider::new(
            Arc::new(client.clone()),
            client.quoter_address(),
            Duration::from_millis(50),
            retry,
        );
        let workflow =
            SwapWorkflow::new(Arc::new(provider), Arc::new(client.clone()), config(false));

        let trade = workflow.best_trade(&params(usdt(), wavax(), "0.01")).await.unwrap();
        assert_eq!(trade.route.tokens(), &[usdt(), wavax()]);
        assert_eq!(trade.output_amount.raw(), U256::from(400_000_000_000_000u64));
    }

    #[tokio::test]
    async fn slow_quotes_time_out() {
        let client = MockChainClient::new();
        let provider = MockRouteProvider::new(vec![mock_trade(&[], 10_000, 400)])
            .with_delay(Duration::from_secs(5));
        let workflow =
            SwapWorkflow::new(Arc::new(provider.clone()), Arc::new(client.clone()), config(false));

        let err = workflow.run(&params(usdt(), wavax(), "0.01")).await.unwrap_err();
        assert_eq!(err, SwapError::QuoteTimeout);
        assert_eq!(provider.requested_routes().len(), 2);
        assert_eq!(client.send_count(), 0);
    }

    #[tokio::test]
    async fn malformed_amounts_are_rejected_before_quoting() {
        let client = MockChainClient::new();
        let provider = MockRouteProvider::new(vec![]);
        let workflow =
            SwapWorkflow::new(Arc::new(provider.clone()), Arc::new(client.clone()), config(false));

        for amount in ["0.0000001", "-1", "0"] {
            let err = workflow.run(&params(usdt(), wavax(), amount)).await.unwrap_err();
            assert!(matches!(err, SwapError::Parse(_)), "{amount}: {err}");
        }
        assert!(provider.requested_routes().is_empty());
    }
}
