//! The CLI for the swapper

use std::{path::PathBuf, time::Duration};

use alloy_primitives::{Address, U256};
use clap::Parser;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::{
    chain::{Chain, TokenList, LB_QUOTER_ADDRESS, LB_ROUTER_ADDRESS},
    error::{SwapError, SwapResult},
    helpers::RetryConfig,
    routing::routes::DEFAULT_MAX_HOPS,
    types::{trade::BPS_DENOMINATOR, TradeOptions, TradeType},
    workflow::{TradeParams, WorkflowConfig},
};

/// The default slippage tolerance, 0.5%
const DEFAULT_SLIPPAGE_BPS: u32 = 50;
/// The default swap deadline, one hour
const DEFAULT_TTL_SECS: u64 = 3600;
/// The default bound on quoting all routes
const DEFAULT_QUOTE_TIMEOUT_MS: u64 = 10_000;
/// The default bound on a single quoter call
const DEFAULT_QUOTE_CALL_TIMEOUT_MS: u64 = 2_000;
/// The default bound on waiting for a transaction to be mined
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
/// The default interval between receipt polls
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Swap through the best Liquidity Book route
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // --- Chain --- //
    /// The RPC URL of the chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,
    /// The private key that signs the approval and the swap
    #[arg(long, env = "PRIVATE_KEY")]
    pub private_key: String,
    /// The chain to swap on
    #[arg(long, env = "CHAIN", value_enum, default_value = "fuji")]
    pub chain: Chain,
    /// Override the router address
    #[arg(long, env = "ROUTER_ADDRESS")]
    pub router_address: Option<Address>,
    /// Override the quoter address
    #[arg(long, env = "QUOTER_ADDRESS")]
    pub quoter_address: Option<Address>,

    // --- Trade --- //
    /// The token to sell, by symbol or address
    #[arg(long, default_value = "USDT")]
    pub input_token: String,
    /// The token to buy, by symbol or address
    #[arg(long, default_value = "WAVAX")]
    pub output_token: String,
    /// The amount to sell, or to buy with `--exact-out`, in whole units
    #[arg(long, default_value = "0.01")]
    pub amount: String,
    /// Fix the output amount instead of the input amount
    #[arg(long)]
    pub exact_out: bool,
    /// The slippage tolerance in basis points
    #[arg(long, default_value_t = DEFAULT_SLIPPAGE_BPS)]
    pub slippage_bps: u32,
    /// How long the swap stays valid, in seconds
    #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u64,
    /// The address receiving the output, defaults to the signer
    #[arg(long)]
    pub recipient: Option<Address>,
    /// Whether a token on the route charges a fee on transfer
    #[arg(long)]
    pub fee_on_transfer: bool,
    /// Trade the wrapped native token as an ERC20 instead of the native asset
    #[arg(long)]
    pub use_wrapped: bool,

    // --- Routing --- //
    /// The intermediate tokens routes may pass through, comma separated
    #[arg(long, default_value = "WAVAX,USDC,USDT")]
    pub bases: String,
    /// The maximum number of pairs in a route
    #[arg(long, default_value_t = DEFAULT_MAX_HOPS)]
    pub max_hops: usize,
    /// A JSON file of additional tokens
    #[arg(long, env = "TOKENS_PATH")]
    pub tokens_path: Option<PathBuf>,

    // --- Timeouts --- //
    /// The bound on quoting all routes, in milliseconds
    ///
    /// Must exceed the time a single route can take across all its retries
    #[arg(long, default_value_t = DEFAULT_QUOTE_TIMEOUT_MS)]
    pub quote_timeout_ms: u64,
    /// The bound on a single quoter call, in milliseconds
    #[arg(long, default_value_t = DEFAULT_QUOTE_CALL_TIMEOUT_MS)]
    pub quote_call_timeout_ms: u64,
    /// The bound on waiting for each transaction to be mined, in seconds
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout_secs: u64,
    /// The interval between receipt polls, in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    // --- Telemetry --- //
    /// Whether to emit JSON formatted logs
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    /// Configure logging from the CLI
    pub fn configure_logging(&self) {
        let filter =
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();

        let fmt_layer = if self.json_logs {
            fmt::layer().with_file(true).with_line_number(true).json().flatten_event(true).boxed()
        } else {
            fmt::layer().boxed()
        };

        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    }

    /// The tokens known on the configured chain, including any token file
    pub fn token_list(&self) -> SwapResult<TokenList> {
        let mut tokens = TokenList::for_chain(self.chain);
        if let Some(path) = &self.tokens_path {
            tokens.extend_from_file(path)?;
        }

        Ok(tokens)
    }

    /// The router swaps are sent to
    pub fn router_address(&self) -> Address {
        self.router_address.unwrap_or(LB_ROUTER_ADDRESS)
    }

    /// The quoter routes are priced against
    pub fn quoter_address(&self) -> Address {
        self.quoter_address.unwrap_or(LB_QUOTER_ADDRESS)
    }

    /// The bound on a single quoter call
    pub fn quote_call_timeout(&self) -> Duration {
        Duration::from_millis(self.quote_call_timeout_ms)
    }

    /// The run configuration
    pub fn workflow_config(&self, tokens: &TokenList) -> SwapResult<WorkflowConfig> {
        if self.max_hops == 0 {
            return Err(SwapError::config("max hops must be at least one"));
        }

        // A route that exhausts its retries must be dropped, not time out the run
        let retry = RetryConfig::default();
        let quote_timeout = Duration::from_millis(self.quote_timeout_ms);
        let per_route = retry.max_elapsed(self.quote_call_timeout());
        if quote_timeout <= per_route {
            return Err(SwapError::config(format!(
                "quote timeout of {quote_timeout:?} must exceed the {per_route:?} a single \
                 route may take"
            )));
        }

        Ok(WorkflowConfig {
            router_address: self.router_address(),
            wrapped_native: self.chain.wrapped_native(),
            bases: tokens.resolve_all(&self.bases)?,
            max_hops: self.max_hops,
            use_wrapped: self.use_wrapped,
            quote_timeout,
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            retry,
        })
    }

    /// The trade to execute, paying out to `signer` unless a recipient is set
    pub fn trade_params(&self, tokens: &TokenList, signer: Address) -> SwapResult<TradeParams> {
        if U256::from(self.slippage_bps) > BPS_DENOMINATOR {
            return Err(SwapError::config(format!(
                "slippage of {} bps exceeds 100%",
                self.slippage_bps
            )));
        }

        let trade_type = if self.exact_out { TradeType::ExactOut } else { TradeType::ExactIn };
        Ok(TradeParams {
            input: tokens.resolve(&self.input_token)?,
            output: tokens.resolve(&self.output_token)?,
            amount: self.amount.clone(),
            trade_type,
            options: TradeOptions {
                allowed_slippage_bps: self.slippage_bps,
                ttl_secs: self.ttl,
                recipient: self.recipient.unwrap_or(signer),
                fee_on_transfer: self.fee_on_transfer,
            },
        })
    }
}
