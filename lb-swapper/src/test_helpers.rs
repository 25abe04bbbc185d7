//! Test doubles and fixtures shared by the unit tests

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use crate::{
    abis::{
        IERC20::{allowanceCall, approveCall},
        ILBQuoter::{findBestPathFromAmountInCall, findBestPathFromAmountOutCall, Quote},
        ILBRouter::{
            swapExactNATIVEForTokensCall,
            swapExactNATIVEForTokensSupportingFeeOnTransferTokensCall,
            swapExactTokensForNATIVECall,
            swapExactTokensForNATIVESupportingFeeOnTransferTokensCall,
            swapExactTokensForTokensCall,
            swapExactTokensForTokensSupportingFeeOnTransferTokensCall,
            swapNATIVEForExactTokensCall, swapTokensForExactNATIVECall,
            swapTokensForExactTokensCall,
        },
    },
    chain::{Chain, TokenList},
    chain_client::{errors::ChainClientError, ChainClient, TxReceipt},
    error::SwapResult,
    routing::{QuoteRequest, RouteProvider},
    types::{Route, Token, TokenAmount, Trade, TradeType},
};

/// A fee of 0.1% per hop, scaled by 1e18
pub const TENTH_PERCENT_FEE: u128 = 1_000_000_000_000_000;

// ----------
// | Tokens |
// ----------

/// Resolve a default Fuji token
fn fuji_token(symbol: &str) -> Token {
    TokenList::for_chain(Chain::Fuji).resolve(symbol).unwrap()
}

/// USDT on Fuji, 6 decimals
pub fn usdt() -> Token {
    fuji_token("USDT")
}

/// USDC on Fuji, 6 decimals
pub fn usdc() -> Token {
    fuji_token("USDC")
}

/// WAVAX on Fuji, 18 decimals
pub fn wavax() -> Token {
    Chain::Fuji.wrapped_native()
}

/// An exact-in trade selling USDT for native AVAX through `bases`, with a 0.1%
/// fee per hop and no price impact
pub fn mock_trade(bases: &[Token], amount_in: u64, amount_out: u128) -> Trade {
    let tokens = [usdt()].into_iter().chain(bases.iter().cloned()).chain([wavax()]).collect();
    let route = Route::new(tokens).unwrap();
    let hops = route.hops();

    Trade {
        input_amount: TokenAmount::new(usdt(), U256::from(amount_in)),
        output_amount: TokenAmount::new(wavax(), U256::from(amount_out)),
        trade_type: TradeType::ExactIn,
        pairs: vec![Address::repeat_byte(0xaa); hops],
        bin_steps: vec![U256::from(20u64); hops],
        versions: vec![2; hops],
        fees: vec![TENTH_PERCENT_FEE; hops],
        quoted_amount_without_slippage: U256::from(amount_out),
        is_native_in: false,
        is_native_out: true,
        route,
    }
}

/// A quoter response for `route` moving through the given per-hop amounts,
/// with a 0.1% fee per hop and no price impact
pub fn mock_quote(route: &Route, amounts: Vec<u128>) -> Quote {
    let hops = route.hops();
    Quote {
        route: route.addresses(),
        pairs: vec![Address::repeat_byte(0xaa); hops],
        binSteps: vec![U256::from(20u64); hops],
        versions: vec![2; hops],
        virtualAmountsWithoutSlippage: amounts.clone(),
        amounts,
        fees: vec![TENTH_PERCENT_FEE; hops],
    }
}

// -------------------
// | MockChainClient |
// -------------------

/// How the mock mines submitted transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptBehavior {
    /// Transactions are mined immediately and succeed
    Success,
    /// Transactions are mined immediately and revert
    Reverted,
    /// Transactions are never mined
    NeverMined,
}

/// An interaction observed by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// A read-only call to the named method
    Call(&'static str),
    /// A submitted transaction calling the named method
    Sent(&'static str),
    /// A mined receipt was returned for a transaction calling the named method
    Confirmed(&'static str),
}

/// The mutable state behind a [`MockChainClient`]
struct MockState {
    /// Quotes per route, keyed by token path; `None` reverts
    quotes: HashMap<Vec<Address>, Option<Quote>>,
    /// Routes whose quoter calls never return
    hanging_quotes: HashSet<Vec<Address>>,
    /// The allowance reported for any owner and spender
    allowance: U256,
    /// The revert reason of `approve` simulations
    approve_revert: Option<String>,
    /// The revert reason of swap simulations
    swap_revert: Option<String>,
    /// The broadcast error, and whether the nonce advances despite it
    send_failure: Option<(String, bool)>,
    /// How submitted transactions are mined
    receipt_behavior: ReceiptBehavior,
    /// Errors returned by the next receipt polls, in order
    receipt_errors: VecDeque<ChainClientError>,
    /// The signer's pending nonce
    nonce: u64,
    /// Submitted transactions and the method each calls
    submitted: HashMap<TxHash, &'static str>,
    /// Every interaction, in order
    events: Vec<MockEvent>,
}

/// An in-memory chain that dispatches calls on their selector
#[derive(Clone)]
pub struct MockChainClient {
    /// The shared state
    state: Arc<Mutex<MockState>>,
}

impl MockChainClient {
    /// A chain where every call and transaction succeeds
    pub fn new() -> Self {
        let state = MockState {
            quotes: HashMap::new(),
            hanging_quotes: HashSet::new(),
            allowance: U256::ZERO,
            approve_revert: None,
            swap_revert: None,
            send_failure: None,
            receipt_behavior: ReceiptBehavior::Success,
            receipt_errors: VecDeque::new(),
            nonce: 0,
            submitted: HashMap::new(),
            events: Vec::new(),
        };

        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// The address quoter calls are sent to
    pub fn quoter_address(&self) -> Address {
        Address::repeat_byte(0x0e)
    }

    /// Set the quote returned for a route, `None` makes it revert
    pub fn set_quote(&self, route: &Route, quote: Option<Quote>) {
        self.state.lock().unwrap().quotes.insert(route.addresses(), quote);
    }

    /// Make quoter calls for a route never return
    pub fn hang_quote(&self, route: &Route) {
        self.state.lock().unwrap().hanging_quotes.insert(route.addresses());
    }

    /// Set the existing allowance
    pub fn set_allowance(&self, allowance: U256) {
        self.state.lock().unwrap().allowance = allowance;
    }

    /// Make `approve` simulations revert
    pub fn set_approve_revert(&self, reason: &str) {
        self.state.lock().unwrap().approve_revert = Some(reason.to_string());
    }

    /// Make swap simulations revert
    pub fn set_swap_revert(&self, reason: &str) {
        self.state.lock().unwrap().swap_revert = Some(reason.to_string());
    }

    /// Make every broadcast fail
    pub fn fail_sends(&self, reason: &str, advance_nonce: bool) {
        self.state.lock().unwrap().send_failure = Some((reason.to_string(), advance_nonce));
    }

    /// Set how submitted transactions are mined
    pub fn set_receipt_behavior(&self, behavior: ReceiptBehavior) {
        self.state.lock().unwrap().receipt_behavior = behavior;
    }

    /// Fail the next receipt polls with `errors`, in order
    pub fn fail_receipt_polls(&self, errors: Vec<ChainClientError>) {
        self.state.lock().unwrap().receipt_errors.extend(errors);
    }

    /// Every interaction so far, in order
    pub fn events(&self) -> Vec<MockEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// The submissions and confirmations so far, in order
    pub fn tx_events(&self) -> Vec<MockEvent> {
        self.events().into_iter().filter(|e| !matches!(e, MockEvent::Call(_))).collect()
    }

    /// The methods called by submitted transactions, in order
    pub fn sent_methods(&self) -> Vec<&'static str> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Sent(method) => Some(method),
                _ => None,
            })
            .collect()
    }

    /// The number of read-only calls made
    pub fn call_count(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, MockEvent::Call(_))).count()
    }

    /// The number of transactions submitted
    pub fn send_count(&self) -> usize {
        self.sent_methods().len()
    }
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The method a transaction calls, from its selector
fn method_of(tx: &TransactionRequest) -> &'static str {
    let input = tx.input.input().map(|b| b.as_ref()).unwrap_or_default();
    let Some(selector) = input.get(..4) else {
        return "unknown";
    };

    let methods: [([u8; 4], &'static str); 13] = [
        (allowanceCall::SELECTOR, "allowance"),
        (approveCall::SELECTOR, "approve"),
        (findBestPathFromAmountInCall::SELECTOR, "findBestPathFromAmountIn"),
        (findBestPathFromAmountOutCall::SELECTOR, "findBestPathFromAmountOut"),
        (swapExactTokensForTokensCall::SELECTOR, "swapExactTokensForTokens"),
        (swapExactTokensForNATIVECall::SELECTOR, "swapExactTokensForNATIVE"),
        (swapExactNATIVEForTokensCall::SELECTOR, "swapExactNATIVEForTokens"),
        (
            swapExactTokensForTokensSupportingFeeOnTransferTokensCall::SELECTOR,
            "swapExactTokensForTokensSupportingFeeOnTransferTokens",
        ),
        (
            swapExactTokensForNATIVESupportingFeeOnTransferTokensCall::SELECTOR,
            "swapExactTokensForNATIVESupportingFeeOnTransferTokens",
        ),
        (
            swapExactNATIVEForTokensSupportingFeeOnTransferTokensCall::SELECTOR,
            "swapExactNATIVEForTokensSupportingFeeOnTransferTokens",
        ),
        (swapTokensForExactTokensCall::SELECTOR, "swapTokensForExactTokens"),
        (swapTokensForExactNATIVECall::SELECTOR, "swapTokensForExactNATIVE"),
        (swapNATIVEForExactTokensCall::SELECTOR, "swapNATIVEForExactTokens"),
    ];

    methods
        .iter()
        .find(|(s, _)| s.as_slice() == selector)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn signer_address(&self) -> Address {
        Address::repeat_byte(0x5e)
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ChainClientError> {
        let method = method_of(tx);
        let input = tx.input.input().cloned().unwrap_or_default();
        let route = match method {
            "findBestPathFromAmountIn" => {
                findBestPathFromAmountInCall::abi_decode(&input)?.route
            },
            "findBestPathFromAmountOut" => {
                findBestPathFromAmountOutCall::abi_decode(&input)?.route
            },
            _ => Vec::new(),
        };

        let hangs = self.state.lock().unwrap().hanging_quotes.contains(&route);
        if hangs {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        state.events.push(MockEvent::Call(method));

        let output = match method {
            "allowance" => allowanceCall::abi_encode_returns(&state.allowance),
            "approve" => match &state.approve_revert {
                Some(reason) => return Err(ChainClientError::reverted(reason)),
                None => approveCall::abi_encode_returns(&true),
            },
            "findBestPathFromAmountIn" | "findBestPathFromAmountOut" => {
                match state.quotes.get(&route).cloned().flatten() {
                    // Both quoter methods share the return type
                    Some(quote) => findBestPathFromAmountInCall::abi_encode_returns(&quote),
                    None => return Err(ChainClientError::reverted("no quote for route")),
                }
            },
            "unknown" => return Err(ChainClientError::rpc("unknown method")),
            _ => match &state.swap_revert {
                Some(reason) => return Err(ChainClientError::reverted(reason)),
                None => vec![0u8; 32],
            },
        };

        Ok(output.into())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ChainClientError> {
        let method = method_of(&tx);
        let mut state = self.state.lock().unwrap();
        state.events.push(MockEvent::Sent(method));

        if let Some((reason, advance_nonce)) = state.send_failure.clone() {
            if advance_nonce {
                state.nonce += 1;
            }
            return Err(ChainClientError::rpc(reason));
        }

        state.nonce += 1;
        let tx_hash = TxHash::left_padding_from(&state.nonce.to_be_bytes());
        state.submitted.insert(tx_hash, method);
        Ok(tx_hash)
    }

    async fn get_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.receipt_errors.pop_front() {
            return Err(err);
        }

        let Some(method) = state.submitted.get(&tx_hash).copied() else {
            return Ok(None);
        };

        let success = match state.receipt_behavior {
            ReceiptBehavior::NeverMined => return Ok(None),
            ReceiptBehavior::Success => true,
            ReceiptBehavior::Reverted => false,
        };

        state.events.push(MockEvent::Confirmed(method));
        Ok(Some(TxReceipt {
            tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: 25_000_000_000,
            success,
        }))
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, ChainClientError> {
        Ok(self.state.lock().unwrap().nonce)
    }
}

// ---------------------
// | MockRouteProvider |
// ---------------------

/// A route provider returning fixed trades
#[derive(Clone)]
pub struct MockRouteProvider {
    /// The trades returned for any request
    trades: Vec<Trade>,
    /// How long quoting takes
    delay: Option<Duration>,
    /// The routes of every request
    requested: Arc<Mutex<Vec<Route>>>,
}

impl MockRouteProvider {
    /// A provider returning `trades`
    pub fn new(trades: Vec<Trade>) -> Self {
        Self { trades, delay: None, requested: Arc::default() }
    }

    /// Make quoting take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The routes requested so far
    pub fn requested_routes(&self) -> Vec<Route> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteProvider for MockRouteProvider {
    async fn get_trades(
        &self,
        routes: &[Route],
        _request: &QuoteRequest,
    ) -> SwapResult<Vec<Trade>> {
        self.requested.lock().unwrap().extend_from_slice(routes);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.trades.clone())
    }
}
