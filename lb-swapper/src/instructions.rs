//! Router swap instructions derived from a chosen trade
//!
//! Each router method is its own variant carrying the typed call, so the
//! method and its argument list can never disagree.

use alloy::{network::TransactionBuilder, rpc::types::TransactionRequest};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use crate::{
    abis::ILBRouter::{
        swapExactNATIVEForTokensCall, swapExactNATIVEForTokensSupportingFeeOnTransferTokensCall,
        swapExactTokensForNATIVECall, swapExactTokensForNATIVESupportingFeeOnTransferTokensCall,
        swapExactTokensForTokensCall, swapExactTokensForTokensSupportingFeeOnTransferTokensCall,
        swapNATIVEForExactTokensCall, swapTokensForExactNATIVECall, swapTokensForExactTokensCall,
        Path,
    },
    error::{SwapError, SwapResult},
    types::{Trade, TradeOptions},
};

/// A call to one of the router's swap methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapCall {
    /// Sell an exact amount of tokens for tokens
    ExactTokensForTokens(swapExactTokensForTokensCall),
    /// Sell an exact amount of tokens for the native asset
    ExactTokensForNative(swapExactTokensForNATIVECall),
    /// Sell an exact amount of the native asset for tokens
    ExactNativeForTokens(swapExactNATIVEForTokensCall),
    /// Fee-on-transfer variant of `ExactTokensForTokens`
    ExactTokensForTokensFeeOnTransfer(swapExactTokensForTokensSupportingFeeOnTransferTokensCall),
    /// Fee-on-transfer variant of `ExactTokensForNative`
    ExactTokensForNativeFeeOnTransfer(swapExactTokensForNATIVESupportingFeeOnTransferTokensCall),
    /// Fee-on-transfer variant of `ExactNativeForTokens`
    ExactNativeForTokensFeeOnTransfer(swapExactNATIVEForTokensSupportingFeeOnTransferTokensCall),
    /// Buy an exact amount of tokens with tokens
    TokensForExactTokens(swapTokensForExactTokensCall),
    /// Buy an exact amount of the native asset with tokens
    TokensForExactNative(swapTokensForExactNATIVECall),
    /// Buy an exact amount of tokens with the native asset
    NativeForExactTokens(swapNATIVEForExactTokensCall),
}

/// The arguments shared by every swap method
struct CallParts<'a> {
    /// The swap path
    path: &'a Path,
    /// The recipient of the output
    to: Address,
    /// The unix timestamp after which the router rejects the swap
    deadline: U256,
    /// The token amount pulled from the sender, absent when paying in native
    token_amount_in: Option<U256>,
    /// The exact output, or the minimum output for exact-in swaps
    amount_out: U256,
}

impl SwapCall {
    /// The router method signature
    pub fn signature(&self) -> &'static str {
        match self {
            Self::ExactTokensForTokens(_) => swapExactTokensForTokensCall::SIGNATURE,
            Self::ExactTokensForNative(_) => swapExactTokensForNATIVECall::SIGNATURE,
            Self::ExactNativeForTokens(_) => swapExactNATIVEForTokensCall::SIGNATURE,
            Self::ExactTokensForTokensFeeOnTransfer(_) => {
                swapExactTokensForTokensSupportingFeeOnTransferTokensCall::SIGNATURE
            },
            Self::ExactTokensForNativeFeeOnTransfer(_) => {
                swapExactTokensForNATIVESupportingFeeOnTransferTokensCall::SIGNATURE
            },
            Self::ExactNativeForTokensFeeOnTransfer(_) => {
                swapExactNATIVEForTokensSupportingFeeOnTransferTokensCall::SIGNATURE
            },
            Self::TokensForExactTokens(_) => swapTokensForExactTokensCall::SIGNATURE,
            Self::TokensForExactNative(_) => swapTokensForExactNATIVECall::SIGNATURE,
            Self::NativeForExactTokens(_) => swapNATIVEForExactTokensCall::SIGNATURE,
        }
    }

    /// The router method name, without its parameter list
    pub fn method_name(&self) -> &'static str {
        let signature = self.signature();
        signature.split_once('(').map(|(name, _)| name).unwrap_or(signature)
    }

    /// The ABI encoded call
    pub fn calldata(&self) -> Bytes {
        let encoded = match self {
            Self::ExactTokensForTokens(call) => call.abi_encode(),
            Self::ExactTokensForNative(call) => call.abi_encode(),
            Self::ExactNativeForTokens(call) => call.abi_encode(),
            Self::ExactTokensForTokensFeeOnTransfer(call) => call.abi_encode(),
            Self::ExactTokensForNativeFeeOnTransfer(call) => call.abi_encode(),
            Self::ExactNativeForTokensFeeOnTransfer(call) => call.abi_encode(),
            Self::TokensForExactTokens(call) => call.abi_encode(),
            Self::TokensForExactNative(call) => call.abi_encode(),
            Self::NativeForExactTokens(call) => call.abi_encode(),
        };

        encoded.into()
    }

    /// Whether the method is paid for in the native asset
    pub fn is_native_in(&self) -> bool {
        matches!(
            self,
            Self::ExactNativeForTokens(_)
                | Self::ExactNativeForTokensFeeOnTransfer(_)
                | Self::NativeForExactTokens(_)
        )
    }

    /// The path of the swap
    pub fn path(&self) -> &Path {
        self.parts().path
    }

    /// Flatten the method specific arguments
    fn parts(&self) -> CallParts<'_> {
        match self {
            Self::ExactTokensForTokens(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: Some(c.amountIn),
                amount_out: c.amountOutMin,
            },
            Self::ExactTokensForNative(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: Some(c.amountIn),
                amount_out: c.amountOutMinNATIVE,
            },
            Self::ExactNativeForTokens(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: None,
                amount_out: c.amountOutMin,
            },
            Self::ExactTokensForTokensFeeOnTransfer(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: Some(c.amountIn),
                amount_out: c.amountOutMin,
            },
            Self::ExactTokensForNativeFeeOnTransfer(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: Some(c.amountIn),
                amount_out: c.amountOutMinNATIVE,
            },
            Self::ExactNativeForTokensFeeOnTransfer(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: None,
                amount_out: c.amountOutMin,
            },
            Self::TokensForExactTokens(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: Some(c.amountInMax),
                amount_out: c.amountOut,
            },
            Self::TokensForExactNative(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: Some(c.amountInMax),
                amount_out: c.amountNATIVEOut,
            },
            Self::NativeForExactTokens(c) => CallParts {
                path: &c.path,
                to: c.to,
                deadline: c.deadline,
                token_amount_in: None,
                amount_out: c.amountOut,
            },
        }
    }
}

/// A router call plus the native value to attach to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapInstructions {
    /// The router call
    pub call: SwapCall,
    /// The native asset sent with the call
    pub value: U256,
}

impl SwapInstructions {
    /// Build the router call for a trade
    ///
    /// `now` is the current unix timestamp; the deadline is `now + ttl`
    pub fn from_trade(trade: &Trade, options: &TradeOptions, now: u64) -> SwapResult<Self> {
        if trade.is_native_in && trade.is_native_out {
            return Err(SwapError::invalid_instructions("cannot swap native for native"));
        }

        let path = Path {
            pairBinSteps: trade.bin_steps.clone(),
            versions: trade.versions.clone(),
            tokenPath: trade.route.addresses(),
        };
        let to = options.recipient;
        let deadline = U256::from(now.saturating_add(options.ttl_secs));
        let slippage = options.allowed_slippage_bps;

        let instructions = if trade.is_exact_in() {
            let amount_in = trade.input_amount.raw();
            let min_out = trade.minimum_amount_out(slippage);
            let fee_on_transfer = options.fee_on_transfer;

            if trade.is_native_in {
                let call = if fee_on_transfer {
                    SwapCall::ExactNativeForTokensFeeOnTransfer(
                        swapExactNATIVEForTokensSupportingFeeOnTransferTokensCall {
                            amountOutMin: min_out,
                            path,
                            to,
                            deadline,
                        },
                    )
                } else {
                    SwapCall::ExactNativeForTokens(swapExactNATIVEForTokensCall {
                        amountOutMin: min_out,
                        path,
                        to,
                        deadline,
                    })
                };
                Self { call, value: amount_in }
            } else if trade.is_native_out {
                let call = if fee_on_transfer {
                    SwapCall::ExactTokensForNativeFeeOnTransfer(
                        swapExactTokensForNATIVESupportingFeeOnTransferTokensCall {
                            amountIn: amount_in,
                            amountOutMinNATIVE: min_out,
                            path,
                            to,
                            deadline,
                        },
                    )
                } else {
                    SwapCall::ExactTokensForNative(swapExactTokensForNATIVECall {
                        amountIn: amount_in,
                        amountOutMinNATIVE: min_out,
                        path,
                        to,
                        deadline,
                    })
                };
                Self { call, value: U256::ZERO }
            } else {
                let call = if fee_on_transfer {
                    SwapCall::ExactTokensForTokensFeeOnTransfer(
                        swapExactTokensForTokensSupportingFeeOnTransferTokensCall {
                            amountIn: amount_in,
                            amountOutMin: min_out,
                            path,
                            to,
                            deadline,
                        },
                    )
                } else {
                    SwapCall::ExactTokensForTokens(swapExactTokensForTokensCall {
                        amountIn: amount_in,
                        amountOutMin: min_out,
                        path,
                        to,
                        deadline,
                    })
                };
                Self { call, value: U256::ZERO }
            }
        } else {
            // The router has no fee-on-transfer variant for exact output
            if options.fee_on_transfer {
                return Err(SwapError::invalid_instructions(
                    "fee on transfer tokens are only supported for exact input swaps",
                ));
            }

            let amount_out = trade.output_amount.raw();
            let max_in = trade.maximum_amount_in(slippage);
            if trade.is_native_in {
                let call = SwapCall::NativeForExactTokens(swapNATIVEForExactTokensCall {
                    amountOut: amount_out,
                    path,
                    to,
                    deadline,
                });
                Self { call, value: max_in }
            } else if trade.is_native_out {
                let call = SwapCall::TokensForExactNative(swapTokensForExactNATIVECall {
                    amountNATIVEOut: amount_out,
                    amountInMax: max_in,
                    path,
                    to,
                    deadline,
                });
                Self { call, value: U256::ZERO }
            } else {
                let call = SwapCall::TokensForExactTokens(swapTokensForExactTokensCall {
                    amountOut: amount_out,
                    amountInMax: max_in,
                    path,
                    to,
                    deadline,
                });
                Self { call, value: U256::ZERO }
            }
        };

        Ok(instructions)
    }

    /// The router method name
    pub fn method_name(&self) -> &'static str {
        self.call.method_name()
    }

    /// The ABI encoded call
    pub fn calldata(&self) -> Bytes {
        self.call.calldata()
    }

    /// The token amount the router must be allowed to pull from the sender,
    /// `None` when the input is paid in the native asset
    pub fn required_allowance(&self) -> Option<U256> {
        self.call.parts().token_amount_in
    }

    /// Check the instructions are well formed and still executable at `now`
    pub fn validate(&self, now: u64) -> SwapResult<()> {
        let parts = self.call.parts();
        let path = parts.path;

        let hops = path.tokenPath.len().saturating_sub(1);
        if hops == 0 {
            return Err(SwapError::invalid_instructions("token path needs at least two tokens"));
        }
        if path.pairBinSteps.len() != hops || path.versions.len() != hops {
            return Err(SwapError::invalid_instructions(format!(
                "path has {} tokens but {} bin steps and {} versions",
                path.tokenPath.len(),
                path.pairBinSteps.len(),
                path.versions.len()
            )));
        }

        if self.call.is_native_in() == self.value.is_zero() {
            return Err(SwapError::invalid_instructions(format!(
                "{} sent with value {}",
                self.method_name(),
                self.value
            )));
        }

        if parts.token_amount_in.is_some_and(|amount| amount.is_zero()) {
            return Err(SwapError::invalid_instructions("zero input amount"));
        }
        if parts.amount_out.is_zero() {
            return Err(SwapError::invalid_instructions("zero output amount"));
        }

        if parts.to.is_zero() {
            return Err(SwapError::invalid_instructions("recipient is the zero address"));
        }

        if parts.deadline <= U256::from(now) {
            return Err(SwapError::invalid_instructions(format!(
                "deadline {} has passed",
                parts.deadline
            )));
        }

        Ok(())
    }

    /// Build the transaction sending these instructions to the router
    pub fn to_tx(&self, router: Address, from: Address) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(router)
            .with_input(self.calldata());

        if self.value.is_zero() { tx } else { tx.with_value(self.value) }
    }
}
