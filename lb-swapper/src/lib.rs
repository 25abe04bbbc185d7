//! Prices a token swap across every Liquidity Book route through a set of base
//! tokens, then approves the router and executes the best trade

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::needless_pass_by_ref_mut)]
#![deny(unsafe_code)]
#![deny(clippy::uninlined_format_args)]

pub mod abis;
pub mod allowance;
pub mod chain;
pub mod chain_client;
pub mod cli;
pub mod error;
pub mod executor;
pub mod helpers;
pub mod instructions;
pub mod reporter;
pub mod routing;
pub mod selector;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;
