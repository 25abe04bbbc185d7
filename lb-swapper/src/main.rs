//! Entrypoint for the Liquidity Book swapper

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use lb_swapper::{
    chain_client::{rpc::RpcChainClient, ChainClient},
    cli::Cli,
    routing::quoter::LbQuoterProvider,
    workflow::SwapWorkflow,
};
use tracing::{error, info};

/// Quote, approve, and swap, exiting non-zero on any failure
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.configure_logging();

    let tokens = cli.token_list()?;
    let client = Arc::new(RpcChainClient::new(&cli.rpc_url, &cli.private_key)?);
    let account = client.signer_address();
    info!("swapping from {account:#x} on {:?}", cli.chain);

    let params = cli.trade_params(&tokens, account)?;
    let config = cli.workflow_config(&tokens)?;
    let quoter = LbQuoterProvider::new(
        client.clone(),
        cli.quoter_address(),
        cli.quote_call_timeout(),
        config.retry.clone(),
    );
    let workflow = SwapWorkflow::new(Arc::new(quoter), client, config);

    match workflow.run(&params).await {
        Ok(outcome) => {
            if let Some(approval) = &outcome.approval {
                info!("approval: {:#x}", approval.tx_hash);
            }
            info!(
                "swapped {} for {} in {:#x}, gas cost {} wei",
                outcome.trade.input_amount,
                outcome.trade.output_amount,
                outcome.swap.tx_hash,
                outcome.swap.gas_cost()
            );
            Ok(())
        },
        Err(e) => {
            error!(outcome_unknown = e.is_outcome_unknown(), "swap failed: {e}");
            Err(e.into())
        },
    }
}
