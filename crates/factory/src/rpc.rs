//! Provider construction for Ethereum JSON-RPC endpoints.

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionReceipt;
use anyhow::Context;
use url::Url;

/// Connect a provider that signs transactions with `wallet`.
///
/// Nonce, gas and chain id are filled in by the provider before signing.
pub fn connect_signing(url: Url, wallet: EthereumWallet) -> impl Provider + Clone + 'static {
    tracing::debug!(rpc_url = %url, "Connecting signing provider");
    ProviderBuilder::new().wallet(wallet).connect_http(url)
}

/// Connect a provider for read-only calls.
pub fn connect_read_only(url: Url) -> impl Provider + Clone + 'static {
    tracing::debug!(rpc_url = %url, "Connecting read-only provider");
    ProviderBuilder::new().connect_http(url)
}

/// Fetch the chain id of the connected endpoint.
pub async fn chain_id<P: Provider>(provider: &P) -> Result<u64, anyhow::Error> {
    provider
        .get_chain_id()
        .await
        .context("Failed to fetch chain id - is the RPC endpoint reachable?")
}

/// Fail if the mined transaction described by `receipt` reverted.
pub fn ensure_success(receipt: &TransactionReceipt, action: &str) -> anyhow::Result<()> {
    if !receipt.status() {
        anyhow::bail!("{} transaction {} reverted", action, receipt.transaction_hash);
    }
    Ok(())
}
