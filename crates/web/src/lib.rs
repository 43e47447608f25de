//! kickstart-web - Listing page for the campaigns created by a factory.
//!
//! Every page load issues one read call against the factory and renders the
//! addresses it returns.

use std::{future::Future, net::SocketAddr};

use alloy_provider::Provider;
use anyhow::{Context, Result};
use kickstart_factory::{Address, CampaignFactory};

mod handlers;
mod routes;

pub use routes::create_router;

/// Where the listing page gets its campaigns from.
pub trait CampaignSource: Clone + Send + Sync + 'static {
    /// Address of the factory being listed.
    fn factory_address(&self) -> Address;

    /// The campaigns created so far.
    fn campaigns(&self) -> impl Future<Output = Result<Vec<Address>>> + Send;
}

impl<P> CampaignSource for CampaignFactory<P>
where
    P: Provider + Clone + 'static,
{
    fn factory_address(&self) -> Address {
        self.address()
    }

    fn campaigns(&self) -> impl Future<Output = Result<Vec<Address>>> + Send {
        self.get_deployed_campaigns()
    }
}

/// Serve the listing page on `bind` until Ctrl+C.
pub async fn serve<S: CampaignSource>(source: S, bind: SocketAddr) -> Result<()> {
    let factory = source.factory_address();
    let app = create_router(source);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind listing page to {}", bind))?;

    tracing::info!(%bind, %factory, "Serving campaigns index");
    tracing::info!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await
        .context("Listing page server failed")?;

    Ok(())
}
