use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{CampaignSource, handlers};

/// Create the listing page router.
pub fn create_router<S: CampaignSource>(source: S) -> Router {
    Router::new()
        .route("/", get(handlers::index::<S>))
        .route("/api/campaigns", get(handlers::list_campaigns::<S>))
        .route("/health", get(handlers::health_check))
        .with_state(source)
        .layer(TraceLayer::new_for_http())
}
