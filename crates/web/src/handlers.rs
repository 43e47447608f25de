//! HTTP handlers for the listing page.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use kickstart_factory::Address;
use serde::Serialize;

use crate::CampaignSource;

#[derive(Debug, Serialize)]
pub struct CampaignsResponse {
    pub factory: Address,
    pub campaigns: Vec<Address>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET / - Campaigns index page
pub async fn index<S: CampaignSource>(State(source): State<S>) -> Response {
    match source.campaigns().await {
        Ok(campaigns) => {
            tracing::info!(?campaigns, "Retrieved deployed campaigns");
            Html(render_index(source.factory_address(), &campaigns)).into_response()
        }
        Err(e) => {
            tracing::error!(error = ?e, "Failed to retrieve deployed campaigns");
            (StatusCode::BAD_GATEWAY, Html(render_error())).into_response()
        }
    }
}

/// GET /api/campaigns - Campaign addresses as JSON
pub async fn list_campaigns<S: CampaignSource>(State(source): State<S>) -> Response {
    match source.campaigns().await {
        Ok(campaigns) => Json(CampaignsResponse {
            factory: source.factory_address(),
            campaigns,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to retrieve deployed campaigns");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to retrieve deployed campaigns".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health_check() -> &'static str {
    "ok"
}

fn render_index(factory: Address, campaigns: &[Address]) -> String {
    let items = if campaigns.is_empty() {
        "    <p>No campaigns yet.</p>\n".to_string()
    } else {
        let list: String = campaigns
            .iter()
            .map(|campaign| format!("      <li><code>{campaign}</code></li>\n"))
            .collect();
        format!("    <ul>\n{list}    </ul>\n")
    };

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n  <meta charset=\"utf-8\">\n  <title>Campaigns</title>\n</head>\n\
         <body>\n  <div>\n    <h1>Campaigns Index!</h1>\n    <p>Factory: <code>{factory}</code></p>\n\
         {items}  </div>\n</body>\n</html>\n"
    )
}

fn render_error() -> String {
    "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>Campaigns</title>\n</head>\n\
     <body>\n  <div>\n    <h1>Campaigns Index!</h1>\n    <p>Failed to load campaigns.</p>\n  </div>\n</body>\n</html>\n"
        .to_string()
}
