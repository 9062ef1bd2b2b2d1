// src/handlers/dashboard.rs
use std::sync::Arc;

use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::{today, AppContext, DashboardQuery};
use crate::models::ApiEnvelope;
use crate::services::dashboard::compute_dashboard;

pub async fn get_dashboard(query: DashboardQuery, ctx: Arc<AppContext>) -> Result<Json, Rejection> {
    let dataset = ctx.store.dataset_or_empty().await;
    let view = compute_dashboard(&dataset, &query.filter(), &ctx.campaign_keywords, today());
    info!(
        "Dashboard computed: {} accounts, {} views",
        view.stats.total_accounts, view.stats.views
    );
    Ok(warp::reply::json(&ApiEnvelope::ok(view)))
}

/// Forces a fresh upstream scrape and swaps in the new dataset.
pub async fn post_refresh(ctx: Arc<AppContext>) -> Result<Json, Rejection> {
    match ctx.store.refresh(&ctx.upstream, true).await {
        Ok(dataset) => {
            info!("Forced refresh loaded {} creators", dataset.creators.len());
            Ok(warp::reply::json(&ApiEnvelope::ok(serde_json::json!({
                "creators": dataset.creators.len(),
                "fetchedAt": dataset.fetched_at,
            }))))
        }
        Err(e) => {
            error!("Forced refresh failed: {}", e);
            Err(warp::reject::custom(ApiError::upstream(e)))
        }
    }
}
