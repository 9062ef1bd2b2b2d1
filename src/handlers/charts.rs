// src/handlers/charts.rs
use std::sync::Arc;

use log::error;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::{today, AppContext, DashboardQuery};
use crate::models::ApiEnvelope;
use crate::services::dashboard::{select_creators, PlatformFilter};
use crate::services::series;

pub async fn get_daily_videos(
    query: DashboardQuery,
    ctx: Arc<AppContext>,
) -> Result<Json, Rejection> {
    let dataset = ctx.store.dataset_or_empty().await;
    let now = today();
    let filter = query.filter();
    let selected = select_creators(&dataset.creators, &filter, &ctx.campaign_keywords, now);
    let points = series::daily_video_counts(&selected, filter.window, now);
    Ok(warp::reply::json(&ApiEnvelope::ok(points)))
}

pub async fn get_daily_spend(
    query: DashboardQuery,
    ctx: Arc<AppContext>,
) -> Result<Json, Rejection> {
    let dataset = ctx.store.dataset_or_empty().await;
    let now = today();
    let filter = query.filter();
    let selected = select_creators(&dataset.creators, &filter, &ctx.campaign_keywords, now);
    let points = series::daily_spend(&selected, filter.window, now);
    Ok(warp::reply::json(&ApiEnvelope::ok(points)))
}

/// Daily view growth: global snapshots by default, or one creator's history
/// fetched on demand when a creator is selected.
pub async fn get_growth(query: DashboardQuery, ctx: Arc<AppContext>) -> Result<Json, Rejection> {
    let now = today();
    let filter = query.filter();

    let points = match &filter.creator {
        Some(username) => {
            let detail = match filter.platform {
                PlatformFilter::Instagram => {
                    ctx.upstream.instagram_creator_snapshot_detail(username).await
                }
                _ => ctx.upstream.creator_snapshot_detail(username).await,
            };
            match detail {
                Ok(detail) => series::creator_growth(&detail, filter.window, now),
                Err(e) => {
                    error!("Creator snapshot detail fetch failed for {}: {}", username, e);
                    return Err(warp::reject::custom(ApiError::upstream(e)));
                }
            }
        }
        None => {
            let dataset = ctx.store.dataset_or_empty().await;
            series::global_growth(&dataset.snapshots, filter.window, now)
        }
    };
    Ok(warp::reply::json(&ApiEnvelope::ok(points)))
}
