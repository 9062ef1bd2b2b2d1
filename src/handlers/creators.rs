// src/handlers/creators.rs
use std::sync::Arc;

use log::info;
use warp::reply::Json;
use warp::Rejection;

use super::{today, AppContext, DashboardQuery};
use crate::models::ApiEnvelope;
use crate::services::dashboard::{
    creator_rows, select_creators, sort_rows, top_performers, top_videos, PlatformFilter, SortKey,
};

const TOP_VIDEO_LIMIT: usize = 5;
const TOP_PERFORMER_LIMIT: usize = 20;

pub async fn get_creators(query: DashboardQuery, ctx: Arc<AppContext>) -> Result<Json, Rejection> {
    let dataset = ctx.store.dataset_or_empty().await;
    let now = today();
    let selected = select_creators(&dataset.creators, &query.filter(), &ctx.campaign_keywords, now);
    let mut rows = creator_rows(&selected, now);

    let key = query.sort.as_deref().map(SortKey::parse).unwrap_or(SortKey::Views);
    sort_rows(&mut rows, key, query.descending());

    info!("Creator table: {} rows", rows.len());
    Ok(warp::reply::json(&ApiEnvelope::ok(rows)))
}

pub async fn get_top_videos(query: DashboardQuery, ctx: Arc<AppContext>) -> Result<Json, Rejection> {
    let dataset = ctx.store.dataset_or_empty().await;
    let selected =
        select_creators(&dataset.creators, &query.filter(), &ctx.campaign_keywords, today());
    let top = top_videos(&selected, TOP_VIDEO_LIMIT);
    Ok(warp::reply::json(&ApiEnvelope::ok(top)))
}

/// Creator snapshot rows ranked by 24h growth; the platform filter picks
/// which snapshot feed is ranked (TikTok by default).
pub async fn get_top_performers(
    query: DashboardQuery,
    ctx: Arc<AppContext>,
) -> Result<Json, Rejection> {
    let dataset = ctx.store.dataset_or_empty().await;
    let feed = match query.filter().platform {
        PlatformFilter::Instagram => &dataset.instagram_creator_snapshots,
        _ => &dataset.creator_snapshots,
    };
    let ranked = top_performers(feed, TOP_PERFORMER_LIMIT);
    Ok(warp::reply::json(&ApiEnvelope::ok(ranked)))
}
