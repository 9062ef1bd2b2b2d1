// src/services/rollup.rs
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Creator, CreatorSnapshot, Platform, Snapshot};
use crate::services::cost::{self, CostBreakdown};

/// A creator is "active" when their most recent post is at most this many
/// days old.
pub const ACTIVE_WINDOW_DAYS: i64 = 10;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub published_videos: u64,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub daily_views_change: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTotals {
    pub videos: u64,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSplit {
    pub tiktok: PlatformTotals,
    pub instagram: PlatformTotals,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    pub total: f64,
    pub tiktok: f64,
    pub instagram: f64,
    pub bonus: f64,
    pub real_cpm: f64,
}

/// Folds a filtered creator set into global totals.
pub fn rollup(creators: &[Creator], daily_views_change: i64, today: NaiveDate) -> GlobalStats {
    let active_accounts = creators
        .iter()
        .filter(|c| {
            c.days_since_last_post(today)
                .map_or(false, |days| days <= ACTIVE_WINDOW_DAYS)
        })
        .count();

    GlobalStats {
        published_videos: creators.iter().map(|c| c.video_count() as u64).sum(),
        views: creators.iter().map(Creator::view_count).sum(),
        likes: creators.iter().map(Creator::like_count).sum(),
        comments: creators.iter().map(Creator::comment_count).sum(),
        total_accounts: creators.len(),
        active_accounts,
        daily_views_change,
    }
}

pub fn platform_split(creators: &[Creator]) -> PlatformSplit {
    let mut split = PlatformSplit::default();
    for video in creators.iter().flat_map(|c| c.videos.iter()) {
        let totals = match video.platform {
            Platform::Instagram => &mut split.instagram,
            // Pre-rollout rows without a platform are TikTok.
            _ => &mut split.tiktok,
        };
        totals.videos += 1;
        totals.views += video.views;
        totals.likes += video.likes;
        totals.comments += video.comments;
    }
    split
}

/// Sums per-creator cost breakdowns; the global real CPM is computed over the
/// summed totals, not averaged per creator.
pub fn cost_totals(creators: &[Creator]) -> CostTotals {
    let breakdowns: Vec<CostBreakdown> = creators.iter().map(cost::compute_cost).collect();
    let total: f64 = breakdowns.iter().map(|b| b.total).sum();
    let views_used: u64 = breakdowns.iter().map(|b| b.views_used).sum();
    CostTotals {
        total,
        tiktok: breakdowns.iter().map(|b| b.tiktok_cost).sum(),
        instagram: breakdowns.iter().map(|b| b.instagram_cost).sum(),
        bonus: breakdowns.iter().map(|b| b.bonus).sum(),
        real_cpm: if views_used > 0 { total / views_used as f64 * 1000.0 } else { 0.0 },
    }
}

/// Which snapshot feeds participate in the daily-change figure, and whether
/// the scope is completely unfiltered (all platforms, no creator selected).
#[derive(Debug, Clone)]
pub struct ChangeScope {
    pub usernames: HashSet<String>,
    pub include_tiktok: bool,
    pub include_instagram: bool,
    pub unfiltered: bool,
}

/// Single definition for the stat-card delta: sum the per-creator 24h growth
/// rows matching the scope; only a completely unfiltered scope with no
/// matching rows falls back to the latest global snapshot delta.
pub fn daily_views_change(
    scope: &ChangeScope,
    tiktok: &[CreatorSnapshot],
    instagram: &[CreatorSnapshot],
    global: &[Snapshot],
) -> i64 {
    let mut sum = 0i64;
    let mut matched = false;

    let mut feeds: Vec<&[CreatorSnapshot]> = Vec::new();
    if scope.include_tiktok {
        feeds.push(tiktok);
    }
    if scope.include_instagram {
        feeds.push(instagram);
    }
    for row in feeds.into_iter().flatten() {
        if !scope.usernames.contains(&row.username.to_lowercase()) {
            continue;
        }
        if let Some(growth) = row.today_growth {
            sum += growth;
            matched = true;
        }
    }

    if matched || !scope.unfiltered {
        return sum;
    }

    // A delta needs at least two recorded days.
    if global.len() < 2 {
        return 0;
    }
    global
        .iter()
        .filter(|s| s.day().is_some())
        .max_by_key(|s| s.day())
        .map(|s| s.view_growth)
        .unwrap_or(0)
}
