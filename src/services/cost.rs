// src/services/cost.rs
use serde::Serialize;

use crate::models::{Creator, Platform, Video};

/// Instagram posts are billed at a flat $1 CPM with no per-video base cost;
/// the per-video rate and contract CPM only apply to TikTok.
pub const INSTAGRAM_CPM: f64 = 1.0;

/// (total-view threshold, cash bonus). Highest threshold first; first match
/// wins.
const BONUS_TIERS: [(u64, f64); 3] = [(1_500_000, 600.0), (1_000_000, 400.0), (500_000, 200.0)];

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub total: f64,
    pub tiktok_cost: f64,
    pub instagram_cost: f64,
    pub bonus: f64,
    pub tiktok_views: u64,
    pub instagram_views: u64,
    pub tiktok_videos: usize,
    pub instagram_videos: usize,
    pub videos_used: usize,
    pub views_used: u64,
}

/// Videos that participate in cost and engagement computation. When the
/// creator's contract changed, only videos on/after the change date count;
/// a video whose timestamp never parsed cannot be placed against the cutoff
/// and is excluded. A missing or malformed change date disables the cutoff.
pub fn billable_videos(creator: &Creator) -> Vec<&Video> {
    match (creator.contract_changed, creator.contract_changed_date) {
        (true, Some(cutoff)) => creator
            .videos
            .iter()
            .filter(|v| v.day().map_or(false, |d| d >= cutoff))
            .collect(),
        _ => creator.videos.iter().collect(),
    }
}

pub fn bonus_for(total_views: u64) -> f64 {
    BONUS_TIERS
        .iter()
        .find(|(threshold, _)| total_views >= *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

/// Spend attributed to a single video, used by the daily-spend series.
pub fn video_cost(video: &Video, cost_per_video: f64, cpm: f64) -> f64 {
    match video.platform {
        Platform::Instagram => video.views as f64 / 1000.0 * INSTAGRAM_CPM,
        _ => cost_per_video + video.views as f64 / 1000.0 * cpm,
    }
}

/// Pure, never fails: malformed inputs were already defaulted at ingestion.
pub fn compute_cost(creator: &Creator) -> CostBreakdown {
    let videos = billable_videos(creator);

    let (tiktok, instagram): (Vec<&Video>, Vec<&Video>) = videos
        .iter()
        .copied()
        .filter(|v| v.platform != Platform::Unknown)
        .partition(|v| v.platform == Platform::Tiktok);

    let tiktok_views: u64 = tiktok.iter().map(|v| v.views).sum();
    let instagram_views: u64 = instagram.iter().map(|v| v.views).sum();
    let total_views = tiktok_views + instagram_views;

    let tiktok_cost = tiktok.len() as f64 * creator.cost_per_video
        + tiktok_views as f64 / 1000.0 * creator.cpm;
    let instagram_cost = instagram_views as f64 / 1000.0 * INSTAGRAM_CPM;

    let bonus = if creator.bonus_eligible { bonus_for(total_views) } else { 0.0 };

    CostBreakdown {
        total: tiktok_cost + instagram_cost + bonus,
        tiktok_cost,
        instagram_cost,
        bonus,
        tiktok_views,
        instagram_views,
        tiktok_videos: tiktok.len(),
        instagram_videos: instagram.len(),
        videos_used: videos.len(),
        views_used: total_views,
    }
}

/// Effective cost per 1000 counted views; 0 when nothing was counted.
pub fn real_cpm(cost: &CostBreakdown) -> f64 {
    if cost.views_used > 0 {
        cost.total / cost.views_used as f64 * 1000.0
    } else {
        0.0
    }
}

/// Flags creators whose effective CPM is out of line with their volume.
pub fn cpm_warning(real_cpm: f64, video_count: usize) -> bool {
    if real_cpm > 10.0 {
        return true;
    }
    if real_cpm > 5.0 && (5..=9).contains(&video_count) {
        return true;
    }
    real_cpm > 2.5 && video_count > 10
}
