// src/services/series.rs
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Creator, CreatorSnapshotDetail, Snapshot};
use crate::services::cost;
use crate::services::window::{day_range, filter_snapshots, Window};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountPoint {
    pub date: NaiveDate,
    pub videos: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendPoint {
    pub date: NaiveDate,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub views: i64,
    pub total_views: u64,
}

/// Lays day buckets over the window: bounded windows are gap-filled so charts
/// render a continuous day-by-day series; all-time uses observed days only.
fn windowed_days<T>(buckets: &BTreeMap<NaiveDate, T>, window: Window, today: NaiveDate) -> Vec<NaiveDate> {
    match window.bounds(today) {
        Some((start, end)) => day_range(start, end),
        None => buckets.keys().copied().collect(),
    }
}

/// Videos posted per day across the (already filtered) creator set.
pub fn daily_video_counts(creators: &[Creator], window: Window, today: NaiveDate) -> Vec<CountPoint> {
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for video in creators.iter().flat_map(|c| c.videos.iter()) {
        if let Some(day) = video.day() {
            *buckets.entry(day).or_insert(0) += 1;
        }
    }
    windowed_days(&buckets, window, today)
        .into_iter()
        .map(|date| CountPoint { date, videos: buckets.get(&date).copied().unwrap_or(0) })
        .collect()
}

/// Spend per day, attributing each billable video's cost to its posting day.
/// Honors each creator's contract-change cutoff.
pub fn daily_spend(creators: &[Creator], window: Window, today: NaiveDate) -> Vec<SpendPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for creator in creators {
        for video in cost::billable_videos(creator) {
            if let Some(day) = video.day() {
                *buckets.entry(day).or_insert(0.0) +=
                    cost::video_cost(video, creator.cost_per_video, creator.cpm);
            }
        }
    }
    windowed_days(&buckets, window, today)
        .into_iter()
        .map(|date| SpendPoint { date, cost: buckets.get(&date).copied().unwrap_or(0.0) })
        .collect()
}

/// Global daily view growth from the snapshot series.
pub fn global_growth(snapshots: &[Snapshot], window: Window, today: NaiveDate) -> Vec<GrowthPoint> {
    let mut points: Vec<GrowthPoint> = filter_snapshots(snapshots, window, today)
        .into_iter()
        .filter_map(|s| {
            s.day().map(|date| GrowthPoint {
                date,
                views: s.view_growth,
                total_views: s.total_views,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// One creator's daily view growth. Older feed rows carry only cumulative
/// totals with a zeroed growth column; in that case growth is derived as
/// successive-day deltas of the running total before windowing.
pub fn creator_growth(detail: &CreatorSnapshotDetail, window: Window, today: NaiveDate) -> Vec<GrowthPoint> {
    let mut points: Vec<(NaiveDate, i64, u64, u64)> = detail
        .daily_growth
        .iter()
        .filter_map(|e| e.date.map(|d| (d.date_naive(), e.views, e.recent_views, e.total_views)))
        .collect();
    points.sort_by_key(|p| p.0);

    if points.len() > 1 && points.iter().all(|p| p.1 == 0) {
        for i in 1..points.len() {
            let prev = if points[i - 1].3 > 0 { points[i - 1].3 } else { points[i - 1].2 };
            let curr = if points[i].3 > 0 { points[i].3 } else { points[i].2 };
            points[i].1 = curr as i64 - prev as i64;
        }
    }

    points
        .into_iter()
        .filter(|p| window.contains(p.0, today))
        .map(|(date, views, _, total_views)| GrowthPoint { date, views, total_views })
        .collect()
}
