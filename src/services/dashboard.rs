// src/services/dashboard.rs
//
// The deterministic reducer behind every dashboard view: one immutable filter
// tuple (window, platform, selected creator) applied to the last-fetched raw
// dataset. Each request recomputes all derived fields from scratch; nothing
// here mutates shared state.
use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::models::{Creator, CreatorSnapshot, Platform, Video};
use crate::services::cost::{self, CostBreakdown};
use crate::services::rollup::{self, ChangeScope, CostTotals, GlobalStats, PlatformSplit};
use crate::services::store::Dataset;
use crate::services::window::{restrict_creator, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFilter {
    All,
    Tiktok,
    Instagram,
}

impl PlatformFilter {
    pub fn parse(raw: &str) -> PlatformFilter {
        match raw.trim().to_lowercase().as_str() {
            "tiktok" => PlatformFilter::Tiktok,
            "instagram" => PlatformFilter::Instagram,
            _ => PlatformFilter::All,
        }
    }

    fn keeps(&self, platform: Platform) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Tiktok => platform == Platform::Tiktok,
            PlatformFilter::Instagram => platform == Platform::Instagram,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterState {
    pub window: Window,
    pub platform: PlatformFilter,
    pub creator: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState { window: Window::AllTime, platform: PlatformFilter::All, creator: None }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stats: GlobalStats,
    pub platforms: PlatformSplit,
    pub costs: CostTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRow {
    pub username: String,
    pub deal_type: Option<String>,
    pub published_videos: usize,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub last_post_days: Option<i64>,
    pub contract_changed: bool,
    pub cost: CostBreakdown,
    pub real_cpm: f64,
    pub cpm_warning: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopVideo {
    pub username: String,
    #[serde(flatten)]
    pub video: Video,
}

/// Accepts a bare name, an @-handle, or a TikTok profile URL.
pub fn extract_username(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(re) = Regex::new(r"(?i)tiktok\.com/@([^/?#]+)") {
        if let Some(caps) = re.captures(trimmed) {
            return caps.get(1).map(|m| m.as_str().trim().to_string());
        }
    }
    let name = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn matches_campaign(username: &str, video: &Video, keywords: &[String]) -> bool {
    let username = username.to_lowercase();
    let description = video.description.to_lowercase();
    keywords
        .iter()
        .any(|kw| username.contains(kw.as_str()) || description.contains(kw.as_str()))
}

/// Keeps only campaign-relevant videos when keywords are configured. An empty
/// keyword list disables the filter entirely.
fn campaign_restrict(creator: &Creator, keywords: &[String]) -> Option<Creator> {
    if keywords.is_empty() {
        return Some(creator.clone());
    }
    let videos: Vec<Video> = creator
        .videos
        .iter()
        .filter(|v| matches_campaign(&creator.username, v, keywords))
        .cloned()
        .collect();
    if videos.is_empty() {
        return None;
    }
    Some(Creator { videos, ..creator.clone() })
}

fn platform_restrict(creator: &Creator, platform: PlatformFilter) -> Option<Creator> {
    if platform == PlatformFilter::All {
        return Some(creator.clone());
    }
    let videos: Vec<Video> =
        creator.videos.iter().filter(|v| platform.keeps(v.platform)).cloned().collect();
    if videos.is_empty() {
        return None;
    }
    Some(Creator { videos, ..creator.clone() })
}

/// Applies the full filter pipeline: campaign relevance, date window,
/// selected creator, platform. Creators left without videos drop out.
pub fn select_creators(
    creators: &[Creator],
    filter: &FilterState,
    keywords: &[String],
    today: NaiveDate,
) -> Vec<Creator> {
    let wanted = filter.creator.as_ref().map(|c| c.to_lowercase());
    creators
        .iter()
        .filter(|c| c.has_valid_username())
        .filter(|c| wanted.as_ref().map_or(true, |w| &c.username_key() == w))
        .filter_map(|c| campaign_restrict(c, keywords))
        .filter_map(|c| restrict_creator(&c, filter.window, today))
        .filter_map(|c| platform_restrict(&c, filter.platform))
        .collect()
}

/// The single entry point for the stat cards: every derived figure recomputed
/// from the raw dataset and the filter tuple.
pub fn compute_dashboard(
    dataset: &Dataset,
    filter: &FilterState,
    keywords: &[String],
    today: NaiveDate,
) -> DashboardView {
    let selected = select_creators(&dataset.creators, filter, keywords, today);

    let usernames: HashSet<String> = selected.iter().map(Creator::username_key).collect();
    let scope = ChangeScope {
        usernames,
        include_tiktok: filter.platform != PlatformFilter::Instagram,
        include_instagram: filter.platform != PlatformFilter::Tiktok,
        unfiltered: filter.platform == PlatformFilter::All && filter.creator.is_none(),
    };
    let change = rollup::daily_views_change(
        &scope,
        &dataset.creator_snapshots,
        &dataset.instagram_creator_snapshots,
        &dataset.snapshots,
    );

    DashboardView {
        stats: rollup::rollup(&selected, change, today),
        platforms: rollup::platform_split(&selected),
        costs: rollup::cost_totals(&selected),
    }
}

pub fn creator_rows(creators: &[Creator], today: NaiveDate) -> Vec<CreatorRow> {
    creators
        .iter()
        .map(|c| {
            let breakdown = cost::compute_cost(c);
            let real_cpm = cost::real_cpm(&breakdown);
            CreatorRow {
                username: c.username.clone(),
                deal_type: c.deal_type.clone(),
                published_videos: c.video_count(),
                views: c.view_count(),
                likes: c.like_count(),
                comments: c.comment_count(),
                last_post_days: c.days_since_last_post(today),
                contract_changed: c.contract_changed,
                cpm_warning: cost::cpm_warning(real_cpm, c.video_count()),
                real_cpm,
                cost: breakdown,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Views,
    Videos,
    Cost,
    RealCpm,
    LastPost,
}

impl SortKey {
    pub fn parse(raw: &str) -> SortKey {
        match raw.trim().to_lowercase().as_str() {
            "videos" => SortKey::Videos,
            "cost" => SortKey::Cost,
            "real_cpm" | "realcpm" | "cpm" => SortKey::RealCpm,
            "last_post" | "lastpost" => SortKey::LastPost,
            _ => SortKey::Views,
        }
    }
}

pub fn sort_rows(rows: &mut [CreatorRow], key: SortKey, descending: bool) {
    let cmp = |a: &CreatorRow, b: &CreatorRow| -> Ordering {
        match key {
            SortKey::Views => a.views.cmp(&b.views),
            SortKey::Videos => a.published_videos.cmp(&b.published_videos),
            SortKey::Cost => a.cost.total.partial_cmp(&b.cost.total).unwrap_or(Ordering::Equal),
            SortKey::RealCpm => a.real_cpm.partial_cmp(&b.real_cpm).unwrap_or(Ordering::Equal),
            // Creators that never posted sort as oldest.
            SortKey::LastPost => a
                .last_post_days
                .unwrap_or(i64::MAX)
                .cmp(&b.last_post_days.unwrap_or(i64::MAX)),
        }
    };
    rows.sort_by(|a, b| if descending { cmp(b, a) } else { cmp(a, b) });
}

/// Top N videos by views across the filtered creator set.
pub fn top_videos(creators: &[Creator], limit: usize) -> Vec<TopVideo> {
    let mut all: Vec<TopVideo> = creators
        .iter()
        .flat_map(|c| {
            c.videos
                .iter()
                .map(|v| TopVideo { username: c.username.clone(), video: v.clone() })
        })
        .collect();
    all.sort_by(|a, b| b.video.views.cmp(&a.video.views));
    all.truncate(limit);
    all
}

/// Creator snapshot rows ranked by 24h growth; rows without a growth figure
/// are not ranked.
pub fn top_performers(snapshots: &[CreatorSnapshot], limit: usize) -> Vec<CreatorSnapshot> {
    let mut ranked: Vec<CreatorSnapshot> =
        snapshots.iter().filter(|s| s.today_growth.is_some()).cloned().collect();
    ranked.sort_by_key(|s| std::cmp::Reverse(s.today_growth.unwrap_or(0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::models::Snapshot;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn video(date: (i32, u32, u32), platform: Platform, views: u64, description: &str) -> Video {
        Video {
            platform,
            date: Some(Utc.with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0).unwrap()),
            views,
            likes: 0,
            comments: 0,
            description: description.into(),
            url: None,
        }
    }

    fn creator(username: &str, videos: Vec<Video>) -> Creator {
        Creator {
            username: username.into(),
            videos,
            cost_per_video: 0.0,
            cpm: 0.0,
            bonus_eligible: false,
            deal_type: None,
            contract_changed: false,
            contract_changed_date: None,
        }
    }

    fn dataset(creators: Vec<Creator>) -> Dataset {
        Dataset { creators, ..Dataset::default() }
    }

    #[test]
    fn extract_username_handles_urls_and_handles() {
        assert_eq!(extract_username("@alice"), Some("alice".into()));
        assert_eq!(extract_username("alice"), Some("alice".into()));
        assert_eq!(
            extract_username("https://www.tiktok.com/@alice?lang=en"),
            Some("alice".into())
        );
        assert_eq!(
            extract_username("https://TIKTOK.com/@alice/video/123"),
            Some("alice".into())
        );
        assert_eq!(extract_username("  "), None);
        assert_eq!(extract_username("@"), None);
    }

    #[test]
    fn creator_filter_is_case_insensitive() {
        let creators = vec![
            creator("Alice", vec![video((2024, 3, 9), Platform::Tiktok, 10, "")]),
            creator("bob", vec![video((2024, 3, 9), Platform::Tiktok, 20, "")]),
        ];
        let filter = FilterState { creator: Some("ALICE".into()), ..FilterState::default() };
        let selected = select_creators(&creators, &filter, &[], day(2024, 3, 10));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].username, "Alice");
    }

    #[test]
    fn unknown_creator_yields_empty_selection() {
        let creators = vec![creator("alice", vec![video((2024, 3, 9), Platform::Tiktok, 10, "")])];
        let filter = FilterState { creator: Some("nobody".into()), ..FilterState::default() };
        assert!(select_creators(&creators, &filter, &[], day(2024, 3, 10)).is_empty());
    }

    #[test]
    fn campaign_keywords_restrict_videos() {
        let creators = vec![
            creator("talleralice", vec![video((2024, 3, 9), Platform::Tiktok, 10, "hello")]),
            creator(
                "bob",
                vec![
                    video((2024, 3, 9), Platform::Tiktok, 20, "my taller journey"),
                    video((2024, 3, 9), Platform::Tiktok, 30, "unrelated"),
                ],
            ),
            creator("carol", vec![video((2024, 3, 9), Platform::Tiktok, 40, "unrelated")]),
        ];
        let keywords = vec!["taller".to_string()];
        let selected =
            select_creators(&creators, &FilterState::default(), &keywords, day(2024, 3, 10));
        assert_eq!(selected.len(), 2);
        let bob = selected.iter().find(|c| c.username == "bob").unwrap();
        assert_eq!(bob.video_count(), 1);
        assert_eq!(bob.view_count(), 20);
    }

    #[test]
    fn platform_filter_drops_empty_creators() {
        let creators = vec![
            creator("alice", vec![video((2024, 3, 9), Platform::Tiktok, 10, "")]),
            creator("iris", vec![video((2024, 3, 9), Platform::Instagram, 20, "")]),
        ];
        let filter = FilterState { platform: PlatformFilter::Instagram, ..FilterState::default() };
        let selected = select_creators(&creators, &filter, &[], day(2024, 3, 10));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].username, "iris");
    }

    #[test]
    fn all_time_rollup_matches_unfiltered_rollup() {
        let creators = vec![
            creator("a", vec![video((2020, 1, 1), Platform::Tiktok, 100, "")]),
            creator("b", vec![video((2024, 3, 9), Platform::Instagram, 200, "")]),
        ];
        let today = day(2024, 3, 10);
        let view = compute_dashboard(&dataset(creators.clone()), &FilterState::default(), &[], today);
        let direct = rollup::rollup(&creators, 0, today);
        assert_eq!(view.stats.views, direct.views);
        assert_eq!(view.stats.published_videos, direct.published_videos);
        assert_eq!(view.stats.total_accounts, direct.total_accounts);
    }

    #[test]
    fn dashboard_change_uses_global_delta_when_unfiltered() {
        let mut ds = dataset(vec![creator(
            "alice",
            vec![video((2024, 3, 9), Platform::Tiktok, 10, "")],
        )]);
        ds.snapshots = vec![
            Snapshot { date: crate::models::parse_datetime("2024-03-09"), view_growth: 1, total_views: 10 },
            Snapshot { date: crate::models::parse_datetime("2024-03-10"), view_growth: 9, total_views: 19 },
        ];
        let view = compute_dashboard(&ds, &FilterState::default(), &[], day(2024, 3, 10));
        assert_eq!(view.stats.daily_views_change, 9);
    }

    #[test]
    fn rows_sort_by_real_cpm() {
        let mut cheap = creator("cheap", vec![video((2024, 3, 9), Platform::Tiktok, 100_000, "")]);
        cheap.cpm = 1.0;
        let mut pricey = creator("pricey", vec![video((2024, 3, 9), Platform::Tiktok, 1_000, "")]);
        pricey.cost_per_video = 50.0;
        let mut rows = creator_rows(&[cheap, pricey], day(2024, 3, 10));
        sort_rows(&mut rows, SortKey::RealCpm, true);
        assert_eq!(rows[0].username, "pricey");
        sort_rows(&mut rows, SortKey::RealCpm, false);
        assert_eq!(rows[0].username, "cheap");
    }

    #[test]
    fn top_videos_ranks_across_creators() {
        let creators = vec![
            creator("a", vec![video((2024, 3, 1), Platform::Tiktok, 50, ""), video((2024, 3, 2), Platform::Tiktok, 500, "")]),
            creator("b", vec![video((2024, 3, 3), Platform::Instagram, 300, "")]),
        ];
        let top = top_videos(&creators, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].video.views, 500);
        assert_eq!(top[1].username, "b");
    }

    #[test]
    fn top_performers_skip_rows_without_growth() {
        let snaps = vec![
            CreatorSnapshot { username: "a".into(), today_growth: Some(5), latest_recent_views: 0, latest_total_views: 0 },
            CreatorSnapshot { username: "b".into(), today_growth: None, latest_recent_views: 0, latest_total_views: 0 },
            CreatorSnapshot { username: "c".into(), today_growth: Some(50), latest_recent_views: 0, latest_total_views: 0 },
        ];
        let ranked = top_performers(&snaps, 20);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].username, "c");
    }
}
