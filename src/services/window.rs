// src/services/window.rs
use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Creator, Snapshot};

/// Named date range restricting which videos/snapshots contribute to a
/// computation. The wire values ("1", "7", "30", "current_month", "all") come
/// straight from the dashboard's date selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    LastDay,
    LastWeek,
    LastMonth,
    CurrentMonth,
    AllTime,
}

impl Window {
    /// Unknown selector values fall back to all-time rather than erroring.
    pub fn parse(raw: &str) -> Window {
        match raw.trim() {
            "1" => Window::LastDay,
            "7" => Window::LastWeek,
            "30" => Window::LastMonth,
            "current_month" | "month" => Window::CurrentMonth,
            _ => Window::AllTime,
        }
    }

    /// Inclusive [start, end] day bounds, or None for the unbounded window.
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Window::LastDay => Some((today - Duration::days(1), today)),
            Window::LastWeek => Some((today - Duration::days(7), today)),
            Window::LastMonth => Some((today - Duration::days(30), today)),
            Window::CurrentMonth => {
                let first = today.with_day(1).unwrap_or(today);
                Some((first, today))
            }
            Window::AllTime => None,
        }
    }

    pub fn contains(&self, day: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Window::AllTime => true,
            Window::CurrentMonth => day.month() == today.month() && day.year() == today.year(),
            _ => match self.bounds(today) {
                Some((start, end)) => day >= start && day <= end,
                None => true,
            },
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::AllTime
    }
}

/// Restricts a snapshot series to the window. Undated snapshots never match a
/// bounded window but survive all-time (which is a no-op by contract).
pub fn filter_snapshots(snapshots: &[Snapshot], window: Window, today: NaiveDate) -> Vec<Snapshot> {
    if window == Window::AllTime {
        return snapshots.to_vec();
    }
    snapshots
        .iter()
        .filter(|s| s.day().map_or(false, |d| window.contains(d, today)))
        .cloned()
        .collect()
}

/// Restricts a creator's video list to the window, recomputing the derived
/// counts implicitly (they are read off the surviving list). Returns None when
/// no videos survive, dropping the creator from the filtered set.
pub fn restrict_creator(creator: &Creator, window: Window, today: NaiveDate) -> Option<Creator> {
    if window == Window::AllTime {
        return if creator.videos.is_empty() { None } else { Some(creator.clone()) };
    }
    let videos: Vec<_> = creator
        .videos
        .iter()
        .filter(|v| v.day().map_or(false, |d| window.contains(d, today)))
        .cloned()
        .collect();
    if videos.is_empty() {
        return None;
    }
    Some(Creator { videos, ..creator.clone() })
}

/// Every calendar day in [start, end], used to fill chart gaps with
/// zero-valued buckets.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current += Duration::days(1);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(date: &str, growth: i64) -> Snapshot {
        Snapshot {
            date: crate::models::parse_datetime(&format!("{date}T08:00:00Z")),
            view_growth: growth,
            total_views: 0,
        }
    }

    #[test]
    fn parse_falls_back_to_all_time() {
        assert_eq!(Window::parse("7"), Window::LastWeek);
        assert_eq!(Window::parse("current_month"), Window::CurrentMonth);
        assert_eq!(Window::parse("fortnight"), Window::AllTime);
        assert_eq!(Window::parse(""), Window::AllTime);
    }

    #[test]
    fn last_day_keeps_at_most_yesterday_and_today() {
        let today = day(2024, 3, 10);
        let series: Vec<Snapshot> = (1..=10)
            .map(|d| snapshot(&format!("2024-03-{d:02}"), d as i64))
            .collect();
        let filtered = filter_snapshots(&series, Window::LastDay, today);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].day(), Some(day(2024, 3, 9)));
        assert_eq!(filtered[1].day(), Some(day(2024, 3, 10)));
    }

    #[test]
    fn week_window_is_midnight_aligned_inclusive() {
        let today = day(2024, 3, 10);
        assert!(Window::LastWeek.contains(day(2024, 3, 3), today));
        assert!(!Window::LastWeek.contains(day(2024, 3, 2), today));
        assert!(Window::LastWeek.contains(today, today));
        assert!(!Window::LastWeek.contains(day(2024, 3, 11), today));
    }

    #[test]
    fn current_month_matches_month_and_year() {
        let today = day(2024, 3, 10);
        assert!(Window::CurrentMonth.contains(day(2024, 3, 31), today));
        assert!(!Window::CurrentMonth.contains(day(2024, 2, 29), today));
        assert!(!Window::CurrentMonth.contains(day(2023, 3, 10), today));
    }

    #[test]
    fn all_time_is_identity_for_snapshots() {
        let series = vec![snapshot("2020-01-01", 5), snapshot("2024-03-01", 7)];
        let filtered = filter_snapshots(&series, Window::AllTime, day(2024, 3, 10));
        assert_eq!(filtered.len(), series.len());
    }

    #[test]
    fn undated_snapshots_are_dropped_by_bounded_windows() {
        let mut series = vec![snapshot("2024-03-10", 5)];
        series.push(Snapshot { date: None, view_growth: 9, total_views: 0 });
        let filtered = filter_snapshots(&series, Window::LastWeek, day(2024, 3, 10));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn restrict_creator_recomputes_counts_and_drops_empty() {
        let creator = Creator {
            username: "alice".into(),
            videos: vec![
                crate::models::Video {
                    platform: crate::models::Platform::Tiktok,
                    date: Some(Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()),
                    views: 100,
                    likes: 10,
                    comments: 1,
                    description: String::new(),
                    url: None,
                },
                crate::models::Video {
                    platform: crate::models::Platform::Tiktok,
                    date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
                    views: 900,
                    likes: 90,
                    comments: 9,
                    description: String::new(),
                    url: None,
                },
            ],
            cost_per_video: 0.0,
            cpm: 0.0,
            bonus_eligible: false,
            deal_type: None,
            contract_changed: false,
            contract_changed_date: None,
        };
        let today = day(2024, 3, 10);
        let restricted = restrict_creator(&creator, Window::LastWeek, today).unwrap();
        assert_eq!(restricted.video_count(), 1);
        assert_eq!(restricted.view_count(), 100);
        assert!(restrict_creator(&creator, Window::LastDay, today).is_none());
    }

    #[test]
    fn day_range_is_inclusive() {
        let days = day_range(day(2024, 2, 27), day(2024, 3, 2));
        assert_eq!(days.len(), 5); // leap year
        assert_eq!(days[0], day(2024, 2, 27));
        assert_eq!(days[4], day(2024, 3, 2));
    }
}
