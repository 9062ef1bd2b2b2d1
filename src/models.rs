// src/models.rs
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Wire envelope used by the upstream analytics API and re-used for our own
/// responses: `{ success, data, error }`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        ApiEnvelope { success: true, data: Some(data), error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ApiEnvelope { success: false, data: None, error: Some(message.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Instagram,
    #[serde(other)]
    Unknown,
}

impl Default for Platform {
    // Rows scraped before the Instagram rollout carry no platform field.
    fn default() -> Self {
        Platform::Tiktok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default, deserialize_with = "de_platform")]
    pub platform: Platform,
    #[serde(default, deserialize_with = "de_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_count")]
    pub views: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub likes: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub comments: u64,
    #[serde(default, deserialize_with = "de_string")]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Video {
    /// Calendar day of the post, or None when the timestamp never parsed.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.date_naive())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default, deserialize_with = "de_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub videos: Vec<Video>,
    #[serde(default, deserialize_with = "de_currency")]
    pub cost_per_video: f64,
    #[serde(default, deserialize_with = "de_currency")]
    pub cpm: f64,
    #[serde(rename = "bonusEligibility", default, deserialize_with = "de_yes")]
    pub bonus_eligible: bool,
    #[serde(default)]
    pub deal_type: Option<String>,
    #[serde(rename = "contractHasChanged", default, deserialize_with = "de_flag")]
    pub contract_changed: bool,
    #[serde(default, deserialize_with = "de_mdy_date")]
    pub contract_changed_date: Option<NaiveDate>,
}

impl Creator {
    /// Creators must carry a real username to participate in any aggregation;
    /// the scraper emits the literal string "null" for dead rows.
    pub fn has_valid_username(&self) -> bool {
        !self.username.is_empty() && self.username != "null"
    }

    pub fn username_key(&self) -> String {
        self.username.to_lowercase()
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn view_count(&self) -> u64 {
        self.videos.iter().map(|v| v.views).sum()
    }

    pub fn like_count(&self) -> u64 {
        self.videos.iter().map(|v| v.likes).sum()
    }

    pub fn comment_count(&self) -> u64 {
        self.videos.iter().map(|v| v.comments).sum()
    }

    pub fn last_post_day(&self) -> Option<NaiveDate> {
        self.videos.iter().filter_map(Video::day).max()
    }

    pub fn days_since_last_post(&self, today: NaiveDate) -> Option<i64> {
        self.last_post_day().map(|d| (today - d).num_days())
    }
}

/// One point of the global daily view-growth series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "de_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_signed")]
    pub view_growth: i64,
    #[serde(default, deserialize_with = "de_count")]
    pub total_views: u64,
}

impl Snapshot {
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.date_naive())
    }
}

/// Per-creator daily summary from the snapshot feeds (one row per creator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSnapshot {
    #[serde(default, deserialize_with = "de_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de_opt_signed")]
    pub today_growth: Option<i64>,
    #[serde(default, deserialize_with = "de_count")]
    pub latest_recent_views: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub latest_total_views: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthEntry {
    #[serde(default, deserialize_with = "de_datetime")]
    pub date: Option<DateTime<Utc>>,
    // The feed has renamed this field twice; accept all spellings.
    #[serde(default, deserialize_with = "de_signed", alias = "viewGrowth", alias = "growth")]
    pub views: i64,
    #[serde(default, deserialize_with = "de_count")]
    pub recent_views: u64,
    #[serde(default, deserialize_with = "de_count")]
    pub total_views: u64,
}

/// Full daily history for one creator, fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSnapshotDetail {
    #[serde(default, deserialize_with = "de_string")]
    pub username: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub daily_growth: Vec<GrowthEntry>,
}

/// Payload of `/api/data` and `/api/fetch`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatorData {
    #[serde(default, deserialize_with = "de_or_default")]
    pub stats: Vec<Creator>,
}

// ---------------------------------------------------------------------------
// Lenient field parsing. The upstream sheet-backed API mixes numbers, numeric
// strings, "$10"-style currency, nulls and absent fields; every helper here
// fails soft to a default instead of aborting deserialization.
// ---------------------------------------------------------------------------

pub fn parse_currency(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('$').unwrap_or(trimmed);
    stripped.trim().parse::<f64>().unwrap_or(0.0).max(0.0)
}

/// Accepts RFC3339, `YYYY-MM-DDTHH:MM:SS(.f)`, or a bare `YYYY-MM-DD`.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    None
}

/// Contract dates arrive as `month/day/year` with no zero padding.
pub fn parse_mdy_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok()
}

fn de_or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn de_platform<'de, D: Deserializer<'de>>(de: D) -> Result<Platform, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "tiktok" => Platform::Tiktok,
            "instagram" => Platform::Instagram,
            _ => Platform::Unknown,
        },
        _ => Platform::default(),
    })
}

fn de_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

fn de_currency<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => parse_currency(&s),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0).max(0.0),
        _ => 0.0,
    })
}

fn de_count<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.max(0) as u64
            } else {
                n.as_f64().map(|f| f.max(0.0) as u64).unwrap_or(0)
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map(|i| i.max(0) as u64).unwrap_or(0),
        _ => 0,
    })
}

fn de_signed<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    })
}

fn de_opt_signed<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    })
}

fn de_yes<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("yes"),
        Some(Value::Bool(b)) => b,
        _ => false,
    })
}

fn de_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
        }
        _ => false,
    })
}

fn de_datetime<'de, D: Deserializer<'de>>(de: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => parse_datetime(&s),
        _ => None,
    })
}

fn de_mdy_date<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => parse_mdy_date(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_parses_currency_strings_and_yes_flag() {
        let json = r#"{
            "username": "alice",
            "costPerVideo": "$10",
            "cpm": "2",
            "bonusEligibility": "Yes",
            "contractHasChanged": true,
            "contractChangedDate": "1/15/2024",
            "videos": []
        }"#;
        let creator: Creator = serde_json::from_str(json).unwrap();
        assert_eq!(creator.cost_per_video, 10.0);
        assert_eq!(creator.cpm, 2.0);
        assert!(creator.bonus_eligible);
        assert!(creator.contract_changed);
        assert_eq!(
            creator.contract_changed_date,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn malformed_fields_fail_soft_to_defaults() {
        let json = r#"{
            "username": "bob",
            "costPerVideo": "n/a",
            "cpm": null,
            "bonusEligibility": "no",
            "contractHasChanged": "maybe",
            "contractChangedDate": "not a date",
            "videos": [
                {"platform": "tiktok", "date": "garbage", "views": -5, "likes": "12"}
            ]
        }"#;
        let creator: Creator = serde_json::from_str(json).unwrap();
        assert_eq!(creator.cost_per_video, 0.0);
        assert_eq!(creator.cpm, 0.0);
        assert!(!creator.bonus_eligible);
        assert!(!creator.contract_changed);
        assert!(creator.contract_changed_date.is_none());
        assert!(creator.videos[0].date.is_none());
        assert_eq!(creator.videos[0].views, 0);
        assert_eq!(creator.videos[0].likes, 12);
    }

    #[test]
    fn unknown_platform_maps_to_unknown_and_missing_defaults_to_tiktok() {
        let v: Video = serde_json::from_str(r#"{"platform": "youtube"}"#).unwrap();
        assert_eq!(v.platform, Platform::Unknown);
        let v: Video = serde_json::from_str("{}").unwrap();
        assert_eq!(v.platform, Platform::Tiktok);
    }

    #[test]
    fn null_usernames_are_invalid() {
        let c: Creator = serde_json::from_str(r#"{"username": "null"}"#).unwrap();
        assert!(!c.has_valid_username());
        let c: Creator = serde_json::from_str(r#"{"username": null}"#).unwrap();
        assert!(!c.has_valid_username());
    }

    #[test]
    fn growth_entry_accepts_field_aliases() {
        let e: GrowthEntry = serde_json::from_str(r#"{"date": "2024-01-02", "viewGrowth": 150}"#).unwrap();
        assert_eq!(e.views, 150);
        let e: GrowthEntry = serde_json::from_str(r#"{"growth": -20}"#).unwrap();
        assert_eq!(e.views, -20);
    }

    #[test]
    fn datetime_parsing_accepts_common_shapes() {
        assert!(parse_datetime("2024-03-01T10:30:00Z").is_some());
        assert!(parse_datetime("2024-03-01T10:30:00.123Z").is_some());
        assert!(parse_datetime("2024-03-01").is_some());
        assert!(parse_datetime("03/01/2024").is_none());
    }

    #[test]
    fn envelope_round_trips() {
        let raw = r#"{"success": false, "error": "scrape failed"}"#;
        let env: ApiEnvelope<Vec<Snapshot>> = serde_json::from_str(raw).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("scrape failed"));
    }
}
