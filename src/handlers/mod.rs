// src/handlers/mod.rs
pub mod charts;
pub mod creators;
pub mod dashboard;
pub mod error;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::services::dashboard::{extract_username, FilterState, PlatformFilter};
use crate::services::store::DashboardStore;
use crate::services::upstream::UpstreamClient;
use crate::services::window::Window;

/// Shared handler state: the dataset cache, the upstream client, and the
/// campaign keyword configuration.
pub struct AppContext {
    pub store: DashboardStore,
    pub upstream: UpstreamClient,
    pub campaign_keywords: Vec<String>,
}

/// Query parameters shared by every dashboard endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub window: Option<String>,
    pub platform: Option<String>,
    pub creator: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl DashboardQuery {
    pub fn filter(&self) -> FilterState {
        FilterState {
            window: self.window.as_deref().map(Window::parse).unwrap_or_default(),
            platform: self
                .platform
                .as_deref()
                .map(PlatformFilter::parse)
                .unwrap_or(PlatformFilter::All),
            // Accepts @handles and profile URLs; an unknown name just
            // selects nothing.
            creator: self.creator.as_deref().and_then(extract_username),
        }
    }

    pub fn descending(&self) -> bool {
        !matches!(self.order.as_deref(), Some("asc"))
    }
}

/// Window comparisons happen against the server's local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
