// src/services/store.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::RwLock;

use crate::models::{Creator, CreatorSnapshot, Snapshot};
use crate::services::upstream::{Result, UpstreamClient};

/// One complete pull of the upstream API. Readers always see either the
/// previous dataset or this one, never a partial mix.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub creators: Vec<Creator>,
    pub snapshots: Vec<Snapshot>,
    pub creator_snapshots: Vec<CreatorSnapshot>,
    pub instagram_creator_snapshots: Vec<CreatorSnapshot>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// In-memory cache of the last-fetched raw dataset. Refreshes carry a
/// generation token; a slow refresh that resolves after a newer one was
/// issued is discarded instead of clobbering fresher data.
pub struct DashboardStore {
    data: RwLock<Option<Arc<Dataset>>>,
    generation: AtomicU64,
}

impl DashboardStore {
    pub fn new() -> Self {
        DashboardStore { data: RwLock::new(None), generation: AtomicU64::new(0) }
    }

    pub async fn dataset(&self) -> Option<Arc<Dataset>> {
        self.data.read().await.clone()
    }

    /// The current dataset, or an empty one so every view degrades to
    /// zero-valued results instead of erroring.
    pub async fn dataset_or_empty(&self) -> Arc<Dataset> {
        self.dataset().await.unwrap_or_default()
    }

    fn issue_token(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_token(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn install(&self, token: u64, dataset: Dataset) -> bool {
        if token != self.current_token() {
            warn!(
                "Discarding stale refresh (token {} superseded by {})",
                token,
                self.current_token()
            );
            return false;
        }
        *self.data.write().await = Some(Arc::new(dataset));
        true
    }

    /// Pulls everything from upstream and swaps the dataset in one step.
    /// Creator data is mandatory; the snapshot feeds are best-effort and
    /// default to empty so one broken feed never blanks the dashboard.
    pub async fn refresh(&self, upstream: &UpstreamClient, force: bool) -> Result<Arc<Dataset>> {
        let token = self.issue_token();

        let mut creators =
            if force { upstream.refresh_data().await? } else { upstream.cached_data().await? };
        creators.retain(Creator::has_valid_username);

        let snapshots = upstream.snapshots().await.unwrap_or_else(|e| {
            warn!("Global snapshot fetch failed: {}", e);
            Vec::new()
        });
        let creator_snapshots = upstream.creator_snapshots().await.unwrap_or_else(|e| {
            warn!("Creator snapshot fetch failed: {}", e);
            Vec::new()
        });
        let instagram_creator_snapshots =
            upstream.instagram_creator_snapshots().await.unwrap_or_else(|e| {
                warn!("Instagram creator snapshot fetch failed: {}", e);
                Vec::new()
            });

        let dataset = Dataset {
            creators,
            snapshots,
            creator_snapshots,
            instagram_creator_snapshots,
            fetched_at: Some(Utc::now()),
        };
        info!(
            "Loaded dataset: {} creators, {} global snapshots",
            dataset.creators.len(),
            dataset.snapshots.len()
        );

        self.install(token, dataset).await;
        self.dataset().await.ok_or_else(|| "no dataset available after refresh".into())
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        DashboardStore::new()
    }
}
