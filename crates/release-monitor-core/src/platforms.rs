//! Tracked platform list and platform search

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{Platform, SelectOption};
use crate::sequence::RequestSequence;
use crate::storage::{LocalStore, PLATFORMS_KEY};

/// Observable state of the platform store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformState {
    pub search_query: String,
    pub search_results: Vec<Platform>,
    pub platforms: Vec<Platform>,
}

pub struct PlatformStore {
    storage: LocalStore,
    catalog: Arc<dyn Catalog>,
    state: RwLock<PlatformState>,
    search_seq: RequestSequence,
}

impl PlatformStore {
    pub fn new(storage: LocalStore, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            storage,
            catalog,
            state: RwLock::new(PlatformState::default()),
            search_seq: RequestSequence::default(),
        }
    }

    /// Replace the in-memory list with the persisted one
    pub async fn load(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.platforms = self.storage.load_list(PLATFORMS_KEY)?;
        tracing::debug!("Loaded {} tracked platforms", state.platforms.len());
        Ok(())
    }

    /// Track a copy of `platform`, keeping the list sorted by name.
    ///
    /// Returns `false` when a platform with the same id is already tracked.
    pub async fn add(&self, platform: &Platform) -> Result<bool> {
        let mut state = self.state.write().await;

        if state.platforms.iter().any(|p| p.id == platform.id) {
            tracing::debug!("Platform {} already tracked", platform.id);
            return Ok(false);
        }

        let mut platforms = state.platforms.clone();
        platforms.push(platform.clone());
        sort_platforms(&mut platforms);

        self.storage.save_list(PLATFORMS_KEY, &platforms)?;
        state.platforms = platforms;

        tracing::info!("Tracking platform {} ({})", platform.name, platform.id);
        Ok(true)
    }

    /// Stop tracking platform `id`. Returns whether it was tracked.
    pub async fn remove(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;

        let platforms: Vec<Platform> = state
            .platforms
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        let removed = platforms.len() != state.platforms.len();

        self.storage.save_list(PLATFORMS_KEY, &platforms)?;
        state.platforms = platforms;

        if removed {
            tracing::info!("Stopped tracking platform {}", id);
        }
        Ok(removed)
    }

    pub async fn get(&self, id: i64) -> Option<Platform> {
        let state = self.state.read().await;
        state.platforms.iter().find(|p| p.id == id).cloned()
    }

    /// Search the catalog and publish the matches as `search_results`.
    ///
    /// If another search or a reset was issued while this one was in
    /// flight, the response is dropped, failures included.
    pub async fn search(&self, query: &str) -> Result<()> {
        let ticket = {
            let mut state = self.state.write().await;
            state.search_query = query.to_string();
            self.search_seq.next()
        };

        let result = self.catalog.search_platforms(query).await;

        let mut state = self.state.write().await;
        if !self.search_seq.is_current(ticket) {
            if let Err(e) = result {
                tracing::debug!("Ignoring failure of stale platform search '{}': {}", query, e);
            } else {
                tracing::debug!("Dropping stale platform search results for '{}'", query);
            }
            return Ok(());
        }
        state.search_results = result?;
        Ok(())
    }

    pub async fn reset_search(&self) {
        let mut state = self.state.write().await;
        self.search_seq.next();
        state.search_query.clear();
        state.search_results.clear();
    }

    pub async fn platforms(&self) -> Vec<Platform> {
        self.state.read().await.platforms.clone()
    }

    pub async fn snapshot(&self) -> PlatformState {
        self.state.read().await.clone()
    }

    pub async fn search_result_options(&self) -> Vec<SelectOption<Platform>> {
        let state = self.state.read().await;
        state
            .search_results
            .iter()
            .map(|platform| SelectOption {
                label: platform.name.clone(),
                value: platform.clone(),
            })
            .collect()
    }
}

fn sort_platforms(platforms: &mut [Platform]) {
    platforms.sort_by(|a, b| a.name.cmp(&b.name));
}
