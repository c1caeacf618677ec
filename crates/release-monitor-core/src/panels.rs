//! View-side controllers
//!
//! A panel owns no state of its own beyond what it needs to route user
//! intents: clicks become store calls, typed search text goes through a
//! [`Debouncer`] first. Rendering is left to whoever holds the panel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::debounce::Debouncer;
use crate::error::{Error, Result};
use crate::games::{GamesStore, LoadReport};
use crate::models::{Game, Platform};
use crate::platforms::PlatformStore;

pub struct PlatformsPanel {
    store: Arc<PlatformStore>,
    search: Debouncer<String>,
}

impl PlatformsPanel {
    pub fn new(store: Arc<PlatformStore>, debounce: Duration) -> Self {
        let search_store = store.clone();
        let search = Debouncer::new(debounce, move |query: String| {
            let store = search_store.clone();
            async move {
                if query.is_empty() {
                    store.reset_search().await;
                } else if let Err(e) = store.search(&query).await {
                    tracing::error!("Platform search for '{}' failed: {}", query, e);
                }
            }
        });

        Self { store, search }
    }

    pub fn store(&self) -> &Arc<PlatformStore> {
        &self.store
    }

    pub async fn mount(&self) -> Result<()> {
        self.store.load().await
    }

    /// Search text changed; an empty query clears the results
    pub fn on_search(&self, query: &str) {
        self.search.call(query.to_string());
    }

    pub async fn on_add(&self, platform: &Platform) -> Result<bool> {
        let added = self.store.add(platform).await?;
        self.store.reset_search().await;
        Ok(added)
    }

    pub async fn on_remove(&self, id: i64) -> Result<bool> {
        self.store.remove(id).await
    }

    pub async fn on_select(&self, id: i64) -> Option<Platform> {
        self.store.get(id).await
    }
}

pub struct GamesPanel {
    store: Arc<GamesStore>,
    platform: Arc<RwLock<Option<Platform>>>,
    search: Debouncer<String>,
}

impl GamesPanel {
    pub fn new(store: Arc<GamesStore>, debounce: Duration) -> Self {
        let platform: Arc<RwLock<Option<Platform>>> = Arc::new(RwLock::new(None));

        let search_store = store.clone();
        let search_platform = platform.clone();
        let search = Debouncer::new(debounce, move |query: String| {
            let store = search_store.clone();
            let platform = search_platform.clone();
            async move {
                if query.is_empty() {
                    store.reset_search().await;
                    return;
                }
                // The platform is read when the search fires, not when typed
                let Some(platform_id) = platform.read().await.as_ref().map(|p| p.id) else {
                    tracing::debug!("Dropping game search '{}': no platform mounted", query);
                    return;
                };
                if let Err(e) = store.search(&query, platform_id).await {
                    tracing::error!("Game search for '{}' failed: {}", query, e);
                }
            }
        });

        Self {
            store,
            platform,
            search,
        }
    }

    pub fn store(&self) -> &Arc<GamesStore> {
        &self.store
    }

    pub async fn platform(&self) -> Option<Platform> {
        self.platform.read().await.clone()
    }

    /// Show the games of `platform`, reloading them from the catalog
    pub async fn mount(&self, platform: Platform) -> Result<LoadReport> {
        let platform_id = platform.id;
        *self.platform.write().await = Some(platform);
        self.store.reset_search().await;
        self.store.load(platform_id).await
    }

    /// Drop the mounted platform along with its loaded games
    pub async fn unmount(&self) {
        *self.platform.write().await = None;
        self.store.reset_search().await;
        self.store.clear().await;
    }

    pub fn on_search(&self, query: &str) {
        self.search.call(query.to_string());
    }

    pub async fn on_add(&self, game: &Game) -> Result<bool> {
        let platform = self.platform().await.ok_or(Error::NoPlatformSelected)?;
        self.store.add(game, &platform).await
    }

    /// Remove `game_id` from the mounted platform only
    pub async fn on_remove(&self, game_id: i64) -> Result<()> {
        let platform = self.platform().await.ok_or(Error::NoPlatformSelected)?;
        self.store.remove_from_platform(platform.id, game_id).await
    }

    pub async fn on_expand(&self, game_id: i64) -> Option<i64> {
        self.store.expand_game(game_id).await
    }
}
