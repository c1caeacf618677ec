//! Application shell: platform selection and the two panels

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::catalog::{Catalog, CatalogClient};
use crate::config::Config;
use crate::error::Result;
use crate::games::{GamesStore, LoadReport};
use crate::models::Platform;
use crate::panels::{GamesPanel, PlatformsPanel};
use crate::platforms::PlatformStore;
use crate::storage::{FileStorage, LocalStore, PLATFORMS_KEY};

/// Holds the selected platform
pub struct AppStore {
    storage: LocalStore,
    selected_platform: RwLock<Option<Platform>>,
}

impl AppStore {
    pub fn new(storage: LocalStore) -> Self {
        Self {
            storage,
            selected_platform: RwLock::new(None),
        }
    }

    /// Look a platform up in the persisted list, independent of any
    /// platform store
    pub fn load_platform(&self, id: i64) -> Result<Option<Platform>> {
        let platforms: Vec<Platform> = self.storage.load_list(PLATFORMS_KEY)?;
        Ok(platforms.into_iter().find(|p| p.id == id))
    }

    pub async fn set_selected_platform(&self, platform: Option<Platform>) {
        *self.selected_platform.write().await = platform;
    }

    pub async fn selected_platform(&self) -> Option<Platform> {
        self.selected_platform.read().await.clone()
    }
}

pub struct App {
    store: AppStore,
    platforms: PlatformsPanel,
    games: GamesPanel,
}

impl App {
    pub fn new(
        storage: LocalStore,
        catalog: Arc<dyn Catalog>,
        image_host: impl Into<String>,
        search_debounce: Duration,
    ) -> Self {
        let platform_store = PlatformStore::new(storage.clone(), catalog.clone());
        let games_store = GamesStore::new(storage.clone(), catalog, image_host);

        Self {
            store: AppStore::new(storage),
            platforms: PlatformsPanel::new(Arc::new(platform_store), search_debounce),
            games: GamesPanel::new(Arc::new(games_store), search_debounce),
        }
    }

    /// Build the app with file storage under the configured data directory
    /// and the HTTP catalog client
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = LocalStore::new(Arc::new(FileStorage::new(config.data_directory())));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: &Config, storage: LocalStore) -> Result<Self> {
        let catalog = CatalogClient::new(config.catalog_config())?;
        if !catalog.has_credentials() {
            tracing::warn!("No catalog API key configured; catalog requests will likely be rejected");
        }

        Ok(Self::new(
            storage,
            Arc::new(catalog),
            config.image_host.clone(),
            config.search_debounce(),
        ))
    }

    pub fn platforms(&self) -> &PlatformsPanel {
        &self.platforms
    }

    pub fn games(&self) -> &GamesPanel {
        &self.games
    }

    pub async fn selected_platform(&self) -> Option<Platform> {
        self.store.selected_platform().await
    }

    /// Load the tracked platforms and, if `platform_id` is tracked, select it
    pub async fn start(&self, platform_id: Option<i64>) -> Result<Option<Platform>> {
        self.platforms.mount().await?;

        let Some(id) = platform_id else {
            return Ok(None);
        };

        match self.store.load_platform(id)? {
            Some(platform) => {
                self.set_selection(Some(platform.clone())).await?;
                Ok(Some(platform))
            }
            None => {
                tracing::warn!("Platform {} is not tracked; nothing selected", id);
                Ok(None)
            }
        }
    }

    /// Select a tracked platform and load its games. Unknown ids are ignored.
    pub async fn select_platform(&self, id: i64) -> Result<Option<Platform>> {
        let Some(platform) = self.platforms.on_select(id).await else {
            return Ok(None);
        };
        self.set_selection(Some(platform.clone())).await?;
        Ok(Some(platform))
    }

    pub async fn clear_selection(&self) -> Result<()> {
        self.set_selection(None).await.map(|_| ())
    }

    pub async fn add_platform(&self, platform: &Platform) -> Result<bool> {
        self.platforms.on_add(platform).await
    }

    /// Stop tracking a platform, dropping the selection if it was selected
    pub async fn remove_platform(&self, id: i64) -> Result<bool> {
        let removed = self.platforms.on_remove(id).await?;

        let selected = self.store.selected_platform().await;
        if selected.is_some_and(|p| p.id == id) {
            self.set_selection(None).await?;
        }
        Ok(removed)
    }

    async fn set_selection(&self, platform: Option<Platform>) -> Result<Option<LoadReport>> {
        self.store.set_selected_platform(platform.clone()).await;

        match platform {
            Some(platform) => {
                tracing::info!("Selected platform {} ({})", platform.name, platform.id);
                let report = self.games.mount(platform).await?;
                Ok(Some(report))
            }
            None => {
                self.games.unmount().await;
                Ok(None)
            }
        }
    }
}
