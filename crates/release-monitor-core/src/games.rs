//! Games tracked for a platform, game search and the derived display values
//!
//! Only the `[platform_id, game_id]` association is persisted. Game data is
//! always re-fetched from the catalog when a platform's games are loaded.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::RwLock;

use crate::catalog::{image_url, Catalog, ImageSize};
use crate::error::Result;
use crate::models::{Game, Platform, SelectOption, TrackedGame};
use crate::sequence::RequestSequence;
use crate::storage::{LocalStore, GAMES_KEY};

/// Observable state of the games store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamesState {
    /// Platform whose games were last loaded
    pub platform_id: Option<i64>,
    pub search_query: String,
    pub search_results: Vec<Game>,
    pub search_loading: bool,
    pub games: Vec<Game>,
    pub games_loading: bool,
    /// Game whose details are expanded, at most one
    pub game_expanded: Option<i64>,
}

/// Outcome of [`GamesStore::load`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Game ids whose lookup failed; they are left out of the list
    pub failed: Vec<i64>,
    /// A newer load started before this one finished
    pub superseded: bool,
}

pub struct GamesStore {
    storage: LocalStore,
    catalog: Arc<dyn Catalog>,
    image_host: String,
    state: RwLock<GamesState>,
    search_seq: RequestSequence,
    load_seq: RequestSequence,
}

impl GamesStore {
    pub fn new(storage: LocalStore, catalog: Arc<dyn Catalog>, image_host: impl Into<String>) -> Self {
        Self {
            storage,
            catalog,
            image_host: image_host.into(),
            state: RwLock::new(GamesState::default()),
            search_seq: RequestSequence::default(),
            load_seq: RequestSequence::default(),
        }
    }

    /// Load the games tracked for `platform_id`.
    ///
    /// Lookups run concurrently and each game is inserted as soon as it
    /// arrives, so the list is sorted after every insertion. A failed lookup
    /// is logged and skipped.
    pub async fn load(&self, platform_id: i64) -> Result<LoadReport> {
        let tracked: Vec<TrackedGame> = self.storage.load_list(GAMES_KEY)?;

        let mut seen = HashSet::new();
        let game_ids: Vec<i64> = tracked
            .iter()
            .filter(|t| t.platform_id == platform_id)
            .map(|t| t.game_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let ticket = {
            let mut state = self.state.write().await;
            state.platform_id = Some(platform_id);
            state.games.clear();
            state.game_expanded = None;
            state.games_loading = true;
            self.load_seq.next()
        };

        tracing::info!("Loading {} games for platform {}", game_ids.len(), platform_id);

        let mut pending: FuturesUnordered<_> = game_ids
            .into_iter()
            .map(|game_id| async move {
                (game_id, self.catalog.fetch_game(game_id, platform_id).await)
            })
            .collect();

        let mut report = LoadReport::default();

        while let Some((game_id, result)) = pending.next().await {
            match result {
                Ok(game) => {
                    let mut state = self.state.write().await;
                    if !self.load_seq.is_current(ticket) {
                        tracing::debug!("Load for platform {} superseded", platform_id);
                        report.superseded = true;
                        return Ok(report);
                    }
                    state.games.push(game);
                    sort_games(&mut state.games);
                    report.loaded += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to load game {} for platform {}: {}", game_id, platform_id, e);
                    report.failed.push(game_id);
                }
            }
        }

        let mut state = self.state.write().await;
        if self.load_seq.is_current(ticket) {
            state.games_loading = false;
        } else {
            report.superseded = true;
        }

        Ok(report)
    }

    /// Forget the loaded platform and its games.
    ///
    /// A load still in flight is invalidated and inserts nothing further.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        self.load_seq.next();
        state.platform_id = None;
        state.games.clear();
        state.games_loading = false;
        state.game_expanded = None;
    }

    /// Track a copy of `game` under `platform`.
    ///
    /// Returns `false` when the game is already listed and the association
    /// already persisted.
    pub async fn add(&self, game: &Game, platform: &Platform) -> Result<bool> {
        let mut state = self.state.write().await;

        let pair = TrackedGame {
            platform_id: platform.id,
            game_id: game.id,
        };
        let mut tracked: Vec<TrackedGame> = self.storage.load_list(GAMES_KEY)?;
        let persisted = tracked.contains(&pair);
        let listed = state.games.iter().any(|g| g.id == game.id);

        if persisted && listed {
            return Ok(false);
        }

        if !persisted {
            tracked.push(pair);
            self.storage.save_list(GAMES_KEY, &tracked)?;
        }
        if !listed {
            state.games.push(game.clone());
            sort_games(&mut state.games);
        }

        tracing::info!("Tracking game {} ({}) on platform {}", game.name, game.id, platform.id);
        Ok(true)
    }

    /// Stop tracking `game_id` on every platform it was added under
    pub async fn remove(&self, game_id: i64) -> Result<()> {
        self.remove_where(game_id, |t| t.game_id == game_id).await
    }

    /// Stop tracking `game_id` on `platform_id` only
    pub async fn remove_from_platform(&self, platform_id: i64, game_id: i64) -> Result<()> {
        self.remove_where(game_id, |t| t.platform_id == platform_id && t.game_id == game_id)
            .await
    }

    async fn remove_where(&self, game_id: i64, matches: impl Fn(&TrackedGame) -> bool) -> Result<()> {
        let mut state = self.state.write().await;

        let mut tracked: Vec<TrackedGame> = self.storage.load_list(GAMES_KEY)?;
        let before = tracked.len();
        tracked.retain(|t| !matches(t));
        self.storage.save_list(GAMES_KEY, &tracked)?;

        state.games.retain(|g| g.id != game_id);
        if state.game_expanded == Some(game_id) {
            state.game_expanded = None;
        }

        tracing::info!("Removed game {} ({} associations)", game_id, before - tracked.len());
        Ok(())
    }

    /// Search the catalog for games released on `platform_id`.
    ///
    /// Results of a search overtaken by a newer search or a reset are
    /// dropped. `search_loading` is cleared by the latest search whether it
    /// succeeds or fails.
    pub async fn search(&self, query: &str, platform_id: i64) -> Result<()> {
        let ticket = {
            let mut state = self.state.write().await;
            state.search_query = query.to_string();
            state.search_loading = true;
            state.search_results.clear();
            self.search_seq.next()
        };

        let result = self.catalog.search_games(query, platform_id).await;

        let mut state = self.state.write().await;
        let current = self.search_seq.is_current(ticket);
        if !current {
            tracing::debug!("Dropping stale game search results for '{}'", query);
        }

        match result {
            Ok(games) => {
                if current {
                    state.search_results = games;
                    state.search_loading = false;
                }
                Ok(())
            }
            Err(e) => {
                if current {
                    state.search_loading = false;
                }
                Err(e)
            }
        }
    }

    pub async fn reset_search(&self) {
        let mut state = self.state.write().await;
        self.search_seq.next();
        state.search_query.clear();
        state.search_results.clear();
        state.search_loading = false;
    }

    /// Toggle the expanded game; returns the game now expanded, if any
    pub async fn expand_game(&self, game_id: i64) -> Option<i64> {
        let mut state = self.state.write().await;
        state.game_expanded = if state.game_expanded == Some(game_id) {
            None
        } else {
            Some(game_id)
        };
        state.game_expanded
    }

    pub async fn games(&self) -> Vec<Game> {
        self.state.read().await.games.clone()
    }

    pub async fn snapshot(&self) -> GamesState {
        self.state.read().await.clone()
    }

    pub async fn search_result_options(&self) -> Vec<SelectOption<Game>> {
        let state = self.state.read().await;
        state
            .search_results
            .iter()
            .map(|game| SelectOption {
                label: game.name.clone(),
                value: game.clone(),
            })
            .collect()
    }

    /// Display URL for an image on the configured image host
    pub fn get_image(&self, cloudinary_id: &str, size: ImageSize) -> String {
        image_url(&self.image_host, cloudinary_id, size)
    }

    pub fn cover_url(&self, game: &Game) -> Option<String> {
        game.cover
            .as_ref()
            .map(|cover| self.get_image(&cover.cloudinary_id, ImageSize::CoverBig))
    }
}

/// Human-readable date of the first release entry for `platform_id`
pub fn first_release_date(game: &Game, platform_id: i64) -> Option<&str> {
    game.release_dates
        .iter()
        .find(|release| release.platform == Some(platform_id))
        .and_then(|release| release.human.as_deref())
}

pub fn first_website(game: &Game) -> Option<&str> {
    game.websites
        .as_ref()
        .and_then(|websites| websites.first())
        .map(|website| website.url.as_str())
}

fn sort_games(games: &mut [Game]) {
    games.sort_by_key(Game::release_sort_key);
}
