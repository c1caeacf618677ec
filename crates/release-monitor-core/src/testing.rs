//! In-memory catalog used by the store and view tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::{Game, Platform, ReleaseDate};

#[derive(Default)]
pub(crate) struct FakeCatalog {
    platforms: Vec<Platform>,
    games: HashMap<i64, Game>,
    failing: HashSet<i64>,
    failing_queries: HashSet<String>,
    query_delays: HashMap<String, Duration>,
    fetch_delays: HashMap<i64, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_platform(mut self, id: i64, name: &str) -> Self {
        self.platforms.push(platform(id, name));
        self
    }

    pub(crate) fn with_game(mut self, game: Game) -> Self {
        self.games.insert(game.id, game);
        self
    }

    /// Make `fetch_game(game_id, _)` fail with a server error
    pub(crate) fn failing(mut self, game_id: i64) -> Self {
        self.failing.insert(game_id);
        self
    }

    /// Make searches for exactly `query` fail after any configured delay
    pub(crate) fn failing_query(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    /// Delay responses to searches for exactly `query`
    pub(crate) fn delay_query(mut self, query: &str, delay: Duration) -> Self {
        self.query_delays.insert(query.to_string(), delay);
        self
    }

    pub(crate) fn delay_fetch(mut self, game_id: i64, delay: Duration) -> Self {
        self.fetch_delays.insert(game_id, delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn answer_query(&self, query: &str) -> Result<()> {
        if let Some(delay) = self.query_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_queries.contains(query) {
            return Err(server_error());
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_platforms(&self, query: &str) -> Result<Vec<Platform>> {
        self.record(format!("search_platforms:{}", query));
        self.answer_query(query).await?;

        let needle = query.to_lowercase();
        Ok(self
            .platforms
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_games(&self, query: &str, platform_id: i64) -> Result<Vec<Game>> {
        self.record(format!("search_games:{}:{}", query, platform_id));
        self.answer_query(query).await?;

        let needle = query.to_lowercase();
        let mut found: Vec<Game> = self
            .games
            .values()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .filter(|g| g.release_dates.iter().any(|r| r.platform == Some(platform_id)))
            .cloned()
            .collect();
        found.sort_by_key(|g| g.id);
        Ok(found)
    }

    async fn fetch_game(&self, game_id: i64, platform_id: i64) -> Result<Game> {
        self.record(format!("fetch_game:{}:{}", game_id, platform_id));
        if let Some(delay) = self.fetch_delays.get(&game_id) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&game_id) {
            return Err(server_error());
        }

        self.games
            .get(&game_id)
            .cloned()
            .ok_or(Error::GameNotFound {
                game_id,
                platform_id,
            })
    }
}

fn server_error() -> Error {
    Error::Api {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "upstream unavailable".to_string(),
    }
}

pub(crate) fn platform(id: i64, name: &str) -> Platform {
    Platform {
        id,
        name: name.to_string(),
    }
}

/// A game released on `platform_id` at `date` (ms since epoch)
pub(crate) fn game(id: i64, name: &str, platform_id: i64, date: Option<i64>) -> Game {
    Game {
        id,
        name: name.to_string(),
        release_dates: vec![ReleaseDate {
            platform: Some(platform_id),
            date,
            human: date.map(|d| format!("day {}", d)),
            ..Default::default()
        }],
        cover: None,
        summary: None,
        websites: None,
        screenshots: None,
    }
}
