//! Release Monitor Core - platform and game stores, local persistence and catalog client

pub mod app;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod games;
pub mod models;
pub mod panels;
pub mod platforms;
pub mod storage;

mod sequence;
#[cfg(test)]
mod testing;

pub use app::{App, AppStore};
pub use catalog::{image_url, Catalog, CatalogClient, CatalogConfig, ImageSize};
pub use config::Config;
pub use error::{Error, Result};
pub use games::{first_release_date, first_website, GamesState, GamesStore, LoadReport};
pub use models::{Game, Image, Platform, ReleaseDate, SelectOption, TrackedGame, Website};
pub use panels::{GamesPanel, PlatformsPanel};
pub use platforms::{PlatformState, PlatformStore};
pub use storage::{FileStorage, KeyValueStorage, LocalStore, MemoryStorage};
