//! Release Monitor CLI - track platforms and upcoming game releases

mod logging;
mod render;
mod shell;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use release_monitor_core::{App, Config, LocalStore, MemoryStorage, SelectOption};

#[derive(Parser)]
#[command(name = "release-monitor")]
#[command(author, version, about = "Track platforms and the games you are waiting for", long_about = None)]
struct Cli {
    /// Path to config file (defaults to the OS config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for persisted platforms and games
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog API key
    #[arg(long, global = true, env = "RELEASE_MONITOR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Catalog API base URL
    #[arg(long, global = true, env = "RELEASE_MONITOR_API_URL")]
    api_url: Option<String>,

    /// Keep state in memory only; nothing is written to disk
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked platforms
    Platforms,

    /// Search the catalog for platforms
    SearchPlatforms {
        query: String,
    },

    /// Search for a platform and start tracking it
    AddPlatform {
        query: String,

        /// Pick the Nth search result instead of prompting
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Stop tracking a platform
    RemovePlatform {
        id: i64,
    },

    /// List the games tracked for a platform
    Games {
        #[arg(short, long)]
        platform: i64,
    },

    /// Search the catalog for games released on a platform
    SearchGames {
        #[arg(short, long)]
        platform: i64,

        query: String,
    },

    /// Search for a game and start tracking it on a platform
    AddGame {
        #[arg(short, long)]
        platform: i64,

        query: String,

        /// Pick the Nth search result instead of prompting
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Stop tracking a game
    RemoveGame {
        #[arg(short, long)]
        platform: i64,

        game_id: i64,

        /// Remove the game from every platform it was added under
        #[arg(long)]
        all_platforms: bool,
    },

    /// Show cover, summary and screenshots of a tracked game
    ShowGame {
        #[arg(short, long)]
        platform: i64,

        game_id: i64,
    },

    /// Interactive session
    Shell {
        /// Platform to select on start
        #[arg(short, long)]
        platform: Option<i64>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let path = self.config.clone().or_else(Config::default_path);
        let mut config = match path {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(ref dir) = self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(ref key) = self.api_key {
            config.api_key = key.clone();
        }
        if let Some(ref url) = self.api_url {
            config.api_url = url.clone();
        }

        Ok(config)
    }

    fn build_app(&self, config: &Config) -> Result<App> {
        let app = if self.memory {
            App::with_storage(config, LocalStore::new(Arc::new(MemoryStorage::new())))
        } else {
            App::from_config(config)
        };
        app.context("Failed to initialize application")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let _log_guard = logging::init_logging(&config.data_directory());
    tracing::debug!("Data directory: {}", config.data_directory().display());

    let app = cli.build_app(&config)?;

    match cli.command {
        Commands::Platforms => cmd_platforms(&app).await?,
        Commands::SearchPlatforms { query } => cmd_search_platforms(&app, &query).await?,
        Commands::AddPlatform { query, pick } => cmd_add_platform(&app, &query, pick).await?,
        Commands::RemovePlatform { id } => cmd_remove_platform(&app, id).await?,
        Commands::Games { platform } => cmd_games(&app, platform).await?,
        Commands::SearchGames { platform, query } => cmd_search_games(&app, platform, &query).await?,
        Commands::AddGame { platform, query, pick } => cmd_add_game(&app, platform, &query, pick).await?,
        Commands::RemoveGame {
            platform,
            game_id,
            all_platforms,
        } => cmd_remove_game(&app, platform, game_id, all_platforms).await?,
        Commands::ShowGame { platform, game_id } => cmd_show_game(&app, platform, game_id).await?,
        Commands::Shell { platform } => shell::run(&app, platform).await?,
    }

    Ok(())
}

/// Start the app with `platform_id` selected, failing if it is not tracked
async fn start_with_platform(app: &App, platform_id: i64) -> Result<release_monitor_core::Platform> {
    app.start(Some(platform_id))
        .await
        .context("Failed to load tracked state")?
        .with_context(|| {
            format!(
                "Platform {} is not tracked. Run `release-monitor platforms` to list tracked platforms.",
                platform_id
            )
        })
}

/// Resolve the chosen option, prompting on stdin when `pick` is not given
fn choose<T: Clone>(options: &[SelectOption<T>], pick: Option<usize>) -> Result<Option<T>> {
    let index = match pick {
        Some(n) => n,
        None => {
            print!("Pick a result [1-{}] (empty to cancel): ", options.len());
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let input = input.trim();
            if input.is_empty() {
                return Ok(None);
            }
            input.parse::<usize>().context("Expected a result number")?
        }
    };

    if index == 0 || index > options.len() {
        anyhow::bail!("No result number {} (there are {})", index, options.len());
    }
    Ok(Some(options[index - 1].value.clone()))
}

async fn cmd_platforms(app: &App) -> Result<()> {
    app.start(None).await?;
    render::print_platforms(&app.platforms().store().platforms().await, None);
    Ok(())
}

async fn cmd_search_platforms(app: &App, query: &str) -> Result<()> {
    let store = app.platforms().store();
    store.search(query).await.context("Platform search failed")?;
    render::print_options(&store.search_result_options().await, "No platforms found.");
    Ok(())
}

async fn cmd_add_platform(app: &App, query: &str, pick: Option<usize>) -> Result<()> {
    app.start(None).await?;
    let store = app.platforms().store();
    store.search(query).await.context("Platform search failed")?;

    let options = store.search_result_options().await;
    render::print_options(&options, "No platforms found.");
    if options.is_empty() {
        return Ok(());
    }

    let Some(platform) = choose(&options, pick)? else {
        println!("Cancelled.");
        return Ok(());
    };

    if app.add_platform(&platform).await? {
        println!("Now tracking {} [{}]", platform.name, platform.id);
    } else {
        println!("{} is already tracked", platform.name);
    }
    Ok(())
}

async fn cmd_remove_platform(app: &App, id: i64) -> Result<()> {
    app.start(None).await?;
    if app.remove_platform(id).await? {
        println!("Stopped tracking platform {}", id);
    } else {
        println!("Platform {} was not tracked", id);
    }
    Ok(())
}

async fn cmd_games(app: &App, platform_id: i64) -> Result<()> {
    let platform = start_with_platform(app, platform_id).await?;
    let store = app.games().store();
    let state = store.snapshot().await;
    render::print_games(store, &platform, &state.games, state.game_expanded);
    Ok(())
}

async fn cmd_search_games(app: &App, platform_id: i64, query: &str) -> Result<()> {
    let store = app.games().store();
    store.search(query, platform_id).await.context("Game search failed")?;
    render::print_options(&store.search_result_options().await, "No games found.");
    Ok(())
}

async fn cmd_add_game(app: &App, platform_id: i64, query: &str, pick: Option<usize>) -> Result<()> {
    let platform = start_with_platform(app, platform_id).await?;
    let store = app.games().store();
    store.search(query, platform.id).await.context("Game search failed")?;

    let options = store.search_result_options().await;
    render::print_options(&options, "No games found.");
    if options.is_empty() {
        return Ok(());
    }

    let Some(game) = choose(&options, pick)? else {
        println!("Cancelled.");
        return Ok(());
    };

    if app.games().on_add(&game).await? {
        println!("Now tracking {} on {}", game.name, platform.name);
    } else {
        println!("{} is already tracked on {}", game.name, platform.name);
    }
    Ok(())
}

async fn cmd_remove_game(app: &App, platform_id: i64, game_id: i64, all_platforms: bool) -> Result<()> {
    if all_platforms {
        app.games().store().remove(game_id).await?;
        println!("Stopped tracking game {} on all platforms", game_id);
    } else {
        start_with_platform(app, platform_id).await?;
        app.games().on_remove(game_id).await?;
        println!("Stopped tracking game {} on platform {}", game_id, platform_id);
    }
    Ok(())
}

async fn cmd_show_game(app: &App, platform_id: i64, game_id: i64) -> Result<()> {
    let platform = start_with_platform(app, platform_id).await?;
    let store = app.games().store();

    let games = store.games().await;
    let Some(game) = games.iter().find(|g| g.id == game_id) else {
        anyhow::bail!("Game {} is not tracked on {}", game_id, platform.name);
    };

    let expanded = app.games().on_expand(game.id).await;
    render::print_games(store, &platform, std::slice::from_ref(game), expanded);
    Ok(())
}
