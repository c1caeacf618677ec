//! Interactive session over the application shell
//!
//! Search commands go through the panels' debounced input, so results show
//! up a moment later; `results` prints whatever has arrived.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use release_monitor_core::App;

use crate::render;

const HELP: &str = "\
Commands:
  platforms              list tracked platforms (* = selected)
  find <text>            search the catalog for platforms
  track <n>              track platform result n
  untrack <id>           stop tracking a platform
  select <id>            select a platform and load its games
  games                  list games of the selected platform
  find-game <text>       search games for the selected platform
  track-game <n>         track game result n on the selected platform
  drop <game-id>         stop tracking a game on the selected platform
  expand <game-id>       toggle the detail view of a game
  results                show pending search results
  help                   show this help
  quit                   leave the shell";

/// Parsed shell input
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Platforms,
    Find(&'a str),
    Track(usize),
    Untrack(i64),
    Select(i64),
    Games,
    FindGame(&'a str),
    TrackGame(usize),
    Drop(i64),
    Expand(i64),
    Results,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Command<'_>, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let number = |what: &str| -> Result<i64, String> {
        rest.parse::<i64>()
            .map_err(|_| format!("expected {} after '{}'", what, word))
    };
    let index = |what: &str| -> Result<usize, String> {
        rest.parse::<usize>()
            .map_err(|_| format!("expected {} after '{}'", what, word))
    };

    let command = match word {
        "platforms" | "ls" => Command::Platforms,
        "find" => Command::Find(rest),
        "track" => Command::Track(index("a result number")?),
        "untrack" => Command::Untrack(number("a platform id")?),
        "select" => Command::Select(number("a platform id")?),
        "games" => Command::Games,
        "find-game" => Command::FindGame(rest),
        "track-game" => Command::TrackGame(index("a result number")?),
        "drop" => Command::Drop(number("a game id")?),
        "expand" => Command::Expand(number("a game id")?),
        "results" => Command::Results,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(command)
}

pub async fn run(app: &App, platform_id: Option<i64>) -> Result<()> {
    let selected = app.start(platform_id).await?;
    render::print_platforms(
        &app.platforms().store().platforms().await,
        selected.as_ref().map(|p| p.id),
    );
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        // Errors are reported and the session continues
        if let Err(e) = execute(app, command).await {
            println!("Error: {:#}", e);
        }
    }

    Ok(())
}

async fn execute(app: &App, command: Command<'_>) -> Result<()> {
    match command {
        Command::Platforms => {
            let selected = app.selected_platform().await.map(|p| p.id);
            render::print_platforms(&app.platforms().store().platforms().await, selected);
        }
        Command::Find(text) => app.platforms().on_search(text),
        Command::Track(n) => {
            let options = app.platforms().store().search_result_options().await;
            match n.checked_sub(1).and_then(|i| options.get(i)) {
                Some(option) => {
                    if app.add_platform(&option.value).await? {
                        println!("Now tracking {}", option.value.name);
                    } else {
                        println!("{} is already tracked", option.value.name);
                    }
                }
                None => println!("No platform result {}", n),
            }
        }
        Command::Untrack(id) => {
            if !app.remove_platform(id).await? {
                println!("Platform {} was not tracked", id);
            }
        }
        Command::Select(id) => match app.select_platform(id).await? {
            Some(platform) => print_selected_games(app, &platform).await,
            None => println!("Platform {} is not tracked", id),
        },
        Command::Games => match app.selected_platform().await {
            Some(platform) => print_selected_games(app, &platform).await,
            None => println!("No platform selected"),
        },
        Command::FindGame(text) => {
            if app.selected_platform().await.is_none() {
                println!("Select a platform first");
            } else {
                app.games().on_search(text);
            }
        }
        Command::TrackGame(n) => {
            let options = app.games().store().search_result_options().await;
            match n.checked_sub(1).and_then(|i| options.get(i)) {
                Some(option) => {
                    if app.games().on_add(&option.value).await? {
                        println!("Now tracking {}", option.value.name);
                    }
                }
                None => println!("No game result {}", n),
            }
        }
        Command::Drop(game_id) => app.games().on_remove(game_id).await?,
        Command::Expand(game_id) => {
            app.games().on_expand(game_id).await;
            if let Some(platform) = app.selected_platform().await {
                print_selected_games(app, &platform).await;
            }
        }
        Command::Results => {
            let platforms = app.platforms().store().snapshot().await;
            if !platforms.search_query.is_empty() {
                println!("Platforms matching '{}':", platforms.search_query);
                render::print_options(&app.platforms().store().search_result_options().await, "  (none yet)");
            }

            let games = app.games().store().snapshot().await;
            if !games.search_query.is_empty() {
                println!("Games matching '{}':", games.search_query);
                let empty = if games.search_loading { "  Loading..." } else { "  (none)" };
                render::print_options(&app.games().store().search_result_options().await, empty);
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }

    Ok(())
}

async fn print_selected_games(app: &App, platform: &release_monitor_core::Platform) {
    let store = app.games().store();
    let state = store.snapshot().await;
    if state.games_loading {
        println!("Loading games...");
    }
    render::print_games(store, platform, &state.games, state.game_expanded);
}
