//! Plain-text rendering of store state

use chrono::{DateTime, Utc};
use release_monitor_core::{
    first_release_date, first_website, Game, GamesStore, ImageSize, Platform, SelectOption,
};

pub fn print_platforms(platforms: &[Platform], selected: Option<i64>) {
    if platforms.is_empty() {
        println!("No platforms tracked yet. Use `add-platform <name>` to add one.");
        return;
    }

    println!("Platforms:");
    for platform in platforms {
        let marker = if Some(platform.id) == selected { "*" } else { " " };
        println!(" {} [{:>4}] {}", marker, platform.id, platform.name);
    }
}

pub fn print_options<T>(options: &[SelectOption<T>], empty_text: &str) {
    if options.is_empty() {
        println!("{}", empty_text);
        return;
    }

    for (i, option) in options.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, option.label);
    }
}

/// `upcoming` when the release on `platform_id` is still ahead of `now`
fn release_status(game: &Game, platform_id: i64, now: DateTime<Utc>) -> &'static str {
    let release = game
        .release_dates
        .iter()
        .find(|release| release.platform == Some(platform_id))
        .and_then(|release| release.datetime());

    match release {
        Some(date) if date > now => "upcoming",
        Some(_) => "released",
        None => "TBA",
    }
}

pub fn print_games(store: &GamesStore, platform: &Platform, games: &[Game], expanded: Option<i64>) {
    println!("Games for {}:", platform.name);
    if games.is_empty() {
        println!("  (none)");
        return;
    }

    let now = Utc::now();
    for game in games {
        println!(
            "  [{:>6}] {:<40} {:<16} {}",
            game.id,
            game.name,
            first_release_date(game, platform.id).unwrap_or("-"),
            release_status(game, platform.id, now),
        );
        if let Some(url) = first_website(game) {
            println!("           {}", url);
        }
        if Some(game.id) == expanded {
            print_game_details(store, game);
        }
    }
}

pub fn print_game_details(store: &GamesStore, game: &Game) {
    if let Some(cover) = store.cover_url(game) {
        println!("           cover: {}", cover);
    }
    if let Some(summary) = &game.summary {
        println!("           {}", summary);
    }
    if let Some(screenshots) = &game.screenshots {
        for shot in screenshots {
            println!(
                "           screenshot: {}",
                store.get_image(&shot.cloudinary_id, ImageSize::ScreenshotMed)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_monitor_core::ReleaseDate;

    fn game_released_at(platform_id: i64, millis: i64) -> Game {
        Game {
            id: 1,
            name: "Hades".to_string(),
            release_dates: vec![ReleaseDate {
                platform: Some(platform_id),
                date: Some(millis),
                ..Default::default()
            }],
            cover: None,
            summary: None,
            websites: None,
            screenshots: None,
        }
    }

    #[test]
    fn test_release_status() {
        let now = DateTime::<Utc>::from_timestamp_millis(2_000).unwrap();

        assert_eq!(release_status(&game_released_at(6, 1_000), 6, now), "released");
        assert_eq!(release_status(&game_released_at(6, 3_000), 6, now), "upcoming");
        assert_eq!(release_status(&game_released_at(6, 3_000), 130, now), "TBA");
    }
}
