/// Season Preview: runs simulated seasons for one player and prints the feed.
///
/// Usage: season_preview --traits <name,name,...> [--seed <n>] [--seasons <n>]
///                       [--weeks <n>] [--player <name>] [--team <name>]
///                       [--options <path>] [--templates <path>] [--snapshot <path>]
///
/// Trait names are the camelCase identifiers (clutch, injuryProne, ...).
/// Set RUST_LOG=debug to watch every evidence update.

use env_logger::Env;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revelation_engine::core::narrative::{sort_news_by_priority, trait_hint_news};
use revelation_engine::core::revelation::RevelationEngine;
use revelation_engine::schema::event::{GameEventContext, GameEventType};
use revelation_engine::schema::news::NewsEvent;
use revelation_engine::schema::player::{Player, PlayerId};
use revelation_engine::schema::traits::Trait;
use std::process;

const PLAYOFF_WEEKS: u8 = 3;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut traits: Vec<Trait> = Vec::new();
    let mut seed: u64 = 42;
    let mut seasons: u16 = 3;
    let mut weeks: u8 = 17;
    let mut player_name = "Theo Grant".to_string();
    let mut team_name = "Harbor City".to_string();
    let mut options_path = None;
    let mut templates_path = None;
    let mut snapshot_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--traits" if i + 1 < args.len() => {
                i += 1;
                traits = parse_traits(&args[i]);
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--seasons" if i + 1 < args.len() => {
                i += 1;
                seasons = args[i].parse().unwrap_or(3);
            }
            "--weeks" if i + 1 < args.len() => {
                i += 1;
                weeks = args[i].parse::<u8>().unwrap_or(17).max(1);
            }
            "--player" if i + 1 < args.len() => {
                i += 1;
                player_name = args[i].clone();
            }
            "--team" if i + 1 < args.len() => {
                i += 1;
                team_name = args[i].clone();
            }
            "--options" if i + 1 < args.len() => {
                i += 1;
                options_path = Some(args[i].clone());
            }
            "--templates" if i + 1 < args.len() => {
                i += 1;
                templates_path = Some(args[i].clone());
            }
            "--snapshot" if i + 1 < args.len() => {
                i += 1;
                snapshot_path = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = RevelationEngine::builder().seed(seed);
    if let Some(path) = options_path {
        builder = builder.options_path(path);
    }
    if let Some(path) = templates_path {
        builder = builder.templates_path(path);
    }
    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut player = Player::new(PlayerId(1), player_name, &traits);
    // Separate stream so event generation does not shift the engine's draws.
    let mut sim = StdRng::seed_from_u64(seed.wrapping_add(7919));
    let first_season = 2030u16;

    println!("Seed: {}", seed);
    println!(
        "Hidden: {}",
        traits.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    );

    for season in first_season..first_season.saturating_add(seasons) {
        let mut feed: Vec<NewsEvent> = Vec::new();
        let regular = weeks.saturating_sub(PLAYOFF_WEEKS).max(1);

        for week in 1..=weeks {
            let context = random_event(&mut sim, season, week, week > regular);
            let result = engine.process_game_event(&mut player, &context, &team_name);
            if result.news.is_empty() && sim.gen_bool(0.2) {
                feed.push(engine.game_event_news(&player, &context, &team_name));
            }
            feed.extend(result.news);
        }

        let full_season = GameEventContext::new(GameEventType::FullSeasonPlayed, season, weeks);
        feed.extend(engine.process_game_event(&mut player, &full_season, &team_name).news);

        let wrap_up = engine.process_end_of_season_revelations(&mut player, season, &team_name);
        feed.extend(wrap_up.news);

        sort_news_by_priority(&mut feed);
        print_season(season, &feed);
        info!(
            "season {} done: {} items, {} hint stories",
            season,
            feed.len(),
            trait_hint_news(&feed).len()
        );
    }

    println!("\n=== Where Things Stand ===\n");
    let revealed = engine.revealed_traits(&player);
    if revealed.is_empty() {
        println!("Revealed: none");
    }
    for r in &revealed {
        println!("Revealed: {} ({})", r.trait_kind.label(), r.confidence.name());
    }
    for hint in engine.trait_hints(&player) {
        println!(
            "Pattern: {} at {} (p={:.2}, {} supporting)",
            hint.trait_kind.name(),
            hint.confidence().name(),
            hint.probability(),
            hint.supporting_observations
        );
    }

    if let Some(path) = snapshot_path {
        match engine.store().to_ron() {
            Ok(ron) => {
                if let Err(e) = std::fs::write(&path, ron) {
                    eprintln!("ERROR: Failed to write {}: {}", path, e);
                    process::exit(1);
                }
                println!("\nSnapshot written to {}", path);
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Usage: season_preview --traits <name,name,...> [--seed <n>] [--seasons <n>]");
    println!("                      [--weeks <n>] [--player <name>] [--team <name>]");
    println!("                      [--options <path>] [--templates <path>] [--snapshot <path>]");
    println!();
    println!("Traits:");
    for t in Trait::ALL {
        println!("  {}", t.name());
    }
}

fn parse_traits(list: &str) -> Vec<Trait> {
    let mut traits = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match Trait::ALL.iter().find(|t| t.name().eq_ignore_ascii_case(name)) {
            Some(t) => traits.push(*t),
            None => {
                eprintln!("Unknown trait: {}", name);
                process::exit(1);
            }
        }
    }
    traits
}

fn random_event(rng: &mut StdRng, season: u16, week: u8, playoff: bool) -> GameEventContext {
    let event_type = GameEventType::ALL[rng.gen_range(0..GameEventType::ALL.len())];
    let context = GameEventContext::new(event_type, season, week)
        .with_playoff(playoff)
        .with_primetime(rng.gen_bool(0.15));

    match event_type {
        GameEventType::InjuryOccurred => context.with_games_missed(rng.gen_range(0..10)),
        GameEventType::GameWinningPlay
        | GameEventType::Touchdown
        | GameEventType::CrucialDrop
        | GameEventType::Fumble
        | GameEventType::PersonalFoul => {
            let quarter = rng.gen_range(1..=4);
            context.with_game_clock(quarter, rng.gen_range(0..=900), rng.gen_range(-14..=14))
        }
        _ => context,
    }
}

fn print_season(season: u16, feed: &[NewsEvent]) {
    println!("\n=== Season {} ({} stories) ===\n", season, feed.len());
    for item in feed {
        println!("[{:?}/{}] {}", item.priority, item.category.name(), item.headline);
        println!("    {}", item.body);
    }
}
