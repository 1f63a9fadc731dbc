//! Mini Arcade entry point
//!
//! Headless demo host: logs a demo user in against the in-memory backend,
//! plays the requested games with the autopilot at a fixed 60 Hz frame
//! time, and logs each final score and reward.
//!
//! Usage: `mini-arcade [game-id|all] [--seed N] [--frames N] [--config PATH]`

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use mini_arcade::Settings;
use mini_arcade::autopilot::Autopilot;
use mini_arcade::shell::{Arcade, AuthRequest, GAMES, InMemoryBackend, Screen};

/// Host frame time in milliseconds
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug)]
struct Options {
    games: Vec<&'static str>,
    seed: Option<u64>,
    max_frames: u64,
    config: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            games: GAMES.iter().map(|g| g.id()).collect(),
            seed: None,
            max_frames: 60 * 60 * 5,
            config: None,
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                options.seed = Some(value.parse().with_context(|| format!("bad seed '{value}'"))?);
            }
            "--frames" => {
                let value = args.next().context("--frames needs a value")?;
                options.max_frames = value
                    .parse()
                    .with_context(|| format!("bad frame count '{value}'"))?;
            }
            "--config" => {
                let value = args.next().context("--config needs a path")?;
                options.config = Some(PathBuf::from(value));
            }
            "all" => options.games = GAMES.iter().map(|g| g.id()).collect(),
            id if !id.starts_with("--") => {
                let Some(game) = GAMES.iter().find(|g| g.id() == id) else {
                    let known: Vec<_> = GAMES.iter().map(|g| g.id()).collect();
                    bail!("unknown game '{id}' (expected one of: {})", known.join(", "));
                };
                options.games = vec![game.id()];
            }
            other => bail!("unknown option '{other}'"),
        }
    }
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args(std::env::args().skip(1))?;
    let mut settings = match &options.config {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if options.seed.is_some() {
        settings.seed = options.seed;
    }
    log::info!("Mini Arcade (headless) starting...");

    let mut arcade = Arcade::new(settings, InMemoryBackend::new());
    arcade
        .login(&AuthRequest {
            identity: "demo".to_string(),
            username: None,
            first_name: "Demo".to_string(),
            last_name: Some("Player".to_string()),
            validation: "local".to_string(),
        })
        .context("demo login failed")?;
    arcade.navigate(Screen::GameMenu)?;

    for id in &options.games {
        play(&mut arcade, id, options.max_frames)?;
    }

    if let Some(user) = arcade.user() {
        log::info!(
            "{}: {} points, {:.6} coins",
            user.display_name,
            user.score,
            user.coins
        );
    }
    Ok(())
}

fn play(arcade: &mut Arcade<InMemoryBackend>, id: &str, max_frames: u64) -> Result<()> {
    arcade
        .select_game(id)
        .with_context(|| format!("cannot start {id}"))?;
    let mut pilot = Autopilot::new();

    for _ in 0..max_frames {
        let Some(session) = arcade.session() else {
            break;
        };
        if !session.is_running() {
            break;
        }
        for event in pilot.inputs(session.engine()) {
            arcade.input(event);
        }
        for event in arcade.frame(FRAME_MS) {
            log::trace!("{id}: {event:?}");
        }
    }

    match arcade.last_game() {
        Some(last) => log::info!(
            "{}: score {} -> {:.6} coins{}",
            last.game.name,
            last.reward.score,
            last.reward.coins,
            if last.reward.is_win { " (win)" } else { "" }
        ),
        None => log::info!("{id}: stopped after {max_frames} frames without finishing"),
    }
    arcade.exit_game();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults_to_all_games() {
        let options = parse_args(args(&[])).unwrap();
        assert_eq!(options.games.len(), GAMES.len());
        assert_eq!(options.seed, None);
    }

    #[test]
    fn test_parse_single_game_and_flags() {
        let options = parse_args(args(&["snake", "--seed", "7", "--frames", "100"])).unwrap();
        assert_eq!(options.games, vec!["snake"]);
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.max_frames, 100);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_args(args(&["pinball"])).is_err());
        assert!(parse_args(args(&["--fast"])).is_err());
        assert!(parse_args(args(&["--seed"])).is_err());
    }
}
