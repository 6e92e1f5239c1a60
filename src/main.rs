//! Stacktui: falling-block puzzle game in the terminal.

mod app;
mod bag;
mod game;
mod highscores;
mod input;
mod piece;
mod playfield;
mod theme;
mod timer;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Longest player name accepted from the menu or `--player`.
pub const MAX_NAME_LEN: usize = 12;

const DEFAULT_PLAYER: &str = "Player 1";

/// Options derived from CLI that shape a play session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub player_name: String,
    /// Fixed piece sequence when set; OS entropy otherwise.
    pub seed: Option<u64>,
    pub skip_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded, using defaults: {e}");
        let mut t = theme::Theme::default();
        t.apply_palette(args.palette);
        t
    });
    let scores = highscores::HighScores::new(
        args.scores_file.clone().unwrap_or_else(highscores::default_path),
    );
    let config = GameConfig {
        player_name: sanitize_name(&args.player),
        seed: args.seed,
        skip_menu: args.no_menu,
    };
    let mut app = App::new(config, theme, scores);
    app.run()?;
    Ok(())
}

/// Logging stays off unless RUST_LOG is set or a log file is given:
/// stderr output would tear the alternate screen.
fn init_logging(log_file: Option<&std::path::Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"))
                .init();
        }
    }
    Ok(())
}

/// Trimmed, at most [`MAX_NAME_LEN`] characters, never empty.
pub fn sanitize_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        DEFAULT_PLAYER.to_string()
    } else {
        name
    }
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stacktui",
    version,
    about = "Falling-block puzzle in the terminal. Clear full rows to score; top ten scores are kept locally.",
    long_about = "Stacktui is a terminal falling-block puzzle game.\n\n\
        Pieces come from a shuffled bag of all seven shapes. Fill a row edge to edge to clear it: \
        1/2/3/4 rows at once score 100/300/500/800. Pieces fall one row per second.\n\n\
        CONTROLS:\n  Left/Right (h/l)  Move      Up (k)        Rotate\n  \
        Down (j)          Soft drop Space/Enter   Hard drop\n  P                 Pause     Q / Esc       Quit"
)]
pub struct Args {
    /// Player name recorded with the score (max 12 characters).
    #[arg(short, long, default_value = DEFAULT_PLAYER, value_name = "NAME")]
    pub player: String,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Seed for the piece randomizer (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// High-score file. Defaults to $XDG_CONFIG_HOME/stacktui/scores.json.
    #[arg(long, value_name = "FILE")]
    pub scores_file: Option<PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"value\").
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write logs to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
