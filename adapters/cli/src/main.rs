#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Invaders games headless or in the terminal.

mod config;
mod scene;
mod watch;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use invaders_core::{Difficulty, GameState, ShipType};
use invaders_rendering::{Color, Presentation, RenderingBackend, Scene, TextBackend, TextCanvas};
use invaders_session::{
    Autopilot, FrameInput, GameConfig, Idle, InputSource, PlayerRun, SinglePlayerGame,
    TwoPlayerGame,
};
use invaders_system_progression::{Achievements, Wallet};
use invaders_world::World;
use tracing_subscriber::EnvFilter;

use self::{config::FileConfig, watch::Spectator};

#[derive(Parser, Debug)]
#[command(name = "invaders")]
#[command(about = "Deterministic Space Invaders campaigns for one or two players")]
struct Cli {
    /// TOML file providing defaults for every flag
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a single-player campaign
    Play {
        #[command(flatten)]
        game: GameArgs,
        /// Controller steering the ship
        #[arg(long, value_enum, default_value_t = Pilot::Autopilot)]
        input: Pilot,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Play two campaigns side by side, advancing levels in lockstep
    Versus {
        #[command(flatten)]
        game: GameArgs,
        /// Controller steering player one
        #[arg(long, value_enum, default_value_t = Pilot::Autopilot)]
        first: Pilot,
        /// Controller steering player two
        #[arg(long, value_enum, default_value_t = Pilot::Autopilot)]
        second: Pilot,
    },
}

/// Flags overriding the `[game]` table of the config file.
#[derive(Args, Debug)]
struct GameArgs {
    /// Seed all random decisions derive from
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    difficulty: Option<CliDifficulty>,
    #[arg(long, value_enum)]
    ship: Option<CliShip>,
    /// Stop after this level
    #[arg(long)]
    levels: Option<u32>,
    /// Abandon a level after this many frames
    #[arg(long)]
    frames: Option<u64>,
    /// Pace frames to wall-clock time
    #[arg(long)]
    real_time: bool,
}

impl GameArgs {
    fn apply(&self, config: &mut GameConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty.into();
        }
        if let Some(ship) = self.ship {
            config.ship_type = ship.into();
        }
        if self.levels.is_some() {
            config.max_levels = self.levels;
        }
        if self.frames.is_some() {
            config.max_frames_per_level = self.frames;
        }
        config.real_time |= self.real_time;
    }
}

/// Terminal rendering flags of the `play` command.
#[derive(Args, Debug)]
struct RenderArgs {
    /// Draw the game in the terminal instead of running headless
    #[arg(long)]
    render: bool,
    #[arg(long, default_value_t = 60)]
    columns: usize,
    #[arg(long, default_value_t = 32)]
    rows: usize,
    /// Draw every n-th frame
    #[arg(long, default_value_t = 4)]
    stride: u64,
    /// Tint glyphs with ANSI colors
    #[arg(long)]
    color: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliDifficulty {
    Easy,
    Normal,
    Hard,
}

impl From<CliDifficulty> for Difficulty {
    fn from(value: CliDifficulty) -> Self {
        match value {
            CliDifficulty::Easy => Difficulty::Easy,
            CliDifficulty::Normal => Difficulty::Normal,
            CliDifficulty::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliShip {
    StarDefender,
    VoidReaper,
    GalacticGuardian,
    CosmicCruiser,
}

impl From<CliShip> for ShipType {
    fn from(value: CliShip) -> Self {
        match value {
            CliShip::StarDefender => ShipType::StarDefender,
            CliShip::VoidReaper => ShipType::VoidReaper,
            CliShip::GalacticGuardian => ShipType::GalacticGuardian,
            CliShip::CosmicCruiser => ShipType::CosmicCruiser,
        }
    }
}

/// Controller selectable from the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pilot {
    /// Never touches the controls
    Idle,
    /// Dodges bullets and shoots the lowest row
    Autopilot,
}

impl InputSource for Pilot {
    fn next_input(&mut self, world: &World) -> FrameInput {
        match self {
            Self::Idle => Idle.next_input(world),
            Self::Autopilot => Autopilot.next_input(world),
        }
    }
}

/// Entry point for the Invaders command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let Cli { config, command } = Cli::parse();
    let file = FileConfig::load(config.as_deref())?;
    let wallet = file.wallet.into_wallet()?;
    let mut game_config = file.game;

    match command {
        Commands::Play {
            game,
            mut input,
            render,
        } => {
            game.apply(&mut game_config);
            if render.render {
                watch_game(game_config, &wallet, input, &render)
            } else {
                play_game(game_config, wallet, &mut input)
            }
        }
        Commands::Versus {
            game,
            first,
            second,
        } => {
            game.apply(&mut game_config);
            play_versus(game_config, wallet, first, second)
        }
    }
}

fn play_game(config: GameConfig, wallet: Wallet, input: &mut Pilot) -> Result<()> {
    let game = SinglePlayerGame::new(config, wallet, Achievements::default())
        .context("failed to set up the game")?;
    let summary = game.play(input);

    print_state("final", &summary.final_state);
    println!("levels played: {}", summary.levels.len());
    println!("ended by: {:?}", summary.end);
    println!(
        "coins earned: {} from score, {} from achievements ({} held)",
        summary.score_coins,
        summary.achievement_coins,
        summary.wallet.coins()
    );
    Ok(())
}

fn watch_game(
    config: GameConfig,
    wallet: &Wallet,
    input: Pilot,
    render: &RenderArgs,
) -> Result<()> {
    config.validate().context("failed to set up the game")?;
    let canvas = TextCanvas::new(render.columns, render.rows)
        .context("invalid canvas size")?
        .with_color(render.color);
    let mut backend = TextBackend::new(io::stdout().lock(), canvas)
        .with_frame_stride(render.stride)
        .context("invalid frame stride")?
        .with_real_time(config.real_time)
        .with_clear_screen(true);
    let presentation = Presentation::new(
        "Invaders",
        Color::from_rgb_u8(0, 0, 0),
        Scene::default(),
    );

    let mut spectator = Spectator::new(config, wallet, input);
    (&mut backend).run(presentation, |_, scene| spectator.advance(scene))?;
    drop(backend);

    print_state("final", &spectator.state());
    Ok(())
}

fn play_versus(config: GameConfig, wallet: Wallet, first: Pilot, second: Pilot) -> Result<()> {
    let game = TwoPlayerGame::new(config, wallet).context("failed to set up the game")?;
    let summary = game
        .play(first, second)
        .context("two-player game aborted")?;

    print_run("player 1", &summary.player_one);
    print_run("player 2", &summary.player_two);
    println!("winner: player {}", summary.winner.number());
    Ok(())
}

fn print_run(label: &str, run: &PlayerRun) {
    print_state(label, &run.final_state());
    println!("{label} levels played: {}", run.levels().len());
}

fn print_state(label: &str, state: &GameState) {
    println!("{}", state_line(label, state));
}

fn state_line(label: &str, state: &GameState) -> String {
    format!(
        "{label} score: {} (level {}, lives {}, accuracy {:.0}%, best combo {})",
        state.score,
        state.level,
        state.lives,
        state.accuracy(),
        state.max_combo
    )
}
