#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a match-3 grid in the terminal.

mod config;
mod terminal;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    thread,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use match3_core::{CellCoord, GravityDirection};
use match3_presentation::{GridLayout, Scene};
use match3_system_cascade::Config as PacingConfig;
use match3_system_session::Session;
use match3_world::query;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Overrides, Settings},
    terminal::{SharedScene, TerminalBackend},
};

/// Play a match-3 grid in the terminal.
#[derive(Parser, Debug)]
#[command(name = "match3", version)]
struct Args {
    /// TOML file providing grid and session settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for grid generation and refills. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of columns in the grid.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of rows in the grid.
    #[arg(long)]
    rows: Option<u32>,
    /// Minimum run length that counts as a match.
    #[arg(long)]
    threshold: Option<u32>,
    /// Direction in which tiles fall after a match.
    #[arg(long, value_enum)]
    gravity: Option<GravityArg>,
    /// Milliseconds between cascade steps; zero settles immediately.
    #[arg(long, value_name = "MS")]
    step_ms: Option<u64>,
    /// Play this many random legal swaps and exit instead of reading stdin.
    #[arg(long, value_name = "MOVES")]
    autoplay: Option<u32>,
    /// Disable ANSI colors.
    #[arg(long)]
    plain: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GravityArg {
    TopToBottom,
    BottomToTop,
}

impl From<GravityArg> for GravityDirection {
    fn from(value: GravityArg) -> Self {
        match value {
            GravityArg::TopToBottom => Self::TopToBottom,
            GravityArg::BottomToTop => Self::BottomToTop,
        }
    }
}

/// Entry point for the match-3 command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let overrides = Overrides {
        seed: args.seed,
        step_ms: args.step_ms,
        columns: args.columns,
        rows: args.rows,
        threshold: args.threshold,
        gravity: args.gravity.map(GravityDirection::from),
    };
    let settings = config::load(args.config.as_deref(), overrides)?;
    info!(seed = settings.seed, "starting session");

    let seed = settings.seed;
    let mut game = Game::new(settings, !args.plain)?;
    game.backend.print_line(query::welcome_banner(game.session.world()))?;
    game.draw()?;

    match args.autoplay {
        Some(moves) => game.autoplay(moves, seed),
        None => game.interactive(),
    }
}

struct Game {
    session: Session,
    scene: SharedScene,
    backend: TerminalBackend<io::Stdout>,
    pacing: PacingConfig,
}

impl Game {
    fn new(settings: Settings, color: bool) -> Result<Self> {
        let pacing = PacingConfig::new(settings.step);
        let mut session = Session::with_pacing(settings.grid.clone(), settings.seed, pacing)
            .context("failed to generate the grid")?;
        let layout = GridLayout::new(settings.grid.columns, settings.grid.rows, 1.0)?;
        let scene = SharedScene::new(Scene::new(layout));
        session.set_observer(Box::new(scene.clone()));

        Ok(Self {
            session,
            scene,
            backend: TerminalBackend::stdout(&settings.grid.catalog, color),
            pacing,
        })
    }

    fn draw(&mut self) -> Result<()> {
        self.scene.present(&mut self.backend)?;
        self.backend.print_counters(self.session.counters())
    }

    /// Lets a paced cascade play out on screen.
    fn run_cascade(&mut self) -> Result<()> {
        let step = self.pacing.step_interval();
        while !self.session.phase().is_idle() {
            thread::sleep(step);
            self.session.tick(step);
            self.draw()?;
        }
        Ok(())
    }

    fn activate(&mut self, cell: CellCoord) -> Result<()> {
        if !self.session.activate_cell(cell) {
            return self
                .backend
                .print_line(&format!("no tile at {cell}; the grid is {}", self.size()));
        }
        self.draw()?;
        self.run_cascade()
    }

    fn size(&self) -> String {
        let (columns, rows) = query::dimensions(self.session.world());
        format!("{columns}x{rows}")
    }

    fn hint(&mut self) -> Result<()> {
        let world = self.session.world();
        let hint = query::legal_swaps(world).into_iter().next().and_then(|(a, b)| {
            Some((query::tile(world, a)?.cell, query::tile(world, b)?.cell))
        });
        match hint {
            Some((first, second)) => self
                .backend
                .print_line(&format!("try swapping {first} with {second}")),
            None => self.backend.print_line("no legal swaps left; type r to restart"),
        }
    }

    fn restart(&mut self) -> Result<()> {
        let seed = rand::random::<u64>();
        self.scene.clear();
        self.session
            .restart(seed)
            .context("failed to generate a new grid")?;
        self.backend.print_line(&format!("new grid (seed {seed})"))?;
        self.draw()
    }

    fn interactive(&mut self) -> Result<()> {
        self.backend
            .print_line("enter `column row` to activate a tile, h for a hint, r to restart, q to quit")?;
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("failed to read from stdin")?;
            let mut words = line.split_whitespace();
            match (words.next(), words.next(), words.next()) {
                (None, _, _) => continue,
                (Some("q" | "quit"), None, _) => break,
                (Some("h" | "hint"), None, _) => self.hint()?,
                (Some("r" | "restart"), None, _) => self.restart()?,
                (Some(column), Some(row), None) => match (column.parse(), row.parse()) {
                    (Ok(column), Ok(row)) => self.activate(CellCoord::new(column, row))?,
                    _ => self
                        .backend
                        .print_line("coordinates must be non-negative integers")?,
                },
                _ => self.backend.print_line("unrecognised input")?,
            }
        }
        Ok(())
    }

    fn autoplay(&mut self, moves: u32, seed: u64) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for turn in 1..=moves {
            let legal = query::legal_swaps(self.session.world());
            if legal.is_empty() {
                self.backend.print_line("no legal swaps left")?;
                break;
            }
            let (first, second) = legal[rng.gen_range(0..legal.len())];
            self.backend.print_line(&format!("move {turn}"))?;
            self.session.activate_tile(first);
            self.session.activate_tile(second);
            self.run_cascade()?;
            self.draw()?;
        }
        Ok(())
    }
}
