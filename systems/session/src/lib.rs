#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session wiring the world to the selection, pacing, and scoring systems.
//!
//! The session owns exactly one [`World`] at a time. Every player action is
//! turned into commands, applied to the world one by one, and the resulting
//! events are fanned out to the systems and the optional [`TileObserver`].

use std::{fmt, time::Duration};

use match3_core::{
    CascadePhase, CellCoord, Command, Event, GenerationError, GridConfig, MoveCause,
    PlacementCause, SessionCounters, SwapOutcome, TileId, TileObserver, TilePlacement,
};
use match3_system_cascade::{CascadeDriver, Config as PacingConfig};
use match3_system_scoring::Scoring;
use match3_system_selection::Selection;
use match3_world::{self as world, query, World};
use tracing::{debug, info};

/// Top-level game session holding the grid and its counters.
pub struct Session {
    world: World,
    pacing: PacingConfig,
    selection: Selection,
    driver: CascadeDriver,
    scoring: Scoring,
    observer: Option<Box<dyn TileObserver>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("pacing", &self.pacing)
            .field("selection", &self.selection)
            .field("driver", &self.driver)
            .field("scoring", &self.scoring)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Session {
    /// Starts a session on a freshly generated grid that settles cascades
    /// immediately.
    pub fn new(config: GridConfig, seed: u64) -> Result<Self, GenerationError> {
        Self::with_pacing(config, seed, PacingConfig::immediate())
    }

    /// Starts a session whose cascades advance with the supplied pacing.
    pub fn with_pacing(
        config: GridConfig,
        seed: u64,
        pacing: PacingConfig,
    ) -> Result<Self, GenerationError> {
        let world = World::new(config, seed)?;
        Ok(Self::from_world(world, pacing))
    }

    /// Starts a session on an already built world.
    #[must_use]
    pub fn from_world(world: World, pacing: PacingConfig) -> Self {
        Self {
            world,
            pacing,
            selection: Selection::new(),
            driver: CascadeDriver::new(pacing),
            scoring: Scoring::new(),
            observer: None,
        }
    }

    /// Installs the presentation callback and announces every current tile.
    pub fn set_observer(&mut self, observer: Box<dyn TileObserver>) {
        self.observer = Some(observer);
        self.announce_grid();
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Score and move count accumulated since the session started.
    #[must_use]
    pub fn counters(&self) -> SessionCounters {
        self.scoring.counters()
    }

    /// Current cascade phase of the grid.
    #[must_use]
    pub fn phase(&self) -> CascadePhase {
        query::cascade_phase(&self.world)
    }

    /// Tile awaiting a second activation, if any.
    #[must_use]
    pub fn pending_selection(&self) -> Option<TileId> {
        self.selection.pending()
    }

    /// Reports a tile activation from the input collaborator.
    pub fn activate_tile(&mut self, tile: TileId) {
        let mut commands = Vec::new();
        self.selection.handle(&[], &[tile], &mut commands);
        self.run(commands);
    }

    /// Activates whichever tile occupies the cell. Returns `false` when the
    /// cell is empty or outside the grid.
    pub fn activate_cell(&mut self, cell: CellCoord) -> bool {
        match query::tile_at(&self.world, cell) {
            Some(tile) => {
                self.activate_tile(tile.id);
                true
            }
            None => false,
        }
    }

    /// Attempts a swap directly, bypassing the pending selection.
    pub fn try_swap(&mut self, first: TileId, second: TileId) -> SwapOutcome {
        let mut events = Vec::new();
        let outcome = world::try_swap(&mut self.world, first, second, &mut events);
        let commands = self.absorb(&events);
        self.run(commands);
        outcome
    }

    /// Advances the session clock, stepping any cascade that is due.
    pub fn tick(&mut self, dt: Duration) {
        self.run(vec![Command::Tick { dt }]);
    }

    /// Runs the current cascade to completion regardless of pacing.
    pub fn settle(&mut self) {
        while !query::cascade_phase(&self.world).is_idle() {
            self.run(vec![Command::StepCascade]);
        }
    }

    /// Replaces the grid with a freshly generated one and zeroes the counters.
    ///
    /// The configuration of the current grid is reused. On error the current
    /// session is left untouched.
    pub fn restart(&mut self, seed: u64) -> Result<(), GenerationError> {
        let config = query::config(&self.world).clone();
        self.world = World::new(config, seed)?;
        self.selection = Selection::new();
        self.driver = CascadeDriver::new(self.pacing);
        self.scoring.reset();
        info!(seed, "session restarted");
        self.announce_grid();
        Ok(())
    }

    fn run(&mut self, mut commands: Vec<Command>) {
        while !commands.is_empty() {
            let mut follow_up = Vec::new();
            for command in commands {
                let mut events = Vec::new();
                world::apply(&mut self.world, command, &mut events);
                follow_up.extend(self.absorb(&events));
            }
            commands = follow_up;
        }
    }

    fn absorb(&mut self, events: &[Event]) -> Vec<Command> {
        self.notify(events);
        if self.scoring.handle(events) {
            let counters = self.scoring.counters();
            debug!(
                score = counters.score(),
                moves = counters.moves(),
                "counters updated"
            );
        }

        let mut commands = Vec::new();
        self.selection.handle(events, &[], &mut commands);
        self.driver.handle(events, &mut commands);
        commands
    }

    fn notify(&mut self, events: &[Event]) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        for event in events {
            match *event {
                Event::TileMoved { tile, to, cause, .. } => {
                    if let Some(snapshot) = query::tile(&self.world, tile) {
                        let cause = match cause {
                            MoveCause::Swap => PlacementCause::Swapped,
                            MoveCause::Gravity => PlacementCause::Fell,
                        };
                        observer.tile_placed(TilePlacement {
                            tile,
                            kind: snapshot.kind,
                            cell: to,
                            cause,
                        });
                    }
                }
                Event::TileSpawned { tile, cell, kind } => observer.tile_placed(TilePlacement {
                    tile,
                    kind,
                    cell,
                    cause: PlacementCause::Refilled,
                }),
                Event::TileDestroyed { tile, cell, .. } => observer.tile_removed(tile, cell),
                Event::TileSelected { tile } => observer.selection_changed(tile, true),
                Event::TileDeselected { tile } => observer.selection_changed(tile, false),
                _ => {}
            }
        }
    }

    fn announce_grid(&mut self) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        for snapshot in query::grid_view(&self.world).iter() {
            observer.tile_placed(TilePlacement {
                tile: snapshot.id,
                kind: snapshot.kind,
                cell: snapshot.cell,
                cause: PlacementCause::Generated,
            });
        }
    }
}
