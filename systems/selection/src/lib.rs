#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system translating tile activations into world commands.
//!
//! The first activation asks the world to select a tile, which becomes
//! pending once the world confirms it with `TileSelected`. Activating the
//! pending tile again clears the selection, while activating any other tile requests a swap with the
//! pending one and always drops the pending selection afterwards, whether or
//! not the world accepts the swap.

use match3_core::{CascadePhase, Command, Event, TileId};

/// Selection system holding the single pending tile of one grid.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pending: Option<TileId>,
    phase: CascadePhase,
}

impl Selection {
    /// Creates a selection system with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            phase: CascadePhase::Idle,
        }
    }

    /// Tile awaiting a second activation, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<TileId> {
        self.pending
    }

    /// Consumes world events and player activations to emit selection commands.
    ///
    /// Activations are ignored while a cascade is running.
    pub fn handle(&mut self, events: &[Event], activations: &[TileId], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::CascadePhaseChanged { phase } => self.phase = *phase,
                Event::TileSelected { tile } => self.pending = Some(*tile),
                Event::TileDeselected { tile } | Event::TileDestroyed { tile, .. }
                    if self.pending == Some(*tile) =>
                {
                    self.pending = None;
                }
                _ => {}
            }
        }

        if !self.phase.is_idle() {
            return;
        }

        for &tile in activations {
            self.activate(tile, out);
        }
    }

    fn activate(&mut self, tile: TileId, out: &mut Vec<Command>) {
        match self.pending.take() {
            None => out.push(Command::SelectTile { tile }),
            Some(pending) if pending == tile => {
                out.push(Command::DeselectTile { tile });
            }
            Some(pending) => {
                out.push(Command::SwapTiles {
                    first: tile,
                    second: pending,
                });
                out.push(Command::DeselectTile { tile: pending });
            }
        }
    }
}
