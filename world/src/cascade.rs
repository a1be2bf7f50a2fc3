//! Cascade state machine driven one transition per `StepCascade`.

use match3_core::{CascadePhase, CellCoord, Event, GravityDirection, MoveCause};
use tracing::{debug, trace};

use crate::{matching::find_all_matches, tiles::Tile, World};

impl World {
    /// Performs the transition associated with the current phase.
    pub(crate) fn step_cascade(&mut self, out_events: &mut Vec<Event>) {
        match self.phase {
            CascadePhase::Idle => {}
            CascadePhase::Resolving => self.resolve(out_events),
            CascadePhase::Collapsing => self.collapse(out_events),
            CascadePhase::Refilling => self.refill(out_events),
        }
    }

    pub(crate) fn enter_phase(&mut self, phase: CascadePhase, out_events: &mut Vec<Event>) {
        self.phase = phase;
        debug!(?phase, pass = self.pass, "cascade phase changed");
        out_events.push(Event::CascadePhaseChanged { phase });
    }

    fn resolve(&mut self, out_events: &mut Vec<Event>) {
        let matched = find_all_matches(&self.grid, self.config.win_threshold);
        if matched.is_empty() {
            let passes = self.pass;
            self.enter_phase(CascadePhase::Idle, out_events);
            debug!(passes, "cascade settled");
            out_events.push(Event::CascadeSettled { passes });
            return;
        }

        self.pass = self.pass.saturating_add(1);
        let mut destroyed = 0_u32;
        for cell in matched {
            if let Some(tile) = self.grid.take(cell) {
                if tile.selected {
                    self.selected = None;
                    out_events.push(Event::TileDeselected { tile: tile.id });
                }
                let score = self.config.catalog.score(tile.kind);
                trace!(tile = tile.id.get(), %cell, score, "tile destroyed");
                out_events.push(Event::TileDestroyed {
                    tile: tile.id,
                    cell,
                    kind: tile.kind,
                    score,
                });
                destroyed += 1;
            }
        }

        debug!(pass = self.pass, tiles = destroyed, "matches cleared");
        out_events.push(Event::MatchesCleared {
            pass: self.pass,
            tiles: destroyed,
        });
        self.enter_phase(CascadePhase::Collapsing, out_events);
    }

    fn collapse(&mut self, out_events: &mut Vec<Event>) {
        let (columns, rows) = self.grid.dimensions();
        let gravity = self.config.gravity;

        for column in 0..columns {
            let mut packed = 0;
            for offset in 0..rows {
                let from = CellCoord::new(column, row_from_leading_edge(gravity, rows, offset));
                let Some(tile) = self.grid.take(from) else {
                    continue;
                };
                let to = CellCoord::new(column, row_from_leading_edge(gravity, rows, packed));
                packed += 1;
                if from != to {
                    trace!(tile = tile.id.get(), %from, %to, "tile fell");
                    out_events.push(Event::TileMoved {
                        tile: tile.id,
                        from,
                        to,
                        cause: MoveCause::Gravity,
                    });
                }
                self.grid.place(to, tile);
            }
        }
        debug_assert!(self.grid.is_consistent());

        self.enter_phase(CascadePhase::Refilling, out_events);
    }

    fn refill(&mut self, out_events: &mut Vec<Event>) {
        let empty: Vec<CellCoord> = self
            .grid
            .cells()
            .filter(|cell| self.grid.get(*cell).is_none())
            .collect();

        for cell in empty {
            let kind = self.sampler.refill();
            let id = self.ids.allocate();
            self.grid.place(cell, Tile::new(id, cell, kind));
            trace!(tile = id.get(), %cell, kind = kind.get(), "tile spawned");
            out_events.push(Event::TileSpawned {
                tile: id,
                cell,
                kind,
            });
        }

        self.enter_phase(CascadePhase::Resolving, out_events);
    }
}

/// Maps a distance from the leading edge of a column to a row index.
fn row_from_leading_edge(gravity: GravityDirection, rows: u32, offset: u32) -> u32 {
    match gravity {
        GravityDirection::TopToBottom => rows - 1 - offset,
        GravityDirection::BottomToTop => offset,
    }
}

#[cfg(test)]
mod tests {
    use super::row_from_leading_edge;
    use match3_core::GravityDirection;

    #[test]
    fn leading_edge_follows_gravity() {
        assert_eq!(row_from_leading_edge(GravityDirection::TopToBottom, 6, 0), 5);
        assert_eq!(row_from_leading_edge(GravityDirection::TopToBottom, 6, 5), 0);
        assert_eq!(row_from_leading_edge(GravityDirection::BottomToTop, 6, 0), 0);
        assert_eq!(row_from_leading_edge(GravityDirection::BottomToTop, 6, 4), 4);
    }
}
