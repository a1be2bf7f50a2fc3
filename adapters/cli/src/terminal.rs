//! Text rendering backend drawing the scene to a writer.

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

use anyhow::{Context, Result};
use match3_core::{CellCoord, SessionCounters, TileCatalog, TileId, TileObserver, TilePlacement};
use match3_presentation::{kind_color, RenderingBackend, Scene};

const SELECTED_LIGHTEN: f32 = 0.45;

/// Scene handle shared between the session observer and the renderer.
#[derive(Clone, Debug)]
pub(crate) struct SharedScene(Rc<RefCell<Scene>>);

impl SharedScene {
    pub(crate) fn new(scene: Scene) -> Self {
        Self(Rc::new(RefCell::new(scene)))
    }

    pub(crate) fn present(&self, backend: &mut impl RenderingBackend) -> Result<()> {
        backend.present(&self.0.borrow())
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl TileObserver for SharedScene {
    fn tile_placed(&mut self, placement: TilePlacement) {
        self.0.borrow_mut().tile_placed(placement);
    }

    fn tile_removed(&mut self, tile: TileId, cell: CellCoord) {
        self.0.borrow_mut().tile_removed(tile, cell);
    }

    fn selection_changed(&mut self, tile: TileId, selected: bool) {
        self.0.borrow_mut().selection_changed(tile, selected);
    }
}

/// Draws one character per tile, optionally tinted with 24-bit ANSI colors.
pub(crate) struct TerminalBackend<W: Write> {
    out: W,
    glyphs: Vec<char>,
    color: bool,
}

impl TerminalBackend<io::Stdout> {
    pub(crate) fn stdout(catalog: &TileCatalog, color: bool) -> Self {
        Self::new(io::stdout(), catalog, color)
    }
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W, catalog: &TileCatalog, color: bool) -> Self {
        let glyphs = catalog
            .iter()
            .map(|(_, kind)| {
                kind.name()
                    .chars()
                    .next()
                    .map_or('?', |glyph| glyph.to_ascii_uppercase())
            })
            .collect();
        Self { out, glyphs, color }
    }

    pub(crate) fn print_counters(&mut self, counters: SessionCounters) -> Result<()> {
        writeln!(
            self.out,
            "score: {}  moves: {}",
            counters.score(),
            counters.moves()
        )
        .context("failed to write counters")
    }

    pub(crate) fn print_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}").context("failed to write to terminal")
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        let (columns, rows) = scene.layout().dimensions();
        let mut frame = String::from("   ");
        for column in 0..columns {
            frame.push_str(&format!("{:>3}", column % 100));
        }
        frame.push('\n');

        for row in 0..rows {
            frame.push_str(&format!("{:>3}", row % 100));
            for column in 0..columns {
                let cell = match scene.tile_at(CellCoord::new(column, row)) {
                    Some((_, tile)) => {
                        let glyph = self.glyphs.get(tile.kind.index()).copied().unwrap_or('?');
                        let (open, close) = if tile.selected { ('[', ']') } else { (' ', ' ') };
                        if self.color {
                            let mut color = kind_color(tile.kind);
                            if tile.selected {
                                color = color.lighten(SELECTED_LIGHTEN);
                            }
                            format!(
                                "{open}\x1b[38;2;{};{};{}m{glyph}\x1b[0m{close}",
                                channel(color.red),
                                channel(color.green),
                                channel(color.blue)
                            )
                        } else {
                            format!("{open}{glyph}{close}")
                        }
                    }
                    None => " . ".to_owned(),
                };
                frame.push_str(&cell);
            }
            frame.push('\n');
        }

        self.out
            .write_all(frame.as_bytes())
            .context("failed to draw the grid")?;
        self.out.flush().context("failed to flush the terminal")
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::{PlacementCause, TileKindId};
    use match3_presentation::GridLayout;

    #[test]
    fn plain_frame_marks_selection_and_gaps() {
        let catalog = TileCatalog::default();
        let mut scene = Scene::new(GridLayout::new(2, 1, 1.0).expect("valid layout"));
        scene.tile_placed(TilePlacement {
            tile: TileId::new(0),
            kind: TileKindId::new(2),
            cell: CellCoord::new(0, 0),
            cause: PlacementCause::Generated,
        });
        scene.selection_changed(TileId::new(0), true);

        let mut backend = TerminalBackend::new(Vec::new(), &catalog, false);
        backend.present(&scene).expect("writing to a vec succeeds");
        let frame = String::from_utf8(backend.into_inner()).expect("utf-8 output");

        assert_eq!(frame, "     0  1\n  0[S] . \n");
    }
}
