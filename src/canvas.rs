//! Terminal host graphics: a grid of character cells plus a braille line layer.

use crate::braille::{BrailleCell, BrailleLayer};
use crate::color::Rgb;
use crate::render::{Anchor, PlacedGlyph, Surface};

/// Virtual pixels per terminal cell, horizontally
pub const CELL_W_PX: f32 = 10.0;

/// Virtual pixels per terminal cell, vertically
pub const CELL_H_PX: f32 = 20.0;

/// Pixel size of a canvas of `cols x rows` cells
pub fn pixel_size(cols: u16, rows: u16) -> (f32, f32) {
    (cols as f32 * CELL_W_PX, rows as f32 * CELL_H_PX)
}

/// Pixel position at the centre of a cell; cells left of or above the canvas are negative
pub fn cell_center(col: i32, row: i32) -> (f32, f32) {
    (
        (col as f32 + 0.5) * CELL_W_PX,
        (row as f32 + 0.5) * CELL_H_PX,
    )
}

/// Character cell grid the simulation is painted into each frame
#[derive(Debug, Clone, Default)]
pub struct CellCanvas {
    cols: u16,
    rows: u16,
    glyphs: Vec<Option<(char, Rgb)>>,
    links: BrailleLayer,
}

impl CellCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            glyphs: vec![None; cols as usize * rows as usize],
            links: BrailleLayer::new(cols, rows),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols != self.cols || rows != self.rows {
            self.cols = cols;
            self.rows = rows;
            self.glyphs = vec![None; cols as usize * rows as usize];
            self.links.resize(cols, rows);
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    fn cell_at(&self, x: f32, y: f32) -> Option<usize> {
        let col = (x / CELL_W_PX).floor();
        let row = (y / CELL_H_PX).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn glyph_at(&self, col: u16, row: u16) -> Option<(char, Rgb)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.glyphs[row as usize * self.cols as usize + col as usize]
    }

    /// Everything to blit: link cells first, glyph cells on top
    pub fn cells(&self) -> Vec<BrailleCell> {
        let mut cells: Vec<BrailleCell> = self
            .links
            .cells()
            .into_iter()
            .filter(|c| self.glyph_at(c.x, c.y).is_none())
            .collect();
        for (idx, glyph) in self.glyphs.iter().enumerate() {
            if let Some((ch, color)) = glyph {
                cells.push(BrailleCell {
                    x: (idx % self.cols as usize) as u16,
                    y: (idx / self.cols as usize) as u16,
                    char: *ch,
                    color: *color,
                });
            }
        }
        cells
    }
}

impl Surface for CellCanvas {
    fn size(&self) -> (f32, f32) {
        pixel_size(self.cols, self.rows)
    }

    fn clear(&mut self) {
        self.glyphs.fill(None);
        self.links.clear();
    }

    fn draw_glyph(&mut self, glyph: &PlacedGlyph) {
        // Cells cannot rotate; the glyph lands in the cell holding its visual centre
        let (x, y) = match glyph.anchor {
            Anchor::Center => (glyph.x, glyph.y),
            Anchor::Baseline => {
                let lift = glyph.size * 0.28;
                let (sin, cos) = glyph.angle.sin_cos();
                (glyph.x + lift * sin, glyph.y - lift * cos)
            }
        };
        if let Some(idx) = self.cell_at(x, y) {
            self.glyphs[idx] = Some((glyph.ch, glyph.color));
        }
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let sx = 2.0 / CELL_W_PX;
        let sy = 4.0 / CELL_H_PX;
        self.links.line(x0 * sx, y0 * sy, x1 * sx, y1 * sy, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char, x: f32, y: f32, anchor: Anchor) -> PlacedGlyph {
        PlacedGlyph {
            ch,
            x,
            y,
            angle: 0.0,
            size: 20.0,
            anchor,
            color: Rgb::new(10, 20, 30),
        }
    }

    #[test]
    fn test_glyph_lands_in_containing_cell() {
        let mut canvas = CellCanvas::new(8, 4);
        canvas.draw_glyph(&glyph('A', 35.0, 45.0, Anchor::Center));
        assert_eq!(canvas.glyph_at(3, 2), Some(('A', Rgb::new(10, 20, 30))));
    }

    #[test]
    fn test_baseline_anchor_lifts_glyph() {
        let mut canvas = CellCanvas::new(8, 4);
        // baseline at y=42 puts the visual centre at 36.4, row 1
        canvas.draw_glyph(&glyph('g', 5.0, 42.0, Anchor::Baseline));
        assert_eq!(canvas.glyph_at(0, 1).map(|g| g.0), Some('g'));
    }

    #[test]
    fn test_baseline_lift_follows_rotation() {
        let mut canvas = CellCanvas::new(8, 4);
        // a quarter turn carries the lift sideways: centre at (10.6, 42)
        let turned = PlacedGlyph {
            angle: std::f32::consts::FRAC_PI_2,
            ..glyph('g', 5.0, 42.0, Anchor::Baseline)
        };
        canvas.draw_glyph(&turned);
        assert_eq!(canvas.glyph_at(1, 2).map(|g| g.0), Some('g'));
    }

    #[test]
    fn test_offscreen_glyphs_are_dropped() {
        let mut canvas = CellCanvas::new(4, 4);
        canvas.draw_glyph(&glyph('A', -1.0, 10.0, Anchor::Center));
        canvas.draw_glyph(&glyph('B', 400.0, 10.0, Anchor::Center));
        assert!(canvas.cells().is_empty());
    }

    #[test]
    fn test_glyphs_cover_links() {
        let mut canvas = CellCanvas::new(4, 1);
        canvas.draw_line(0.0, 10.0, 39.0, 10.0, Rgb::new(1, 1, 1));
        canvas.draw_glyph(&glyph('X', 15.0, 10.0, Anchor::Center));
        let cells = canvas.cells();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells.iter().filter(|c| c.char == 'X').count(), 1);
        assert!(cells.iter().all(|c| c.x != 1 || c.char == 'X'));
    }

    #[test]
    fn test_clear_and_pixel_size() {
        let mut canvas = CellCanvas::new(4, 3);
        canvas.draw_glyph(&glyph('A', 5.0, 5.0, Anchor::Center));
        canvas.clear();
        assert!(canvas.cells().is_empty());
        assert_eq!(canvas.size(), (40.0, 60.0));
        assert_eq!(cell_center(0, 0), (5.0, 10.0));
    }
}
