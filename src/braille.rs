use crate::color::Rgb;

/// Braille character rendering for sub-cell line work.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Rgb,
}

/// Dot raster covering `cols x rows` terminal cells
#[derive(Debug, Clone, Default)]
pub struct BrailleLayer {
    cols: u16,
    rows: u16,
    patterns: Vec<u8>,
    colors: Vec<Option<Rgb>>,
}

impl BrailleLayer {
    pub fn new(cols: u16, rows: u16) -> Self {
        let n = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            patterns: vec![0; n],
            colors: vec![None; n],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols != self.cols || rows != self.rows {
            *self = Self::new(cols, rows);
        }
    }

    pub fn clear(&mut self) {
        self.patterns.fill(0);
        self.colors.fill(None);
    }

    /// Dot resolution (2 per cell across, 4 per cell down)
    pub fn dot_size(&self) -> (i32, i32) {
        (self.cols as i32 * 2, self.rows as i32 * 4)
    }

    /// Set one dot in dot coordinates; out-of-range dots are dropped
    pub fn set_dot(&mut self, dx: i32, dy: i32, color: Rgb) {
        let (w, h) = self.dot_size();
        if dx < 0 || dy < 0 || dx >= w || dy >= h {
            return;
        }
        let idx = (dy / 4) as usize * self.cols as usize + (dx / 2) as usize;
        self.patterns[idx] |= BRAILLE_DOTS[(dx % 2) as usize][(dy % 4) as usize];
        self.colors[idx] = Some(color);
    }

    /// Plot a straight line in dot coordinates (DDA)
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
        // Cap pathological spans (e.g. huge coordinates) to the raster diagonal
        let (w, h) = self.dot_size();
        let steps = steps.min((w + h) as f32 * 2.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.set_dot(x.floor() as i32, y.floor() as i32, color);
        }
    }

    /// Non-empty cells
    pub fn cells(&self) -> Vec<BrailleCell> {
        let mut cells = Vec::new();
        for (idx, &pattern) in self.patterns.iter().enumerate() {
            if pattern == 0 {
                continue;
            }
            let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
            cells.push(BrailleCell {
                x: (idx % self.cols as usize) as u16,
                y: (idx / self.cols as usize) as u16,
                char: braille_char,
                color: self.colors[idx].unwrap_or(Rgb::new(255, 255, 255)),
            });
        }
        cells
    }
}
