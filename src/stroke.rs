use crate::glyph::GlyphCache;
use crate::settings::{DEFAULT_TEXT, POINTER_NOISE_FLOOR};
use std::collections::VecDeque;

/// One simulated glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub ch: char,
    /// Smoothed render angle (radians)
    pub last_angle: f32,
    /// Unit pointer direction when the particle was seeded
    pub dir_x: f32,
    pub dir_y: f32,
    /// Advance width for the current font (refreshed every frame)
    pub w: f32,
    /// Collision radius for the current font (refreshed every frame)
    pub r: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, ch: char, dir_x: f32, dir_y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            ch,
            last_angle: dir_y.atan2(dir_x),
            dir_x,
            dir_y,
            w: 0.0,
            r: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }
}

/// A path of glyphs laid down by one pointer drag
#[derive(Debug, Clone)]
pub struct Stroke {
    pub particles: Vec<Particle>,
    pub is_drawing: bool,
    pub last_x: f32,
    pub last_y: f32,
    /// Travel since the last placed glyph that did not yet fit the next advance
    pub carry: f32,
    pub char_cursor: usize,
    chars: Vec<char>,
}

impl Stroke {
    pub fn new(x: f32, y: f32, text: &str) -> Self {
        let text = if text.is_empty() { DEFAULT_TEXT } else { text };
        Self {
            particles: Vec::new(),
            is_drawing: true,
            last_x: x,
            last_y: y,
            carry: 0.0,
            char_cursor: 0,
            chars: text.chars().collect(),
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Character the next seeded particle will carry
    pub fn next_char(&self) -> char {
        self.chars[self.char_cursor % self.chars.len()]
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Strokes with fewer than two glyphs have no spring
    pub fn has_springs(&self) -> bool {
        self.particles.len() >= 2
    }

    pub fn is_finite(&self) -> bool {
        self.particles.iter().all(Particle::is_finite)
    }
}

/// Turns pointer down/drag/up into strokes of seeded particles.
/// Holds at most `max_strokes`; the oldest stroke is evicted first.
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    strokes: VecDeque<Stroke>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &VecDeque<Stroke> {
        &self.strokes
    }

    pub fn strokes_mut(&mut self) -> &mut VecDeque<Stroke> {
        &mut self.strokes
    }

    pub fn particle_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    pub fn is_drawing(&self) -> bool {
        self.strokes.back().is_some_and(|s| s.is_drawing)
    }

    /// Pointer down: begin a new stroke carrying `text`
    pub fn start(&mut self, x: f32, y: f32, text: &str, max_strokes: usize) {
        self.finish();
        let max_strokes = max_strokes.max(1);
        while self.strokes.len() >= max_strokes {
            if let Some(evicted) = self.strokes.pop_front() {
                tracing::debug!(particles = evicted.len(), "evicted oldest stroke");
            }
        }
        self.strokes.push_back(Stroke::new(x, y, text));
        tracing::debug!(strokes = self.strokes.len(), x, y, "stroke started");
    }

    /// Pointer drag: seed as many glyphs as the travelled distance pays for.
    /// Returns the number of particles added.
    pub fn extend(&mut self, x: f32, y: f32, glyphs: &mut GlyphCache, max_chars: usize) -> usize {
        let Some(stroke) = self.strokes.back_mut().filter(|s| s.is_drawing) else {
            return 0;
        };
        let max_chars = max_chars.max(1);

        let dx = x - stroke.last_x;
        let dy = y - stroke.last_y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= POINTER_NOISE_FLOOR {
            return 0;
        }
        let (ux, uy) = (dx / dist, dy / dist);

        let mut remain = dist + stroke.carry;
        // Offset along this segment from the last pointer position; starts behind it by the carry
        let mut along = -stroke.carry;
        let mut added = 0;

        while stroke.particles.len() < max_chars {
            let ch = stroke.next_char();
            let info = glyphs.info(ch);
            if remain < info.advance {
                break;
            }
            along += info.advance;
            let mut particle = Particle::new(
                stroke.last_x + ux * along,
                stroke.last_y + uy * along,
                ch,
                ux,
                uy,
            );
            particle.w = info.advance;
            particle.r = info.radius;
            stroke.particles.push(particle);
            stroke.char_cursor += 1;
            remain -= info.advance;
            added += 1;
        }

        // A full stroke seeds nothing more
        stroke.carry = if stroke.particles.len() < max_chars {
            remain
        } else {
            0.0
        };
        stroke.last_x = x;
        stroke.last_y = y;
        added
    }

    /// Pointer up: freeze the current stroke
    pub fn finish(&mut self) {
        if let Some(stroke) = self.strokes.back_mut().filter(|s| s.is_drawing) {
            stroke.is_drawing = false;
            tracing::debug!(particles = stroke.len(), "stroke finished");
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Re-apply capacity limits after they were lowered
    pub fn enforce_capacity(&mut self, max_strokes: usize, max_chars: usize) {
        let max_strokes = max_strokes.max(1);
        let max_chars = max_chars.max(1);
        while self.strokes.len() > max_strokes {
            self.strokes.pop_front();
        }
        for stroke in self.strokes.iter_mut() {
            stroke.particles.truncate(max_chars);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{FontSpec, TableMetrics};
    use rand::Rng;

    fn ab_cache() -> GlyphCache {
        let metrics = TableMetrics::new(40.0)
            .with_width('A', 30.0)
            .with_width('B', 26.0);
        GlyphCache::new(Box::new(metrics), FontSpec::new(40.0, 400), 1.0)
    }

    #[test]
    fn test_straight_drag_seeds_by_advance() {
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        recorder.start(0.0, 100.0, "AB", 10);
        let added = recorder.extend(140.0, 100.0, &mut glyphs, 100);
        assert_eq!(added, 4);

        let stroke = &recorder.strokes()[0];
        let xs: Vec<f32> = stroke.particles.iter().map(|p| p.x).collect();
        let chars: Vec<char> = stroke.particles.iter().map(|p| p.ch).collect();
        assert_eq!(xs, vec![30.0, 56.0, 86.0, 112.0]);
        assert_eq!(chars, vec!['A', 'B', 'A', 'B']);
        assert!((stroke.carry - 28.0).abs() < 1e-4);
        assert_eq!(stroke.char_cursor, 4);
        assert!(stroke.particles.iter().all(|p| p.y == 100.0 && p.dir_x == 1.0));
    }

    #[test]
    fn test_small_drags_carry_over() {
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        recorder.start(0.0, 0.0, "AB", 10);
        for step in 1..=14 {
            recorder.extend(step as f32 * 10.0, 0.0, &mut glyphs, 100);
        }

        let stroke = &recorder.strokes()[0];
        assert_eq!(stroke.len(), 4);
        let expected = [30.0, 56.0, 86.0, 112.0];
        for (p, x) in stroke.particles.iter().zip(expected) {
            assert!((p.x - x).abs() < 1e-3, "expected {x}, got {}", p.x);
        }
        assert!((stroke.carry - 28.0).abs() < 1e-3);
    }

    #[test]
    fn test_full_stroke_stops_carrying() {
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        recorder.start(0.0, 0.0, "AB", 10);
        assert_eq!(recorder.extend(140.0, 0.0, &mut glyphs, 2), 2);
        assert_eq!(recorder.strokes()[0].carry, 0.0);

        for x in [200.0, 300.0, 400.0] {
            assert_eq!(recorder.extend(x, 0.0, &mut glyphs, 2), 0);
        }
        let stroke = &recorder.strokes()[0];
        assert_eq!(stroke.len(), 2);
        assert_eq!(stroke.carry, 0.0);
        assert_eq!(stroke.last_x, 400.0);
    }

    #[test]
    fn test_noise_floor_ignores_jitter() {
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        recorder.start(10.0, 10.0, "AB", 10);
        recorder.extend(10.3, 10.3, &mut glyphs, 100);

        let stroke = &recorder.strokes()[0];
        assert_eq!(stroke.last_x, 10.0);
        assert_eq!(stroke.carry, 0.0);
    }

    #[test]
    fn test_empty_text_uses_placeholder() {
        let stroke = Stroke::new(0.0, 0.0, "");
        assert_eq!(stroke.chars().iter().collect::<String>(), DEFAULT_TEXT);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut recorder = StrokeRecorder::new();
        let max = 3;
        recorder.start(0.0, 0.0, "FIRST", max);
        for i in 0..max {
            recorder.start(i as f32, 0.0, "LATER", max);
            recorder.finish();
        }

        assert_eq!(recorder.strokes().len(), max);
        assert!(recorder
            .strokes()
            .iter()
            .all(|s| s.chars().iter().collect::<String>() == "LATER"));
    }

    #[test]
    fn test_start_finishes_previous_stroke() {
        let mut recorder = StrokeRecorder::new();
        recorder.start(0.0, 0.0, "A", 5);
        recorder.start(5.0, 0.0, "B", 5);
        assert!(!recorder.strokes()[0].is_drawing);
        assert!(recorder.strokes()[1].is_drawing);
    }

    #[test]
    fn test_extend_after_finish_is_ignored() {
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        recorder.start(0.0, 0.0, "AB", 5);
        recorder.finish();
        assert_eq!(recorder.extend(200.0, 0.0, &mut glyphs, 100), 0);
        assert!(recorder.strokes()[0].is_empty());
        assert!(!recorder.is_drawing());
    }

    #[test]
    fn test_random_drags_respect_capacity() {
        let mut rng = rand::thread_rng();
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        let (max_strokes, max_chars) = (4, 7);

        for _ in 0..12 {
            let (mut x, mut y) = (rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0));
            recorder.start(x, y, "ABBA", max_strokes);
            for _ in 0..rng.gen_range(1..40) {
                x += rng.gen_range(-60.0..60.0);
                y += rng.gen_range(-60.0..60.0);
                recorder.extend(x, y, &mut glyphs, max_chars);
                assert!(recorder.strokes().len() <= max_strokes);
                assert!(recorder.strokes().iter().all(|s| s.len() <= max_chars));
            }
            recorder.finish();
        }
    }

    #[test]
    fn test_enforce_capacity_after_lowering_limits() {
        let mut glyphs = ab_cache();
        let mut recorder = StrokeRecorder::new();
        for i in 0..5 {
            recorder.start(0.0, i as f32 * 50.0, "AB", 10);
            recorder.extend(400.0, i as f32 * 50.0, &mut glyphs, 100);
        }
        recorder.enforce_capacity(2, 3);
        assert_eq!(recorder.strokes().len(), 2);
        assert!(recorder.strokes().iter().all(|s| s.len() == 3));
        assert_eq!(recorder.strokes()[0].last_y, 150.0);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut recorder = StrokeRecorder::new();
        recorder.start(0.0, 0.0, "AB", 5);
        recorder.clear();
        assert!(recorder.strokes().is_empty());
        assert_eq!(recorder.particle_count(), 0);
    }
}
