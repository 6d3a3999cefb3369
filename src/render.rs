use crate::color::Rgb;
use crate::stroke::Stroke;

/// How a glyph hangs off its anchor point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Centred on the point and rotated by `angle`
    Center,
    /// Unrotated, horizontally centred, baseline on the point
    Baseline,
}

/// One character ready to be painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    /// Radians, clockwise on screen
    pub angle: f32,
    pub size: f32,
    pub anchor: Anchor,
    pub color: Rgb,
}

/// Host graphics the renderer paints into
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (f32, f32);

    /// Reset to an empty frame
    fn clear(&mut self);

    fn draw_glyph(&mut self, glyph: &PlacedGlyph);

    /// Straight segment between two points; surfaces without line support ignore it
    fn draw_line(&mut self, _x0: f32, _y0: f32, _x1: f32, _y1: f32, _color: Rgb) {}
}

/// Per-frame renderer inputs
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub color: Rgb,
    pub size: f32,
    pub aligned: bool,
    /// Also draw the spring between neighbouring glyphs
    pub links: bool,
}

pub fn draw<'a, I>(surface: &mut dyn Surface, strokes: I, style: &RenderStyle)
where
    I: IntoIterator<Item = &'a Stroke>,
{
    let anchor = if style.aligned {
        Anchor::Center
    } else {
        Anchor::Baseline
    };
    let link_color = style.color.dim(0.6);

    for stroke in strokes {
        if !stroke.is_finite() {
            continue;
        }
        if style.links {
            for pair in stroke.particles.windows(2) {
                surface.draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, link_color);
            }
        }
        for p in &stroke.particles {
            surface.draw_glyph(&PlacedGlyph {
                ch: p.ch,
                x: p.x,
                y: p.y,
                angle: if style.aligned { p.last_angle } else { 0.0 },
                size: style.size,
                anchor,
                color: style.color,
            });
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::stroke::Particle;

    /// Records every call for inspection
    #[derive(Default)]
    pub struct RecordingSurface {
        pub width: f32,
        pub height: f32,
        pub glyphs: Vec<PlacedGlyph>,
        pub lines: usize,
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (f32, f32) {
            (self.width, self.height)
        }

        fn clear(&mut self) {
            self.glyphs.clear();
            self.lines = 0;
        }

        fn draw_glyph(&mut self, glyph: &PlacedGlyph) {
            self.glyphs.push(*glyph);
        }

        fn draw_line(&mut self, _x0: f32, _y0: f32, _x1: f32, _y1: f32, _color: Rgb) {
            self.lines += 1;
        }
    }

    fn stroke() -> Stroke {
        let mut s = Stroke::new(0.0, 0.0, "HI");
        let mut a = Particle::new(10.0, 20.0, 'H', 0.0, 1.0);
        a.last_angle = 1.0;
        s.particles.push(a);
        s.particles.push(Particle::new(30.0, 20.0, 'I', 1.0, 0.0));
        s
    }

    #[test]
    fn test_aligned_glyphs_are_rotated() {
        let mut surface = RecordingSurface::default();
        let style = RenderStyle {
            color: Rgb::new(1, 2, 3),
            size: 20.0,
            aligned: true,
            links: false,
        };
        draw(&mut surface, [&stroke()], &style);

        assert_eq!(surface.glyphs.len(), 2);
        assert_eq!(surface.glyphs[0].ch, 'H');
        assert_eq!(surface.glyphs[0].angle, 1.0);
        assert_eq!(surface.glyphs[0].anchor, Anchor::Center);
        assert_eq!(surface.lines, 0);
    }

    #[test]
    fn test_baseline_glyphs_are_upright() {
        let mut surface = RecordingSurface::default();
        let style = RenderStyle {
            color: Rgb::new(1, 2, 3),
            size: 20.0,
            aligned: false,
            links: true,
        };
        draw(&mut surface, [&stroke()], &style);

        assert!(surface.glyphs.iter().all(|g| g.angle == 0.0));
        assert!(surface.glyphs.iter().all(|g| g.anchor == Anchor::Baseline));
        assert_eq!(surface.lines, 1);
    }

    #[test]
    fn test_single_glyph_stroke_is_drawn() {
        let mut s = Stroke::new(0.0, 0.0, "X");
        s.particles.push(Particle::new(5.0, 5.0, 'X', 1.0, 0.0));
        let mut surface = RecordingSurface::default();
        let style = RenderStyle {
            color: Rgb::new(0, 0, 0),
            size: 10.0,
            aligned: true,
            links: true,
        };
        draw(&mut surface, [&s], &style);
        assert_eq!(surface.glyphs.len(), 1);
        assert_eq!(surface.lines, 0);
    }
}
