use crate::boundary::{self, Bounds};
use crate::collide::SpatialHash;
use crate::error::ExperimentError;
use crate::experiment::{Axis, DrawContext, Experiment, ExperimentStats};
use crate::glyph::{FontSpec, GlyphCache, GlyphMetrics};
use crate::orient;
use crate::physics;
use crate::render::{self, RenderStyle, Surface};
use crate::settings::{ParamId, Params, ParamsPatch, HASH_CELL_EM};
use crate::stroke::StrokeRecorder;
use serde_json::Value;

/// Text-on-a-path physics: strokes of glyphs joined by springs, falling,
/// colliding and turning to follow their chain.
pub struct TextPhysics {
    params: Params,
    recorder: StrokeRecorder,
    glyphs: GlyphCache,
    collider: SpatialHash,
    frames: u64,
    /// Host clock at the last simulated frame
    seconds: f32,
}

impl TextPhysics {
    pub fn new(metrics: Box<dyn GlyphMetrics>) -> Self {
        let params = Params::default();
        Self {
            glyphs: GlyphCache::new(metrics, FontSpec::new(24.0, 400), params.char_spacing),
            params,
            recorder: StrokeRecorder::new(),
            collider: SpatialHash::new(),
            frames: 0,
            seconds: 0.0,
        }
    }

    /// Glyph font for this context
    fn font(&self, ctx: &DrawContext) -> FontSpec {
        FontSpec::new(ctx.font_size * self.params.text_size, ctx.font_weight)
    }

    /// Set pointer-bound parameters from the pointer position
    fn apply_bindings(&mut self, ctx: &DrawContext) {
        let Some((px, py)) = ctx.pointer else {
            return;
        };
        for id in ParamId::ALL {
            if !ctx.bindings.is_bound(id) {
                continue;
            }
            let Some((min, max)) = id.range() else {
                continue;
            };
            let mut t = match ctx.bindings.axis(id) {
                Axis::X => px / ctx.width.max(1.0),
                Axis::Y => py / ctx.height.max(1.0),
            }
            .clamp(0.0, 1.0);
            if ctx.bindings.invert(id) {
                t = 1.0 - t;
            }
            self.params.merge(&ParamsPatch::single(id, min + (max - min) * t));
        }
    }

    /// Bring the glyph cache and per-particle scratch in line with the current font
    fn refresh_glyphs(&mut self, ctx: &DrawContext) {
        let font = self.font(ctx);
        self.glyphs.sync(font, self.params.char_spacing);
        for stroke in self.recorder.strokes_mut().iter_mut() {
            for p in stroke.particles.iter_mut() {
                let info = self.glyphs.info(p.ch);
                p.w = info.advance;
                p.r = info.radius;
            }
        }
    }

    /// One simulation frame
    pub fn step(&mut self, ctx: &DrawContext) {
        self.apply_bindings(ctx);
        self.recorder
            .enforce_capacity(self.params.max_strokes, self.params.max_chars_per_stroke);
        self.refresh_glyphs(ctx);

        let strokes = self.recorder.strokes_mut();
        physics::integrate(strokes.iter_mut(), &self.params);

        if self.params.collisions {
            let cell = HASH_CELL_EM * self.glyphs.font().size;
            self.collider
                .resolve(strokes.iter_mut(), cell, self.params.collision_strength);
        }

        let bounds = Bounds::new(
            ctx.width,
            ctx.height,
            self.glyphs.ascent(),
            self.glyphs.descent(),
        )
        .inset(ctx.padding);
        boundary::clamp(
            strokes.iter_mut(),
            &bounds,
            self.params.align_to_motion,
            self.params.bounce,
        );

        for stroke in strokes.iter_mut() {
            orient::smooth(stroke);
        }
        self.frames += 1;
        self.seconds = ctx.time_seconds;
    }

    /// Paint the current state
    pub fn render(&self, surface: &mut dyn Surface, ctx: &DrawContext) {
        let style = RenderStyle {
            color: ctx.type_color,
            size: self.glyphs.font().size,
            aligned: self.params.align_to_motion,
            links: ctx.links,
        };
        surface.clear();
        render::draw(surface, self.recorder.strokes().iter(), &style);
    }
}

impl Experiment for TextPhysics {
    fn name(&self) -> &str {
        "text-physics"
    }

    fn init(&mut self, ctx: &DrawContext) {
        self.refresh_glyphs(ctx);
    }

    fn draw(&mut self, surface: &mut dyn Surface, ctx: &DrawContext) {
        self.step(ctx);
        self.render(surface, ctx);
    }

    fn redraw(&mut self, surface: &mut dyn Surface, ctx: &DrawContext) {
        self.render(surface, ctx);
    }

    fn mouse_pressed(&mut self, _surface: &mut dyn Surface, ctx: &DrawContext) {
        if let Some((x, y)) = ctx.pointer {
            self.recorder.start(x, y, ctx.text, self.params.max_strokes);
        }
    }

    fn mouse_dragged(&mut self, _surface: &mut dyn Surface, ctx: &DrawContext) {
        if let Some((x, y)) = ctx.pointer {
            let font = self.font(ctx);
            self.glyphs.sync(font, self.params.char_spacing);
            self.recorder
                .extend(x, y, &mut self.glyphs, self.params.max_chars_per_stroke);
        }
    }

    fn mouse_released(&mut self, _surface: &mut dyn Surface, _ctx: &DrawContext) {
        self.recorder.finish();
    }

    fn clear(&mut self) {
        tracing::info!(
            strokes = self.recorder.strokes().len(),
            particles = self.recorder.particle_count(),
            "cleared"
        );
        self.recorder.clear();
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.params).unwrap_or(Value::Null)
    }

    fn set_params(&mut self, patch: Value) -> Result<(), ExperimentError> {
        let patch: ParamsPatch = serde_json::from_value(patch)?;
        self.params.merge(&patch);
        Ok(())
    }

    fn stats(&self) -> ExperimentStats {
        ExperimentStats {
            strokes: self.recorder.strokes().len(),
            particles: self.recorder.particle_count(),
            drawing: self.recorder.is_drawing(),
            frames: self.frames,
            seconds: self.seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::experiment::{CursorBindings, NoBindings};
    use crate::glyph::TableMetrics;
    use crate::render::tests::RecordingSurface;
    use crate::stroke::Particle;
    use serde_json::json;

    fn ctx<'a>(pointer: Option<(f32, f32)>, bindings: &'a dyn CursorBindings) -> DrawContext<'a> {
        DrawContext {
            text: "AB",
            font_size: 40.0,
            font_weight: 400,
            padding: [0.0; 4],
            type_color: Rgb::new(255, 255, 255),
            width: 800.0,
            height: 600.0,
            time_seconds: 0.0,
            pointer,
            bindings,
            links: false,
        }
    }

    impl TextPhysics {
        fn params(&self) -> &Params {
            &self.params
        }

        fn set_params(&mut self, patch: &ParamsPatch) {
            self.params.merge(patch);
        }

        fn recorder(&self) -> &StrokeRecorder {
            &self.recorder
        }
    }

    fn ab_physics() -> TextPhysics {
        let metrics = TableMetrics::new(40.0)
            .with_width('A', 30.0)
            .with_width('B', 26.0)
            .with_fallback(20.0)
            .with_vertical(8.0, 2.0);
        TextPhysics::new(Box::new(metrics))
    }

    fn drag(sim: &mut TextPhysics, from: (f32, f32), to: (f32, f32)) {
        let mut surface = RecordingSurface::default();
        let none = NoBindings;
        sim.mouse_pressed(&mut surface, &ctx(Some(from), &none));
        sim.mouse_dragged(&mut surface, &ctx(Some(to), &none));
        sim.mouse_released(&mut surface, &ctx(Some(to), &none));
    }

    #[test]
    fn test_param_roundtrip_through_json() {
        let mut sim = ab_physics();
        let before: Params = serde_json::from_value(Experiment::params(&sim)).unwrap();

        Experiment::set_params(&mut sim, json!({"gravity": 1.2})).unwrap();
        let after: Params = serde_json::from_value(Experiment::params(&sim)).unwrap();

        assert_eq!(after.gravity, 1.2);
        assert_eq!(
            Params {
                gravity: before.gravity,
                ..after
            },
            before
        );
    }

    #[test]
    fn test_set_params_rejects_wrong_types() {
        let mut sim = ab_physics();
        assert!(Experiment::set_params(&mut sim, json!({"gravity": "heavy"})).is_err());
        assert_eq!(sim.params().gravity, Params::default().gravity);
    }

    #[test]
    fn test_pointer_events_seed_stroke() {
        let mut sim = ab_physics();
        drag(&mut sim, (0.0, 100.0), (140.0, 100.0));

        let stats = sim.stats();
        assert_eq!(stats.strokes, 1);
        assert_eq!(stats.particles, 4);
        assert!(!stats.drawing);
        assert!((sim.recorder().strokes()[0].carry - 28.0).abs() < 1e-4);
    }

    #[test]
    fn test_fifo_eviction_through_pointer() {
        let mut sim = ab_physics();
        sim.set_params(&ParamsPatch {
            max_strokes: Some(3),
            ..Default::default()
        });
        for i in 0..4 {
            let y = 50.0 + i as f32 * 100.0;
            drag(&mut sim, (0.0, y), (200.0, y));
        }
        let strokes = sim.recorder().strokes();
        assert_eq!(strokes.len(), 3);
        assert_eq!(strokes[0].particles[0].y, 150.0);
    }

    #[test]
    fn test_lowered_capacity_applies_next_frame() {
        let mut sim = ab_physics();
        for i in 0..5 {
            let y = 50.0 + i as f32 * 100.0;
            drag(&mut sim, (0.0, y), (400.0, y));
        }
        sim.set_params(&ParamsPatch {
            max_strokes: Some(2),
            max_chars_per_stroke: Some(3),
            ..Default::default()
        });
        let none = NoBindings;
        sim.step(&ctx(None, &none));
        assert_eq!(sim.recorder().strokes().len(), 2);
        assert!(sim.recorder().strokes().iter().all(|s| s.len() <= 3));
    }

    #[test]
    fn test_particles_stay_inside_canvas() {
        let mut sim = ab_physics();
        sim.set_params(&ParamsPatch {
            gravity: Some(2.0),
            ..Default::default()
        });
        drag(&mut sim, (10.0, 10.0), (790.0, 590.0));
        drag(&mut sim, (790.0, 10.0), (10.0, 590.0));

        let none = NoBindings;
        let context = ctx(None, &none);
        for aligned in [true, false] {
            sim.set_params(&ParamsPatch {
                align_to_motion: Some(aligned),
                ..Default::default()
            });
            for _ in 0..120 {
                sim.step(&context);
                for p in sim.recorder().strokes().iter().flat_map(|s| s.particles.iter()) {
                    assert!((0.0..=800.0).contains(&p.x), "x out of range: {}", p.x);
                    assert!((0.0..=600.0).contains(&p.y), "y out of range: {}", p.y);
                }
            }
        }
    }

    #[test]
    fn test_resting_chain_settles_near_rest_length() {
        let mut sim = ab_physics();
        sim.set_params(&ParamsPatch {
            gravity: Some(0.2),
            stiffness: Some(0.8),
            damping: Some(0.1),
            bounce: Some(0.2),
            ..Default::default()
        });
        // Five glyphs at the fallback width, seeded at rest spacing
        let mut surface = RecordingSurface::default();
        let none = NoBindings;
        let context = DrawContext {
            text: "ZZZZZ",
            ..ctx(Some((100.0, 300.0)), &none)
        };
        sim.mouse_pressed(&mut surface, &context);
        sim.mouse_dragged(
            &mut surface,
            &DrawContext {
                pointer: Some((200.0, 300.0)),
                ..context
            },
        );
        sim.mouse_released(&mut surface, &ctx(None, &none));
        assert_eq!(sim.stats().particles, 5);

        let context = ctx(None, &none);
        for _ in 0..600 {
            sim.step(&context);
        }
        let particles = &sim.recorder().strokes()[0].particles;
        for pair in particles.windows(2) {
            let d = ((pair[1].x - pair[0].x).powi(2) + (pair[1].y - pair[0].y).powi(2)).sqrt();
            assert!((d - 20.0).abs() < 0.5, "spacing {d} far from rest length 20");
        }
        // Resting on the floor
        assert!(particles.iter().all(|p| p.y > 550.0));
    }

    #[test]
    fn test_draw_renders_every_particle() {
        let mut sim = ab_physics();
        drag(&mut sim, (0.0, 100.0), (140.0, 100.0));
        let mut surface = RecordingSurface::default();
        let none = NoBindings;
        sim.draw(&mut surface, &ctx(None, &none));
        assert_eq!(surface.glyphs.len(), 4);
        assert_eq!(sim.stats().frames, 1);

        sim.redraw(&mut surface, &ctx(None, &none));
        assert_eq!(surface.glyphs.len(), 4);
        assert_eq!(surface.lines, 0);
        assert_eq!(sim.stats().frames, 1);

        let with_links = DrawContext {
            links: true,
            ..ctx(None, &none)
        };
        sim.redraw(&mut surface, &with_links);
        assert_eq!(surface.lines, 3);
    }

    #[test]
    fn test_padding_keeps_glyphs_off_the_edges() {
        let mut sim = ab_physics();
        sim.set_params(&ParamsPatch {
            gravity: Some(2.0),
            ..Default::default()
        });
        drag(&mut sim, (10.0, 10.0), (790.0, 590.0));

        let none = NoBindings;
        let padded = DrawContext {
            padding: [40.0, 50.0, 60.0, 70.0],
            time_seconds: 2.5,
            ..ctx(None, &none)
        };
        for _ in 0..120 {
            sim.step(&padded);
        }
        for p in sim.recorder().strokes().iter().flat_map(|s| s.particles.iter()) {
            assert!((70.0..=750.0).contains(&p.x), "x outside padding: {}", p.x);
            assert!((40.0..=540.0).contains(&p.y), "y outside padding: {}", p.y);
        }
        let stats = sim.stats();
        assert_eq!(stats.frames, 120);
        assert_eq!(stats.seconds, 2.5);
    }

    #[test]
    fn test_clear_removes_all_strokes() {
        let mut sim = ab_physics();
        drag(&mut sim, (0.0, 100.0), (140.0, 100.0));
        Experiment::clear(&mut sim);
        assert_eq!(sim.stats(), ExperimentStats::default());
    }

    struct GravityOnY;

    impl CursorBindings for GravityOnY {
        fn is_bound(&self, id: ParamId) -> bool {
            id == ParamId::Gravity
        }

        fn axis(&self, _id: ParamId) -> Axis {
            Axis::Y
        }

        fn invert(&self, _id: ParamId) -> bool {
            true
        }
    }

    #[test]
    fn test_bound_parameter_follows_pointer() {
        let mut sim = ab_physics();
        let bindings = GravityOnY;
        let (min, max) = ParamId::Gravity.range().unwrap();

        sim.step(&ctx(Some((0.0, 600.0)), &bindings));
        assert!((sim.params().gravity - min).abs() < 1e-5);

        sim.step(&ctx(Some((0.0, 0.0)), &bindings));
        assert!((sim.params().gravity - max).abs() < 1e-5);
        assert_eq!(sim.params().stiffness, Params::default().stiffness);
    }

    #[test]
    fn test_malformed_stroke_does_not_stop_frame() {
        let mut sim = ab_physics();
        drag(&mut sim, (0.0, 100.0), (140.0, 100.0));
        drag(&mut sim, (0.0, 300.0), (140.0, 300.0));
        sim.recorder.strokes_mut()[0].particles[1] =
            Particle::new(f32::NAN, 0.0, 'A', 1.0, 0.0);

        let none = NoBindings;
        sim.step(&ctx(None, &none));
        let healthy = &sim.recorder().strokes()[1];
        assert!(healthy.is_finite());
        assert!(healthy.particles[0].y > 300.0);
    }
}
