//! The interface a host drives every visual experiment through.

use crate::color::Rgb;
use crate::error::ExperimentError;
use crate::glyph::GlyphMetrics;
use crate::render::Surface;
use crate::settings::ParamId;
use crate::simulation::TextPhysics;
use serde_json::Value;

/// Pointer axis a parameter can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Host-side cursor-to-parameter bindings
pub trait CursorBindings {
    /// Whether `id` currently follows the pointer
    fn is_bound(&self, _id: ParamId) -> bool {
        false
    }

    fn axis(&self, _id: ParamId) -> Axis {
        Axis::X
    }

    fn invert(&self, _id: ParamId) -> bool {
        false
    }
}

/// No parameter follows the pointer
pub struct NoBindings;

impl CursorBindings for NoBindings {}

/// Everything the host hands an experiment for one call
pub struct DrawContext<'a> {
    pub text: &'a str,
    pub font_size: f32,
    pub font_weight: u16,
    /// Inset of the usable area from each canvas edge: top, right, bottom, left
    pub padding: [f32; 4],
    pub type_color: Rgb,
    pub width: f32,
    pub height: f32,
    /// Seconds since the host started
    pub time_seconds: f32,
    /// Pointer position in canvas pixels, when known
    pub pointer: Option<(f32, f32)>,
    pub bindings: &'a dyn CursorBindings,
    /// Host overlay: draw links between neighbouring glyphs
    pub links: bool,
}

/// Counters for the host status display
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExperimentStats {
    pub strokes: usize,
    pub particles: usize,
    pub drawing: bool,
    /// Frames simulated so far
    pub frames: u64,
    /// Host clock at the last simulated frame
    pub seconds: f32,
}

/// A visual experiment. Every capability defaults to doing nothing, so an
/// experiment only implements what it supports.
pub trait Experiment {
    fn name(&self) -> &str;

    /// Called once before the first frame
    fn init(&mut self, _ctx: &DrawContext) {}

    /// Advance one frame and paint it
    fn draw(&mut self, _surface: &mut dyn Surface, _ctx: &DrawContext) {}

    /// Paint the current state without advancing it
    fn redraw(&mut self, _surface: &mut dyn Surface, _ctx: &DrawContext) {}

    fn mouse_pressed(&mut self, _surface: &mut dyn Surface, _ctx: &DrawContext) {}

    fn mouse_dragged(&mut self, _surface: &mut dyn Surface, _ctx: &DrawContext) {}

    fn mouse_released(&mut self, _surface: &mut dyn Surface, _ctx: &DrawContext) {}

    fn clear(&mut self) {}

    /// Snapshot of all tunables as a JSON object
    fn params(&self) -> Value {
        Value::Null
    }

    /// Merge a partial JSON object into the live tunables
    fn set_params(&mut self, _patch: Value) -> Result<(), ExperimentError> {
        Ok(())
    }

    fn stats(&self) -> ExperimentStats {
        ExperimentStats::default()
    }
}

/// Experiments this build knows how to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExperimentKind {
    #[default]
    TextPhysics,
}

impl ExperimentKind {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text-physics" | "physics" | "rope" => Some(ExperimentKind::TextPhysics),
            _ => None,
        }
    }

    pub fn create(&self, metrics: Box<dyn GlyphMetrics>) -> Box<dyn Experiment> {
        match self {
            ExperimentKind::TextPhysics => Box::new(TextPhysics::new(metrics)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::ProportionalMetrics;

    struct Inert;

    impl Experiment for Inert {
        fn name(&self) -> &str {
            "inert"
        }
    }

    #[test]
    fn test_defaults_are_no_ops() {
        let mut exp = Inert;
        assert_eq!(exp.params(), Value::Null);
        assert!(exp.set_params(serde_json::json!({"gravity": 3.0})).is_ok());
        assert_eq!(exp.stats(), ExperimentStats::default());
        exp.clear();
    }

    #[test]
    fn test_default_bindings_are_unbound() {
        let bindings = NoBindings;
        assert!(!bindings.is_bound(ParamId::Gravity));
        assert!(!bindings.invert(ParamId::Gravity));
        assert_eq!(bindings.axis(ParamId::Gravity), Axis::X);
    }

    #[test]
    fn test_factory() {
        assert_eq!(
            ExperimentKind::from_name("Text-Physics"),
            Some(ExperimentKind::TextPhysics)
        );
        assert_eq!(ExperimentKind::from_name("moire"), None);
        let exp = ExperimentKind::TextPhysics.create(Box::new(ProportionalMetrics));
        assert_eq!(exp.name(), "text-physics");
        assert!(exp.params().get("gravity").is_some());
    }
}
