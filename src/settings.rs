use serde::{Deserialize, Serialize};

/// Hard minimum advance, as a fraction of the font size
pub const MIN_ADVANCE_EM: f32 = 0.25;

/// Narrow glyphs ("I", "l", "1") are measured at least this wide, as a fraction of the font size
pub const MIN_THIN_EM: f32 = 0.35;

/// Spatial hash cell size as a fraction of the base font size
pub const HASH_CELL_EM: f32 = 0.8;

/// Most collision candidates examined per particle each frame
pub const MAX_COLLISION_CANDIDATES: usize = 12;

/// Fraction of the remaining angular gap closed per frame
pub const ANGLE_BLEND: f32 = 0.35;

/// Pointer moves at or below this distance (px) are ignored
pub const POINTER_NOISE_FLOOR: f32 = 0.5;

/// Placeholder used when the active text is empty
pub const DEFAULT_TEXT: &str = "TYPE";

/// Identifies one tunable parameter (sidebar focus, cursor bindings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    TextSize,
    CharSpacing,
    Gravity,
    Stiffness,
    Damping,
    MaxStrokes,
    MaxChars,
    AlignToMotion,
    Collisions,
    CollisionStrength,
    Bounce,
}

impl ParamId {
    /// Sidebar order
    pub const ALL: [ParamId; 11] = [
        ParamId::TextSize,
        ParamId::CharSpacing,
        ParamId::Gravity,
        ParamId::Stiffness,
        ParamId::Damping,
        ParamId::MaxStrokes,
        ParamId::MaxChars,
        ParamId::AlignToMotion,
        ParamId::Collisions,
        ParamId::CollisionStrength,
        ParamId::Bounce,
    ];

    pub fn name(&self) -> &str {
        match self {
            ParamId::TextSize => "Size",
            ParamId::CharSpacing => "Spacing",
            ParamId::Gravity => "Gravity",
            ParamId::Stiffness => "Stiffness",
            ParamId::Damping => "Damping",
            ParamId::MaxStrokes => "Strokes",
            ParamId::MaxChars => "Chars",
            ParamId::AlignToMotion => "Align",
            ParamId::Collisions => "Collide",
            ParamId::CollisionStrength => "Push",
            ParamId::Bounce => "Bounce",
        }
    }

    /// Position in `ALL`, also the sidebar line index
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|id| id == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// UI range for numeric parameters; `None` for toggles
    pub fn range(&self) -> Option<(f32, f32)> {
        match self {
            ParamId::TextSize => Some((0.5, 3.0)),
            ParamId::CharSpacing => Some((0.5, 2.5)),
            ParamId::Gravity => Some((-1.0, 2.0)),
            ParamId::Stiffness => Some((0.01, 1.0)),
            ParamId::Damping => Some((0.0, 0.5)),
            ParamId::MaxStrokes => Some((1.0, 100.0)),
            ParamId::MaxChars => Some((2.0, 500.0)),
            ParamId::CollisionStrength => Some((0.0, 1.0)),
            ParamId::Bounce => Some((0.0, 1.0)),
            ParamId::AlignToMotion | ParamId::Collisions => None,
        }
    }

    /// Increment applied by one Up/Down press
    pub fn step(&self) -> f32 {
        match self {
            ParamId::TextSize => 0.1,
            ParamId::CharSpacing => 0.05,
            ParamId::Gravity => 0.05,
            ParamId::Stiffness => 0.05,
            ParamId::Damping => 0.01,
            ParamId::MaxStrokes => 1.0,
            ParamId::MaxChars => 10.0,
            ParamId::CollisionStrength => 0.05,
            ParamId::Bounce => 0.05,
            ParamId::AlignToMotion | ParamId::Collisions => 1.0,
        }
    }

    pub fn is_toggle(&self) -> bool {
        self.range().is_none()
    }
}

/// All tunable simulation constants (the host's `getParams` snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Params {
    /// Glyph size as a multiple of the host font size
    pub text_size: f32,
    /// Multiplier on every glyph advance
    pub char_spacing: f32,
    /// Added to vy every frame (px/frame²)
    pub gravity: f32,
    /// Spring constant between neighbouring glyphs
    pub stiffness: f32,
    /// Fraction of velocity removed every frame
    pub damping: f32,
    pub max_strokes: usize,
    pub max_chars_per_stroke: usize,
    /// Rotate glyphs along the chain tangent and collide as circles
    pub align_to_motion: bool,
    pub collisions: bool,
    pub collision_strength: f32,
    /// Fraction of wall-normal speed kept after a wall hit
    pub bounce: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            text_size: 1.0,
            char_spacing: 1.0,
            gravity: 0.25,
            stiffness: 0.35,
            damping: 0.04,
            max_strokes: 24,
            max_chars_per_stroke: 160,
            align_to_motion: true,
            collisions: true,
            collision_strength: 0.9,
            bounce: 0.4,
        }
    }
}

/// Partial update for `Params` (the host's `setParams` argument)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParamsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_strokes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars_per_stroke: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_to_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collisions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collision_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce: Option<f32>,
}

impl ParamsPatch {
    /// Patch that sets a single parameter from a numeric value
    pub fn single(id: ParamId, value: f32) -> Self {
        let mut patch = Self::default();
        match id {
            ParamId::TextSize => patch.text_size = Some(value),
            ParamId::CharSpacing => patch.char_spacing = Some(value),
            ParamId::Gravity => patch.gravity = Some(value),
            ParamId::Stiffness => patch.stiffness = Some(value),
            ParamId::Damping => patch.damping = Some(value),
            ParamId::MaxStrokes => patch.max_strokes = Some(value.round().max(0.0) as usize),
            ParamId::MaxChars => patch.max_chars_per_stroke = Some(value.round().max(0.0) as usize),
            ParamId::AlignToMotion => patch.align_to_motion = Some(value >= 0.5),
            ParamId::Collisions => patch.collisions = Some(value >= 0.5),
            ParamId::CollisionStrength => patch.collision_strength = Some(value),
            ParamId::Bounce => patch.bounce = Some(value),
        }
        patch
    }
}

impl Params {
    /// Merge a partial update; fields absent from the patch keep their value
    pub fn merge(&mut self, patch: &ParamsPatch) {
        if let Some(v) = patch.text_size {
            self.text_size = v;
        }
        if let Some(v) = patch.char_spacing {
            self.char_spacing = v;
        }
        if let Some(v) = patch.gravity {
            self.gravity = v;
        }
        if let Some(v) = patch.stiffness {
            self.stiffness = v;
        }
        if let Some(v) = patch.damping {
            self.damping = v;
        }
        if let Some(v) = patch.max_strokes {
            self.max_strokes = v;
        }
        if let Some(v) = patch.max_chars_per_stroke {
            self.max_chars_per_stroke = v;
        }
        if let Some(v) = patch.align_to_motion {
            self.align_to_motion = v;
        }
        if let Some(v) = patch.collisions {
            self.collisions = v;
        }
        if let Some(v) = patch.collision_strength {
            self.collision_strength = v;
        }
        if let Some(v) = patch.bounce {
            self.bounce = v;
        }
    }

    /// Numeric view of a parameter (toggles read as 0/1)
    pub fn value(&self, id: ParamId) -> f32 {
        match id {
            ParamId::TextSize => self.text_size,
            ParamId::CharSpacing => self.char_spacing,
            ParamId::Gravity => self.gravity,
            ParamId::Stiffness => self.stiffness,
            ParamId::Damping => self.damping,
            ParamId::MaxStrokes => self.max_strokes as f32,
            ParamId::MaxChars => self.max_chars_per_stroke as f32,
            ParamId::AlignToMotion => f32::from(u8::from(self.align_to_motion)),
            ParamId::Collisions => f32::from(u8::from(self.collisions)),
            ParamId::CollisionStrength => self.collision_strength,
            ParamId::Bounce => self.bounce,
        }
    }

    /// Patch that moves a parameter by `steps` UI increments, clamped to its UI range.
    /// Toggles flip regardless of the step count.
    pub fn adjusted(&self, id: ParamId, steps: i32) -> ParamsPatch {
        match id.range() {
            Some((min, max)) => {
                let value = (self.value(id) + id.step() * steps as f32).clamp(min, max);
                ParamsPatch::single(id, value)
            }
            None => ParamsPatch::single(id, 1.0 - self.value(id)),
        }
    }

    /// Sidebar text for a parameter
    pub fn display(&self, id: ParamId) -> String {
        match id {
            ParamId::MaxStrokes => format!("{}", self.max_strokes),
            ParamId::MaxChars => format!("{}", self.max_chars_per_stroke),
            ParamId::AlignToMotion => on_off(self.align_to_motion).to_string(),
            ParamId::Collisions => on_off(self.collisions).to_string(),
            ParamId::Damping => format!("{:.3}", self.damping),
            _ => format!("{:.2}", self.value(id)),
        }
    }
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}
