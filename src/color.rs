use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// 8-bit RGB colour as handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward black by `amount` (0 = unchanged, 1 = black)
    pub fn dim(self, amount: f32) -> Self {
        let keep = (1.0 - amount).clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * keep) as u8,
            g: (self.g as f32 * keep) as u8,
            b: (self.b as f32 * keep) as u8,
        }
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Type colour palette
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TypeColor {
    #[default]
    Paper,
    Amber,
    Cyan,
    Magenta,
    Lime,
    Coral,
}

impl TypeColor {
    pub fn name(&self) -> &str {
        match self {
            TypeColor::Paper => "Paper",
            TypeColor::Amber => "Amber",
            TypeColor::Cyan => "Cyan",
            TypeColor::Magenta => "Magenta",
            TypeColor::Lime => "Lime",
            TypeColor::Coral => "Coral",
        }
    }

    pub fn rgb(&self) -> Rgb {
        match self {
            TypeColor::Paper => Rgb::new(238, 234, 222),
            TypeColor::Amber => Rgb::new(255, 191, 0),
            TypeColor::Cyan => Rgb::new(64, 224, 240),
            TypeColor::Magenta => Rgb::new(240, 80, 200),
            TypeColor::Lime => Rgb::new(170, 240, 60),
            TypeColor::Coral => Rgb::new(255, 120, 100),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TypeColor::Paper => TypeColor::Amber,
            TypeColor::Amber => TypeColor::Cyan,
            TypeColor::Cyan => TypeColor::Magenta,
            TypeColor::Magenta => TypeColor::Lime,
            TypeColor::Lime => TypeColor::Coral,
            TypeColor::Coral => TypeColor::Paper,
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "paper" | "white" => Some(TypeColor::Paper),
            "amber" | "yellow" => Some(TypeColor::Amber),
            "cyan" => Some(TypeColor::Cyan),
            "magenta" | "pink" => Some(TypeColor::Magenta),
            "lime" | "green" => Some(TypeColor::Lime),
            "coral" | "red" => Some(TypeColor::Coral),
            _ => None,
        }
    }
}
