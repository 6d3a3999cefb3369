use crate::canvas::{self, CellCanvas};
use crate::color::TypeColor;
use crate::config::AppConfig;
use crate::experiment::{
    Axis, CursorBindings, DrawContext, Experiment, ExperimentStats,
};
use crate::presets::{Preset, PresetManager};
use crate::render::Surface;
use crate::settings::{ParamId, Params, ParamsPatch, DEFAULT_TEXT};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long a notification stays on screen
const TOAST_DURATION: Duration = Duration::from_millis(1800);

/// Longest text accepted from the text entry prompt
const MAX_TEXT_LEN: usize = 64;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Param(ParamId),
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in sidebar order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Param(ParamId::ALL[0]),
            Focus::Param(id) => Focus::Param(id.next()),
        }
    }

    /// Shift+Tab cycles backwards
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Param(ParamId::ALL[ParamId::ALL.len() - 1]),
            Focus::Param(id) => Focus::Param(id.prev()),
        }
    }

    /// Get the line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::Param(id) => id.index() as u16,
            Focus::None | Focus::Controls => 0,
        }
    }

    pub fn param(&self) -> Option<ParamId> {
        match self {
            Focus::Param(id) => Some(*id),
            Focus::None | Focus::Controls => None,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        self.param().is_some()
    }
}

/// Pointer axis and direction a parameter follows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub axis: Axis,
    pub invert: bool,
}

impl Binding {
    pub fn label(&self) -> &'static str {
        match (self.axis, self.invert) {
            (Axis::X, false) => "x",
            (Axis::X, true) => "-x",
            (Axis::Y, false) => "y",
            (Axis::Y, true) => "-y",
        }
    }
}

/// Parameters currently driven by the pointer
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: HashMap<ParamId, Binding>,
}

impl BindingTable {
    pub fn get(&self, id: ParamId) -> Option<Binding> {
        self.bindings.get(&id).copied()
    }

    /// Step a parameter through unbound, y, -y, x, -x. Toggles cannot be bound.
    pub fn cycle(&mut self, id: ParamId) -> Option<Binding> {
        if id.is_toggle() {
            return None;
        }
        let next = match self.get(id) {
            None => Some(Binding {
                axis: Axis::Y,
                invert: false,
            }),
            Some(Binding {
                axis: Axis::Y,
                invert: false,
            }) => Some(Binding {
                axis: Axis::Y,
                invert: true,
            }),
            Some(Binding {
                axis: Axis::Y,
                invert: true,
            }) => Some(Binding {
                axis: Axis::X,
                invert: false,
            }),
            Some(Binding {
                axis: Axis::X,
                invert: false,
            }) => Some(Binding {
                axis: Axis::X,
                invert: true,
            }),
            Some(Binding {
                axis: Axis::X,
                invert: true,
            }) => None,
        };
        match next {
            Some(binding) => self.bindings.insert(id, binding),
            None => self.bindings.remove(&id),
        };
        next
    }
}

impl CursorBindings for BindingTable {
    fn is_bound(&self, id: ParamId) -> bool {
        self.bindings.contains_key(&id)
    }

    fn axis(&self, id: ParamId) -> Axis {
        self.get(id).map_or(Axis::X, |b| b.axis)
    }

    fn invert(&self, id: ParamId) -> bool {
        self.get(id).is_some_and(|b| b.invert)
    }
}

/// A transient message shown over the canvas
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub expires: Instant,
}

/// Host-side state that is handed to the experiment every call
pub struct Scene {
    pub text: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub type_color: TypeColor,
    pub show_links: bool,
    pub pointer: Option<(f32, f32)>,
    pub bindings: BindingTable,
    started: Instant,
}

impl Scene {
    fn context(&self, (width, height): (f32, f32)) -> DrawContext<'_> {
        DrawContext {
            text: &self.text,
            font_size: self.font_size,
            font_weight: self.font_weight,
            padding: [0.0; 4],
            type_color: self.type_color.rgb(),
            width,
            height,
            time_seconds: self.started.elapsed().as_secs_f32(),
            pointer: self.pointer,
            bindings: &self.bindings,
            links: self.show_links,
        }
    }
}

/// Main application state
pub struct App {
    pub experiment: Box<dyn Experiment>,
    pub canvas: CellCanvas,
    pub scene: Scene,
    pub presets: PresetManager,
    /// Position of the last applied preset in `presets.all_presets()`
    pub preset_index: Option<usize>,
    /// Where `S` writes the config; the default config path when unset
    pub config_path: Option<PathBuf>,
    pub focus: Focus,
    pub paused: bool,
    pub fullscreen_mode: bool,
    pub steps_per_frame: usize,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Text being typed while the text prompt is open
    pub text_input: Option<String>,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(
        canvas_width: u16,
        canvas_height: u16,
        experiment: Box<dyn Experiment>,
        presets: PresetManager,
    ) -> Self {
        let mut app = Self {
            experiment,
            canvas: CellCanvas::new(canvas_width, canvas_height),
            scene: Scene {
                text: DEFAULT_TEXT.to_string(),
                font_size: 24.0,
                font_weight: 400,
                type_color: TypeColor::default(),
                show_links: false,
                pointer: None,
                bindings: BindingTable::default(),
                started: Instant::now(),
            },
            presets,
            preset_index: None,
            config_path: None,
            focus: Focus::Controls,
            paused: false,
            fullscreen_mode: false,
            steps_per_frame: 1,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            text_input: None,
            toast: None,
        };
        let ctx = app.scene.context(app.canvas.size());
        app.experiment.init(&ctx);
        app
    }

    /// Run simulation steps for current frame
    pub fn tick(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| Instant::now() >= t.expires)
        {
            self.toast = None;
        }

        let ctx = self.scene.context(self.canvas.size());
        if self.paused {
            self.experiment.redraw(&mut self.canvas, &ctx);
            return;
        }
        for _ in 0..self.steps_per_frame {
            self.experiment.draw(&mut self.canvas, &ctx);
        }
    }

    pub fn stats(&self) -> ExperimentStats {
        self.experiment.stats()
    }

    /// Show a message over the canvas for a short while
    pub fn notify(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires: Instant::now() + TOAST_DURATION,
        });
    }

    pub fn toast_message(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.message.as_str())
    }

    // === Parameters ===

    /// Current tunables, read back through the experiment interface
    pub fn params(&self) -> Params {
        serde_json::from_value(self.experiment.params()).unwrap_or_default()
    }

    pub fn apply_patch(&mut self, patch: &ParamsPatch) {
        let result = serde_json::to_value(patch)
            .map_err(crate::error::ExperimentError::from)
            .and_then(|value| self.experiment.set_params(value));
        if let Err(err) = result {
            tracing::warn!(%err, "parameter update rejected");
            self.notify(format!("Rejected: {}", err));
        }
    }

    /// Replace every tunable at once
    pub fn apply_params(&mut self, params: &Params) {
        match serde_json::to_value(params) {
            Ok(value) => {
                if let Err(err) = self.experiment.set_params(value) {
                    tracing::warn!(%err, "parameter update rejected");
                }
            }
            Err(err) => tracing::warn!(%err, "could not encode parameters"),
        }
    }

    /// Move a parameter by UI steps (toggles flip)
    pub fn adjust_param(&mut self, id: ParamId, steps: i32) {
        let patch = self.params().adjusted(id, steps);
        self.apply_patch(&patch);
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        if let Some(id) = self.focus.param() {
            self.adjust_param(id, 1);
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        if let Some(id) = self.focus.param() {
            self.adjust_param(id, -1);
        }
    }

    pub fn toggle_param(&mut self, id: ParamId) {
        self.adjust_param(id, 1);
        self.focus = Focus::Param(id);
        let state = self.params().display(id);
        self.notify(format!("{}: {}", id.name(), state));
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Bind the focused parameter to the pointer, or step its binding
    pub fn cycle_binding(&mut self) {
        let Some(id) = self.focus.param() else {
            self.notify("Focus a parameter to bind it");
            return;
        };
        let message = match self.scene.bindings.cycle(id) {
            Some(binding) => format!("{} follows pointer {}", id.name(), binding.label()),
            None if id.is_toggle() => format!("{} cannot follow the pointer", id.name()),
            None => format!("{} unbound", id.name()),
        };
        self.notify(message);
    }

    // === Presets and config ===

    pub fn apply_preset(&mut self, index: usize) {
        let Some(preset) = self.presets.get(index).cloned() else {
            return;
        };
        self.apply_params(&preset.params);
        self.preset_index = Some(index);
        tracing::info!(name = %preset.name, "preset applied");
        self.notify(format!("Preset: {}", preset.name));
    }

    /// Apply a preset by name; unknown names only raise a notification
    pub fn apply_preset_named(&mut self, name: &str) -> bool {
        match self.presets.position(name) {
            Some(index) => {
                self.apply_preset(index);
                true
            }
            None => {
                let known = self.presets.preset_names().join(", ");
                self.notify(format!("Unknown preset: {} ({})", name, known));
                false
            }
        }
    }

    pub fn cycle_preset(&mut self) {
        if self.presets.is_empty() {
            return;
        }
        let len = self.presets.len();
        let next = self.preset_index.map_or(0, |i| (i + 1) % len);
        self.apply_preset(next);
    }

    pub fn preset_name(&self) -> &str {
        self.preset_index
            .and_then(|i| self.presets.get(i))
            .map_or("Custom", |p| p.name.as_str())
    }

    pub fn save_user_preset(&mut self) {
        let name = format!("User {}", self.presets.user.len() + 1);
        let preset = Preset::new(name.clone(), "Saved from the app", self.params());
        match self.presets.save_preset(preset) {
            Ok(_) => {
                self.preset_index = self.presets.all_presets().position(|p| p.name == name);
                self.notify(format!("Saved preset {}", name));
            }
            Err(err) => {
                tracing::warn!(%err, "preset save failed");
                self.notify(format!("Preset not saved: {}", err));
            }
        }
    }

    /// Snapshot of everything `S` exports
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            version: 1,
            params: self.params(),
            text: self.scene.text.clone(),
            font_size: self.scene.font_size,
            font_weight: self.scene.font_weight,
            type_color: self.scene.type_color,
            show_links: self.scene.show_links,
            steps_per_frame: self.steps_per_frame,
        }
    }

    pub fn apply_config(&mut self, config: &AppConfig) {
        self.apply_params(&config.params);
        self.scene.text = config.text.clone();
        self.scene.font_size = config.font_size.clamp(8.0, 96.0);
        self.scene.font_weight = config.font_weight.clamp(100, 900);
        self.scene.type_color = config.type_color;
        self.scene.show_links = config.show_links;
        self.steps_per_frame = config.steps_per_frame.clamp(1, 8);
    }

    pub fn save_config(&mut self) {
        let path = match self.config_path.clone() {
            Some(path) => Ok(path),
            None => AppConfig::default_path(),
        };
        let result = path.and_then(|path| self.to_config().save_to_file(&path).map(|_| path));
        match result {
            Ok(path) => self.notify(format!("Config saved to {}", path.display())),
            Err(err) => {
                tracing::warn!(%err, "config save failed");
                self.notify(format!("Config not saved: {}", err));
            }
        }
    }

    // === Pointer ===

    /// Pointer position in canvas pixels for a canvas-relative cell
    fn pointer_at(col: i32, row: i32) -> (f32, f32) {
        canvas::cell_center(col, row)
    }

    pub fn mouse_down(&mut self, col: i32, row: i32) {
        if col < 0 || row < 0 || col >= self.canvas.cols() as i32 || row >= self.canvas.rows() as i32 {
            return;
        }
        self.scene.pointer = Some(Self::pointer_at(col, row));
        let ctx = self.scene.context(self.canvas.size());
        self.experiment.mouse_pressed(&mut self.canvas, &ctx);
    }

    pub fn mouse_drag(&mut self, col: i32, row: i32) {
        self.scene.pointer = Some(Self::pointer_at(col, row));
        let ctx = self.scene.context(self.canvas.size());
        self.experiment.mouse_dragged(&mut self.canvas, &ctx);
    }

    pub fn mouse_up(&mut self, col: i32, row: i32) {
        self.scene.pointer = Some(Self::pointer_at(col, row));
        let ctx = self.scene.context(self.canvas.size());
        self.experiment.mouse_released(&mut self.canvas, &ctx);
    }

    /// Plain motion only moves the pointer used by bindings
    pub fn mouse_move(&mut self, col: i32, row: i32) {
        self.scene.pointer = Some(Self::pointer_at(col, row));
    }

    // === Text entry ===

    pub fn begin_text_edit(&mut self) {
        self.text_input = Some(self.scene.text.clone());
    }

    pub fn text_edit_push(&mut self, c: char) {
        if let Some(input) = &mut self.text_input {
            if input.chars().count() < MAX_TEXT_LEN && !c.is_control() {
                input.push(c);
            }
        }
    }

    pub fn text_edit_pop(&mut self) {
        if let Some(input) = &mut self.text_input {
            input.pop();
        }
    }

    /// New strokes use the edited text; existing strokes keep theirs
    pub fn commit_text_edit(&mut self) {
        if let Some(input) = self.text_input.take() {
            self.scene.text = input;
            let shown = if self.scene.text.is_empty() {
                DEFAULT_TEXT
            } else {
                &self.scene.text
            };
            let message = format!("Text: {}", shown);
            self.notify(message);
        }
    }

    pub fn cancel_text_edit(&mut self) {
        self.text_input = None;
    }

    // === Misc controls ===

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Remove every stroke
    pub fn clear(&mut self) {
        self.experiment.clear();
        self.canvas.clear();
        self.notify("Cleared");
    }

    pub fn cycle_type_color(&mut self) {
        self.scene.type_color = self.scene.type_color.next();
        let message = format!("Color: {}", self.scene.type_color.name());
        self.notify(message);
    }

    pub fn toggle_links(&mut self) {
        self.scene.show_links = !self.scene.show_links;
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Resize the canvas; strokes are kept
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.canvas.resize(canvas_width, canvas_height);
        let ctx = self.scene.context(self.canvas.size());
        self.experiment.redraw(&mut self.canvas, &ctx);
    }

    /// Increase simulation speed
    pub fn increase_speed(&mut self) {
        self.steps_per_frame = (self.steps_per_frame + 1).min(8);
    }

    /// Decrease simulation speed
    pub fn decrease_speed(&mut self) {
        self.steps_per_frame = self.steps_per_frame.saturating_sub(1).max(1);
    }
}
