mod app;
mod boundary;
mod braille;
mod canvas;
mod collide;
mod color;
mod config;
mod error;
mod experiment;
mod glyph;
mod orient;
mod physics;
mod presets;
mod render;
mod settings;
mod simulation;
mod stroke;
mod ui;

use app::{App, Focus};
use clap::Parser;
use color::TypeColor;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use experiment::{Experiment, ExperimentKind};
use glyph::{GlyphMetrics, ProportionalMetrics, TableMetrics};
use presets::PresetManager;
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::{ParamId, ParamsPatch};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "text-rope")]
#[command(about = "Draw text along a path and watch it fall as a chain of springs")]
struct Args {
    // === Text ===
    /// Text laid along each new stroke
    #[arg(short = 't', long)]
    text: Option<String>,

    /// Base font size in canvas pixels (8-96)
    #[arg(long = "font-size")]
    font_size: Option<f32>,

    /// Font weight (100-900)
    #[arg(long = "font-weight")]
    font_weight: Option<u16>,

    /// Glyph size as a multiple of the font size (0.5-3.0)
    #[arg(long = "text-size")]
    text_size: Option<f32>,

    /// Multiplier on every glyph advance (0.5-2.5)
    #[arg(long)]
    spacing: Option<f32>,

    /// Treat every glyph as the same width
    #[arg(long)]
    monospace: bool,

    // === Physics ===
    /// Downward pull per frame (-1.0 to 2.0)
    #[arg(short = 'g', long)]
    gravity: Option<f32>,

    /// Spring constant between neighbouring glyphs (0.01-1.0)
    #[arg(long)]
    stiffness: Option<f32>,

    /// Fraction of velocity removed per frame (0.0-0.5)
    #[arg(long)]
    damping: Option<f32>,

    /// Fraction of wall-normal speed kept on contact (0.0-1.0)
    #[arg(long)]
    bounce: Option<f32>,

    /// Overlap correction strength (0.0-1.0)
    #[arg(long = "collision-strength")]
    collision_strength: Option<f32>,

    /// Keep glyphs upright on their baseline
    #[arg(long = "no-align")]
    no_align: bool,

    /// Let glyphs pass through each other
    #[arg(long = "no-collisions")]
    no_collisions: bool,

    // === Capacity ===
    /// Strokes kept before the oldest is dropped (1-100)
    #[arg(long = "max-strokes")]
    max_strokes: Option<usize>,

    /// Glyphs per stroke (2-500)
    #[arg(long = "max-chars")]
    max_chars: Option<usize>,

    // === App ===
    /// Type color (paper, amber, cyan, magenta, lime, coral)
    #[arg(long)]
    color: Option<String>,

    /// Start from a named preset
    #[arg(short = 'p', long)]
    preset: Option<String>,

    /// Experiment to run
    #[arg(short = 'e', long, default_value = "text-physics")]
    experiment: String,

    /// Config file to load at start-up and write with S
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Simulation steps per frame (1-8)
    #[arg(long)]
    speed: Option<usize>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Parameter overrides given on the command line, clamped to UI ranges
    fn params_patch(&self) -> ParamsPatch {
        let clamp = |id: ParamId, v: Option<f32>| {
            v.map(|v| match id.range() {
                Some((min, max)) => v.clamp(min, max),
                None => v,
            })
        };
        ParamsPatch {
            text_size: clamp(ParamId::TextSize, self.text_size),
            char_spacing: clamp(ParamId::CharSpacing, self.spacing),
            gravity: clamp(ParamId::Gravity, self.gravity),
            stiffness: clamp(ParamId::Stiffness, self.stiffness),
            damping: clamp(ParamId::Damping, self.damping),
            max_strokes: self.max_strokes.map(|v| v.clamp(1, 100)),
            max_chars_per_stroke: self.max_chars.map(|v| v.clamp(2, 500)),
            align_to_motion: self.no_align.then_some(false),
            collisions: self.no_collisions.then_some(false),
            collision_strength: clamp(ParamId::CollisionStrength, self.collision_strength),
            bounce: clamp(ParamId::Bounce, self.bounce),
        }
    }
}

/// Install a plain-text file subscriber; the terminal belongs to the UI
fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // Load config before touching the terminal so errors print normally
    let config = match &args.config {
        Some(path) if path.exists() => Some(AppConfig::load_from_file(path)?),
        _ => None,
    };

    let metrics: Box<dyn GlyphMetrics> = if args.monospace {
        Box::new(TableMetrics::monospace())
    } else {
        Box::new(ProportionalMetrics)
    };

    let kind = ExperimentKind::from_name(&args.experiment)
        .ok_or_else(|| format!("unknown experiment: {}", args.experiment))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let frame_rect = ratatui::layout::Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_rect, false);
    let mut app = App::new(
        canvas_width,
        canvas_height,
        kind.create(metrics),
        PresetManager::new(),
    );
    app.config_path = args.config.clone();

    // Precedence: config file, then preset, then explicit flags
    if let Some(config) = &config {
        app.apply_config(config);
    }
    if let Some(name) = &args.preset {
        app.apply_preset_named(name);
    }
    app.apply_patch(&args.params_patch());
    if let Some(text) = &args.text {
        app.scene.text = text.clone();
    }
    if let Some(size) = args.font_size {
        app.scene.font_size = size.clamp(8.0, 96.0);
    }
    if let Some(weight) = args.font_weight {
        app.scene.font_weight = weight.clamp(100, 900);
    }
    if let Some(name) = &args.color {
        match TypeColor::from_name(name) {
            Some(color) => app.scene.type_color = color,
            None => app.notify(format!("Unknown color: {}", name)),
        }
    }
    if let Some(speed) = args.speed {
        app.steps_per_frame = speed.clamp(1, 8);
    }

    tracing::info!(
        cols = canvas_width,
        rows = canvas_height,
        text = %app.scene.text,
        monospace = args.monospace,
        experiment = app.experiment.name(),
        "starting"
    );

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Returns `false` when the app should quit
fn handle_key<B: ratatui::backend::Backend>(
    terminal: &Terminal<B>,
    app: &mut App,
    key: KeyEvent,
) -> bool {
    // Handle Ctrl+C
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    // === Text entry captures every key while open ===
    if app.text_input.is_some() {
        match key.code {
            KeyCode::Enter => app.commit_text_edit(),
            KeyCode::Esc => app.cancel_text_edit(),
            KeyCode::Backspace => app.text_edit_pop(),
            KeyCode::Char(c) => app.text_edit_push(c),
            _ => {}
        }
        return true;
    }

    match key.code {
        // System controls
        KeyCode::Char('q') | KeyCode::Char('Q') => return false,
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('c') | KeyCode::Char('C') => app.clear(),
        KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('t') | KeyCode::Char('T') => app.begin_text_edit(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.increase_speed(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.decrease_speed(),

        // Parameter shortcuts
        KeyCode::Char('a') | KeyCode::Char('A') => app.toggle_param(ParamId::AlignToMotion),
        KeyCode::Char('x') | KeyCode::Char('X') => app.toggle_param(ParamId::Collisions),
        KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_links(),
        KeyCode::Char('k') | KeyCode::Char('K') if !app.show_help => app.cycle_type_color(),
        KeyCode::Char('g') | KeyCode::Char('G') => app.cycle_binding(),

        // Presets and config
        KeyCode::Char('p') | KeyCode::Char('P') => app.cycle_preset(),
        KeyCode::Char('u') | KeyCode::Char('U') => app.save_user_preset(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),

        // Navigation
        KeyCode::Tab => app.next_focus(),
        KeyCode::BackTab => app.prev_focus(),
        KeyCode::Up => {
            if !app.show_help {
                if app.focus.is_param() {
                    app.adjust_focused_up();
                } else {
                    app.scroll_controls_up();
                }
            }
        }
        KeyCode::Down => {
            if !app.show_help {
                if app.focus.is_param() {
                    app.adjust_focused_down();
                } else {
                    let term_size = terminal.size().unwrap_or_default();
                    let visible = ui::get_controls_visible_lines(term_size.height);
                    app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                }
            }
        }
        KeyCode::Esc => {
            if app.show_help {
                app.toggle_help();
            } else if app.focus.is_param() {
                app.focus = Focus::Controls;
            }
        }
        KeyCode::Char('j') | KeyCode::Char('J') => {
            if app.show_help {
                app.scroll_help_down(ui::HELP_CONTENT_LINES);
            }
        }
        KeyCode::Char('k') | KeyCode::Char('K') => app.scroll_help_up(),
        _ => {}
    }
    true
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (ox, oy) = ui::canvas_origin(app.fullscreen_mode);
    let col = mouse.column as i32 - ox as i32;
    let row = mouse.row as i32 - oy as i32;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(col, row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(col, row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(col, row),
        MouseEventKind::Moved => app.mouse_move(col, row),
        _ => {}
    }
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Drain every pending event before the next frame so drags stay smooth
        let mut timeout = FRAME_DURATION;
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind == KeyEventKind::Press && !handle_key(terminal, app, key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => {
                    let (canvas_width, canvas_height) = ui::get_canvas_size(
                        ratatui::layout::Rect {
                            x: 0,
                            y: 0,
                            width,
                            height,
                        },
                        app.fullscreen_mode,
                    );
                    app.resize(canvas_width, canvas_height);
                }
                _ => {}
            }
        }

        // Fullscreen toggles change the canvas without a resize event
        let size = terminal.size()?;
        let (canvas_width, canvas_height) = ui::get_canvas_size(
            ratatui::layout::Rect {
                x: 0,
                y: 0,
                width: size.width,
                height: size.height,
            },
            app.fullscreen_mode,
        );
        if (canvas_width, canvas_height) != (app.canvas.cols(), app.canvas.rows()) {
            app.resize(canvas_width, canvas_height);
        }

        // Run simulation tick
        app.tick();
    }
}
