use crate::app::{App, Focus};
use crate::settings::ParamId;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 26;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 50;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 20;

/// Status box height, parameters box height
const STATUS_HEIGHT: u16 = 7;
const PARAMS_HEIGHT: u16 = ParamId::ALL.len() as u16 + 2;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let canvas_area = if app.fullscreen_mode {
        area
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        layout[1]
    };
    render_canvas(frame, canvas_area, app);

    if let Some(message) = app.toast_message() {
        render_toast(frame, canvas_area, message);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

/// Terminal position of the canvas' top-left cell (inside its border)
pub fn canvas_origin(fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (1, 1)
    } else {
        (SIDEBAR_WIDTH + 1, 1)
    }
}

/// Visible lines in the controls box for a terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT)
        .saturating_sub(2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(5), // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Text Rope ");
    let stats = app.stats();

    let (status_text, status_color) = if app.text_input.is_some() {
        ("EDITING TEXT", Color::Green)
    } else if app.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if stats.drawing {
        ("DRAWING", Color::Green)
    } else {
        ("RUNNING", BORDER_COLOR)
    };

    let text_line = match &app.text_input {
        Some(input) => Line::from(vec![
            Span::styled("> ", Style::default().fg(HIGHLIGHT_COLOR)),
            Span::styled(format!("{}_", input), Style::default().fg(TEXT_COLOR)),
        ]),
        None => Line::from(Span::styled(
            format!("\"{}\"", app.scene.text),
            Style::default().fg(app.scene.type_color.rgb().into()),
        )),
    };

    let content = vec![
        Line::from(Span::styled(
            format!("{} strokes, {} glyphs", stats.strokes, stats.particles),
            Style::default().fg(TEXT_COLOR),
        )),
        text_line,
        Line::from(Span::styled(
            format!(
                "{} | {} | x{}",
                app.preset_name(),
                app.scene.type_color.name(),
                app.steps_per_frame
            ),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!(
                "links {} | {}f {:.0}s",
                if app.scene.show_links { "on" } else { "off" },
                stats.frames,
                stats.seconds
            ),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");
    let params = app.params();

    let content: Vec<Line> = ParamId::ALL
        .iter()
        .map(|&id| {
            let focused = app.focus == Focus::Param(id);
            let prefix = if focused { "> " } else { "  " };
            let style = if focused {
                Style::default().fg(HIGHLIGHT_COLOR)
            } else {
                Style::default().fg(TEXT_COLOR)
            };
            let mut spans = vec![Span::styled(
                format!("{}{}: {}", prefix, id.name(), params.display(id)),
                style,
            )];
            if let Some(binding) = app.scene.bindings.get(id) {
                spans.push(Span::styled(
                    format!(" [{}]", binding.label()),
                    Style::default().fg(Color::Green),
                ));
            }
            Line::from(spans)
        })
        .collect();

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        // Scroll to show focused line at bottom of visible area
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0 // Focus is within first visible lines
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: &str| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Drag", "draw a stroke"),
        make_control("Space", "pause/resume"),
        make_control("H/?", "help"),
        make_control("C", "clear"),
        make_control("T", "edit text"),
        make_control("A", "align to motion"),
        make_control("X", "collisions"),
        make_control("L", "links overlay"),
        make_control("K", "type color"),
        make_control("P", "next preset"),
        make_control("U", "save user preset"),
        make_control("S", "save config"),
        make_control("G", "bind to pointer"),
        make_control("Tab", "select param"),
        make_control("↑/↓", "adjust param"),
        make_control("+/-", "speed"),
        make_control("V", "fullscreen"),
        make_control("Esc", "unfocus"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll.min(max_scroll), 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    for cell in app.canvas.cells() {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color.into()));
            let paragraph = Paragraph::new(Line::from(span));
            frame.render_widget(paragraph, cell_rect);
        }
    }
}

fn render_toast(frame: &mut Frame, canvas_area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 4).min(canvas_area.width.saturating_sub(2));
    if width < 5 || canvas_area.height < 5 {
        return;
    }
    let toast_area = Rect {
        x: canvas_area.x + canvas_area.width.saturating_sub(width + 1),
        y: canvas_area.y + canvas_area.height.saturating_sub(4),
        width,
        height: 3,
    };
    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(TEXT_COLOR),
    )))
    .block(block);
    frame.render_widget(paragraph, toast_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 60.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(40);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let heading = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(HIGHLIGHT_COLOR)));
    let term = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(TEXT_COLOR)));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("TEXT ON A ROPE", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Drag with the left mouse button to lay the text along your path. Each glyph becomes a particle tied to its neighbours by a spring, then falls, collides and settles."),
        Line::from(""),
        heading("PARAMETERS (Tab, then Up/Down):"),
        Line::from(""),
        term("Text Size / Spacing"),
        Line::from("Glyph size relative to the font, and the gap between glyphs along a stroke."),
        Line::from(""),
        term("Gravity / Stiffness / Damping"),
        Line::from("Downward pull per frame, spring strength between neighbours, and velocity lost per frame."),
        Line::from(""),
        term("Max Strokes / Max Chars"),
        Line::from("The oldest stroke is dropped when a new one would exceed the limit."),
        Line::from(""),
        term("Align (A)"),
        Line::from("On: glyphs follow the chain and collide as circles. Off: glyphs stay upright on their baseline."),
        Line::from(""),
        term("Collisions (X) / Strength / Bounce"),
        Line::from("Glyphs push apart when they overlap; bounce is the speed kept after hitting a wall."),
        Line::from(""),
        heading("POINTER BINDINGS (G):"),
        Line::from("Bind the focused parameter to the pointer: y, inverted y, x, inverted x, then off."),
        Line::from(""),
        heading("TEXT (T):"),
        Line::from("Type new text, Enter to apply, Esc to cancel. Existing strokes keep their letters."),
        Line::from(""),
        heading("PRESETS AND CONFIG:"),
        Line::from("P cycles presets, U saves the current parameters as a user preset, S writes the config file."),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Pause, C=Clear, L=Links, K=Color, V=Fullscreen, +/-=Speed, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    // Update title to show scroll hint if scrollable
    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size_accounts_for_sidebar() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(get_canvas_size(area, true), (98, 38));
        assert_eq!(get_canvas_size(area, false), (100 - SIDEBAR_WIDTH - 2, 38));
        assert_eq!(get_canvas_size(Rect::new(0, 0, 10, 1), false), (0, 0));
    }

    #[test]
    fn test_canvas_origin_matches_border() {
        assert_eq!(canvas_origin(true), (1, 1));
        assert_eq!(canvas_origin(false), (SIDEBAR_WIDTH + 1, 1));
    }
}
