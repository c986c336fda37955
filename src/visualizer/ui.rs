//! Terminal user interface for the visualizer.
//!
//! Blits the pixel canvas into the terminal two pixels per cell, draws the
//! start overlay while no source is active, and maps key presses to commands.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::error::Error;
use std::io::{stdout, Stdout};
use std::time::Duration;

use super::canvas::PixelCanvas;
use super::controller::LoopState;
use super::visualizations::Mode;

const FOOTER_HEIGHT: u16 = 1;
const FOOTER_FG: Color = Color::Rgb(185, 207, 212);
const FOOTER_BG: Color = Color::Rgb(0, 0, 0);

/// User input command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiCommand {
    /// No key pressed, or one with no binding
    Continue,
    /// Capture system audio ('s')
    StartSystem,
    /// Capture the microphone ('m')
    StartMicrophone,
    /// Switch strategy ('b'/'1', 'w'/'2')
    SetMode(Mode),
    /// Flip between strategies (Tab)
    ToggleMode,
    SensitivityUp,
    SensitivityDown,
    /// Stop or resume the render loop (Space)
    TogglePause,
    /// Release the stream and return to the overlay ('x')
    StopCapture,
    /// Terminal was resized to (columns, rows)
    Resize(u16, u16),
    /// Exit ('q', Escape, Ctrl+C)
    Quit,
}

/// What the footer shows.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    pub lifecycle: LoopState,
    pub source: Option<&'a str>,
    pub mode: Mode,
    pub sensitivity: f64,
    pub notice: Option<&'a str>,
}

/// Full-screen visualizer terminal.
pub struct VisualizerTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl VisualizerTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        Ok(VisualizerTui { terminal })
    }

    /// Canvas size in pixels for the current terminal: one column per pixel,
    /// two pixel rows per terminal row, footer excluded.
    pub fn canvas_size(&self) -> Result<(u32, u32), Box<dyn Error>> {
        let size = self.terminal.size()?;
        Ok(canvas_size_for(size.width, size.height))
    }

    /// Draws the canvas, the footer, and optionally the start overlay.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(
        &mut self,
        canvas: &PixelCanvas,
        status: &StatusLine<'_>,
        show_overlay: bool,
    ) -> Result<(), Box<dyn Error>> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            let canvas_area = Rect {
                height: area.height.saturating_sub(FOOTER_HEIGHT),
                ..area
            };
            let footer_area = Rect {
                y: area.y + canvas_area.height,
                height: area.height.min(FOOTER_HEIGHT),
                ..area
            };

            frame.render_widget(CanvasView { canvas }, canvas_area);

            if show_overlay {
                render_overlay(frame, canvas_area, status.notice);
            }

            let footer = Paragraph::new(footer_line(status))
                .style(Style::default().fg(FOOTER_FG).bg(FOOTER_BG));
            frame.render_widget(footer, footer_area);
        })?;
        Ok(())
    }

    /// Waits up to `timeout` for one input event and maps it to a command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, timeout: Duration) -> Result<UiCommand, Box<dyn Error>> {
        if !event::poll(timeout)? {
            return Ok(UiCommand::Continue);
        }

        Ok(match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                let command = map_key(key.code, key.modifiers);
                if command != UiCommand::Continue {
                    tracing::debug!("Key {:?} mapped to {:?}", key.code, command);
                }
                command
            }
            Event::Resize(columns, rows) => UiCommand::Resize(columns, rows),
            _ => UiCommand::Continue,
        })
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Pixel dimensions of the canvas for a terminal of `columns` x `rows`.
pub fn canvas_size_for(columns: u16, rows: u16) -> (u32, u32) {
    let rows = rows.saturating_sub(FOOTER_HEIGHT) as u32;
    (columns as u32, rows * 2)
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> UiCommand {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => UiCommand::Quit,
        KeyCode::Char('q') | KeyCode::Esc => UiCommand::Quit,
        KeyCode::Char('s') => UiCommand::StartSystem,
        KeyCode::Char('m') => UiCommand::StartMicrophone,
        KeyCode::Char('b') | KeyCode::Char('1') => UiCommand::SetMode(Mode::Bars),
        KeyCode::Char('w') | KeyCode::Char('2') => UiCommand::SetMode(Mode::Wave),
        KeyCode::Tab => UiCommand::ToggleMode,
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => UiCommand::SensitivityUp,
        KeyCode::Char('-') | KeyCode::Down => UiCommand::SensitivityDown,
        KeyCode::Char(' ') => UiCommand::TogglePause,
        KeyCode::Char('x') => UiCommand::StopCapture,
        _ => UiCommand::Continue,
    }
}

fn footer_line<'a>(status: &StatusLine<'a>) -> Line<'a> {
    let indicator = match (status.source, status.lifecycle) {
        (Some(_), LoopState::Running) => Span::styled("● ", Style::default().fg(Color::Green)),
        (Some(_), _) => Span::styled("⏸ ", Style::default().fg(Color::Yellow)),
        (None, _) => Span::styled("○ ", Style::default().fg(Color::DarkGray)),
    };

    let mut spans = vec![
        indicator,
        Span::raw(status.source.unwrap_or("no source").to_string()),
        Span::raw(" / "),
        Span::raw(status.mode.to_string()),
        Span::raw(" / "),
        Span::raw(format!("x{:.1}", status.sensitivity)),
        Span::styled(
            "  [b]ars [w]ave [+/-] sens [space] pause [x] stop [q] quit",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(notice) = status.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Rgb(255, 255, 255)).bg(Color::Red),
        ));
    }

    Line::from(spans)
}

fn render_overlay(frame: &mut Frame, area: Rect, notice: Option<&str>) {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("[s]", Style::default().fg(Color::Cyan)),
            Span::raw(" share system audio"),
        ]),
        Line::from(vec![
            Span::styled("[m]", Style::default().fg(Color::Cyan)),
            Span::raw(" use microphone"),
        ]),
        Line::from(vec![
            Span::styled("[q]", Style::default().fg(Color::Cyan)),
            Span::raw(" quit"),
        ]),
    ];
    if let Some(notice) = notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let width = 44.min(area.width);
    let height = (lines.len() as u16 + 3).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" sonoscope ")
        .style(Style::default().fg(FOOTER_FG).bg(FOOTER_BG));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Half-block view of a pixel canvas: the upper pixel is the glyph color,
/// the lower pixel the cell background.
struct CanvasView<'a> {
    canvas: &'a PixelCanvas,
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pixels = self.canvas.pixels();
        let width = self.canvas.width() as usize;
        let color_at = |x: usize, y: usize| {
            let pixel = (x < width).then(|| pixels.get(y * width + x)).flatten();
            pixel.map_or(Color::Rgb(0, 0, 0), |p| {
                let c = p.demultiply();
                Color::Rgb(c.red(), c.green(), c.blue())
            })
        };

        for row in 0..area.height {
            for col in 0..area.width {
                let (x, y) = (col as usize, row as usize * 2);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▀")
                        .set_fg(color_at(x, y))
                        .set_bg(color_at(x, y + 1));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::surface::{Paint, Surface};

    #[test]
    fn test_canvas_size_excludes_footer() {
        assert_eq!(canvas_size_for(80, 25), (80, 48));
        assert_eq!(canvas_size_for(10, 0), (10, 0));
    }

    #[test]
    fn test_key_bindings() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(KeyCode::Char('q'), none), UiCommand::Quit);
        assert_eq!(map_key(KeyCode::Esc, none), UiCommand::Quit);
        assert_eq!(map_key(KeyCode::Char('c'), KeyModifiers::CONTROL), UiCommand::Quit);
        assert_eq!(map_key(KeyCode::Char('c'), none), UiCommand::Continue);
        assert_eq!(map_key(KeyCode::Char('2'), none), UiCommand::SetMode(Mode::Wave));
        assert_eq!(map_key(KeyCode::Char('b'), none), UiCommand::SetMode(Mode::Bars));
        assert_eq!(map_key(KeyCode::Up, none), UiCommand::SensitivityUp);
        assert_eq!(map_key(KeyCode::Char('-'), none), UiCommand::SensitivityDown);
        assert_eq!(map_key(KeyCode::Char(' '), none), UiCommand::TogglePause);
    }

    #[test]
    fn test_canvas_view_packs_two_pixels_per_cell() {
        let mut canvas = PixelCanvas::new(2, 4);
        canvas.fill_rect(0.0, 1.0, 2.0, 1.0, Paint::rgba(255, 0, 0, 1.0));

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        CanvasView { canvas: &canvas }.render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(0, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(1, 1)].bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_canvas_view_beyond_canvas_is_black() {
        let mut canvas = PixelCanvas::new(1, 2);
        canvas.fill_rect(0.0, 0.0, 1.0, 2.0, Paint::rgba(0, 0, 255, 1.0));

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        CanvasView { canvas: &canvas }.render(area, &mut buf);

        assert_eq!(buf[(0, 0)].fg, Color::Rgb(0, 0, 255));
        assert_eq!(buf[(1, 0)].fg, Color::Rgb(0, 0, 0));
        assert_eq!(buf[(0, 1)].bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_footer_shows_notice() {
        let status = StatusLine {
            lifecycle: LoopState::Stopped,
            source: Some("microphone"),
            mode: Mode::Wave,
            sensitivity: 1.5,
            notice: Some("stream ended"),
        };
        let text: String = footer_line(&status)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("microphone / wave / x1.5"));
        assert!(text.ends_with("stream ended"));
    }
}
