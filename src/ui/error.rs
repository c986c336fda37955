//! Full-screen error display.
//!
//! Used when the visualizer cannot start: bad configuration or a capture
//! source that cannot be opened.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(140, 0, 0);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Error screen: message centered on a red background, dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ErrorScreen {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen {
            terminal,
            active: true,
        })
    }

    /// Shows `error_message` until a key is pressed. Text wraps to 80% of the width.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        let text = error_text(error_message);
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(Block::default().style(Style::default().bg(ERROR_BG)), area);

                let height = (text.lines.len() as u16).min(area.height);
                let message_area = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height.saturating_sub(height) / 2,
                    width: area.width * 8 / 10,
                    height: area.height - area.height.saturating_sub(height) / 2,
                };
                let paragraph = Paragraph::new(text.clone())
                    .style(Style::default().fg(ERROR_FG).bg(ERROR_BG))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, message_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Restores the terminal. Safe to call more than once.
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Message lines followed by a dismiss hint.
fn error_text(message: &str) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = message
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to exit",
        Style::default().add_modifier(Modifier::DIM),
    )));
    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_text_keeps_line_breaks() {
        let text = error_text("Capture Error:\n\nno device");
        assert_eq!(text.lines.len(), 5);
        assert_eq!(text.lines[0].to_string(), "Capture Error:");
        assert_eq!(text.lines[2].to_string(), "no device");
        assert_eq!(text.lines[4].to_string(), "Press any key to exit");
    }
}
