//! Single-line question input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::event::EventStatus;

/// Editable question text with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits
/// correctly.
#[derive(Debug, Clone, Default)]
pub struct QuestionInput {
    input: String,
    cursor_pos: usize,
}

impl QuestionInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input pre-filled with `text`, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        let mut input = Self::new();
        input.set_text(text);
        input
    }

    /// Get the current input text.
    pub fn text(&self) -> &str {
        &self.input
    }

    /// Replace the text and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.input = text.to_string();
        self.cursor_pos = self.input.chars().count();
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor_pos);
        self.input.insert(at, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            let at = self.byte_offset(self.cursor_pos - 1);
            self.input.remove(at);
            self.cursor_pos -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            self.cursor_pos += 1;
        }
    }

    /// Apply an editing key. Keys the input does not edit with are left to
    /// the caller.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> EventStatus {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => {
                    self.clear();
                    EventStatus::Consumed
                }
                _ => EventStatus::NotConsumed,
            };
        }

        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.cursor_pos = 0,
            KeyCode::End => self.cursor_pos = self.input.chars().count(),
            _ => return EventStatus::NotConsumed,
        }
        EventStatus::Consumed
    }

    /// Render the input field.
    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("Question (Enter: full run)");

        let inner = block.inner(area);
        block.render(area, buf);

        let text = if focused {
            let (before, after) = self.input.split_at(self.byte_offset(self.cursor_pos));
            format!("> {before}▏{after}")
        } else {
            format!("> {}", self.input)
        };
        Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .render(inner, buf);
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}
