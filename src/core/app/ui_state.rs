use std::time::Instant;

use ratatui::layout::Size;
use tui_textarea::{CursorMove, TextArea};

use crate::ui::theme::Theme;

pub const INPUT_PLACEHOLDER: &str = "请输入您的问题...";

/// Presentation state that has no bearing on the conversation itself.
#[derive(Debug, Clone)]
pub struct UiState {
    textarea: TextArea<'static>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub pulse_start: Instant,
    pub theme: Theme,
    pub exit_requested: bool,
    pub last_term_size: Size,
}

impl UiState {
    pub(crate) fn new(theme: Theme) -> Self {
        let mut state = Self {
            textarea: TextArea::default(),
            scroll_offset: 0,
            auto_scroll: true,
            pulse_start: Instant::now(),
            theme,
            exit_requested: false,
            last_term_size: Size::default(),
        };
        state.configure_textarea();
        state
    }

    pub(crate) fn configure_textarea(&mut self) {
        self.textarea.set_style(self.theme.input_text_style);
        self.textarea.set_cursor_style(self.theme.input_cursor_style);
        self.textarea.set_cursor_line_style(self.theme.input_cursor_line_style);
        self.textarea.set_placeholder_text(INPUT_PLACEHOLDER);
        self.textarea.set_placeholder_style(self.theme.placeholder_style);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Replace the input, leaving the cursor at the end of the last line.
    pub fn set_input_text(&mut self, text: &str) {
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.configure_textarea();
    }

    pub fn clear_input(&mut self) {
        self.set_input_text("");
    }

    /// Run an edit against the textarea and return the resulting text.
    pub fn edit_input<F>(&mut self, f: F) -> String
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        f(&mut self.textarea);
        self.input_text()
    }

    pub fn restart_pulse(&mut self) {
        self.pulse_start = Instant::now();
    }

    /// Input box height including borders; grows with content up to six rows.
    pub fn calculate_input_area_height(&self) -> u16 {
        let rows = self.textarea.lines().len().max(1) as u16;
        rows.clamp(1, 6) + 2
    }
}
