//! Key resolution for the chat screen.
//!
//! Keys either become an [`AppAction`] or are forwarded to the input
//! textarea. Resolution is a pure function of the key and a small snapshot
//! of app state so it can be tested without a terminal.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{CursorMove, Input as TAInput, Key as TAKey};

use crate::core::app::AppAction;

/// App state the key resolver needs to look at.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub input_empty: bool,
    pub busy: bool,
    pub page_size: u16,
}

pub enum KeyResult {
    Action(AppAction),
    Edit(TextareaEdit),
    Ignored,
}

pub enum TextareaEdit {
    Input(TAInput),
    Newline,
    Move(CursorMove),
}

impl TextareaEdit {
    pub fn apply(self, textarea: &mut tui_textarea::TextArea<'static>) {
        match self {
            TextareaEdit::Input(input) => {
                textarea.input(input);
            }
            TextareaEdit::Newline => textarea.insert_newline(),
            TextareaEdit::Move(movement) => textarea.move_cursor(movement),
        }
    }
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

pub fn resolve_key(key: &KeyEvent, ctx: KeyContext) -> KeyResult {
    if is_ctrl(key, 'c') || key.code == KeyCode::Esc {
        return KeyResult::Action(AppAction::Quit);
    }
    if is_ctrl(key, 'p') || key.code == KeyCode::F(2) {
        return KeyResult::Action(AppAction::SwitchPersona);
    }

    match key.code {
        KeyCode::PageUp => {
            return KeyResult::Action(AppAction::ScrollUp {
                lines: ctx.page_size.max(1),
            })
        }
        KeyCode::PageDown => {
            return KeyResult::Action(AppAction::ScrollDown {
                lines: ctx.page_size.max(1),
            })
        }
        KeyCode::Home => return KeyResult::Action(AppAction::ScrollToTop),
        KeyCode::End => return KeyResult::Action(AppAction::ScrollToBottom),
        KeyCode::Up if ctx.input_empty => {
            return KeyResult::Action(AppAction::ScrollUp { lines: 1 })
        }
        KeyCode::Down if ctx.input_empty => {
            return KeyResult::Action(AppAction::ScrollDown { lines: 1 })
        }
        _ => {}
    }

    // Input is disabled while a reply is pending
    if ctx.busy {
        return KeyResult::Ignored;
    }

    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            KeyResult::Edit(TextareaEdit::Newline)
        }
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyResult::Edit(TextareaEdit::Newline)
        }
        KeyCode::Enter => KeyResult::Action(AppAction::SubmitInput),
        KeyCode::Up => KeyResult::Edit(TextareaEdit::Move(CursorMove::Up)),
        KeyCode::Down => KeyResult::Edit(TextareaEdit::Move(CursorMove::Down)),
        KeyCode::Delete => KeyResult::Edit(TextareaEdit::Input(TAInput {
            key: TAKey::Delete,
            ctrl: false,
            alt: false,
            shift: false,
        })),
        _ => KeyResult::Edit(TextareaEdit::Input(TAInput::from(*key))),
    }
}
