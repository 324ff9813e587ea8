use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Submit,
    Quit,
    NextField,
    PrevField,
    ResetStatus,
    Edit(KeyEvent),
    None,
}

/// Arrows, Enter and Delete stay with the focused field; date and time
/// pickers use them.
pub fn classify(key: &KeyEvent) -> KeyCommand {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => KeyCommand::Submit,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyCommand::Quit,
            KeyCode::Char('c') | KeyCode::Char('C') => KeyCommand::Quit,
            KeyCode::Char('n') | KeyCode::Char('N') => KeyCommand::NextField,
            KeyCode::Char('p') | KeyCode::Char('P') => KeyCommand::PrevField,
            _ => KeyCommand::None,
        };
    }

    match key.code {
        KeyCode::Tab => KeyCommand::NextField,
        KeyCode::BackTab => KeyCommand::PrevField,
        KeyCode::Esc => KeyCommand::ResetStatus,
        _ => KeyCommand::Edit(*key),
    }
}

pub const HELP_TEXT: &str =
    "Tab/Shift+Tab move • Ctrl+S submit • Ctrl+Q quit • Esc clear status";
