//! Key bindings: arrows/space plus vim-style letters.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Pause,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Enter | KeyCode::Char(' ') => Action::HardDrop,
        _ => Action::None,
    }
}

/// Whether the action is a gameplay command (suppressed once the game is over).
pub fn is_gameplay(action: Action) -> bool {
    matches!(
        action,
        Action::MoveLeft | Action::MoveRight | Action::Rotate | Action::SoftDrop | Action::HardDrop
    )
}
