//! Input routing: one static dispatch table per mode.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::mode::Mode;

/// Input the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
}

/// Left-hand side of a dispatch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Key(KeyCode),
    /// Any key press.
    AnyKey,
    Resize,
}

/// Things a key (or resize) can ask the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorUp,
    CursorDown,
    Refresh,
    ToggleSort,
    TogglePause,
    OpenTrace,
    ToggleExpand,
    OpenHelp,
    Relayout,
    Close,
    Quit,
}

const MAIN_KEYMAP: &[(Trigger, Action)] = &[
    (Trigger::Key(KeyCode::Up), Action::CursorUp),
    (Trigger::Key(KeyCode::Char('k')), Action::CursorUp),
    (Trigger::Key(KeyCode::Down), Action::CursorDown),
    (Trigger::Key(KeyCode::Char('j')), Action::CursorDown),
    (Trigger::Key(KeyCode::Char('r')), Action::Refresh),
    (Trigger::Key(KeyCode::Char('s')), Action::ToggleSort),
    (Trigger::Key(KeyCode::Char('p')), Action::TogglePause),
    (Trigger::Key(KeyCode::Char('t')), Action::OpenTrace),
    (Trigger::Key(KeyCode::Enter), Action::ToggleExpand),
    (Trigger::Key(KeyCode::Char('o')), Action::ToggleExpand),
    (Trigger::Key(KeyCode::Char('?')), Action::OpenHelp),
    (Trigger::Key(KeyCode::Char('h')), Action::OpenHelp),
    (Trigger::Key(KeyCode::Esc), Action::Quit),
    (Trigger::Key(KeyCode::Char('q')), Action::Quit),
    (Trigger::Resize, Action::Relayout),
];

const DIALOG_KEYMAP: &[(Trigger, Action)] = &[
    (Trigger::Resize, Action::Relayout),
    (Trigger::AnyKey, Action::Close),
];

/// Dispatch table of a mode.
pub fn keymap(mode: &Mode) -> &'static [(Trigger, Action)] {
    match mode {
        Mode::Main => MAIN_KEYMAP,
        Mode::TraceDialog(_) | Mode::HelpDialog => DIALOG_KEYMAP,
    }
}

/// Maps an input event to an action in the given mode.
///
/// Key releases and repeats are ignored. Ctrl-C quits from every mode.
pub fn route(mode: &Mode, event: InputEvent) -> Option<Action> {
    if let InputEvent::Key(key) = event {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
    }

    keymap(mode)
        .iter()
        .find(|(trigger, _)| matches_trigger(*trigger, event))
        .map(|(_, action)| *action)
}

fn matches_trigger(trigger: Trigger, event: InputEvent) -> bool {
    match (trigger, event) {
        (Trigger::Resize, InputEvent::Resize) => true,
        (Trigger::AnyKey, InputEvent::Key(_)) => true,
        // Shift is part of the character; any other modifier is a different key.
        (Trigger::Key(code), InputEvent::Key(key)) => {
            key.code == code && key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
        }
        _ => false,
    }
}
