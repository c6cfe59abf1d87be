//! Key bindings for edit mode.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use editcore::{Command, Motion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Command(Command),
    Type(char),
    Newline,
    Tab,
    Backspace,
    Delete,
    Move { motion: Motion, extend: bool },
    ToggleTheme,
    TogglePreview,
    OpenCommandLine,
    Help,
    Quit,
}

/// Map a key press in edit mode to an action. Releases and repeats of
/// modifier chords are ignored.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl {
        return ctrl_action(key.code, shift);
    }
    if alt {
        return alt_action(key.code);
    }

    let action = match key.code {
        KeyCode::Char(c) => Action::Type(c),
        KeyCode::Enter => Action::Newline,
        KeyCode::Tab => Action::Tab,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::F(1) => Action::Help,
        code => {
            let motion = motion_for(code)?;
            Action::Move {
                motion,
                extend: shift,
            }
        }
    };
    Some(action)
}

fn ctrl_action(code: KeyCode, shift: bool) -> Option<Action> {
    let action = match code {
        KeyCode::Char('z') if shift => Action::Command(Command::Redo),
        KeyCode::Char('Z') => Action::Command(Command::Redo),
        KeyCode::Char('z') => Action::Command(Command::Undo),
        KeyCode::Char('y') => Action::Command(Command::Redo),
        KeyCode::Char('b') => Action::Command(Command::Bold),
        KeyCode::Char('e') => Action::Command(Command::InlineCode),
        KeyCode::Char('k') => Action::Command(Command::Link),
        KeyCode::Char('s') => Action::Command(Command::Save),
        KeyCode::Char('l') => Action::Command(Command::Clear),
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('r') => Action::TogglePreview,
        KeyCode::Char('p') => Action::OpenCommandLine,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Home => Action::Move {
            motion: Motion::DocumentStart,
            extend: shift,
        },
        KeyCode::End => Action::Move {
            motion: Motion::DocumentEnd,
            extend: shift,
        },
        _ => return None,
    };
    Some(action)
}

fn alt_action(code: KeyCode) -> Option<Action> {
    let command = match code {
        KeyCode::Char('i') => Command::Italic,
        KeyCode::Char('1') => Command::Heading1,
        KeyCode::Char('2') => Command::Heading2,
        KeyCode::Char('3') => Command::Heading3,
        KeyCode::Char('q') => Command::Quote,
        KeyCode::Char('l') => Command::ListItem,
        KeyCode::Char('-') => Command::Rule,
        KeyCode::Char('t') => Command::Table,
        KeyCode::Char('x') => Command::TaskItem,
        KeyCode::Char('s') => Command::Strikethrough,
        _ => return None,
    };
    Some(Action::Command(command))
}

fn motion_for(code: KeyCode) -> Option<Motion> {
    let motion = match code {
        KeyCode::Left => Motion::Left,
        KeyCode::Right => Motion::Right,
        KeyCode::Up => Motion::Up,
        KeyCode::Down => Motion::Down,
        KeyCode::Home => Motion::LineStart,
        KeyCode::End => Motion::LineEnd,
        _ => return None,
    };
    Some(motion)
}

/// Key hints shown in the help overlay.
pub const BINDINGS: &[(&str, &str)] = &[
    ("Ctrl+Z", "Undo"),
    ("Ctrl+Y / Ctrl+Shift+Z", "Redo"),
    ("Ctrl+B", "Bold"),
    ("Alt+I", "Italic"),
    ("Ctrl+E", "Inline code"),
    ("Ctrl+K", "Link"),
    ("Alt+1..3", "Heading 1-3"),
    ("Alt+Q", "Quote"),
    ("Alt+L", "List item"),
    ("Alt+X", "Task item"),
    ("Alt+T", "Table"),
    ("Alt+S", "Strikethrough"),
    ("Alt+-", "Horizontal rule"),
    ("Ctrl+S", "Save"),
    ("Ctrl+L", "Clear document"),
    ("Ctrl+T", "Toggle theme"),
    ("Ctrl+R", "Toggle preview"),
    ("Ctrl+P", "Command line"),
    ("Shift+Arrows", "Extend selection"),
    ("F1", "Help"),
    ("Ctrl+Q", "Quit"),
];
