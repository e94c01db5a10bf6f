//! Key mapping from terminal events to viewer commands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Drop the connection and start over with a fresh session.
    Reconnect,
    /// Repaint the whole terminal.
    Redraw,
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }
    if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Command::Redraw);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Reconnect),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        assert_eq!(command_for(KeyEvent::from(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command_for(KeyEvent::from(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(
            command_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_plain_c_is_ignored() {
        assert_eq!(command_for(KeyEvent::from(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_reconnect_and_redraw() {
        assert_eq!(command_for(KeyEvent::from(KeyCode::Char('R'))), Some(Command::Reconnect));
        assert_eq!(
            command_for(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            Some(Command::Redraw)
        );
    }
}
