//! Input handling for the dashboard.
//!
//! The dashboard is read-only: the only key is quit. Terminal resizes come in
//! on the same event stream and are turned into a forced repaint.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Input action resulting from a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the dashboard.
    Quit,
    /// Terminal size changed; repaint from scratch.
    Resize,
    /// Nothing to do.
    None,
}

/// Maps terminal events to actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Creates a new input handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Handles any terminal event.
    #[must_use]
    pub fn handle_event(&self, event: &Event) -> Action {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Resize(..) => Action::Resize,
            _ => Action::None,
        }
    }

    /// Handles a key event.
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> Action {
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key.
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') => Action::Quit,
                _ => Action::None,
            };
        }

        match event.code {
            KeyCode::Char('q' | 'Q') => Action::Quit,
            _ => Action::None,
        }
    }
}
