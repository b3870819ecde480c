//! UI event types consumed by the reducer.

use crossterm::event::KeyEvent;

/// Events the runtime feeds into the reducer.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A key press from the terminal.
    Key(KeyEvent),
    /// Terminal was resized; the next draw picks up the new size.
    Resize,
}
