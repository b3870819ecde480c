//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render
//! function.
//!
//! ## Module Structure
//!
//! - `notes.rs`: Note editor over one or more entries
//! - `order_number.rs`: Order number prompt ahead of submit
//! - `render_utils.rs`: Shared rendering utilities for overlays
//!
//! ## Extension Trait
//!
//! `OverlayExt` provides convenience methods for `Option<Overlay>` to
//! encapsulate the common patterns used in the reducer.

pub mod notes;
pub mod order_number;
pub mod render_utils;

use bunsik_core::register::SelectionPath;
use crossterm::event::KeyEvent;
pub use notes::NotesState;
pub use order_number::OrderNumberState;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;
use crate::mutations::StateMutation;
use crate::state::TuiState;

// ============================================================================
// OverlayRequest / OverlayTransition / OverlayUpdate
// ============================================================================

/// Requests to open a new overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayRequest {
    /// Note editor over the given entries.
    Notes { targets: Vec<SelectionPath> },
    /// Order number prompt ahead of submit.
    OrderNumber,
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub mutations: Vec<StateMutation>,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            mutations: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    #[must_use]
    pub fn with_mutations(mut self, mutations: Vec<StateMutation>) -> Self {
        self.mutations = mutations;
        self
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug)]
pub enum Overlay {
    Notes(NotesState),
    OrderNumber(OrderNumberState),
}

impl Overlay {
    pub fn render(&self, tui: &TuiState, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::Notes(notes) => notes.render(tui, frame, area),
            Overlay::OrderNumber(prompt) => prompt.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Notes(notes) => notes.handle_key(tui, key),
            Overlay::OrderNumber(prompt) => prompt.handle_key(key),
        }
    }
}

/// Handles a key while an overlay is open. Returns `None` when no overlay
/// is active, letting the caller fall through to the mode handlers.
pub fn handle_overlay_key(
    tui: &TuiState,
    overlay: &mut Option<Overlay>,
    key: KeyEvent,
) -> Option<OverlayUpdate> {
    overlay.as_mut().map(|overlay| overlay.handle_key(tui, key))
}

// ============================================================================
// OverlayExt - Extension trait for Option<Overlay>
// ============================================================================

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    /// Renders the overlay if one is active.
    fn render(&self, tui: &TuiState, frame: &mut Frame, area: Rect);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, tui: &TuiState, frame: &mut Frame, area: Rect) {
        if let Some(overlay) = self {
            overlay.render(tui, frame, area);
        }
    }
}
