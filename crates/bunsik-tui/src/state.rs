//! Application state composition.
//!
//! This module defines the top-level state hierarchy for the TUI:
//! - `AppState` - combined state (`TuiState` + overlay)
//! - `TuiState` - non-overlay UI state (register, input mode, status)
//! - `InputMode` - modal input state (normal, search, range-select)
//!
//! ## State Hierarchy
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── register: OrderRegister  (rows, selection, group ids)
//! │   ├── mode: InputMode          (normal / search / range-select)
//! │   ├── status: String           (one-line feedback)
//! │   └── config: Config
//! └── overlay: Option<Overlay>     (modal overlays)
//! ```
//!
//! ## Split State Architecture
//!
//! State is split between `TuiState` (non-overlay) and `Option<Overlay>`:
//! overlay handlers get `&mut self` on the overlay and `&TuiState`
//! simultaneously without borrow conflicts, returning any state edits as
//! mutations for the reducer to apply.

use bunsik_core::catalog::{self, Category, DishMeta};
use bunsik_core::config::Config;
use bunsik_core::register::{OrderRegister, SelectionPath};

use crate::overlays::Overlay;

// ============================================================================
// AppState (Combined State)
// ============================================================================

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            tui: TuiState::new(config),
            overlay: None,
        }
    }
}

// ============================================================================
// TuiState
// ============================================================================

/// TUI application state (non-overlay).
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// The order being built.
    pub register: OrderRegister,
    /// Active input mode.
    pub mode: InputMode,
    /// One-line feedback shown in the status bar.
    pub status: String,
    pub config: Config,
}

impl TuiState {
    pub fn new(config: Config) -> Self {
        Self {
            should_quit: false,
            register: OrderRegister::new(),
            mode: InputMode::Normal,
            status: String::new(),
            config,
        }
    }

    /// Short mode tag for the status bar.
    pub fn mode_name(&self) -> &'static str {
        match &self.mode {
            InputMode::Normal => "NORMAL",
            InputMode::Search(_) => "SEARCH",
            InputMode::RangeSelect(_) => "RANGE",
        }
    }
}

// ============================================================================
// InputMode
// ============================================================================

/// Modal input state outside the overlays.
///
/// Exactly one mode is active at a time; dropping a mode's state is what
/// resets it (a cancelled search keeps no query, an exited range-select
/// keeps no anchor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search(SearchState),
    RangeSelect(RangeSelectState),
}

/// Live menu search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Category the session was opened for; fixed for its lifetime.
    pub category: Category,
    pub query: String,
    /// Index into the current result list.
    pub highlighted: usize,
}

impl SearchState {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            query: String::new(),
            highlighted: 0,
        }
    }

    /// Current result list; the whole menu while the query is empty.
    pub fn results(&self) -> Vec<&'static DishMeta> {
        catalog::search_dishes(self.category, &self.query)
    }
}

/// Scope a range-select session is locked to for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeScope {
    /// Anchor and cursor index top-level rows.
    TopLevel,
    /// Anchor and cursor index members of the group at this row.
    Members { row: usize },
}

/// Live range-select session.
///
/// The anchor is pinned where the session started; the cursor moves. The
/// selected range is always the inclusive span between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelectState {
    pub scope: RangeScope,
    pub anchor: usize,
    pub cursor: usize,
    /// Set after the first `g` of the jump-to-top chord.
    pub chord_pending: bool,
}

impl RangeSelectState {
    pub fn new(scope: RangeScope, index: usize) -> Self {
        Self {
            scope,
            anchor: index,
            cursor: index,
            chord_pending: false,
        }
    }

    /// Inclusive `(start, end)` of the selected span.
    pub fn bounds(&self) -> (usize, usize) {
        (self.anchor.min(self.cursor), self.anchor.max(self.cursor))
    }

    /// Number of positions the cursor can take in this scope.
    pub fn scope_len(&self, register: &OrderRegister) -> usize {
        match self.scope {
            RangeScope::TopLevel => register.len(),
            RangeScope::Members { row } => register
                .row_at(row)
                .and_then(|r| r.as_group())
                .map_or(0, |group| group.members.len()),
        }
    }

    /// Selection path of the cursor position.
    pub fn cursor_path(&self) -> SelectionPath {
        match self.scope {
            RangeScope::TopLevel => SelectionPath::row(self.cursor),
            RangeScope::Members { row } => SelectionPath::member(row, self.cursor),
        }
    }
}
