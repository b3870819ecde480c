//! State mutations requested by overlays and applied by the reducer.
//!
//! Overlay key handlers read `TuiState` immutably; anything they want
//! changed comes back as a mutation, applied by `apply_mutations` after the
//! handler returns. This keeps overlay code free of borrow juggling.

use bunsik_core::register::{OrderRegister, SelectionPath};

use crate::state::TuiState;

/// A deferred mutation of [`TuiState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMutation {
    Register(RegisterMutation),
    /// Replaces the status line.
    SetStatus(String),
}

/// Edits to entries in the order register.
///
/// Each variant applies to every target path; paths that no longer resolve
/// to an entry are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterMutation {
    /// Sets a built-in note on or off.
    SetNote {
        targets: Vec<SelectionPath>,
        note_id: String,
        on: bool,
    },
    /// Appends a custom note (duplicates are suppressed per entry).
    AddCustomNote {
        targets: Vec<SelectionPath>,
        text: String,
    },
    /// Removes a custom note wherever present.
    RemoveCustomNote {
        targets: Vec<SelectionPath>,
        text: String,
    },
}

/// Applies mutations in order.
pub fn apply_mutations(tui: &mut TuiState, mutations: Vec<StateMutation>) {
    for mutation in mutations {
        match mutation {
            StateMutation::Register(register_mutation) => {
                apply_register_mutation(&mut tui.register, register_mutation);
            }
            StateMutation::SetStatus(status) => tui.status = status,
        }
    }
}

fn apply_register_mutation(register: &mut OrderRegister, mutation: RegisterMutation) {
    match mutation {
        RegisterMutation::SetNote { targets, note_id, on } => {
            for path in targets {
                if let Some(entry) = register.entry_at_mut(path) {
                    entry.set_note(&note_id, on);
                }
            }
        }
        RegisterMutation::AddCustomNote { targets, text } => {
            for path in targets {
                if let Some(entry) = register.entry_at_mut(path) {
                    entry.add_custom_note(&text);
                }
            }
        }
        RegisterMutation::RemoveCustomNote { targets, text } => {
            for path in targets {
                if let Some(entry) = register.entry_at_mut(path) {
                    entry.remove_custom_note(&text);
                }
            }
        }
    }
}
