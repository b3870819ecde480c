//! Note editor overlay.
//!
//! Shows the dish's built-in notes as a checkbox list with the entry's
//! custom notes beneath, and an insert line for typing new custom text.
//! When opened over several entries at once (a group row or a range), every
//! edit applies to all of them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use bunsik_core::catalog;
use bunsik_core::notes::available_notes;
use bunsik_core::register::SelectionPath;

use super::OverlayUpdate;
use crate::mutations::{RegisterMutation, StateMutation};
use crate::state::TuiState;

/// State for the note editor overlay.
#[derive(Debug, Clone)]
pub struct NotesState {
    /// Entries every edit applies to.
    targets: Vec<SelectionPath>,
    /// Built-in note ids, resolved from the first target's dish.
    available: Vec<&'static str>,
    /// Cursor over built-ins first, then custom notes.
    cursor: usize,
    /// Custom-note text being typed, when the insert line is active.
    insert: Option<String>,
}

impl NotesState {
    /// Opens the editor over the given entries. Returns `None` when no
    /// target resolves to a live entry.
    pub fn open(tui: &TuiState, targets: Vec<SelectionPath>) -> Option<Self> {
        let first = targets
            .iter()
            .find_map(|&path| tui.register.entry_at(path))?;
        let available = available_notes(first.category, &first.dish_id);
        Some(Self {
            targets,
            available,
            cursor: 0,
            insert: None,
        })
    }

    pub fn render(&self, tui: &TuiState, frame: &mut Frame, area: Rect) {
        render_notes_overlay(frame, self, tui, area);
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if let Some(draft) = &mut self.insert {
            return match key.code {
                KeyCode::Esc => {
                    self.insert = None;
                    OverlayUpdate::stay()
                }
                KeyCode::Enter => {
                    let text = draft.trim().to_string();
                    self.insert = None;
                    if text.is_empty() {
                        OverlayUpdate::stay()
                    } else {
                        OverlayUpdate::stay().with_mutations(vec![StateMutation::Register(
                            RegisterMutation::AddCustomNote {
                                targets: self.targets.clone(),
                                text,
                            },
                        )])
                    }
                }
                KeyCode::Backspace => {
                    draft.pop();
                    OverlayUpdate::stay()
                }
                KeyCode::Char(c) if !ctrl => {
                    draft.push(c);
                    OverlayUpdate::stay()
                }
                _ => OverlayUpdate::stay(),
            };
        }

        // The custom list shrinks when a note is deleted; keep the cursor
        // on a live row before acting on it.
        let rows = self.row_count(tui);
        if rows > 0 {
            self.cursor = self.cursor.min(rows - 1);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('c') if key.code == KeyCode::Esc || ctrl => {
                OverlayUpdate::close()
            }
            KeyCode::Char('q') => OverlayUpdate::close(),
            KeyCode::Char('j') | KeyCode::Down => {
                if rows > 0 {
                    self.cursor = (self.cursor + 1) % rows;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if rows > 0 {
                    self.cursor = (self.cursor + rows - 1) % rows;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Char('i') => {
                self.insert = Some(String::new());
                OverlayUpdate::stay()
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_under_cursor(tui),
            _ => OverlayUpdate::stay(),
        }
    }

    fn toggle_under_cursor(&self, tui: &TuiState) -> OverlayUpdate {
        if let Some(&note_id) = self.available.get(self.cursor) {
            let on = !self.all_have(tui, note_id);
            return OverlayUpdate::stay().with_mutations(vec![StateMutation::Register(
                RegisterMutation::SetNote {
                    targets: self.targets.clone(),
                    note_id: note_id.to_string(),
                    on,
                },
            )]);
        }
        let custom_index = self.cursor - self.available.len();
        if let Some(text) = self.customs(tui).get(custom_index) {
            return OverlayUpdate::stay().with_mutations(vec![StateMutation::Register(
                RegisterMutation::RemoveCustomNote {
                    targets: self.targets.clone(),
                    text: text.clone(),
                },
            )]);
        }
        OverlayUpdate::stay()
    }

    /// Custom notes shown in the list, read live from the first target.
    fn customs<'a>(&self, tui: &'a TuiState) -> &'a [String] {
        self.targets
            .iter()
            .find_map(|&path| tui.register.entry_at(path))
            .map_or(&[], |entry| entry.custom_notes.as_slice())
    }

    fn row_count(&self, tui: &TuiState) -> usize {
        self.available.len() + self.customs(tui).len()
    }

    /// True when every live target carries the note.
    fn all_have(&self, tui: &TuiState, note_id: &str) -> bool {
        self.targets
            .iter()
            .filter_map(|&path| tui.register.entry_at(path))
            .all(|entry| entry.has_note(note_id))
    }

    /// True when at least one live target carries the note.
    fn any_has(&self, tui: &TuiState, note_id: &str) -> bool {
        self.targets
            .iter()
            .filter_map(|&path| tui.register.entry_at(path))
            .any(|entry| entry.has_note(note_id))
    }
}

fn render_notes_overlay(frame: &mut Frame, state: &NotesState, tui: &TuiState, area: Rect) {
    use super::render_utils::{
        InputHint, InputLine, OverlayConfig, render_input_line, render_overlay,
    };

    let customs = state.customs(tui);
    let rows = state.available.len() + customs.len();

    let title = if state.targets.len() > 1 {
        format!("Notes ({} items)", state.targets.len())
    } else {
        "Notes".to_string()
    };

    let insert_height = u16::from(state.insert.is_some());
    let overlay_width = 44;
    let overlay_height = (rows.max(1) as u16 + insert_height + 3).max(6);

    let hints = if state.insert.is_some() {
        vec![InputHint::new("Enter", "add"), InputHint::new("Esc", "back")]
    } else {
        vec![
            InputHint::new("Enter", "toggle"),
            InputHint::new("I", "custom"),
            InputHint::new("Esc", "close"),
        ]
    };
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: &title,
            border_color: Color::Cyan,
            width: overlay_width,
            height: overlay_height,
            hints: &hints,
        },
    );

    if rows == 0 && state.insert.is_none() {
        let empty = Line::from(Span::styled(
            "No note options for this dish.",
            Style::default().fg(Color::DarkGray),
        ));
        let empty_area = Rect::new(layout.body.x, layout.body.y, layout.body.width, 1);
        frame.render_widget(Paragraph::new(empty), empty_area);
        return;
    }

    let mut y = layout.body.y;
    for (index, note_id) in state.available.iter().enumerate() {
        if y >= layout.body.y + layout.body.height {
            break;
        }
        let marker = if state.all_have(tui, note_id) {
            "[x]"
        } else if state.any_has(tui, note_id) {
            "[~]"
        } else {
            "[ ]"
        };
        let label = catalog::note_label(note_id).unwrap_or(note_id);
        render_note_row(
            frame,
            layout.body,
            y,
            marker,
            label,
            state.insert.is_none() && index == state.cursor,
            false,
        );
        y += 1;
    }
    for (index, text) in customs.iter().enumerate() {
        if y >= layout.body.y + layout.body.height {
            break;
        }
        render_note_row(
            frame,
            layout.body,
            y,
            "[x]",
            text,
            state.insert.is_none() && state.available.len() + index == state.cursor,
            true,
        );
        y += 1;
    }

    if let Some(draft) = &state.insert {
        let input_area = Rect::new(layout.body.x, y, layout.body.width, 1);
        render_input_line(
            frame,
            input_area,
            &InputLine {
                value: draft,
                placeholder: Some("type a note"),
                prompt: "> ",
                prompt_color: Color::DarkGray,
                text_color: Color::Cyan,
                placeholder_color: Color::DarkGray,
                cursor_color: Color::Cyan,
            },
        );
    }
}

fn render_note_row(
    frame: &mut Frame,
    body: Rect,
    y: u16,
    marker: &str,
    label: &str,
    highlighted: bool,
    custom: bool,
) {
    let pointer = if highlighted { "➤ " } else { "  " };
    let mut label_style = if custom {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    if highlighted {
        label_style = label_style.add_modifier(Modifier::BOLD);
    }
    let spans = vec![
        Span::styled(pointer, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{marker} "), Style::default().fg(Color::DarkGray)),
        Span::styled(label.to_string(), label_style),
    ];
    let row_area = Rect::new(body.x, y, body.width, 1);
    frame.render_widget(Paragraph::new(Line::from(spans)), row_area);
}

#[cfg(test)]
mod tests {
    use bunsik_core::config::Config;
    use bunsik_core::register::OrderEntry;

    use super::*;
    use crate::mutations::apply_mutations;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with(dish_ids: &[&str]) -> TuiState {
        let mut tui = TuiState::new(Config::default());
        for id in dish_ids {
            let dish = catalog::dish_by_id(id).unwrap();
            tui.register.push_entry(OrderEntry::for_dish(dish));
        }
        tui
    }

    #[test]
    fn toggle_sets_the_note_on_every_target() {
        let mut tui = state_with(&["pork_ramyun", "pork_ramyun"]);
        let targets = vec![SelectionPath::row(0), SelectionPath::row(1)];
        let mut notes = NotesState::open(&tui, targets).unwrap();

        let update = notes.handle_key(&tui, key(KeyCode::Enter));
        apply_mutations(&mut tui, update.mutations);

        let first_note = notes.available[0];
        assert!(tui.register.entry_at(SelectionPath::row(0)).unwrap().has_note(first_note));
        assert!(tui.register.entry_at(SelectionPath::row(1)).unwrap().has_note(first_note));
    }

    #[test]
    fn toggle_removes_when_all_targets_have_it() {
        let mut tui = state_with(&["pork_ramyun", "pork_ramyun"]);
        let targets = vec![SelectionPath::row(0), SelectionPath::row(1)];
        let mut notes = NotesState::open(&tui, targets).unwrap();
        let note_id = notes.available[0];

        // One target already has it: toggling first completes the set.
        tui.register
            .entry_at_mut(SelectionPath::row(0))
            .unwrap()
            .set_note(note_id, true);
        let update = notes.handle_key(&tui, key(KeyCode::Enter));
        apply_mutations(&mut tui, update.mutations);
        assert!(tui.register.entry_at(SelectionPath::row(1)).unwrap().has_note(note_id));

        // Now every target has it: toggling clears them all.
        let update = notes.handle_key(&tui, key(KeyCode::Enter));
        apply_mutations(&mut tui, update.mutations);
        assert!(!tui.register.entry_at(SelectionPath::row(0)).unwrap().has_note(note_id));
        assert!(!tui.register.entry_at(SelectionPath::row(1)).unwrap().has_note(note_id));
    }

    #[test]
    fn insert_commits_a_custom_note() {
        let mut tui = state_with(&["tteokbokki"]);
        let mut notes = NotesState::open(&tui, vec![SelectionPath::row(0)]).unwrap();

        notes.handle_key(&tui, key(KeyCode::Char('i')));
        for c in "extra sauce".chars() {
            notes.handle_key(&tui, key(KeyCode::Char(c)));
        }
        let update = notes.handle_key(&tui, key(KeyCode::Enter));
        apply_mutations(&mut tui, update.mutations);

        let entry = tui.register.entry_at(SelectionPath::row(0)).unwrap();
        assert_eq!(entry.custom_notes, ["extra sauce"]);
        assert!(notes.insert.is_none());
    }

    #[test]
    fn enter_on_a_custom_row_deletes_it() {
        let mut tui = state_with(&["kimchi_side"]);
        tui.register
            .entry_at_mut(SelectionPath::row(0))
            .unwrap()
            .add_custom_note("no ice");
        let mut notes = NotesState::open(&tui, vec![SelectionPath::row(0)]).unwrap();

        // Side dishes have no built-in notes, so row zero is the custom.
        assert!(notes.available.is_empty());
        let update = notes.handle_key(&tui, key(KeyCode::Enter));
        apply_mutations(&mut tui, update.mutations);
        assert!(
            tui.register
                .entry_at(SelectionPath::row(0))
                .unwrap()
                .custom_notes
                .is_empty()
        );
    }

    #[test]
    fn open_requires_a_live_target() {
        let tui = state_with(&[]);
        assert!(NotesState::open(&tui, vec![SelectionPath::row(0)]).is_none());
    }

    #[test]
    fn cursor_wraps_over_builtins_and_customs() {
        let mut tui = state_with(&["tteokbokki"]);
        tui.register
            .entry_at_mut(SelectionPath::row(0))
            .unwrap()
            .add_custom_note("vegan");
        let mut notes = NotesState::open(&tui, vec![SelectionPath::row(0)]).unwrap();
        let rows = notes.available.len() + 1;

        notes.handle_key(&tui, key(KeyCode::Char('k')));
        assert_eq!(notes.cursor, rows - 1);
        notes.handle_key(&tui, key(KeyCode::Char('j')));
        assert_eq!(notes.cursor, 0);
    }
}
