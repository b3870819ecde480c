//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is the single source of truth for how events modify state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use bunsik_core::catalog::{self, Category};
use bunsik_core::grouping;
use bunsik_core::register::{OrderEntry, OrderRegister, SelectionPath};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::mutations::apply_mutations;
use crate::overlays::{self, Overlay, OverlayRequest, OverlayTransition, OverlayUpdate};
use crate::state::{AppState, InputMode, RangeScope, RangeSelectState, SearchState, TuiState};

/// Status shown when submit is requested outside normal mode.
const SUBMIT_MODE_STATUS: &str = "Submit only in NORMAL mode (Esc to exit)";

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Key(key) => handle_key(app, key),
        UiEvent::Resize => Vec::new(),
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Try to dispatch to the active overlay
    if let Some(mut update) = overlays::handle_overlay_key(&app.tui, &mut app.overlay, key) {
        apply_mutations(&mut app.tui, std::mem::take(&mut update.mutations));
        return apply_overlay_update(app, update);
    }

    // Ctrl+Q quits from any mode; Ctrl+C is mode-dependent (it cancels an
    // active search or range-select instead of quitting).
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        return vec![UiEffect::Quit];
    }

    let (effects, overlay_request) = match app.tui.mode {
        InputMode::Normal => handle_normal_key(&mut app.tui, key),
        InputMode::Search(_) => handle_search_key(&mut app.tui, key),
        InputMode::RangeSelect(_) => handle_range_key(&mut app.tui, key),
    };

    if let Some(request) = overlay_request
        && app.overlay.is_none()
    {
        open_overlay_request(app, request);
    }

    effects
}

fn apply_overlay_update(app: &mut AppState, update: OverlayUpdate) -> Vec<UiEffect> {
    match update.transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => app.overlay = None,
    }
    update.effects
}

fn open_overlay_request(app: &mut AppState, request: OverlayRequest) {
    match request {
        OverlayRequest::Notes { targets } => {
            if let Some(state) = overlays::NotesState::open(&app.tui, targets) {
                app.overlay = Some(Overlay::Notes(state));
            }
        }
        OverlayRequest::OrderNumber => {
            app.overlay = Some(Overlay::OrderNumber(overlays::OrderNumberState::open()));
        }
    }
}

// ============================================================================
// Normal Mode
// ============================================================================

fn handle_normal_key(
    tui: &mut TuiState,
    key: KeyEvent,
) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match key.code {
            KeyCode::Char('c') => (vec![UiEffect::Quit], None),
            KeyCode::Char('s') => begin_submit(tui),
            _ => (Vec::new(), None),
        };
    }

    match key.code {
        KeyCode::Esc => tui.status.clear(),
        KeyCode::Char('j') | KeyCode::Down => tui.register.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => tui.register.move_selection(-1),
        KeyCode::Char('J') => reorder_selection(tui, 1),
        KeyCode::Char('K') => reorder_selection(tui, -1),
        KeyCode::Char('l') | KeyCode::Right => {
            tui.register.descend();
        }
        KeyCode::Char('h') | KeyCode::Left => {
            tui.register.ascend();
        }
        KeyCode::Char('d') => delete_selection(tui),
        KeyCode::Char('t') => quick_add(tui),
        KeyCode::Char('b') => {
            let targets = selection_targets(&tui.register);
            toggle_takeaway(&mut tui.register, &targets);
        }
        KeyCode::Char('B') => {
            let targets = tui.register.all_entry_paths();
            toggle_takeaway(&mut tui.register, &targets);
        }
        KeyCode::Char('m') => group_selection(tui),
        KeyCode::Char('u') => ungroup_selection(tui),
        KeyCode::Char('v') => enter_range_select(tui),
        KeyCode::Char('n') => {
            let targets = selection_targets(&tui.register);
            if !targets.is_empty() {
                return (Vec::new(), Some(OverlayRequest::Notes { targets }));
            }
        }
        KeyCode::Char('g') => tui.mode = InputMode::Search(SearchState::new(Category::Gimbap)),
        KeyCode::Char('r') => tui.mode = InputMode::Search(SearchState::new(Category::Ramyun)),
        KeyCode::Char('s') => tui.mode = InputMode::Search(SearchState::new(Category::Side)),
        _ => {}
    }
    (Vec::new(), None)
}

fn begin_submit(tui: &mut TuiState) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    if tui.register.is_empty() {
        tui.status = "Nothing to submit".to_string();
        return (Vec::new(), None);
    }
    if tui.config.ask_order_number {
        (Vec::new(), Some(OverlayRequest::OrderNumber))
    } else {
        (
            vec![UiEffect::Submit {
                order_number: 0,
                unpaid: false,
            }],
            None,
        )
    }
}

fn reorder_selection(tui: &mut TuiState, delta: isize) {
    let Some(sel) = tui.register.selection() else {
        return;
    };
    match sel.member {
        Some(member) => {
            tui.register.swap_member(sel.row, member, delta);
        }
        None => {
            tui.register.swap_row(sel.row, delta);
        }
    }
}

fn delete_selection(tui: &mut TuiState) {
    if let Some(sel) = tui.register.selection() {
        tui.register.delete_at(sel);
    }
}

fn quick_add(tui: &mut TuiState) {
    if let Some(dish) = catalog::dish_by_id(catalog::QUICK_ADD_DISH_ID) {
        tui.register.push_entry(OrderEntry::for_dish(dish));
    }
}

fn group_selection(tui: &mut TuiState) {
    let Some(sel) = tui.register.selection() else {
        return;
    };
    if sel.member.is_some() {
        return;
    }
    if !grouping::group_range(&mut tui.register, sel.row, sel.row) {
        tui.status = "Can't group a group".to_string();
    }
}

fn ungroup_selection(tui: &mut TuiState) {
    if let Some(sel) = tui.register.selection()
        && sel.member.is_none()
    {
        grouping::ungroup_at(&mut tui.register, sel.row);
    }
}

fn enter_range_select(tui: &mut TuiState) {
    let Some(sel) = tui.register.selection() else {
        return;
    };
    let state = match sel.member {
        Some(member) => RangeSelectState::new(RangeScope::Members { row: sel.row }, member),
        None => RangeSelectState::new(RangeScope::TopLevel, sel.row),
    };
    tui.mode = InputMode::RangeSelect(state);
}

/// Entry paths the selection stands for: a group row expands to all of its
/// members, anything else is just itself.
fn selection_targets(register: &OrderRegister) -> Vec<SelectionPath> {
    let Some(sel) = register.selection() else {
        return Vec::new();
    };
    match (register.row_at(sel.row), sel.member) {
        (Some(row), None) if row.is_group() => register.entry_paths_in_rows(sel.row, sel.row),
        _ => vec![sel],
    }
}

/// All-or-none takeaway flip: if every target is already flagged, clear them
/// all; otherwise flag them all.
fn toggle_takeaway(register: &mut OrderRegister, targets: &[SelectionPath]) {
    if targets.is_empty() {
        return;
    }
    let all_on = targets
        .iter()
        .filter_map(|&path| register.entry_at(path))
        .all(|entry| entry.takeaway);
    let on = !all_on;
    for &path in targets {
        if let Some(entry) = register.entry_at_mut(path) {
            entry.takeaway = on;
        }
    }
}

// ============================================================================
// Search Mode
// ============================================================================

fn handle_search_key(
    tui: &mut TuiState,
    key: KeyEvent,
) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('s') {
        tui.status = SUBMIT_MODE_STATUS.to_string();
        return (Vec::new(), None);
    }
    if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
        // Dropping the search state is what clears the query.
        tui.mode = InputMode::Normal;
        return (Vec::new(), None);
    }

    let InputMode::Search(search) = &mut tui.mode else {
        return (Vec::new(), None);
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            let len = search.results().len();
            if len > 0 {
                search.highlighted = (search.highlighted + 1) % len;
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            let len = search.results().len();
            if len > 0 {
                search.highlighted = (search.highlighted + len - 1) % len;
            }
        }
        KeyCode::Enter => {
            if let Some(&dish) = search.results().get(search.highlighted) {
                tui.mode = InputMode::Normal;
                tui.register.push_entry(OrderEntry::for_dish(dish));
            }
        }
        KeyCode::Backspace => {
            search.query.pop();
            search.highlighted = 0;
        }
        KeyCode::Char(c) if !ctrl && c.is_alphanumeric() => {
            search.query.push(c);
            search.highlighted = 0;
        }
        _ => {}
    }
    (Vec::new(), None)
}

// ============================================================================
// Range-Select Mode
// ============================================================================

fn handle_range_key(
    tui: &mut TuiState,
    key: KeyEvent,
) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('s') {
        tui.status = SUBMIT_MODE_STATUS.to_string();
        return (Vec::new(), None);
    }

    let InputMode::RangeSelect(range) = &tui.mode else {
        return (Vec::new(), None);
    };
    let mut range = *range;

    // Any key other than a second `g` cancels a pending jump chord (and
    // still acts normally).
    let chord_was_pending = range.chord_pending;
    range.chord_pending = false;

    let (start, end) = range.bounds();
    let scope_len = range.scope_len(&tui.register);

    match key.code {
        KeyCode::Esc | KeyCode::Char('c') if key.code == KeyCode::Esc || ctrl => {
            return exit_range_select(tui, range);
        }
        KeyCode::Char('v') => {
            return exit_range_select(tui, range);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if range.cursor + 1 < scope_len {
                range.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            range.cursor = range.cursor.saturating_sub(1);
        }
        KeyCode::Char('g') => {
            if chord_was_pending {
                range.cursor = 0;
            } else {
                range.chord_pending = true;
            }
        }
        KeyCode::Char('G') => {
            if scope_len > 0 {
                range.cursor = scope_len - 1;
            }
        }
        KeyCode::Char('d') => {
            let removed = match range.scope {
                RangeScope::TopLevel => tui.register.delete_row_range(start, end),
                RangeScope::Members { row } => tui.register.delete_member_range(row, start, end),
            };
            if removed {
                tui.mode = InputMode::Normal;
                return (Vec::new(), None);
            }
        }
        KeyCode::Char('m') => {
            if matches!(range.scope, RangeScope::TopLevel) {
                if grouping::group_range(&mut tui.register, start, end) {
                    tui.mode = InputMode::Normal;
                    return (Vec::new(), None);
                }
                tui.status = "Can't group a group".to_string();
            }
        }
        KeyCode::Char('u') => {
            if matches!(range.scope, RangeScope::TopLevel) {
                // Back to front so splices don't shift unprocessed indexes.
                let mut any = false;
                for index in (start..=end).rev() {
                    any |= grouping::ungroup_at(&mut tui.register, index);
                }
                if any {
                    tui.register.set_selection(Some(SelectionPath::row(start)));
                    tui.mode = InputMode::Normal;
                    return (Vec::new(), None);
                }
            }
        }
        KeyCode::Char('b') => {
            let targets = range_targets(&tui.register, range);
            toggle_takeaway(&mut tui.register, &targets);
        }
        KeyCode::Char('n') => {
            let targets = range_targets(&tui.register, range);
            if !targets.is_empty() {
                tui.mode = InputMode::RangeSelect(range);
                return (Vec::new(), Some(OverlayRequest::Notes { targets }));
            }
        }
        KeyCode::Char('J') => {
            let moved = match range.scope {
                RangeScope::TopLevel => tui.register.move_row_range(start, end, 1),
                RangeScope::Members { row } => {
                    tui.register.move_member_range(row, start, end, 1)
                }
            };
            if moved {
                range.anchor += 1;
                range.cursor += 1;
            }
        }
        KeyCode::Char('K') => {
            let moved = match range.scope {
                RangeScope::TopLevel => tui.register.move_row_range(start, end, -1),
                RangeScope::Members { row } => {
                    tui.register.move_member_range(row, start, end, -1)
                }
            };
            if moved {
                range.anchor -= 1;
                range.cursor -= 1;
            }
        }
        _ => {}
    }

    tui.mode = InputMode::RangeSelect(range);
    (Vec::new(), None)
}

/// Leaves range-select, collapsing the selection onto the cursor.
fn exit_range_select(
    tui: &mut TuiState,
    range: RangeSelectState,
) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    tui.register.set_selection(Some(range.cursor_path()));
    tui.mode = InputMode::Normal;
    (Vec::new(), None)
}

/// Entry paths covered by the range span.
fn range_targets(register: &OrderRegister, range: RangeSelectState) -> Vec<SelectionPath> {
    let (start, end) = range.bounds();
    match range.scope {
        RangeScope::TopLevel => register.entry_paths_in_rows(start, end),
        RangeScope::Members { row } => (start..=end)
            .map(|member| SelectionPath::member(row, member))
            .collect(),
    }
}
