//! Pure view/render functions for the TUI.
//!
//! This module contains all rendering logic. Functions here:
//! - Take `&AppState` by immutable reference
//! - Draw to a ratatui Frame
//! - Never mutate state or return effects
//!
//! The screen is two panes over a one-line status bar: the register on the
//! left, the menu (or the live search) on the right. Overlays draw last so
//! they sit on top.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use bunsik_core::catalog::{self, Category};
use bunsik_core::register::{
    OrderEntry, RegisterGroup, RegisterRow, SelectionPath, window_bounds,
};

use crate::common::truncate_with_ellipsis;
use crate::overlays::OverlayExt;
use crate::state::{AppState, InputMode, RangeScope, RangeSelectState, SearchState, TuiState};

/// Height of the status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Width share of the register pane, in percent.
const REGISTER_PANE_PERCENT: u16 = 55;

/// Renders the entire TUI to the frame.
///
/// This is a pure render function - it only reads state and draws to frame.
/// No mutations, no side effects.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(REGISTER_PANE_PERCENT),
            Constraint::Min(1),
        ])
        .split(chunks[0]);

    render_register_pane(state, frame, panes[0]);
    render_menu_pane(state, frame, panes[1]);
    render_status_line(state, frame, chunks[1]);

    // Render overlay (last, so it appears on top)
    app.overlay.render(state, frame, area);
}

// ============================================================================
// Register pane
// ============================================================================

fn render_register_pane(state: &TuiState, frame: &mut Frame, area: Rect) {
    let total_items: usize = state
        .register
        .rows()
        .iter()
        .map(RegisterRow::entry_count)
        .sum();
    let title = if total_items == 0 {
        " Order ".to_string()
    } else {
        format!(" Order ({total_items} items) ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.register.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "(no items yet)",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let (lines, selected_line) = register_lines(state, inner.width as usize);
    let total = lines.len();
    let capacity = inner.height as usize;
    let (start, end) = window_bounds(total, capacity, selected_line);

    let mut visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(end - start).collect();
    // Clipped content is flagged with a dim ellipsis row at the clipped edge.
    let clip_marker = || Line::from(Span::styled("⋮", Style::default().fg(Color::DarkGray)));
    if start > 0
        && let Some(first) = visible.first_mut()
    {
        *first = clip_marker();
    }
    if end < total
        && let Some(last) = visible.last_mut()
    {
        *last = clip_marker();
    }

    frame.render_widget(Paragraph::new(visible), inner);
}

/// Builds the register's flat display-line list: one line per entry or group
/// header, one per group member, plus a dim note subline under any entry that
/// carries notes. Returns the lines and the index of the cursor's line.
fn register_lines(state: &TuiState, width: usize) -> (Vec<Line<'static>>, Option<usize>) {
    let cursor = display_cursor(state);
    let range = match &state.mode {
        InputMode::RangeSelect(range) => Some(*range),
        _ => None,
    };

    let mut lines = Vec::new();
    let mut cursor_line = None;

    for (row_index, row) in state.register.rows().iter().enumerate() {
        let row_path = SelectionPath::row(row_index);
        let row_is_cursor = cursor == Some(row_path);
        if row_is_cursor {
            cursor_line = Some(lines.len());
        }
        match row {
            RegisterRow::Entry(entry) => {
                lines.push(entry_line(
                    entry,
                    Some(row_index),
                    row_is_cursor,
                    range_covers(range, row_path),
                    width,
                ));
                push_note_line(&mut lines, entry, 6, width);
            }
            RegisterRow::Group(group) => {
                lines.push(group_line(
                    group,
                    row_index,
                    row_is_cursor,
                    range_covers(range, row_path),
                ));
                for (member_index, member) in group.members.iter().enumerate() {
                    let path = SelectionPath::member(row_index, member_index);
                    let is_cursor = cursor == Some(path);
                    if is_cursor {
                        cursor_line = Some(lines.len());
                    }
                    lines.push(member_line(
                        member,
                        is_cursor,
                        range_covers(range, path),
                        width,
                    ));
                    push_note_line(&mut lines, member, 8, width);
                }
            }
        }
    }

    (lines, cursor_line)
}

/// The caret the user is steering: the range cursor while range-select is
/// active, the register selection otherwise.
fn display_cursor(state: &TuiState) -> Option<SelectionPath> {
    match &state.mode {
        InputMode::RangeSelect(range) => Some(range.cursor_path()),
        _ => state.register.selection(),
    }
}

fn range_covers(range: Option<RangeSelectState>, path: SelectionPath) -> bool {
    let Some(range) = range else {
        return false;
    };
    let (start, end) = range.bounds();
    match range.scope {
        RangeScope::TopLevel => path.member.is_none() && (start..=end).contains(&path.row),
        RangeScope::Members { row } => {
            path.row == row && path.member.is_some_and(|m| (start..=end).contains(&m))
        }
    }
}

fn marker_span(is_cursor: bool, in_range: bool) -> Span<'static> {
    if is_cursor {
        Span::styled("➤ ", Style::default().fg(Color::Cyan))
    } else if in_range {
        Span::styled("▌ ", Style::default().fg(Color::Magenta))
    } else {
        Span::raw("  ")
    }
}

fn category_badge(category: Option<Category>) -> Span<'static> {
    match category {
        Some(Category::Gimbap) => Span::styled(
            " G ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        Some(Category::Ramyun) => {
            Span::styled(" R ", Style::default().fg(Color::White).bg(Color::Red))
        }
        Some(Category::Side) => {
            Span::styled(" S ", Style::default().fg(Color::White).bg(Color::Blue))
        }
        None => Span::styled(" · ", Style::default().fg(Color::DarkGray)),
    }
}

fn entry_line(
    entry: &OrderEntry,
    number: Option<usize>,
    is_cursor: bool,
    in_range: bool,
    width: usize,
) -> Line<'static> {
    let mut spans = vec![marker_span(is_cursor, in_range)];
    if let Some(number) = number {
        spans.push(Span::styled(
            format!("{}. ", number + 1),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(category_badge(entry.category));
    spans.push(Span::raw(" "));

    let name_style = if is_cursor {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    // Marker (2) + number (4) + badge (4) + " [bag]" (6)
    spans.push(Span::styled(
        truncate_with_ellipsis(&entry.name, width.saturating_sub(16)),
        name_style,
    ));
    if entry.takeaway {
        spans.push(Span::styled(" [bag]", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn member_line(member: &OrderEntry, is_cursor: bool, in_range: bool, width: usize) -> Line<'static> {
    let mut spans = vec![marker_span(is_cursor, in_range), Span::raw("   ")];
    spans.push(category_badge(member.category));
    spans.push(Span::raw(" "));
    let name_style = if is_cursor {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    spans.push(Span::styled(
        truncate_with_ellipsis(&member.name, width.saturating_sub(16)),
        name_style,
    ));
    if member.takeaway {
        spans.push(Span::styled(" [bag]", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn group_line(
    group: &RegisterGroup,
    row_index: usize,
    is_cursor: bool,
    in_range: bool,
) -> Line<'static> {
    let id_style = if is_cursor {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Line::from(vec![
        marker_span(is_cursor, in_range),
        Span::styled(
            format!("{}. ", row_index + 1),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("#{}", group.id), id_style),
        Span::styled(
            format!(" ({} items)", group.members.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// Appends a dim subline of compact `[label]` tags, built-ins first in
/// catalog order, then custom text in entry order. No line when the entry
/// has no notes.
fn push_note_line(lines: &mut Vec<Line<'static>>, entry: &OrderEntry, indent: usize, width: usize) {
    let mut builtin: Vec<&str> = entry.selected_notes.iter().map(String::as_str).collect();
    builtin.sort_by_key(|id| catalog::note_catalog_index(id).unwrap_or(usize::MAX));

    let mut tags: Vec<&str> = builtin
        .into_iter()
        .map(|id| catalog::note_label(id).unwrap_or(id))
        .collect();
    tags.extend(entry.custom_notes.iter().map(String::as_str));
    if tags.is_empty() {
        return;
    }

    let tags: Vec<String> = tags.into_iter().map(|tag| format!("[{tag}]")).collect();
    let text = format!("└ {}", tags.join(" "));
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(
            truncate_with_ellipsis(&text, width.saturating_sub(indent + 1)),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
}

// ============================================================================
// Menu / search pane
// ============================================================================

fn render_menu_pane(state: &TuiState, frame: &mut Frame, area: Rect) {
    match &state.mode {
        InputMode::Search(search) => render_search_pane(search, frame, area),
        InputMode::Normal | InputMode::RangeSelect(_) => render_menu_listing(frame, area),
    }
}

fn render_menu_listing(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Menu ",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for category in [Category::Gimbap, Category::Ramyun, Category::Side] {
        let key = category.code().to_ascii_lowercase();
        lines.push(Line::from(vec![
            Span::styled(
                category.title().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {key}"), Style::default().fg(Color::DarkGray)),
        ]));
        for dish in catalog::menu(category) {
            lines.push(Line::from(Span::styled(
                format!("  {}", dish.name),
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::default());
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_search_pane(search: &SearchState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            format!(" Search {} ", search.category.title()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(search.query.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        Line::default(),
    ];

    let results = search.results();
    if results.is_empty() {
        lines.push(Line::from(Span::styled(
            "No results",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let capacity = (inner.height as usize).saturating_sub(lines.len());
    let (start, end) = window_bounds(results.len(), capacity, Some(search.highlighted));
    for (index, dish) in results.iter().enumerate().skip(start).take(end - start) {
        let is_highlighted = index == search.highlighted;
        let marker = if is_highlighted { "➤ " } else { "  " };
        let style = if is_highlighted {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Yellow)),
            Span::styled(dish.name, style),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

// ============================================================================
// Status line
// ============================================================================

/// Renders the status line: mode tag, then either the pending status message
/// or the key hints for the active mode.
fn render_status_line(state: &TuiState, frame: &mut Frame, area: Rect) {
    let (mode_color, hints): (Color, &[(&str, &str)]) = match &state.mode {
        InputMode::Normal => (
            Color::Cyan,
            &[
                ("g/r/s", " search  "),
                ("t", " tteokbokki  "),
                ("Ctrl+S", " submit  "),
                ("Ctrl+Q", " quit"),
            ],
        ),
        InputMode::Search(_) => (
            Color::Yellow,
            &[("Enter", " add  "), ("Tab", " next  "), ("Esc", " cancel")],
        ),
        InputMode::RangeSelect(_) => (
            Color::Magenta,
            &[
                ("d", " delete  "),
                ("m", " group  "),
                ("b", " bag  "),
                ("n", " notes  "),
                ("Esc", " done"),
            ],
        ),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.mode_name()),
            Style::default()
                .fg(Color::Black)
                .bg(mode_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    if state.status.is_empty() {
        for (key, action) in hints {
            spans.push(Span::styled(*key, Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw(*action));
        }
    } else {
        spans.push(Span::styled(
            state.status.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use bunsik_core::config::Config;
    use bunsik_core::grouping;

    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn state_with(ids: &[&str]) -> TuiState {
        let mut state = TuiState::new(Config::default());
        for id in ids {
            let dish = catalog::dish_by_id(id).unwrap();
            state.register.push_entry(OrderEntry::for_dish(dish));
        }
        state
    }

    #[test]
    fn register_lines_mark_the_cursor_row() {
        let mut state = state_with(&["beef_gimbap", "pork_ramyun"]);
        state.register.set_selection(Some(SelectionPath::row(1)));

        let (lines, cursor_line) = register_lines(&state, 60);
        assert_eq!(lines.len(), 2);
        assert_eq!(cursor_line, Some(1));
        assert!(line_text(&lines[1]).starts_with('➤'));
        assert!(line_text(&lines[0]).starts_with("  "));
    }

    #[test]
    fn notes_get_a_dim_subline() {
        let mut state = state_with(&["beef_gimbap"]);
        if let Some(entry) = state.register.entry_at_mut(SelectionPath::row(0)) {
            entry.set_note("no_cuccumber", true);
            entry.add_custom_note("extra sauce");
        }

        let (lines, _) = register_lines(&state, 60);
        assert_eq!(lines.len(), 2);
        let subline = line_text(&lines[1]);
        assert!(subline.contains("[No Cuccumber] [extra sauce]"));
    }

    #[test]
    fn group_rows_list_their_members_indented() {
        let mut state = state_with(&["beef_gimbap", "pork_ramyun"]);
        grouping::group_range(&mut state.register, 0, 1);
        state.register.set_selection(Some(SelectionPath::member(0, 1)));

        let (lines, cursor_line) = register_lines(&state, 60);
        assert_eq!(lines.len(), 3);
        assert!(line_text(&lines[0]).contains("#1 (2 items)"));
        assert_eq!(cursor_line, Some(2));
        assert!(line_text(&lines[2]).contains("Pork Ramyun"));
    }

    #[test]
    fn range_span_rows_carry_the_bar_marker() {
        let mut state = state_with(&["beef_gimbap", "pork_ramyun", "kimchi_side"]);
        let mut range = RangeSelectState::new(RangeScope::TopLevel, 0);
        range.cursor = 1;
        state.mode = InputMode::RangeSelect(range);

        let (lines, cursor_line) = register_lines(&state, 60);
        assert!(line_text(&lines[0]).starts_with('▌'));
        assert!(line_text(&lines[1]).starts_with('➤'));
        assert!(line_text(&lines[2]).starts_with("  "));
        assert_eq!(cursor_line, Some(1));
    }

    #[test]
    fn takeaway_entries_carry_the_bag_tag() {
        let mut state = state_with(&["beef_gimbap"]);
        if let Some(entry) = state.register.entry_at_mut(SelectionPath::row(0)) {
            entry.takeaway = true;
        }

        let (lines, _) = register_lines(&state, 60);
        assert!(line_text(&lines[0]).ends_with("[bag]"));
    }
}
