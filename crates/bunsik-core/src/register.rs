//! The order register: the ordered row collection being built for one ticket,
//! plus its selection path and viewport windowing.
//!
//! Rows are either plain entries or numbered groups of entries. The register
//! owns every entry until submission copies them out. All mutating operations
//! re-normalize the selection so it never points at a dead row or member.

use std::collections::BTreeSet;
use std::slice;

use crate::catalog::{Category, DishMeta};

// ============================================================================
// Rows
// ============================================================================

/// One orderable dish line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub dish_id: String,
    pub name: String,
    pub category: Option<Category>,
    /// Selected built-in note ids.
    pub selected_notes: BTreeSet<String>,
    /// Free-text notes in entry order. Duplicates are suppressed on insert.
    pub custom_notes: Vec<String>,
    pub takeaway: bool,
}

impl OrderEntry {
    pub fn new(dish_id: impl Into<String>, name: impl Into<String>, category: Option<Category>) -> Self {
        Self {
            dish_id: dish_id.into(),
            name: name.into(),
            category,
            selected_notes: BTreeSet::new(),
            custom_notes: Vec::new(),
            takeaway: false,
        }
    }

    pub fn for_dish(dish: &DishMeta) -> Self {
        Self::new(dish.id, dish.name, dish.category)
    }

    pub fn has_note(&self, id: &str) -> bool {
        self.selected_notes.contains(id)
    }

    pub fn set_note(&mut self, id: &str, on: bool) {
        if on {
            self.selected_notes.insert(id.to_string());
        } else {
            self.selected_notes.remove(id);
        }
    }

    pub fn has_custom_note(&self, text: &str) -> bool {
        self.custom_notes.iter().any(|note| note == text)
    }

    pub fn add_custom_note(&mut self, text: &str) {
        if !text.is_empty() && !self.has_custom_note(text) {
            self.custom_notes.push(text.to_string());
        }
    }

    pub fn remove_custom_note(&mut self, text: &str) {
        self.custom_notes.retain(|note| note != text);
    }
}

/// A numbered cluster of entries that reorders and prints as one unit.
///
/// Member lists are never empty: the register dissolves a group the moment
/// its last member is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterGroup {
    pub id: u32,
    pub members: Vec<OrderEntry>,
}

/// A top-level register row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterRow {
    Entry(OrderEntry),
    Group(RegisterGroup),
}

impl RegisterRow {
    pub fn as_group(&self) -> Option<&RegisterGroup> {
        match self {
            RegisterRow::Group(group) => Some(group),
            RegisterRow::Entry(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, RegisterRow::Group(_))
    }

    /// Number of entries this row contributes to the ticket.
    pub fn entry_count(&self) -> usize {
        match self {
            RegisterRow::Entry(_) => 1,
            RegisterRow::Group(group) => group.members.len(),
        }
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Points at a top-level row, or at one member inside a group row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPath {
    pub row: usize,
    /// Set only while descended into the group at `row`.
    pub member: Option<usize>,
}

impl SelectionPath {
    pub fn row(row: usize) -> Self {
        Self { row, member: None }
    }

    pub fn member(row: usize, member: usize) -> Self {
        Self { row, member: Some(member) }
    }
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct OrderRegister {
    rows: Vec<RegisterRow>,
    selection: Option<SelectionPath>,
    next_group_id: u32,
}

impl OrderRegister {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            selection: None,
            next_group_id: 1,
        }
    }

    pub fn rows(&self) -> &[RegisterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selection(&self) -> Option<SelectionPath> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<SelectionPath>) {
        self.selection = selection;
        self.normalize_selection();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.selection = None;
        self.next_group_id = 1;
    }

    pub fn row_at(&self, index: usize) -> Option<&RegisterRow> {
        self.rows.get(index)
    }

    /// All entries in register order, groups expanded in place.
    pub fn entries(&self) -> impl Iterator<Item = &OrderEntry> {
        self.rows.iter().flat_map(|row| match row {
            RegisterRow::Entry(entry) => slice::from_ref(entry).iter(),
            RegisterRow::Group(group) => group.members.iter(),
        })
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut OrderEntry> {
        self.rows.iter_mut().flat_map(|row| match row {
            RegisterRow::Entry(entry) => slice::from_mut(entry).iter_mut(),
            RegisterRow::Group(group) => group.members.iter_mut(),
        })
    }

    /// The single entry a path points at. A path on a group row without a
    /// member index resolves to `None`.
    pub fn entry_at(&self, path: SelectionPath) -> Option<&OrderEntry> {
        match (self.rows.get(path.row)?, path.member) {
            (RegisterRow::Entry(entry), None) => Some(entry),
            (RegisterRow::Group(group), Some(member)) => group.members.get(member),
            _ => None,
        }
    }

    pub fn entry_at_mut(&mut self, path: SelectionPath) -> Option<&mut OrderEntry> {
        match (self.rows.get_mut(path.row)?, path.member) {
            (RegisterRow::Entry(entry), None) => Some(entry),
            (RegisterRow::Group(group), Some(member)) => group.members.get_mut(member),
            _ => None,
        }
    }

    pub fn selected_entry(&self) -> Option<&OrderEntry> {
        self.entry_at(self.selection?)
    }

    /// Paths of every entry in the inclusive top-level row range, groups
    /// expanded to one path per member.
    pub fn entry_paths_in_rows(&self, start: usize, end: usize) -> Vec<SelectionPath> {
        let mut paths = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            if index < start || index > end {
                continue;
            }
            match row {
                RegisterRow::Entry(_) => paths.push(SelectionPath::row(index)),
                RegisterRow::Group(group) => {
                    paths.extend((0..group.members.len()).map(|m| SelectionPath::member(index, m)));
                }
            }
        }
        paths
    }

    pub fn all_entry_paths(&self) -> Vec<SelectionPath> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        self.entry_paths_in_rows(0, self.rows.len() - 1)
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Appends a plain entry and selects it.
    pub fn push_entry(&mut self, entry: OrderEntry) {
        self.rows.push(RegisterRow::Entry(entry));
        self.selection = Some(SelectionPath::row(self.rows.len() - 1));
    }

    /// Deletes the row or member at a path. Deleting a group's last member
    /// dissolves the group row itself.
    pub fn delete_at(&mut self, path: SelectionPath) -> bool {
        match path.member {
            Some(member) => self.delete_member_range(path.row, member, member),
            None => self.delete_row_range(path.row, path.row),
        }
    }

    /// Deletes the inclusive top-level row range. Selection lands on the row
    /// that slid into the range's start position.
    pub fn delete_row_range(&mut self, start: usize, end: usize) -> bool {
        if start > end || end >= self.rows.len() {
            return false;
        }
        self.rows.drain(start..=end);
        self.renumber_groups();
        self.selection = Some(SelectionPath::row(start));
        self.normalize_selection();
        true
    }

    /// Deletes the inclusive member range inside the group at `row`,
    /// dissolving the group if that empties it.
    pub fn delete_member_range(&mut self, row: usize, start: usize, end: usize) -> bool {
        let Some(RegisterRow::Group(group)) = self.rows.get_mut(row) else {
            return false;
        };
        if start > end || end >= group.members.len() {
            return false;
        }
        group.members.drain(start..=end);
        if group.members.is_empty() {
            self.rows.remove(row);
            self.renumber_groups();
            self.selection = Some(SelectionPath::row(row));
        } else {
            self.selection = Some(SelectionPath::member(row, start));
        }
        self.normalize_selection();
        true
    }

    /// Swaps a top-level row with its neighbor. Groups move as a unit.
    /// No-op at either boundary.
    pub fn swap_row(&mut self, index: usize, delta: isize) -> bool {
        let Some(target) = offset_index(index, delta, self.rows.len()) else {
            return false;
        };
        self.rows.swap(index, target);
        if let Some(sel) = &mut self.selection
            && sel.row == index
        {
            sel.row = target;
        }
        true
    }

    /// Swaps a member with its neighbor inside the group at `row`.
    pub fn swap_member(&mut self, row: usize, member: usize, delta: isize) -> bool {
        let Some(RegisterRow::Group(group)) = self.rows.get_mut(row) else {
            return false;
        };
        let Some(target) = offset_index(member, delta, group.members.len()) else {
            return false;
        };
        group.members.swap(member, target);
        if let Some(sel) = &mut self.selection
            && sel.row == row
            && sel.member == Some(member)
        {
            sel.member = Some(target);
        }
        true
    }

    /// Moves the inclusive top-level row range by one position; the displaced
    /// neighbor hops over the whole range. No-op at either boundary, and for
    /// any step other than one.
    pub fn move_row_range(&mut self, start: usize, end: usize, delta: isize) -> bool {
        if start > end || end >= self.rows.len() {
            return false;
        }
        match delta {
            -1 if start > 0 => self.rows[start - 1..=end].rotate_left(1),
            1 if end + 1 < self.rows.len() => self.rows[start..=end + 1].rotate_right(1),
            _ => return false,
        }
        if let Some(sel) = &mut self.selection {
            if (start..=end).contains(&sel.row) {
                sel.row = (sel.row as isize + delta) as usize;
            } else if delta == -1 && sel.row == start - 1 {
                sel.row = end;
            } else if delta == 1 && sel.row == end + 1 {
                sel.row = start;
            }
        }
        true
    }

    /// Moves the inclusive member range inside the group at `row` by one.
    pub fn move_member_range(&mut self, row: usize, start: usize, end: usize, delta: isize) -> bool {
        let Some(RegisterRow::Group(group)) = self.rows.get_mut(row) else {
            return false;
        };
        if start > end || end >= group.members.len() {
            return false;
        }
        match delta {
            -1 if start > 0 => group.members[start - 1..=end].rotate_left(1),
            1 if end + 1 < group.members.len() => group.members[start..=end + 1].rotate_right(1),
            _ => return false,
        }
        if let Some(sel) = &mut self.selection
            && sel.row == row
            && let Some(member) = sel.member
        {
            if (start..=end).contains(&member) {
                sel.member = Some((member as isize + delta) as usize);
            } else if delta == -1 && member == start - 1 {
                sel.member = Some(end);
            } else if delta == 1 && member == end + 1 {
                sel.member = Some(start);
            }
        }
        true
    }

    /// Moves the selection by one in its current scope, wrapping at the ends.
    pub fn move_selection(&mut self, delta: isize) {
        let Some(sel) = self.selection else {
            if !self.rows.is_empty() {
                self.selection = Some(SelectionPath::row(0));
            }
            return;
        };
        match sel.member {
            Some(member) => {
                if let Some(RegisterRow::Group(group)) = self.rows.get(sel.row) {
                    let next = wrap_index(member, delta, group.members.len());
                    self.selection = Some(SelectionPath::member(sel.row, next));
                }
            }
            None => {
                let next = wrap_index(sel.row, delta, self.rows.len());
                self.selection = Some(SelectionPath::row(next));
            }
        }
    }

    /// Enters the selected group, selecting its first member.
    pub fn descend(&mut self) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        if sel.member.is_none()
            && let Some(RegisterRow::Group(_)) = self.rows.get(sel.row)
        {
            self.selection = Some(SelectionPath::member(sel.row, 0));
            return true;
        }
        false
    }

    /// Leaves member scope, selecting the enclosing group row.
    pub fn ascend(&mut self) -> bool {
        if let Some(sel) = self.selection
            && sel.member.is_some()
        {
            self.selection = Some(SelectionPath::row(sel.row));
            return true;
        }
        false
    }

    /// Clamps the selection back onto a live row (and live member, when the
    /// row is still a group). Call after any structural mutation.
    pub fn normalize_selection(&mut self) {
        let Some(mut sel) = self.selection else {
            return;
        };
        if self.rows.is_empty() {
            self.selection = None;
            return;
        }
        sel.row = sel.row.min(self.rows.len() - 1);
        sel.member = match (&self.rows[sel.row], sel.member) {
            (RegisterRow::Group(group), Some(member)) => Some(member.min(group.members.len() - 1)),
            _ => None,
        };
        self.selection = Some(sel);
    }

    // ------------------------------------------------------------------------
    // Group ids
    // ------------------------------------------------------------------------

    pub fn group_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .rows
            .iter()
            .filter_map(|row| row.as_group().map(|group| group.id))
            .collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<RegisterRow> {
        &mut self.rows
    }

    pub(crate) fn alloc_group_id(&mut self) -> u32 {
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }

    /// Re-packs group ids into the contiguous run 1..=N, preserving their
    /// relative order, and resets the allocator to N+1. Ids are operator-facing
    /// print tags and must never skip after a deletion.
    pub(crate) fn renumber_groups(&mut self) {
        let ids = self.group_ids();
        for row in &mut self.rows {
            if let RegisterRow::Group(group) = row
                && let Some(position) = ids.iter().position(|&id| id == group.id)
            {
                group.id = position as u32 + 1;
            }
        }
        self.next_group_id = ids.len() as u32 + 1;
    }
}

fn offset_index(index: usize, delta: isize, len: usize) -> Option<usize> {
    let target = index as isize + delta;
    if index >= len || target < 0 || target as usize >= len {
        return None;
    }
    Some(target as usize)
}

fn wrap_index(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (((index as isize + delta) % len + len) % len) as usize
}

// ============================================================================
// Viewport windowing
// ============================================================================

/// Half-open visible range `[start, end)` for a list of `total` items shown
/// in a viewport of `capacity` lines, keeping the selected index centered
/// once the list overflows. Used identically for the register and for
/// search results.
pub fn window_bounds(total: usize, capacity: usize, selected: Option<usize>) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    let capacity = capacity.max(1);
    if total <= capacity {
        return (0, total);
    }
    let Some(selected) = selected else {
        return (0, capacity);
    };
    let start = selected
        .saturating_sub(capacity / 2)
        .min(total - capacity);
    (start, start + capacity)
}
