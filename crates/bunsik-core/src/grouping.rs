//! Forms and dissolves multi-entry groups over contiguous register ranges.
//!
//! Group ids are operator-facing print tags, so the id set is kept as the
//! contiguous run 1..=N at all times. The register's renumbering closes any
//! gap a removal would open.

use tracing::debug;

use crate::register::{OrderEntry, OrderRegister, RegisterGroup, RegisterRow, SelectionPath};

/// Replaces the inclusive row range `[start, end]` with one new group made of
/// the range's entries, in order, and selects the new row.
///
/// Valid only when the range is in bounds and contains no group row. Invalid
/// ranges leave the register untouched and return `false`.
pub fn group_range(register: &mut OrderRegister, start: usize, end: usize) -> bool {
    if start > end || end >= register.len() {
        debug!(start, end, "group range out of bounds");
        return false;
    }
    if register.rows()[start..=end].iter().any(RegisterRow::is_group) {
        debug!(start, end, "group range overlaps an existing group");
        return false;
    }
    let id = register.alloc_group_id();
    let rows = register.rows_mut();
    let members: Vec<OrderEntry> = rows
        .drain(start..=end)
        .filter_map(|row| match row {
            RegisterRow::Entry(entry) => Some(entry),
            RegisterRow::Group(_) => None,
        })
        .collect();
    rows.insert(start, RegisterRow::Group(RegisterGroup { id, members }));
    register.set_selection(Some(SelectionPath::row(start)));
    true
}

/// Replaces the group row at `index` with its members, in original order, at
/// the same position, and selects the first restored member.
///
/// Valid only on a group row. Surviving group ids close the gap left by the
/// removed id.
pub fn ungroup_at(register: &mut OrderRegister, index: usize) -> bool {
    let rows = register.rows_mut();
    match rows.get(index) {
        Some(RegisterRow::Group(_)) => {}
        _ => {
            debug!(index, "ungroup target is not a group row");
            return false;
        }
    }
    if let RegisterRow::Group(group) = rows.remove(index) {
        let members = group.members.into_iter().map(RegisterRow::Entry);
        rows.splice(index..index, members);
    }
    register.renumber_groups();
    register.set_selection(Some(SelectionPath::row(index)));
    true
}
