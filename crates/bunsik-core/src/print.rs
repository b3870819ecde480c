//! Print composition: collapses, sorts, labels, and re-buckets a flattened
//! register snapshot into an ordered, renderer-agnostic instruction sequence.
//!
//! Composition is deterministic: identical row multisets always produce the
//! same instruction sequence. The renderer consumes the sequence verbatim and
//! decides nothing about ordering or grouping.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::catalog::{self, Category};
use crate::register::{OrderEntry, OrderRegister, RegisterRow};

// ============================================================================
// Submission snapshot
// ============================================================================

/// One entry copied out of the register for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintEntry {
    pub entry: OrderEntry,
    /// Id of the group the entry came from, stamped at flatten time.
    pub source_group: Option<u32>,
}

/// Copies the register into a flat submission snapshot, expanding groups and
/// stamping each copy with its origin group id. The register is not consumed;
/// the caller clears it only after a successful save.
pub fn flatten_register(register: &OrderRegister) -> Vec<PrintEntry> {
    let mut entries = Vec::new();
    for row in register.rows() {
        match row {
            RegisterRow::Entry(entry) => entries.push(PrintEntry {
                entry: entry.clone(),
                source_group: None,
            }),
            RegisterRow::Group(group) => entries.extend(group.members.iter().map(|member| PrintEntry {
                entry: member.clone(),
                source_group: Some(group.id),
            })),
        }
    }
    entries
}

// ============================================================================
// Instructions
// ============================================================================

/// Renderer-agnostic print instruction. The sequence produced by [`compose`]
/// is the sole contract with the receipt renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintInstruction {
    /// Ticket header carrying the right-aligned order number and, when set,
    /// an unpaid badge.
    Header { order_number: u16, unpaid: bool },
    /// One merged row's label, count suffix included.
    Label(String),
    /// Units-per-group breakdown under a merged row, ascending by group id.
    Allocation(Vec<(u32, u32)>),
    /// Compacted note line under a row.
    Notes(String),
    /// Rule introducing the side section.
    Separator,
    /// Blank line between the main sequence and bag blocks.
    Spacer,
    /// Trailing compact tag naming a bag block's group id.
    GroupTag(u32),
}

/// Composes the full instruction sequence for one ticket.
///
/// Order number 0 means "no header"; an unpaid ticket still gets a header so
/// the badge has somewhere to print. Takeaway entries are pulled out of the
/// main sequence and re-bucketed into per-group bag blocks at the end.
pub fn compose(entries: &[PrintEntry], order_number: u16, unpaid: bool) -> Vec<PrintInstruction> {
    let mut instructions = Vec::new();
    if order_number > 0 || unpaid {
        instructions.push(PrintInstruction::Header { order_number, unpaid });
    }

    let mut main: Vec<&PrintEntry> = Vec::new();
    let mut bagged: Vec<&PrintEntry> = Vec::new();
    for item in entries {
        if item.entry.takeaway {
            bagged.push(item);
        } else {
            main.push(item);
        }
    }

    let main_rows = merge_rows(&main);
    push_rows(&mut instructions, &main_rows, true);

    let mut previous_block = !main_rows.is_empty();
    for (group_id, bucket) in bag_buckets(&bagged) {
        if previous_block {
            instructions.push(PrintInstruction::Spacer);
        }
        let rows = merge_rows(&bucket);
        push_rows(&mut instructions, &rows, false);
        if let Some(id) = group_id {
            instructions.push(PrintInstruction::GroupTag(id));
        }
        previous_block = true;
    }

    instructions
}

// ============================================================================
// Merging and sorting
// ============================================================================

struct MergedRow<'a> {
    entry: &'a OrderEntry,
    count: u32,
    /// Units contributed per source group id.
    allocations: BTreeMap<u32, u32>,
    /// Stream position of the first merged-in entry, for tie-breaking.
    first_seen: usize,
}

type MergeKey = (Option<Category>, String, Vec<String>, Vec<String>);

fn merge_key(entry: &OrderEntry) -> MergeKey {
    let mut customs = entry.custom_notes.clone();
    customs.sort();
    (
        entry.category,
        entry.dish_id.clone(),
        entry.selected_notes.iter().cloned().collect(),
        customs,
    )
}

/// Collapses one stream of entries into sorted merged rows.
///
/// Entries sharing (category, dish, built-in notes, custom notes) merge into
/// one row with a running count. Dishes marked non-mergeable keep one row per
/// unit, ordered by their original position. Unknown dishes merge normally.
fn merge_rows<'a>(entries: &[&'a PrintEntry]) -> Vec<MergedRow<'a>> {
    let mut rows: Vec<MergedRow<'a>> = Vec::new();
    let mut slot_by_key: HashMap<MergeKey, usize> = HashMap::new();

    for (position, item) in entries.iter().enumerate() {
        let entry = &item.entry;
        let mergeable = catalog::dish_by_id(&entry.dish_id).is_none_or(|dish| dish.mergeable);
        let slot = if mergeable {
            let key = merge_key(entry);
            if let Some(&slot) = slot_by_key.get(&key) {
                Some(slot)
            } else {
                slot_by_key.insert(key, rows.len());
                None
            }
        } else {
            None
        };
        match slot {
            Some(slot) => {
                let row = &mut rows[slot];
                row.count += 1;
                if let Some(id) = item.source_group {
                    *row.allocations.entry(id).or_insert(0) += 1;
                }
            }
            None => {
                let mut allocations = BTreeMap::new();
                if let Some(id) = item.source_group {
                    allocations.insert(id, 1);
                }
                rows.push(MergedRow {
                    entry,
                    count: 1,
                    allocations,
                    first_seen: position,
                });
            }
        }
    }

    rows.sort_by_key(|row| {
        (
            catalog::print_rank(row.entry.category),
            Reverse(row.count),
            row.first_seen,
        )
    });
    rows
}

/// Splits the takeaway stream into per-group buckets, ascending by group id,
/// with entries from no group sharing one final bucket.
fn bag_buckets<'a>(bagged: &[&'a PrintEntry]) -> Vec<(Option<u32>, Vec<&'a PrintEntry>)> {
    let mut ids: Vec<u32> = bagged.iter().filter_map(|item| item.source_group).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut buckets: Vec<(Option<u32>, Vec<&PrintEntry>)> = ids
        .into_iter()
        .map(|id| {
            let bucket = bagged
                .iter()
                .copied()
                .filter(|item| item.source_group == Some(id))
                .collect();
            (Some(id), bucket)
        })
        .collect();

    let loose: Vec<&PrintEntry> = bagged
        .iter()
        .copied()
        .filter(|item| item.source_group.is_none())
        .collect();
    if !loose.is_empty() {
        buckets.push((None, loose));
    }
    buckets
}

fn push_rows(instructions: &mut Vec<PrintInstruction>, rows: &[MergedRow], with_allocations: bool) {
    let mut in_side_section = false;
    for row in rows {
        if !in_side_section && row.entry.category == Some(Category::Side) {
            instructions.push(PrintInstruction::Separator);
            in_side_section = true;
        }
        let mut label = dish_label(row.entry);
        if row.count > 1 {
            label.push_str(&format!(" {}", row.count));
        }
        instructions.push(PrintInstruction::Label(label));
        if with_allocations && !row.allocations.is_empty() {
            let breakdown = row.allocations.iter().map(|(&id, &count)| (id, count)).collect();
            instructions.push(PrintInstruction::Allocation(breakdown));
        }
        if let Some(line) = note_line(row.entry) {
            instructions.push(PrintInstruction::Notes(line));
        }
    }
}

// ============================================================================
// Labels and note compaction
// ============================================================================

/// Ticket label for one entry: the dish's explicit override when present,
/// otherwise the display name with its category suffix stripped and the
/// category code prefixed. Side and uncategorized names pass through.
pub fn dish_label(entry: &OrderEntry) -> String {
    if let Some(label) = catalog::dish_by_id(&entry.dish_id).and_then(|dish| dish.print_label) {
        return label.to_string();
    }
    match entry.category {
        Some(category @ (Category::Gimbap | Category::Ramyun)) => {
            let base = category
                .name_suffix()
                .and_then(|suffix| entry.name.strip_suffix(suffix))
                .unwrap_or(&entry.name);
            format!("{}-{base}", category.code())
        }
        _ => entry.name.clone(),
    }
}

/// Note line for one row: built-in notes in catalog order, then custom notes
/// in lexicographic order, each alias-compacted. Unknown note ids are
/// silently dropped. `None` when the row has no notes.
fn note_line(entry: &OrderEntry) -> Option<String> {
    let mut builtins: Vec<(usize, &str)> = entry
        .selected_notes
        .iter()
        .filter_map(|id| catalog::note_catalog_index(id).map(|position| (position, id.as_str())))
        .collect();
    builtins.sort_unstable_by_key(|&(position, _)| position);

    let mut parts: Vec<String> = builtins
        .into_iter()
        .map(|(_, id)| compact_note_id(id))
        .collect();

    let mut customs = entry.custom_notes.clone();
    customs.sort();
    parts.extend(customs.iter().map(|text| compact_custom_note(text)));

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Compacts a built-in note id: "more_more_spicy" -> "++ spicy".
pub fn compact_note_id(id: &str) -> String {
    let tokens: Vec<&str> = id.split('_').collect();
    compact_tokens(&tokens)
}

/// Compacts free text: "No Onions" -> "x onions". Unrecognized text is
/// lowercased and passed through unchanged.
pub fn compact_custom_note(text: &str) -> String {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    compact_tokens(&tokens)
}

/// The leading run of identical qualifier tokens becomes that qualifier's
/// symbol repeated once per token; the remaining tokens follow verbatim.
fn compact_tokens(tokens: &[&str]) -> String {
    let Some(&first) = tokens.first() else {
        return String::new();
    };
    let Some(symbol) = catalog::qualifier_symbol(first) else {
        return tokens.join(" ");
    };
    let run = tokens.iter().take_while(|&&token| token == first).count();
    let rest = &tokens[run..];
    if rest.is_empty() {
        return tokens.join(" ");
    }
    format!("{} {}", symbol.to_string().repeat(run), rest.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping;
    use crate::register::SelectionPath;

    fn entry(dish_id: &str) -> OrderEntry {
        catalog::dish_by_id(dish_id).map(OrderEntry::for_dish).unwrap()
    }

    fn plain(dish_id: &str) -> PrintEntry {
        PrintEntry {
            entry: entry(dish_id),
            source_group: None,
        }
    }

    fn with_note(dish_id: &str, note: &str) -> PrintEntry {
        let mut item = plain(dish_id);
        item.entry.set_note(note, true);
        item
    }

    fn labels(instructions: &[PrintInstruction]) -> Vec<String> {
        instructions
            .iter()
            .filter_map(|instruction| match instruction {
                PrintInstruction::Label(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn flatten_stamps_source_group_ids() {
        let mut register = OrderRegister::new();
        register.push_entry(entry("kimchi_side"));
        register.push_entry(entry("beef_gimbap"));
        register.push_entry(entry("beef_gimbap"));
        assert!(grouping::group_range(&mut register, 1, 2));
        register.set_selection(Some(SelectionPath::row(0)));

        let flat = flatten_register(&register);
        let sources: Vec<Option<u32>> = flat.iter().map(|item| item.source_group).collect();
        assert_eq!(sources, [None, Some(1), Some(1)]);
    }

    #[test]
    fn identical_entries_merge_with_a_count() {
        let out = compose(&[plain("beef_gimbap"), plain("beef_gimbap")], 0, false);
        assert_eq!(out, [PrintInstruction::Label("G-Beef 2".into())]);
    }

    #[test]
    fn non_mergeable_dish_prints_one_row_per_unit() {
        let out = compose(&[plain("other_side"), plain("other_side")], 0, false);
        assert_eq!(
            out,
            [
                PrintInstruction::Separator,
                PrintInstruction::Label("Other item".into()),
                PrintInstruction::Label("Other item".into()),
            ]
        );
    }

    #[test]
    fn differing_notes_split_the_merge() {
        let out = compose(
            &[
                plain("beef_gimbap"),
                with_note("beef_gimbap", "more_spicy"),
                plain("beef_gimbap"),
            ],
            0,
            false,
        );
        assert_eq!(
            out,
            [
                PrintInstruction::Label("G-Beef 2".into()),
                PrintInstruction::Label("G-Beef".into()),
                PrintInstruction::Notes("+ spicy".into()),
            ]
        );
    }

    #[test]
    fn rows_sort_by_rank_then_count_then_first_seen() {
        let out = compose(
            &[
                plain("kimchi_side"),
                plain("pork_ramyun"),
                plain("pork_ramyun"),
                plain("tteokbokki"),
                plain("beef_gimbap"),
            ],
            0,
            false,
        );
        assert_eq!(
            labels(&out),
            ["G-Beef", "R-Pork 2", "T.T.", "Kimchi"]
        );
        // The separator sits immediately before the first side row.
        let separator = out.iter().position(|i| *i == PrintInstruction::Separator).unwrap();
        assert_eq!(out[separator + 1], PrintInstruction::Label("Kimchi".into()));
    }

    #[test]
    fn composition_is_permutation_invariant() {
        let base = vec![
            plain("beef_gimbap"),
            plain("beef_gimbap"),
            plain("beef_gimbap"),
            plain("tuna_gimbap"),
            with_note("pork_ramyun", "no_mushroom"),
            with_note("pork_ramyun", "no_mushroom"),
            plain("kimchi_side"),
        ];
        let expected = compose(&base, 42, false);

        let mut rotated = base.clone();
        rotated.rotate_left(3);
        assert_eq!(compose(&rotated, 42, false), expected);

        let mut reversed = base;
        reversed.reverse();
        assert_eq!(compose(&reversed, 42, false), expected);
    }

    #[test]
    fn header_is_omitted_for_order_number_zero() {
        let out = compose(&[plain("beef_gimbap")], 0, false);
        assert!(!out.iter().any(|i| matches!(i, PrintInstruction::Header { .. })));
    }

    #[test]
    fn header_carries_number_and_badge() {
        let out = compose(&[plain("beef_gimbap")], 7, false);
        assert_eq!(
            out[0],
            PrintInstruction::Header {
                order_number: 7,
                unpaid: false
            }
        );

        // An unpaid ticket gets a header even without a number.
        let out = compose(&[plain("beef_gimbap")], 0, true);
        assert_eq!(
            out[0],
            PrintInstruction::Header {
                order_number: 0,
                unpaid: true
            }
        );
    }

    #[test]
    fn takeaway_entries_bucket_by_source_group() {
        let mut group_two = plain("beef_gimbap");
        group_two.entry.takeaway = true;
        group_two.source_group = Some(2);
        let mut group_one = plain("tuna_gimbap");
        group_one.entry.takeaway = true;
        group_one.source_group = Some(1);
        let mut loose = plain("rice_side");
        loose.entry.takeaway = true;

        let out = compose(&[plain("pork_ramyun"), group_two, group_one, loose], 0, false);
        assert_eq!(
            out,
            [
                PrintInstruction::Label("R-Pork".into()),
                PrintInstruction::Spacer,
                PrintInstruction::Label("G-Tuna".into()),
                PrintInstruction::GroupTag(1),
                PrintInstruction::Spacer,
                PrintInstruction::Label("G-Beef".into()),
                PrintInstruction::GroupTag(2),
                PrintInstruction::Spacer,
                PrintInstruction::Separator,
                PrintInstruction::Label("Rice".into()),
            ]
        );
    }

    #[test]
    fn all_takeaway_ticket_starts_with_the_first_block() {
        let mut bagged = plain("beef_gimbap");
        bagged.entry.takeaway = true;
        let out = compose(&[bagged], 0, false);
        assert_eq!(out, [PrintInstruction::Label("G-Beef".into())]);
    }

    #[test]
    fn merged_rows_carry_per_group_allocations() {
        let mut from_one = plain("beef_gimbap");
        from_one.source_group = Some(1);
        let mut from_two = plain("beef_gimbap");
        from_two.source_group = Some(2);

        let out = compose(&[from_two, plain("beef_gimbap"), from_one], 0, false);
        assert_eq!(
            out,
            [
                PrintInstruction::Label("G-Beef 3".into()),
                PrintInstruction::Allocation(vec![(1, 1), (2, 1)]),
            ]
        );
    }

    #[test]
    fn labels_prefer_explicit_overrides() {
        assert_eq!(dish_label(&entry("spicy_tuna_gimbap")), "G-S.T.");
        assert_eq!(dish_label(&entry("tteokbokki")), "T.T.");
        assert_eq!(dish_label(&entry("hot_water_side")), "hot water");
        assert_eq!(dish_label(&entry("kimchi_side")), "Kimchi");
        assert_eq!(dish_label(&entry("cheese_ramyun")), "R-Cheese");
    }

    #[test]
    fn notes_print_in_catalog_order_then_customs_lexicographically() {
        let mut item = plain("pork_ramyun");
        item.entry.set_note("no_mushroom", true);
        item.entry.set_note("less_spicy", true);
        item.entry.add_custom_note("zz last");
        item.entry.add_custom_note("aa first");

        let out = compose(&[item], 0, false);
        assert_eq!(
            out,
            [
                PrintInstruction::Label("R-Pork".into()),
                PrintInstruction::Notes("- spicy, x mushroom, aa first, zz last".into()),
            ]
        );
    }

    #[test]
    fn unknown_note_ids_are_dropped_from_note_lines() {
        let mut item = plain("beef_gimbap");
        item.entry.set_note("ghost_note", true);
        let out = compose(&[item], 0, false);
        assert_eq!(out, [PrintInstruction::Label("G-Beef".into())]);
    }

    #[test]
    fn note_id_compaction() {
        assert_eq!(compact_note_id("more_spicy"), "+ spicy");
        assert_eq!(compact_note_id("more_more_spicy"), "++ spicy");
        assert_eq!(compact_note_id("less_less_spicy"), "-- spicy");
        assert_eq!(compact_note_id("no_spring_onion"), "x spring onion");
        assert_eq!(compact_note_id("add_pok_choi"), "^ pok choi");
        assert_eq!(compact_note_id("vegan"), "vegan");
    }

    #[test]
    fn custom_note_compaction_lowercases() {
        assert_eq!(compact_custom_note("No Onions"), "x onions");
        assert_eq!(compact_custom_note("more more Spicy"), "++ spicy");
        assert_eq!(compact_custom_note("Extra Sauce"), "extra sauce");
        // A bare qualifier has no item text to attach to.
        assert_eq!(compact_custom_note("no"), "no");
    }
}
