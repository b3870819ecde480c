//! Resolves which built-in notes a dish offers.

use crate::catalog::{self, Category};

/// Ordered note ids available for one dish.
///
/// Starts from the category defaults, drops ids the dish's override removes,
/// then appends the override's additions (skipping ids already present) so
/// defaults keep their relative order and dish-specific notes trail. Ids
/// missing from the note catalog are dropped rather than surfaced.
pub fn available_notes(category: Option<Category>, dish_id: &str) -> Vec<&'static str> {
    let adjustment = catalog::note_override(dish_id);
    resolve(
        catalog::category_note_defaults(category),
        adjustment.map_or(&[], |over| over.remove),
        adjustment.map_or(&[], |over| over.add),
    )
}

fn resolve(
    defaults: &'static [&'static str],
    remove: &'static [&'static str],
    add: &'static [&'static str],
) -> Vec<&'static str> {
    let mut notes: Vec<&'static str> = defaults
        .iter()
        .copied()
        .filter(|id| !remove.contains(id))
        .collect();
    for id in add {
        if !notes.contains(id) {
            notes.push(id);
        }
    }
    notes.retain(|id| catalog::note_catalog_index(id).is_some());
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_additions_trail_category_defaults() {
        let notes = available_notes(Some(Category::Ramyun), "pork_ramyun");
        assert_eq!(
            notes,
            [
                "less_spicy",
                "less_less_spicy",
                "more_spicy",
                "more_more_spicy",
                "no_spring_onion",
                "no_mushroom",
                "add_cheese",
                "no_onions",
                "no_carrots",
                "more_meat",
            ]
        );
    }

    #[test]
    fn uncategorized_dish_gets_only_its_own_notes() {
        let notes = available_notes(None, "tteokbokki");
        assert_eq!(notes, ["more_cream", "more_cheese", "no_spring_onion"]);
    }

    #[test]
    fn side_dish_without_override_has_no_notes() {
        assert!(available_notes(Some(Category::Side), "kimchi_side").is_empty());
    }

    #[test]
    fn unknown_dish_falls_back_to_category_defaults() {
        let notes = available_notes(Some(Category::Gimbap), "mystery_gimbap");
        assert_eq!(notes, ["no_cuccumber", "no_carrots", "no_spinach"]);
    }

    #[test]
    fn removals_and_duplicate_additions_are_honored() {
        let notes = resolve(
            &["less_spicy", "more_spicy"],
            &["more_spicy"],
            &["vegan", "less_spicy"],
        );
        assert_eq!(notes, ["less_spicy", "vegan"]);
    }

    #[test]
    fn ids_missing_from_catalog_are_dropped() {
        let notes = resolve(&["less_spicy", "ghost_note"], &[], &["bogus"]);
        assert_eq!(notes, ["less_spicy"]);
    }
}
