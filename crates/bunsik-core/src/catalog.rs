//! Static menu, category, and note tables.
//!
//! Everything here is fixed at compile time: the dish list per category,
//! the ordered note catalog, per-category note defaults, and per-dish note
//! overrides. The rest of the crate treats these tables as the single
//! source of truth for dish and note identity.

use serde::{Deserialize, Serialize};

// ============================================================================
// Categories
// ============================================================================

/// Menu category. Serialized as the single-letter code used on tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "G")]
    Gimbap,
    #[serde(rename = "R")]
    Ramyun,
    #[serde(rename = "S")]
    Side,
}

impl Category {
    /// Single-letter code shown in badges and print labels.
    pub fn code(self) -> char {
        match self {
            Category::Gimbap => 'G',
            Category::Ramyun => 'R',
            Category::Side => 'S',
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Gimbap => "Gimbap",
            Category::Ramyun => "Ramyun",
            Category::Side => "Side",
        }
    }

    /// Display-name suffix stripped when deriving a print label.
    ///
    /// Side dishes keep their full name on tickets, so only gimbap and
    /// ramyun names carry a strippable suffix.
    pub fn name_suffix(self) -> Option<&'static str> {
        match self {
            Category::Gimbap => Some(" Gimbap"),
            Category::Ramyun => Some(" Ramyun"),
            Category::Side => None,
        }
    }
}

/// Ticket sort rank for a (possibly uncategorized) entry.
///
/// Gimbap rows print first, then ramyun, then uncategorized dishes
/// (tteokbokki), and sides always last.
pub fn print_rank(category: Option<Category>) -> u8 {
    match category {
        Some(Category::Gimbap) => 0,
        Some(Category::Ramyun) => 1,
        None => 2,
        Some(Category::Side) => 3,
    }
}

// ============================================================================
// Dishes
// ============================================================================

/// Static description of one dish on the menu.
#[derive(Debug)]
pub struct DishMeta {
    pub id: &'static str,
    /// Name shown in the register and search results.
    pub name: &'static str,
    /// `None` for dishes outside the three menus (tteokbokki).
    pub category: Option<Category>,
    /// Extra search terms beyond name and id.
    pub aliases: &'static [&'static str],
    /// Ticket label override. When absent the label is derived from `name`.
    pub print_label: Option<&'static str>,
    /// Dishes marked non-mergeable always print one row per unit.
    pub mergeable: bool,
}

impl DishMeta {
    const fn new(id: &'static str, name: &'static str, category: Option<Category>) -> Self {
        Self {
            id,
            name,
            category,
            aliases: &[],
            print_label: None,
            mergeable: true,
        }
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn print_label(mut self, label: &'static str) -> Self {
        self.print_label = Some(label);
        self
    }

    const fn unmergeable(mut self) -> Self {
        self.mergeable = false;
        self
    }
}

/// All dishes, in menu order within each category.
pub const DISHES: &[DishMeta] = &[
    // Gimbap menu
    DishMeta::new("beef_gimbap", "Beef Gimbap", Some(Category::Gimbap)).aliases(&["bf", "bef", "bfe"]),
    DishMeta::new("tuna_gimbap", "Tuna Gimbap", Some(Category::Gimbap)),
    DishMeta::new("spicy_tuna_gimbap", "S.Tuna Gimbap", Some(Category::Gimbap))
        .aliases(&["st", "stuna", "s-tuna"])
        .print_label("G-S.T."),
    DishMeta::new("sausage_gimbap", "Sausage Gimbap", Some(Category::Gimbap)).print_label("G-Saus"),
    DishMeta::new("mushroom_gimbap", "Mushroom Gimbap", Some(Category::Gimbap)).print_label("G-Mush"),
    DishMeta::new("salad_gimbap", "Salad Gimbap", Some(Category::Gimbap)).aliases(&["sl"]),
    DishMeta::new("tofu_gimbap", "Tofu Gimbap", Some(Category::Gimbap)).aliases(&["tofu", "tf"]),
    // Ramyun menu
    DishMeta::new("pork_ramyun", "Pork Ramyun", Some(Category::Ramyun)),
    DishMeta::new("chicken_ramyun", "Chicken Ramyun", Some(Category::Ramyun))
        .aliases(&["chix", "chicken", "ci"])
        .print_label("R-Chix"),
    DishMeta::new("original_ramyun", "Original Ramyun", Some(Category::Ramyun)).print_label("R-Origi"),
    DishMeta::new("cheese_ramyun", "Cheese Ramyun", Some(Category::Ramyun)).aliases(&["ches"]),
    DishMeta::new("kimchi_ramyun", "Kimchi Ramyun", Some(Category::Ramyun)),
    DishMeta::new("seafood_ramyun", "Seafood Ramyun", Some(Category::Ramyun))
        .aliases(&["sae"])
        .print_label("R-Sea"),
    DishMeta::new("tofu_ramyun", "Tofu Ramyun", Some(Category::Ramyun)).aliases(&["tofu", "tf"]),
    // Off-menu, reachable only through the quick-add key
    DishMeta::new("tteokbokki", "Tteokbokki", None).print_label("T.T."),
    // Side menu
    DishMeta::new("kimchi_side", "Kimchi", Some(Category::Side)),
    DishMeta::new("ssamjang_side", "Ssamjang", Some(Category::Side)).print_label("Ssam"),
    DishMeta::new("namu_side", "Namu", Some(Category::Side)),
    DishMeta::new("hot_side", "Hot", Some(Category::Side)),
    DishMeta::new("rice_side", "Rice", Some(Category::Side)),
    DishMeta::new("chili_side", "Extra chili aside", Some(Category::Side))
        .aliases(&["chil"])
        .print_label("Chili side"),
    DishMeta::new("hot_water_side", "Hot water", Some(Category::Side))
        .aliases(&["wt"])
        .print_label("hot water"),
    DishMeta::new("other_side", "Other item", Some(Category::Side))
        .aliases(&["other"])
        .unmergeable(),
];

/// Dish added by the quick-add key without going through search.
pub const QUICK_ADD_DISH_ID: &str = "tteokbokki";

pub fn dish_by_id(id: &str) -> Option<&'static DishMeta> {
    DISHES.iter().find(|dish| dish.id == id)
}

/// Dishes on one category's menu, in menu order.
pub fn menu(category: Category) -> impl Iterator<Item = &'static DishMeta> {
    DISHES.iter().filter(move |dish| dish.category == Some(category))
}

// ============================================================================
// Search
// ============================================================================

/// Strips non-alphanumeric characters and lowercases, so "S.Tuna" and
/// "s-tuna" compare equal.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Filters one category's menu by a free-text query.
///
/// The normalized query must appear as a substring of the normalized display
/// name, dish id, or any alias. An empty query matches the whole menu.
pub fn search_dishes(category: Category, query: &str) -> Vec<&'static DishMeta> {
    let needle = normalize(query);
    menu(category)
        .filter(|dish| {
            needle.is_empty()
                || normalize(dish.name).contains(&needle)
                || normalize(dish.id).contains(&needle)
                || dish.aliases.iter().any(|alias| normalize(alias).contains(&needle))
        })
        .collect()
}

// ============================================================================
// Note catalog
// ============================================================================

/// Every known built-in note, as (id, display label), in canonical order.
///
/// This order decides where a note tag lands on printed and rendered note
/// sublines. The note editor lists notes in per-dish order instead (see
/// `notes::available_notes`).
pub const NOTE_CATALOG: &[(&str, &str)] = &[
    ("less_spicy", "Less Spicy"),
    ("less_less_spicy", "Less Less Spicy"),
    ("more_spicy", "More Spicy"),
    ("more_more_spicy", "More More Spicy"),
    ("no_mushroom", "No Mush"),
    ("no_onions", "No Onions"),
    ("more_cheese", "More Cheese"),
    ("more_cream", "More Cream"),
    ("no_spring_onion", "No Spring"),
    ("no_carrots", "No Carrots"),
    ("more_meat", "More Meat"),
    ("vegan", "Vegan"),
    ("more_veggies", "More Veg"),
    ("add_pok_choi", "Add pok choi"),
    ("no_zucchini", "No Zucc"),
    ("more_zucchini", "More Zucc"),
    ("add_cheese", "Add Cheese"),
    ("no_egg", "No Egg"),
    ("less_rice", "Less Rice"),
    ("no_cuccumber", "No Cuccumber"),
    ("no_spinach", "No Spinach"),
    ("no_pepper", "No Pepper"),
    ("no_squid", "No Squid"),
    ("no_octopus", "No Octopus"),
    ("no_clams", "No Clams"),
];

pub fn note_label(id: &str) -> Option<&'static str> {
    NOTE_CATALOG
        .iter()
        .find(|(note_id, _)| *note_id == id)
        .map(|(_, label)| *label)
}

/// Position of a note in the canonical catalog order.
pub fn note_catalog_index(id: &str) -> Option<usize> {
    NOTE_CATALOG.iter().position(|(note_id, _)| *note_id == id)
}

/// Short ticket symbol for a qualifier word ("no spring onion" -> "x ...").
pub fn qualifier_symbol(token: &str) -> Option<char> {
    match token {
        "no" => Some('x'),
        "less" => Some('-'),
        "more" => Some('+'),
        "add" => Some('^'),
        _ => None,
    }
}

// ============================================================================
// Note defaults and overrides
// ============================================================================

const RAMYUN_NOTE_DEFAULTS: &[&str] = &[
    "less_spicy",
    "less_less_spicy",
    "more_spicy",
    "more_more_spicy",
    "no_spring_onion",
    "no_mushroom",
    "add_cheese",
];

const GIMBAP_NOTE_DEFAULTS: &[&str] = &["no_cuccumber", "no_carrots", "no_spinach"];

/// Default note ids offered for every dish in a category.
pub fn category_note_defaults(category: Option<Category>) -> &'static [&'static str] {
    match category {
        Some(Category::Ramyun) => RAMYUN_NOTE_DEFAULTS,
        Some(Category::Gimbap) => GIMBAP_NOTE_DEFAULTS,
        Some(Category::Side) | None => &[],
    }
}

/// Per-dish adjustment to the category defaults.
#[derive(Debug)]
pub struct NoteOverride {
    pub dish_id: &'static str,
    /// Removed from the category defaults.
    pub remove: &'static [&'static str],
    /// Appended after the surviving defaults, skipping duplicates.
    pub add: &'static [&'static str],
}

const fn add_notes(dish_id: &'static str, add: &'static [&'static str]) -> NoteOverride {
    NoteOverride { dish_id, remove: &[], add }
}

pub const NOTE_OVERRIDES: &[NoteOverride] = &[
    add_notes("pork_ramyun", &["no_onions", "no_carrots", "more_meat"]),
    add_notes("chicken_ramyun", &["no_pepper", "more_meat"]),
    add_notes("original_ramyun", &[]),
    add_notes("cheese_ramyun", &["vegan"]),
    add_notes("seafood_ramyun", &["no_squid", "no_octopus", "no_clams"]),
    add_notes("kimchi_ramyun", &["vegan"]),
    add_notes(
        "tofu_ramyun",
        &["vegan", "add_pok_choi", "no_zucchini", "more_zucchini", "more_veggies"],
    ),
    add_notes("beef_gimbap", &["no_carrots", "no_onions", "more_meat"]),
    add_notes("tuna_gimbap", &["no_onions"]),
    add_notes("spicy_tuna_gimbap", &["less_spicy", "more_spicy", "no_onions"]),
    add_notes("sausage_gimbap", &["more_meat", "no_onions", "no_carrots"]),
    add_notes("mushroom_gimbap", &["no_onions", "no_carrots"]),
    add_notes("salad_gimbap", &[]),
    add_notes("tteokbokki", &["more_cream", "more_cheese", "no_spring_onion"]),
    add_notes("tofu_gimbap", &[]),
];

pub fn note_override(dish_id: &str) -> Option<&'static NoteOverride> {
    NOTE_OVERRIDES.iter().find(|over| over.dish_id == dish_id)
}
