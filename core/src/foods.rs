//! Static food energy table (kcal per 100g) used to turn a logged weight of
//! food into calories.

use serde::Serialize;

const MAX_SUGGESTIONS: usize = 5;

/// Foods the first-run seed resolves, in the order the seed logs them.
pub const SEED_FOODS: [&str; 6] = ["chicken", "wheat", "rice", "salmon", "broccoli", "banana"];

/// Energy density in kcal per 100g, keyed by normalized name.
pub const FOOD_TABLE: &[(&str, f64)] = &[
    // Proteins
    ("chicken", 165.0),
    ("beef", 250.0),
    ("pork", 242.0),
    ("fish", 100.0),
    ("salmon", 208.0),
    ("tuna", 144.0),
    ("turkey", 135.0),
    ("lamb", 294.0),
    ("duck", 337.0),
    ("shrimp", 99.0),
    ("crab", 102.0),
    ("lobster", 89.0),
    ("eggs", 155.0),
    ("tofu", 76.0),
    ("paneer", 265.0),
    ("tempeh", 195.0),
    ("seitan", 370.0),
    // Grains and cereals
    ("rice", 130.0),
    ("wheat", 340.0),
    ("oats", 389.0),
    ("quinoa", 368.0),
    ("barley", 354.0),
    ("corn", 365.0),
    ("pasta", 370.0),
    ("bread", 265.0),
    ("rye", 338.0),
    ("millet", 378.0),
    ("buckwheat", 343.0),
    // Vegetables
    ("broccoli", 34.0),
    ("spinach", 23.0),
    ("carrot", 41.0),
    ("tomato", 18.0),
    ("potato", 77.0),
    ("onion", 40.0),
    ("garlic", 149.0),
    ("lettuce", 15.0),
    ("cucumber", 15.0),
    ("bell_pepper", 31.0),
    ("cabbage", 25.0),
    ("cauliflower", 25.0),
    ("peas", 81.0),
    ("beans", 127.0),
    ("chickpeas", 164.0),
    ("lentils", 116.0),
    ("asparagus", 20.0),
    ("beets", 43.0),
    ("mushroom", 22.0),
    ("zucchini", 17.0),
    // Fruits
    ("banana", 89.0),
    ("apple", 52.0),
    ("orange", 47.0),
    ("grape", 67.0),
    ("strawberry", 32.0),
    ("blueberry", 57.0),
    ("watermelon", 30.0),
    ("mango", 60.0),
    ("pineapple", 50.0),
    ("kiwi", 61.0),
    ("papaya", 43.0),
    ("peach", 39.0),
    ("pear", 57.0),
    ("avocado", 160.0),
    ("coconut", 354.0),
    ("lemon", 29.0),
    ("lime", 30.0),
    // Dairy
    ("milk", 61.0),
    ("yogurt", 59.0),
    ("cheese", 402.0),
    ("butter", 717.0),
    ("cream", 340.0),
    // Nuts and seeds
    ("almond", 579.0),
    ("walnut", 654.0),
    ("peanut", 567.0),
    ("cashew", 553.0),
    ("pistachio", 556.0),
    ("sunflower_seed", 584.0),
    ("flaxseed", 534.0),
    ("chia_seed", 486.0),
    // Oils and fats
    ("olive_oil", 884.0),
    ("coconut_oil", 892.0),
    // Processed
    ("pizza", 285.0),
    ("burger", 215.0),
    ("fries", 365.0),
    ("chips", 541.0),
    ("chocolate", 535.0),
    ("soda", 42.0),
    ("beer", 43.0),
    ("wine", 85.0),
    ("juice", 45.0),
    // Indian breads
    ("roti", 165.0),
    ("naan", 262.0),
    ("paratha", 234.0),
    ("chapati", 165.0),
    ("puri", 300.0),
    ("dosa", 168.0),
    ("idli", 150.0),
    ("uttapam", 172.0),
    // Indian rice dishes
    ("biryani", 206.0),
    ("pulao", 178.0),
    ("khichdi", 145.0),
    // Curries and gravies
    ("butter_chicken", 197.0),
    ("tikka_masala", 168.0),
    ("curry_paste", 45.0),
    // Vegetables and sides
    ("samosa", 262.0),
    ("pakora", 285.0),
    ("aloo_gobi", 98.0),
    ("dal_makhani", 116.0),
    ("rajma", 91.0),
    ("chana_masala", 121.0),
    ("palak_paneer", 108.0),
    // Breads and snacks
    ("bhatura", 276.0),
    ("poha", 76.0),
    ("upma", 140.0),
    ("chole_bhature", 285.0),
    // Condiments
    ("ghee", 884.0),
    ("coconut_milk", 230.0),
    ("tamarind", 239.0),
    // Spices
    ("turmeric", 312.0),
    ("cumin", 375.0),
    ("coriander", 298.0),
    ("ginger", 80.0),
    ("chili_powder", 318.0),
    ("cardamom", 311.0),
    // Indian desserts
    ("gulab_jamun", 183.0),
    ("kheer", 139.0),
    ("barfi", 369.0),
    ("jalebi", 296.0),
    ("rasgulla", 106.0),
    ("laddu", 387.0),
    ("halwa", 350.0),
    // Pakistani
    ("seekh_kebab", 177.0),
    ("nihari", 145.0),
    ("karahi", 198.0),
    ("shami_kebab", 234.0),
    // Bangladeshi
    ("shorshe_ilish", 235.0),
    ("hilsa_fish", 215.0),
    ("pantabhat", 142.0),
    ("biriyani", 206.0),
    ("khichuri", 145.0),
    ("tehari", 182.0),
    ("luchi", 280.0),
    ("puri_bd", 300.0),
    ("paratha_bd", 234.0),
    ("samosa_bd", 262.0),
    ("spring_roll", 245.0),
    ("fuchka", 180.0),
    ("bhelpuri_bd", 156.0),
    ("chotpoti", 98.0),
    ("jhal_muri", 165.0),
    ("dal_bhaat", 156.0),
    ("fish_curry_bd", 145.0),
    ("chicken_curry_bd", 165.0),
    ("mutton_curry", 198.0),
    ("beef_curry", 210.0),
    ("prawn_curry", 155.0),
    ("lau_curry", 65.0),
    ("pumpkin_curry", 72.0),
    ("bitter_gourd_curry", 35.0),
    ("okra_fry", 145.0),
    ("eggplant_curry", 85.0),
    ("potato_curry", 120.0),
    ("spinach_curry", 45.0),
    ("mixed_vegetable", 95.0),
    ("cabbage_fry", 65.0),
    ("khichdi_bd", 145.0),
    ("pulao_bd", 178.0),
    ("fried_rice_bd", 190.0),
    ("egg_roll", 215.0),
    ("meat_roll", 245.0),
    ("vegetable_roll", 180.0),
    ("shutki_curry", 125.0),
    ("mola_fish", 88.0),
    ("boal_fish", 105.0),
    ("rui_fish", 112.0),
    ("katla_fish", 118.0),
    ("pabda_fish", 108.0),
    ("mishti_doi", 165.0),
    ("payesh", 168.0),
    ("khiroharam", 145.0),
    ("jalebi_bd", 296.0),
    ("sandesh", 287.0),
    ("rasgolla_bd", 106.0),
    ("chandrapuli", 245.0),
    ("kalojam", 256.0),
    ("roshogolla", 106.0),
    ("bhorta", 85.0),
    ("bhuna_khichdi", 145.0),
    ("shutki_macher_jhol", 125.0),
    ("fuska_pani", 12.0),
    ("golgappa_bd", 150.0),
    ("pani_puri_bd", 145.0),
    ("haleem", 265.0),
    ("korma", 235.0),
    ("dopiaza", 175.0),
    ("achar", 85.0),
    ("pickle_bd", 95.0),
    ("lime_pickle", 75.0),
    // Street food and drinks
    ("falooda_bd", 245.0),
    ("baraf_ka_gola", 95.0),
    ("mango_sorbet", 110.0),
    ("shaved_ice_bd", 12.0),
    ("falsa_juice", 45.0),
    ("sugarcane_juice", 55.0),
    // Sri Lankan
    ("kottu_roti", 245.0),
    ("hoppers", 138.0),
    ("lamprais", 210.0),
    // South Indian
    ("idiyappam", 168.0),
    ("vada", 246.0),
    ("medu_vada", 260.0),
    ("appam", 145.0),
    ("puttu", 165.0),
    // North Indian meat
    ("tandoori_chicken", 195.0),
    ("tikka_kebab", 180.0),
    // Lentils (dry)
    ("moong_dal", 347.0),
    ("urad_dal", 341.0),
    ("masoor_dal", 353.0),
    ("toor_dal", 349.0),
    // Other
    ("makhana", 106.0),
    ("sago", 335.0),
    ("vermicelli", 382.0),
    ("milk_powder", 496.0),
    ("panipuri_pani", 12.0),
    ("chaat_powder", 340.0),
];

/// A table row offered while the user types a food name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodSuggestion {
    pub key: &'static str,
    pub display_name: String,
    pub kcal_per_100g: f64,
}

/// Lowercase, trim, and replace anything outside `[a-z0-9_]` with `_`.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Energy density for a free-text food name; unknown foods are 0.
#[must_use]
pub fn kcal_per_100g(name: &str) -> f64 {
    let key = normalize_name(name);
    FOOD_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(0.0, |&(_, kcal)| kcal)
}

/// Whole kcal for `grams` of the named food. Negative grams are passed through.
#[must_use]
pub fn grams_to_kcal(grams: f64, name: &str) -> f64 {
    (grams * kcal_per_100g(name) / 100.0).round()
}

/// Up to five table keys containing `query` (case-insensitive), in table order.
#[must_use]
pub fn suggest(query: &str) -> Vec<FoodSuggestion> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    FOOD_TABLE
        .iter()
        .filter(|(key, _)| key.contains(needle.as_str()))
        .take(MAX_SUGGESTIONS)
        .map(|&(key, kcal)| FoodSuggestion {
            key,
            display_name: display_name(key),
            kcal_per_100g: kcal,
        })
        .collect()
}

/// `butter_chicken` -> `Butter chicken`.
#[must_use]
pub fn display_name(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_size_and_unique_keys() {
        assert!(FOOD_TABLE.len() >= 150);
        let keys: HashSet<&str> = FOOD_TABLE.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), FOOD_TABLE.len());
        for (key, _) in FOOD_TABLE {
            assert_eq!(normalize_name(key), *key, "key must already be normalized");
        }
    }

    #[test]
    fn test_seed_foods_are_in_table() {
        for food in SEED_FOODS {
            assert!(kcal_per_100g(food) > 0.0, "{food}");
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Butter Chicken "), "butter_chicken");
        assert_eq!(normalize_name("Chia-Seed"), "chia_seed");
        assert_eq!(normalize_name("Crème"), "cr_me");
    }

    #[test]
    fn test_grams_to_kcal() {
        assert_eq!(grams_to_kcal(150.0, "chicken"), 248.0);
        assert_eq!(grams_to_kcal(100.0, "Olive Oil"), 884.0);
        assert_eq!(grams_to_kcal(0.0, "rice"), 0.0);
    }

    #[test]
    fn test_grams_to_kcal_unknown_food() {
        assert_eq!(grams_to_kcal(150.0, "unobtainium"), 0.0);
        assert_eq!(grams_to_kcal(10_000.0, ""), 0.0);
    }

    #[test]
    fn test_grams_to_kcal_negative_grams_not_rejected() {
        assert_eq!(grams_to_kcal(-100.0, "rice"), -130.0);
    }

    #[test]
    fn test_suggest_substring() {
        let keys: Vec<&str> = suggest("cor").iter().map(|s| s.key).collect();
        assert!(keys.contains(&"corn"));
        assert!(keys.contains(&"coriander"));
        assert!(keys.iter().all(|k| k.contains("cor")));
    }

    #[test]
    fn test_suggest_case_insensitive_and_capped() {
        let upper: Vec<&str> = suggest("CHICKEN").iter().map(|s| s.key).collect();
        assert_eq!(upper.first(), Some(&"chicken"));

        let many = suggest("a");
        assert_eq!(many.len(), 5);
        // Table order is kept
        assert_eq!(many[0].key, "salmon");
    }

    #[test]
    fn test_suggest_empty_query() {
        assert!(suggest("").is_empty());
        assert!(suggest("zzz").is_empty());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("butter_chicken"), "Butter chicken");
        assert_eq!(display_name("rice"), "Rice");
        assert_eq!(display_name(""), "");
    }
}
