use crate::types::Category;

/// Classification thresholds and keyword tables.
///
/// The pattern lists are ordered and first-match-wins; category assignment
/// depends on that order (a name containing both "text" and "icon" resolves
/// to TEXT because "text" is checked first). Do not reorder.

// Nodes with both dimensions strictly below this are treated as atomic
// candidates; frames with either dimension at or above it as screens.
// Units come from the document source (typically pixels).
pub const ATOMIC_MAX_DIMENSION: f64 = 500.0;
pub const SCREEN_MIN_DIMENSION: f64 = 500.0;

/// Name substrings that mark a COMPONENT/INSTANCE node as atomic.
pub const ATOMIC_NAME_PATTERNS: [&str; 20] = [
    "button", "input", "text", "icon", "image", "avatar", "badge", "statusbar",
    "header", "footer", "card", "list", "tab", "modal", "checkbox", "radio",
    "switch", "slider", "progress", "spinner",
];

/// Name substrings that mark a FRAME node as a screen.
pub const SCREEN_NAME_PATTERNS: [&str; 10] = [
    "page", "screen", "view", "layout", "container", "section", "home",
    "dashboard", "profile", "settings",
];

/// Ordered category rules for atomic components. First match wins;
/// no match yields `Category::Other`.
pub const CATEGORY_RULES: [(&str, Category); 13] = [
    ("statusbar", Category::StatusBar),
    ("button", Category::Button),
    ("input", Category::Input),
    ("textfield", Category::Input),
    ("text", Category::Text),
    ("icon", Category::Icon),
    ("image", Category::Image),
    ("avatar", Category::Avatar),
    ("badge", Category::Badge),
    ("card", Category::Card),
    ("list", Category::List),
    ("tab", Category::Tab),
    ("modal", Category::Modal),
];

/// True if the lower-cased name contains any of the given patterns.
pub fn name_matches_any(name: &str, patterns: &[&str]) -> bool {
    let lower = name.to_lowercase();
    patterns.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_rules_keep_fixed_order() {
        let keys: Vec<&str> = CATEGORY_RULES.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "statusbar",
                "button",
                "input",
                "textfield",
                "text",
                "icon",
                "image",
                "avatar",
                "badge",
                "card",
                "list",
                "tab",
                "modal",
            ]
        );
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        assert!(name_matches_any("PrimaryButton", &ATOMIC_NAME_PATTERNS));
        assert!(name_matches_any("HOME dashboard", &SCREEN_NAME_PATTERNS));
        assert!(!name_matches_any("Rectangle 42", &ATOMIC_NAME_PATTERNS));
    }
}
