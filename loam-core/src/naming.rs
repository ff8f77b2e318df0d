//! Naming conventions shared by the validator, the resolver and templates.

use convert_case::{Case, Casing};

/// Words with irregular plural forms.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
];

/// Words whose plural is identical to the singular.
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
    "staff",
];

/// Convert a string to snake_case (e.g., "UserProfile" -> "user_profile")
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Convert a string to PascalCase (e.g., "user_profile" -> "UserProfile")
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

/// Convert a string to camelCase (e.g., "user_profile" -> "userProfile")
pub fn to_camel_case(s: &str) -> String {
    s.to_case(Case::Camel)
}

/// Convert a string to kebab-case (e.g., "UserProfile" -> "user-profile")
pub fn to_kebab_case(s: &str) -> String {
    s.to_case(Case::Kebab)
}

/// Returns true if `name` is PascalCase: an ASCII uppercase letter followed
/// by ASCII letters and digits.
pub fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Returns true if `name` is camelCase: an ASCII lowercase letter followed
/// by ASCII letters and digits.
pub fn is_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Pluralize the last word of a snake_case identifier.
///
/// ```
/// use loam_core::pluralize;
///
/// assert_eq!(pluralize("user"), "users");
/// assert_eq!(pluralize("blog_category"), "blog_categories");
/// assert_eq!(pluralize("person"), "people");
/// ```
pub fn pluralize(snake: &str) -> String {
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize_word(last)),
        None => pluralize_word(snake),
    }
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();

    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return plural.to_string();
    }

    let mut chars = lower.chars().rev();
    let last = chars.next();
    let before_last = chars.next();

    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", word);
    }

    if last == Some('y') && before_last.is_some_and(|c| !is_vowel(c)) {
        return format!("{}ies", &word[..word.len() - 1]);
    }

    if lower.ends_with("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }

    format!("{}s", word)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
