// src/utils/slug.rs

use std::sync::LazyLock;

use deunicode::deunicode;
use regex::Regex;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\W_]+").expect("static regex is valid"));

/// Transliterates to ASCII, lowercases, and collapses every run of non-word
/// characters (or `_`) into `-`.
///
/// Leading and trailing separators are kept: `"x!!"` becomes `"x-"`.
pub fn slugify(value: &str) -> String {
    NON_WORD
        .replace_all(&deunicode(value).to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("My Quiz__2024!!"), "my-quiz-2024-");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_slugify_transliterates_to_ascii() {
        assert_eq!(slugify("Café Über Quiz"), "cafe-uber-quiz");
        assert_eq!(slugify("x!!"), "x-");
        assert!(slugify("Grüße aus Köln").is_ascii());
    }
}
