use once_cell::sync::Lazy;
use regex::Regex;

/// A single hyphen with a non-hyphen character on each side, whitespace
/// padding allowed. An already-doubled hyphen never matches, and neither
/// does a leading or trailing hyphen with nothing beside it.
static SINGLE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^\s-])\s*-\s*([^\s-])").unwrap());

/// A run of one or more slashes with a non-slash character on each side.
static SLASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^\s/])\s*/+\s*([^\s/])").unwrap());

/// Words that keep their casing: leading digit or uppercase letter,
/// optionally behind an opening parenthesis.
static KEEPS_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(?[0-9A-Z]").unwrap());

/// The normalization steps in application order. Later steps operate on
/// already-substituted text: brackets are mapped after the separator
/// rewrites, and capitalization runs last so it also collapses any
/// whitespace the earlier steps introduced.
const PIPELINE: &[(&str, fn(&str) -> String)] = &[
    ("dashes", normalize_dashes),
    ("slashes", normalize_slashes),
    ("brackets", substitute_brackets),
    ("capitalize", capitalize_words),
];

/// Canonicalize a tag value. Pure and deterministic; running it on its
/// own output changes nothing, since ` -- ` separators and capitalized
/// words are fixed points of every step.
pub fn sanitize(text: &str) -> String {
    PIPELINE
        .iter()
        .fold(text.to_string(), |value, (_, step)| step(&value))
}

/// Replace until the pattern no longer matches, so chained separators
/// like `a-b-c` normalize fully even though each replacement consumes
/// the character shared with the next match.
fn replace_to_fixpoint(re: &Regex, text: &str, rep: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = re.replace_all(&current, rep).into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_dashes(text: &str) -> String {
    replace_to_fixpoint(&SINGLE_DASH, text, "$1 -- $2")
}

fn normalize_slashes(text: &str) -> String {
    replace_to_fixpoint(&SLASH_RUN, text, "$1 -- $2")
}

fn substitute_brackets(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '[' => '(',
            ']' => ')',
            other => other,
        })
        .collect()
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if KEEPS_CASE.is_match(word) {
                word.to_string()
            } else {
                title_case(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first letter, lowercase everything after it. Leading
/// punctuation is passed over, so `(live` becomes `(Live`.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut seen_letter = false;
    for c in word.chars() {
        if seen_letter {
            out.extend(c.to_lowercase());
        } else if c.is_alphabetic() {
            seen_letter = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["dashes", "slashes", "brackets", "capitalize"]);
    }

    #[test]
    fn test_separator_equivalence() {
        for input in ["foo - bar ", "foo -bar", "foo/bar", "foo // bar", "foo -- bar"] {
            assert_eq!(sanitize(input), "Foo -- Bar", "input: {input:?}");
        }
    }

    #[test]
    fn test_bracket_and_case() {
        assert_eq!(
            sanitize("speak For the earth [live on WFMU]"),
            "Speak For The Earth (Live On WFMU)"
        );
    }

    #[test]
    fn test_bracket_with_slash() {
        assert_eq!(
            sanitize("speak For the earth [demo/WFMU]"),
            "Speak For The Earth (Demo -- WFMU)"
        );
    }

    #[test]
    fn test_chained_separators() {
        assert_eq!(sanitize("one-two-three"), "One -- Two -- Three");
        assert_eq!(sanitize("a/b/c"), "A -- B -- C");
    }

    #[test]
    fn test_doubled_hyphen_not_reprocessed() {
        assert_eq!(sanitize("Foo -- Bar"), "Foo -- Bar");
        assert_eq!(sanitize("Foo --- Bar"), "Foo --- Bar");
    }

    #[test]
    fn test_edge_hyphens_left_alone() {
        assert_eq!(sanitize("-foo"), "-Foo");
        assert_eq!(sanitize("foo-"), "Foo-");
    }

    #[test]
    fn test_capitalization_passthrough() {
        assert_eq!(sanitize("4 non blondes"), "4 Non Blondes");
        assert_eq!(sanitize("MF DOOM"), "MF DOOM");
        assert_eq!(sanitize("go! (NYC)"), "Go! (NYC)");
        assert_eq!(sanitize("don't stop"), "Don't Stop");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(sanitize("  speak   for the  earth "), "Speak For The Earth");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "foo - bar",
            "foo // bar",
            "already -- Done",
            "4 Non Blondes",
            "speak For the earth [demo/WFMU]",
            "one-two-three",
            "go! (NYC)",
        ] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }
}
