use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel boundary regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("separator regex"));
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("disallowed regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("hyphen run regex"));

/// Derive a URL-safe slug from arbitrary text.
///
/// camelCase boundaries become word breaks, everything is lowercased,
/// whitespace and underscores collapse to single hyphens, anything outside
/// `[a-z0-9-]` is stripped, hyphen runs collapse and edge hyphens are trimmed.
/// Running the function on its own output returns the same output.
///
/// An input with no usable characters yields a generated `post-<suffix>`
/// placeholder instead of an empty slug.
pub fn slugify(input: &str) -> String {
    let slug = CAMEL_BOUNDARY.replace_all(input, "$1-$2");
    let slug = slug.to_lowercase();
    let slug = SEPARATORS.replace_all(&slug, "-");
    let slug = DISALLOWED.replace_all(&slug, "");
    let slug = HYPHEN_RUNS.replace_all(&slug, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("post-{}", &suffix[..8])
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(slugify("My Post!!"), "my-post");
        assert_eq!(slugify("Hello, World"), "hello-world");
    }

    #[test]
    fn camel_case_splits_into_words() {
        assert_eq!(slugify("camelCaseTitle"), "camel-case-title");
        assert_eq!(slugify("version2Release"), "version2-release");
    }

    #[test]
    fn separators_collapse() {
        assert_eq!(slugify("a   b"), "a-b");
        assert_eq!(slugify("a___b"), "a-b");
        assert_eq!(slugify("a - _ - b"), "a-b");
        assert_eq!(slugify("--edge--case--"), "edge-case");
    }

    #[test]
    fn unicode_and_symbols_are_stripped() {
        assert_eq!(slugify("café & bar"), "caf-bar");
        assert_eq!(slugify("50% off!"), "50-off");
    }

    #[test]
    fn empty_inputs_get_placeholder() {
        for input in ["", "!!!", "???", "   ", "———"] {
            let slug = slugify(input);
            assert!(slug.starts_with("post-"), "{:?} -> {:?}", input, slug);
            assert!(slug.len() > "post-".len());
        }
    }

    #[test]
    fn output_charset_is_restricted() {
        for input in ["My Post!!", "ünïcode", "a_b c-d", "Ends With Bang!", "Ça va"] {
            let slug = slugify(input);
            assert!(!slug.is_empty());
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{:?} -> {:?}",
                input,
                slug
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }

    #[test]
    fn idempotent_on_own_output() {
        for input in [
            "My Post!!",
            "camelCaseTitle",
            "  spaced   out  ",
            "a_b_c",
            "Hello, World",
            "version2Release",
            "already-a-slug",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn placeholder_is_itself_stable() {
        let slug = slugify("!!!");
        assert_eq!(slugify(&slug), slug);
    }
}
