//! Parser for the gap-addressing suffix grammar.
//!
//! A path handed to `Document::set` may end in one of the gap pseudo-steps
//! below; the suffix selects the insertion policy and the remaining path
//! selects the target.

/// Insertion policy applied when placing a value at a matched location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapMode {
    /// Replace the matched node or attribute value entirely.
    None,
    /// Append as last child (elements) / append to value (attributes, CDATA).
    Child,
    /// Insert immediately before / prepend to value.
    Preceding,
    /// Insert immediately after / append to value.
    Following,
    /// Set raw text/comment data directly, bypassing fragment parsing.
    Data,
}

const SUFFIXES: [(&str, GapMode); 4] = [
    ("child-gap()", GapMode::Child),
    ("preceding-gap()", GapMode::Preceding),
    ("following-gap()", GapMode::Following),
    ("data()", GapMode::Data),
];

/// Splits a path into its base query and gap mode.
///
/// The suffix must occupy a whole trailing step; a stripped-empty base
/// degrades to `.` so `child-gap()` alone targets the reference node.
pub fn parse(path: &str) -> (&str, GapMode) {
    for (suffix, mode) in SUFFIXES {
        if let Some(base) = path.strip_suffix(suffix) {
            let base = base.strip_suffix('/').unwrap_or(base);
            let base = if base.is_empty() { "." } else { base };
            return (base, mode);
        }
    }
    (path, GapMode::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_has_no_gap() {
        assert_eq!(parse("./@id"), ("./@id", GapMode::None));
        assert_eq!(parse("//div"), ("//div", GapMode::None));
    }

    #[test]
    fn test_each_suffix() {
        assert_eq!(parse("./@id/child-gap()"), ("./@id", GapMode::Child));
        assert_eq!(parse("./@id/preceding-gap()"), ("./@id", GapMode::Preceding));
        assert_eq!(parse("//div/following-gap()"), ("//div", GapMode::Following));
        assert_eq!(parse("./comment()/data()"), ("./comment()", GapMode::Data));
    }

    #[test]
    fn test_bare_suffix_targets_reference_node() {
        assert_eq!(parse("child-gap()"), (".", GapMode::Child));
        assert_eq!(parse("/child-gap()"), (".", GapMode::Child));
    }
}
