//! The `NNN-name` file naming convention used by directory import.
//!
//! Image files and gallery directories may carry a numeric prefix that fixes
//! their position, followed by a name whose dashes read as spaces:
//!
//! | Entry                     | Position | Title            |
//! |---------------------------|----------|------------------|
//! | `020-Evening-Light.jpg`   | 20       | "Evening Light"  |
//! | `001-Harbour.png`         | 1        | "Harbour"        |
//! | `sketch-study.webp`       | none     | "sketch study"   |
//! | `010-Spring-Show/`        | 10       | "Spring Show"    |
//!
//! Unnumbered entries sort after numbered ones.

use std::cmp::Ordering;

/// A parsed entry name such as `020-Evening-Light`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Position prefix, if present.
    pub number: Option<u32>,
    /// Name after the prefix, dashes preserved. The full input when
    /// unnumbered, empty when the name is only a number.
    pub name: String,
    /// `name` with dashes shown as spaces.
    pub display_title: String,
}

impl ParsedName {
    /// The display title, or `fallback` when the name carried no title.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.display_title.trim().is_empty() {
            fallback
        } else {
            &self.display_title
        }
    }
}

/// Parse a file stem or directory name.
///
/// - `"020-Evening-Light"` → number 20, title "Evening Light"
/// - `"001"` / `"001-"` → number 1, empty title
/// - `"sketch-study"` → no number, title "sketch study"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-')
        && let Ok(number) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(number),
            name: rest.to_string(),
            display_title: rest.replace('-', " "),
        };
    }
    if let Ok(number) = name.parse::<u32>() {
        return ParsedName {
            number: Some(number),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
        display_title: name.replace('-', " "),
    }
}

/// Ordering for import: numbered entries by number, then the rest, with the
/// raw entry name breaking ties.
pub fn compare_entries(a: &str, b: &str) -> Ordering {
    let (pa, pb) = (parse_entry_name(a), parse_entry_name(b));
    match (pa.number, pb.number) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_multi_word_title() {
        let p = parse_entry_name("020-Evening-Light");
        assert_eq!(p.number, Some(20));
        assert_eq!(p.name, "Evening-Light");
        assert_eq!(p.display_title, "Evening Light");
    }

    #[test]
    fn number_only() {
        for input in ["001", "001-"] {
            let p = parse_entry_name(input);
            assert_eq!(p.number, Some(1));
            assert_eq!(p.name, "");
            assert_eq!(p.display_title, "");
        }
    }

    #[test]
    fn unnumbered_dashes_become_spaces() {
        let p = parse_entry_name("sketch-study");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "sketch-study");
        assert_eq!(p.display_title, "sketch study");
    }

    #[test]
    fn non_numeric_prefix_is_part_of_name() {
        let p = parse_entry_name("v2-draft");
        assert_eq!(p.number, None);
        assert_eq!(p.display_title, "v2 draft");
    }

    #[test]
    fn title_or_falls_back_for_number_only() {
        assert_eq!(parse_entry_name("007").title_or("007"), "007");
        assert_eq!(parse_entry_name("007-Bond").title_or("007-Bond"), "Bond");
    }

    #[test]
    fn compare_numbered_before_unnumbered() {
        let mut names = vec!["zebra", "010-b", "002-z", "apple", "010-a"];
        names.sort_by(|a, b| compare_entries(a, b));
        assert_eq!(names, vec!["002-z", "010-a", "010-b", "apple", "zebra"]);
    }

    #[test]
    fn compare_uses_numeric_not_lexical_order() {
        assert_eq!(compare_entries("9-x", "10-x"), Ordering::Less);
    }
}
