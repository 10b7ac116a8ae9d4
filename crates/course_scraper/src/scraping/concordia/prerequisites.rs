//! Turns a free-text requisite sentence into ordered alternative groups.
//!
//! The text goes through [`NORMALIZE_STEPS`] in order, is split on `;`, and
//! every segment keeps only its course codes, joined with `/`:
//!
//! ```text
//! "Prerequisite/Corequisite: COMP 232 or COEN 231; COMP 352."
//!   -> "COMP 232/COEN 231;COMP 352"
//!   -> ["COMP 232/COEN 231", "COMP 352"]
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// One rewrite applied to the requisite text.
pub struct NormalizeStep {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl NormalizeStep {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            replacement,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

pub static NORMALIZE_STEPS: LazyLock<Vec<NormalizeStep>> = LazyLock::new(|| {
    vec![
        NormalizeStep::new("strip_label", r"(?i)prerequisite(?:/corequisite)?:\s*", ""),
        NormalizeStep::new(
            "strip_completed_previously",
            r"(?i)the following courses? must be completed previously(?: or concurrently)?:\s*",
            "",
        ),
        NormalizeStep::new("punctuation_to_separator", r"[:.]", ";"),
        NormalizeStep::new("or_to_slash", r"(?i)\s+or\s+", "/"),
        NormalizeStep::new("collapse_separator", r";\s+", ";"),
        NormalizeStep::new("drop_trailing_separator", r";\s*$", ""),
    ]
});

static COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z]{4,})\s+(\d{3,4})").unwrap());

/// Runs every normalization step over `text`, in order.
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    NORMALIZE_STEPS
        .iter()
        .fold(collapsed, |acc, step| step.apply(&acc))
}

/// Splits normalized text into alternative groups, dropping segments without course codes.
pub fn alternative_groups(normalized: &str) -> Vec<String> {
    normalized
        .split(';')
        .map(|segment| {
            COURSE_CODE
                .captures_iter(segment)
                .map(|caps| format!("{} {}", &caps[1], &caps[2]))
                .collect::<Vec<_>>()
                .join("/")
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Parses a requisite sentence into ordered alternative groups.
pub fn parse_requisites(text: &str) -> Vec<String> {
    alternative_groups(&normalize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str) -> &'static NormalizeStep {
        NORMALIZE_STEPS.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_strip_label_variants() {
        let s = step("strip_label");
        assert_eq!(s.apply("Prerequisite/Corequisite: COMP 248"), "COMP 248");
        assert_eq!(s.apply("prerequisite: COMP 248"), "COMP 248");
    }

    #[test]
    fn test_strip_completed_previously() {
        let s = step("strip_completed_previously");
        assert_eq!(
            s.apply("The following courses must be completed previously: COMP 248"),
            "COMP 248"
        );
        assert_eq!(
            s.apply("The following course must be completed previously or concurrently: MATH 204"),
            "MATH 204"
        );
    }

    #[test]
    fn test_separator_steps() {
        assert_eq!(step("punctuation_to_separator").apply("A: B. C"), "A; B; C");
        assert_eq!(step("or_to_slash").apply("COMP 232 or COEN 231"), "COMP 232/COEN 231");
        assert_eq!(step("or_to_slash").apply("COMP 232 OR COEN 231"), "COMP 232/COEN 231");
        assert_eq!(step("collapse_separator").apply("A;  B; C"), "A;B;C");
        assert_eq!(step("drop_trailing_separator").apply("A;B;"), "A;B");
    }

    #[test]
    fn test_groups_split_on_semicolons() {
        let groups = parse_requisites(
            "Prerequisite/Corequisite: The following courses must be completed previously: COMP 232 or COEN 231; COMP 352.",
        );
        assert_eq!(groups, vec!["COMP 232/COEN 231", "COMP 352"]);
    }

    // " or " only joins alternatives within a `;` group, so a trailing
    // "or COMP 352" extends the group rather than starting a new one.
    #[test]
    fn test_slash_and_or_are_one_group() {
        let groups = parse_requisites("Prerequisite/Corequisite: COMP 232/COEN 231 or COMP 352.");
        assert_eq!(groups, vec!["COMP 232/COEN 231/COMP 352"]);
    }

    #[test]
    fn test_prose_segments_are_dropped() {
        let groups = parse_requisites(
            "Prerequisite: MATH 203. Students who have received credit for COMP 218 may not take this course for credit.",
        );
        assert_eq!(groups, vec!["MATH 203", "COMP 218"]);

        assert!(parse_requisites("Permission of the Department is required.").is_empty());
    }

    #[test]
    fn test_whitespace_inside_codes_is_normalized() {
        let groups = parse_requisites("Prerequisite:\n   COMP\n 248;   SOEN  287");
        assert_eq!(groups, vec!["COMP 248", "SOEN 287"]);
    }
}
