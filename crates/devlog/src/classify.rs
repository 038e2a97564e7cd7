//! Commit message classification.
//!
//! Splits a raw commit message into a title and body and derives a
//! deterministic tag list from keyword matches.

/// Tag carried by every classified commit.
pub const TAG_COMMIT: &str = "commit";

/// Tag marking records the pipeline produced on its own.
pub const TAG_AUTO_GENERATED: &str = "auto-generated";

/// Keyword rules in application order. A tag is added when any of its
/// keywords occurs (case-insensitively) anywhere in the message.
const KEYWORD_RULES: &[(&str, &[&str])] = &[
    ("bug-fix", &["fix", "bug"]),
    ("feature", &["feat", "feature"]),
    ("refactor", &["refactor"]),
    ("testing", &["test"]),
    ("documentation", &["doc"]),
];

/// Result of classifying a commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// First line of the message.
    pub title: String,
    /// Remaining non-blank lines, newline-joined.
    pub body: String,
    /// Ordered, duplicate-free tags.
    pub tags: Vec<String>,
}

/// Classify a raw commit message.
///
/// The output is a pure function of the input, including tag order.
pub fn classify(message: &str) -> Classification {
    let mut lines = message.lines();
    let title = lines.next().unwrap_or_default().trim().to_string();
    let body = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Classification {
        title,
        body,
        tags: classify_tags(message),
    }
}

/// Derive the tag list for a message.
pub fn classify_tags(message: &str) -> Vec<String> {
    let haystack = message.to_lowercase();

    let mut tags = vec![TAG_COMMIT.to_string(), TAG_AUTO_GENERATED.to_string()];
    tags.extend(
        KEYWORD_RULES
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
            .map(|(tag, _)| (*tag).to_string()),
    );
    tags
}
