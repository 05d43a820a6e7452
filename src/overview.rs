// src/overview.rs
//! Picks the section that acts as the newsletter overview.

use crate::sections::Section;

/// Letters only, lower-cased: "Executive Summary:" -> "executivesummary".
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fuzzy overview match. Note the substring rule: "Overviews of Markets"
/// counts as an overview too.
pub fn is_overview_title(title: &str) -> bool {
    let norm = normalize_title(title);
    matches!(norm.as_str(), "overview" | "summary" | "executivesummary") || norm.contains("overview")
}

/// First section with an overview-like title, else the first section.
pub fn select_overview(sections: &[Section]) -> Option<&Section> {
    sections
        .iter()
        .find(|s| is_overview_title(&s.title))
        .or_else(|| sections.first())
}
