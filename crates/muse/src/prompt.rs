//! Deterministic description building for generation requests.
//!
//! The generation service does its own prompt engineering; this module
//! only composes the user-facing `description` field from theme input so
//! that identical inputs always produce identical requests.

/// Compose a generation description from theme tags and an optional
/// free-form note.
///
/// Tags are normalized (trimmed, empties dropped) but their order is
/// preserved; the output is fully determined by the inputs.
pub fn build_description(tags: &[String], note: Option<&str>) -> String {
    let mut parts = Vec::new();
    parts.push(
        "A set of ten interlocking sonnets whose lines at the same position are interchangeable."
            .to_string(),
    );

    let themes: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !themes.is_empty() {
        parts.push(format!("Themes: {}.", themes.join(", ")));
    }

    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        parts.push(note.to_string());
    }

    parts.join(" ")
}
