//! Poem set document types, status constants, and structural validation.
//!
//! A poem set is ten 14-line sonnets whose lines are combinatorially
//! interchangeable (see [`crate::reader`]). Structure is enforced only at
//! publish time and on a manual save; drafts may be incomplete.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Structural constants
// ---------------------------------------------------------------------------

/// A poem set always contains exactly this many sonnets when published.
pub const POEMS_PER_SET: usize = 10;

/// Every sonnet has exactly this many lines when published.
pub const LINES_PER_SONNET: usize = 14;

/// Number of distinct readable poems in a valid set: 10^14.
pub const TOTAL_COMBINATIONS: u64 = 100_000_000_000_000;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Known poem set statuses.
pub mod statuses {
    /// Editable; structure not yet enforced.
    pub const DRAFT: &str = "draft";
    /// Frozen structure: exactly 10 sonnets of 14 non-blank lines each.
    pub const PUBLISHED: &str = "published";
}

/// The set of all valid poem set statuses.
pub const VALID_STATUSES: &[&str] = &[statuses::DRAFT, statuses::PUBLISHED];

/// Returns `true` if the given status string is valid.
pub fn is_valid_status(status: &str) -> bool {
    VALID_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// A single sonnet: an ordered list of lines.
///
/// Drafts may hold any number of lines; the 14-line shape is checked by
/// [`validate_for_publish`], not by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    pub lines: Vec<String>,
}

impl Poem {
    /// A sonnet with 14 empty lines, the starting point for new drafts.
    pub fn blank() -> Self {
        Self {
            lines: vec![String::new(); LINES_PER_SONNET],
        }
    }
}

/// The in-memory editing unit for a poem set: title, tags, and the ten
/// sonnets. This is what autosave writes and what row-change notifications
/// carry; the persisted row splits title/tags into their own columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemSetDoc {
    pub title: String,
    pub tags: Vec<String>,
    pub poems: Vec<Poem>,
}

impl PoemSetDoc {
    /// An untitled draft with ten blank sonnets.
    pub fn blank() -> Self {
        Self {
            title: String::new(),
            tags: Vec::new(),
            poems: vec![Poem::blank(); POEMS_PER_SET],
        }
    }
}

// ---------------------------------------------------------------------------
// Publish-time validation
// ---------------------------------------------------------------------------

/// First structural violation found in a poem set document.
///
/// Sonnet and line indices are 0-based. Validation stops at the first
/// violation so the error can name a single editable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoemSetIssue {
    /// The set does not contain exactly [`POEMS_PER_SET`] sonnets.
    WrongPoemCount { found: usize },
    /// A sonnet does not contain exactly [`LINES_PER_SONNET`] lines.
    WrongLineCount { sonnet: usize, lines: usize },
    /// A line is empty or whitespace-only.
    BlankLine { sonnet: usize, line: usize },
}

impl std::fmt::Display for PoemSetIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoemSetIssue::WrongPoemCount { found } => {
                write!(f, "Expected {POEMS_PER_SET} sonnets, found {found}")
            }
            PoemSetIssue::WrongLineCount { sonnet, lines } => write!(
                f,
                "Sonnet {} has {lines} lines, expected {LINES_PER_SONNET}",
                sonnet + 1
            ),
            PoemSetIssue::BlankLine { sonnet, line } => {
                write!(f, "Sonnet {} line {} is blank", sonnet + 1, line + 1)
            }
        }
    }
}

/// Validate that a document meets the published-set structure: exactly 10
/// sonnets, each with exactly 14 non-blank lines.
///
/// Returns the first violation in reading order (sonnet by sonnet, line by
/// line), or `Ok(())` when the document is publishable.
pub fn validate_for_publish(doc: &PoemSetDoc) -> Result<(), PoemSetIssue> {
    if doc.poems.len() != POEMS_PER_SET {
        return Err(PoemSetIssue::WrongPoemCount {
            found: doc.poems.len(),
        });
    }

    for (sonnet, poem) in doc.poems.iter().enumerate() {
        let non_blank = poem.lines.iter().filter(|l| !l.trim().is_empty()).count();
        if poem.lines.len() != LINES_PER_SONNET || non_blank != LINES_PER_SONNET {
            // Prefer naming a specific blank line when the count is right.
            if poem.lines.len() == LINES_PER_SONNET {
                for (line, text) in poem.lines.iter().enumerate() {
                    if text.trim().is_empty() {
                        return Err(PoemSetIssue::BlankLine { sonnet, line });
                    }
                }
            }
            return Err(PoemSetIssue::WrongLineCount {
                sonnet,
                lines: non_blank,
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
