//! The combinatorial reader.
//!
//! A [`Selection`] picks, for each of the 14 line positions, which of the
//! ten sonnets contributes that line. Assembling a reading is O(1) index
//! arithmetic per line; no text is copied. A selection is interchangeable
//! with its rank, a single integer in `0..10^14` where line position 0 is
//! the most significant decimal digit.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::poem::{Poem, LINES_PER_SONNET, POEMS_PER_SET, TOTAL_COMBINATIONS};

/// Per-line-position choice of source sonnet.
///
/// `selection[position]` is the 0-based sonnet index whose line at
/// `position` is displayed. Every entry is `< POEMS_PER_SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection([u8; LINES_PER_SONNET]);

impl Selection {
    /// A selection reading every line from the same sonnet.
    pub fn uniform(poem: usize) -> Result<Self, CoreError> {
        if poem >= POEMS_PER_SET {
            return Err(CoreError::Validation(format!(
                "Sonnet index {poem} out of range (0..{POEMS_PER_SET})"
            )));
        }
        Ok(Self([poem as u8; LINES_PER_SONNET]))
    }

    /// Build a selection from explicit per-position choices.
    pub fn new(choices: [u8; LINES_PER_SONNET]) -> Result<Self, CoreError> {
        for (position, &choice) in choices.iter().enumerate() {
            if choice as usize >= POEMS_PER_SET {
                return Err(CoreError::Validation(format!(
                    "Choice {choice} at line position {position} out of range"
                )));
            }
        }
        Ok(Self(choices))
    }

    /// Decode a selection from its rank in `0..10^14`.
    ///
    /// Line position 0 maps to the most significant decimal digit, so
    /// rank 0 is "all lines from sonnet 0" and rank `10^14 - 1` is
    /// "all lines from sonnet 9".
    pub fn from_rank(rank: u64) -> Result<Self, CoreError> {
        if rank >= TOTAL_COMBINATIONS {
            return Err(CoreError::Validation(format!(
                "Rank {rank} out of range (0..{TOTAL_COMBINATIONS})"
            )));
        }
        let mut choices = [0u8; LINES_PER_SONNET];
        let mut remaining = rank;
        for position in (0..LINES_PER_SONNET).rev() {
            choices[position] = (remaining % POEMS_PER_SET as u64) as u8;
            remaining /= POEMS_PER_SET as u64;
        }
        Ok(Self(choices))
    }

    /// The rank of this selection, the inverse of [`from_rank`](Self::from_rank).
    pub fn rank(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, &choice| acc * POEMS_PER_SET as u64 + choice as u64)
    }

    /// The sonnet chosen at a line position.
    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(position).map(|&c| c as usize)
    }

    /// Change the sonnet chosen at one line position.
    pub fn set(&mut self, position: usize, poem: usize) -> Result<(), CoreError> {
        if position >= LINES_PER_SONNET {
            return Err(CoreError::Validation(format!(
                "Line position {position} out of range (0..{LINES_PER_SONNET})"
            )));
        }
        if poem >= POEMS_PER_SET {
            return Err(CoreError::Validation(format!(
                "Sonnet index {poem} out of range (0..{POEMS_PER_SET})"
            )));
        }
        self.0[position] = poem as u8;
        Ok(())
    }
}

impl Default for Selection {
    /// The all-zeros selection: the first sonnet, read straight through.
    fn default() -> Self {
        Self([0; LINES_PER_SONNET])
    }
}

/// Assemble the reading a selection describes, borrowing one line per
/// position from the source sonnets.
///
/// Fails if the set does not have the published 10x14 shape (drafts are
/// not readable combinatorially).
pub fn assemble<'a>(
    poems: &'a [Poem],
    selection: &Selection,
) -> Result<Vec<&'a str>, CoreError> {
    if poems.len() != POEMS_PER_SET {
        return Err(CoreError::Validation(format!(
            "Expected {POEMS_PER_SET} sonnets, found {}",
            poems.len()
        )));
    }

    let mut lines = Vec::with_capacity(LINES_PER_SONNET);
    for position in 0..LINES_PER_SONNET {
        let poem = &poems[selection.0[position] as usize];
        let line = poem.lines.get(position).ok_or_else(|| {
            CoreError::Validation(format!(
                "Sonnet {} has no line at position {position}",
                selection.0[position]
            ))
        })?;
        lines.push(line.as_str());
    }
    Ok(lines)
}
