//! Remote update merging for full-document row-change notifications.

use sonnet_core::poem::PoemSetDoc;

/// What a remote merge did to the local document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub title_changed: bool,
    pub tags_changed: bool,
    /// Sonnet indices whose local text was replaced by the incoming text.
    pub replaced_sonnets: Vec<usize>,
    /// Sonnet indices where the incoming text differed but was held back
    /// because the local user is focused there.
    pub shielded_sonnets: Vec<usize>,
}

impl MergeOutcome {
    /// `true` if the merge changed anything locally.
    pub fn changed(&self) -> bool {
        self.title_changed || self.tags_changed || !self.replaced_sonnets.is_empty()
    }
}

/// Apply an incoming full-document update to the local editing state.
///
/// Title and tags are low-conflict metadata and are always overwritten.
/// Sonnet `i` is replaced only when the local user's focus is not on `i`
/// AND the incoming text differs from the local text. This is the entire
/// conflict-avoidance strategy: concurrent edits to any other sonnet are
/// not detected, the most recent store write simply wins and silently
/// overwrites unsaved local edits there. No versioning is used.
pub fn merge_remote_update(
    local: &mut PoemSetDoc,
    incoming: &PoemSetDoc,
    focused: Option<usize>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    if local.title != incoming.title {
        local.title = incoming.title.clone();
        outcome.title_changed = true;
    }
    if local.tags != incoming.tags {
        local.tags = incoming.tags.clone();
        outcome.tags_changed = true;
    }

    for (i, remote_poem) in incoming.poems.iter().enumerate() {
        let differs = local
            .poems
            .get(i)
            .map_or(true, |p| p.lines != remote_poem.lines);
        if !differs {
            continue;
        }

        // "My focus is my shield": never clobber the sonnet under edit.
        if focused == Some(i) {
            outcome.shielded_sonnets.push(i);
            continue;
        }

        match local.poems.get_mut(i) {
            Some(poem) => poem.lines = remote_poem.lines.clone(),
            None => local.poems.push(remote_poem.clone()),
        }
        outcome.replaced_sonnets.push(i);
    }

    // The incoming document is authoritative for sonnet count, except a
    // focused trailing sonnet is kept like any other shielded edit.
    if local.poems.len() > incoming.poems.len() && focused.map_or(true, |f| f < incoming.poems.len())
    {
        local.poems.truncate(incoming.poems.len());
    }

    outcome
}
