//! Debounced autosave of the local document to the backing store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sonnet_core::error::CoreError;
use sonnet_core::poem::{validate_for_publish, PoemSetDoc, PoemSetIssue};
use sonnet_core::types::{DbId, Timestamp};
use tokio::sync::Mutex;

/// Quiet period after the last edit before an autosave fires.
pub const DEBOUNCE: Duration = Duration::from_secs(3);

/// Write access to the authoritative poem set document.
///
/// The API layer implements this over the poem set repository; tests use
/// an in-memory recorder.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save_doc(&self, poem_set_id: DbId, doc: &PoemSetDoc) -> Result<(), CoreError>;
}

/// Why a manual save was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Structural validation failed; nothing was written and the editable
    /// state is preserved.
    #[error("{0}")]
    Invalid(PoemSetIssue),

    /// The store write failed; the document stays dirty.
    #[error(transparent)]
    Store(#[from] CoreError),
}

#[derive(Debug)]
struct SchedulerState {
    doc: PoemSetDoc,
    dirty: bool,
    /// Bumped on every edit and manual save; a pending timer whose epoch
    /// no longer matches has been superseded and does nothing.
    epoch: u64,
    last_saved_at: Option<Timestamp>,
}

struct Inner<S> {
    store: S,
    poem_set_id: DbId,
    state: Mutex<SchedulerState>,
}

/// Per-open-poem-set autosave state machine.
///
/// `Clean → (edit) → Dirty(pending timer) → (timer fires, write succeeds)
/// → Clean`. Every edit restarts the 3-second debounce window, so a client
/// typing continuously never autosaves until it pauses.
///
/// The debounced path writes the full current document without structural
/// validation, so invalid drafts can persist silently; a manual
/// [`save_now`](AutosaveScheduler::save_now) validates first and refuses,
/// naming the first violation. Autosave failures are logged only and leave
/// the dirty flag set; nothing retries.
pub struct AutosaveScheduler<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for AutosaveScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore + 'static> AutosaveScheduler<S> {
    pub fn new(store: S, poem_set_id: DbId, doc: PoemSetDoc) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                poem_set_id,
                state: Mutex::new(SchedulerState {
                    doc,
                    dirty: false,
                    epoch: 0,
                    last_saved_at: None,
                }),
            }),
        }
    }

    /// Record a local edit: replace the held document, mark it dirty, and
    /// restart the debounce timer.
    pub async fn edit(&self, doc: PoemSetDoc) {
        let epoch = {
            let mut state = self.inner.state.lock().await;
            state.doc = doc;
            state.dirty = true;
            state.epoch += 1;
            state.epoch
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            Self::flush_if_current(&inner, epoch).await;
        });
    }

    /// Debounce expiry: write the document unless a newer edit or a manual
    /// save has superseded this timer.
    async fn flush_if_current(inner: &Inner<S>, epoch: u64) {
        let mut state = inner.state.lock().await;
        if state.epoch != epoch || !state.dirty {
            return;
        }

        match inner.store.save_doc(inner.poem_set_id, &state.doc).await {
            Ok(()) => {
                state.dirty = false;
                state.last_saved_at = Some(Utc::now());
            }
            Err(e) => {
                // Silent failure: the user is not notified and nothing
                // retries. The dirty flag stays set.
                tracing::error!(
                    error = %e,
                    poem_set_id = inner.poem_set_id,
                    "Autosave failed"
                );
            }
        }
    }

    /// Manual save: validate the document structure first (exactly 14
    /// non-blank lines per sonnet), then write immediately.
    ///
    /// A successful save supersedes any pending autosave timer.
    pub async fn save_now(&self) -> Result<(), SaveError> {
        let mut state = self.inner.state.lock().await;

        if let Err(issue) = validate_for_publish(&state.doc) {
            return Err(SaveError::Invalid(issue));
        }

        self.inner
            .store
            .save_doc(self.inner.poem_set_id, &state.doc)
            .await?;

        state.dirty = false;
        state.epoch += 1;
        state.last_saved_at = Some(Utc::now());
        Ok(())
    }

    pub async fn is_dirty(&self) -> bool {
        self.inner.state.lock().await.dirty
    }

    pub async fn last_saved_at(&self) -> Option<Timestamp> {
        self.inner.state.lock().await.last_saved_at
    }

    /// The document the next save would write.
    pub async fn doc(&self) -> PoemSetDoc {
        self.inner.state.lock().await.doc.clone()
    }
}
