//! Corpus-change notifications over an [`EventEmitter`].
//!
//! Whatever ingests into the corpus emits [`CORPUS_CHANGED`] with a short
//! description of the mutation; caches listening on the same emitter mark
//! themselves stale.

use event_emitter_rs::EventEmitter;

use crate::cache::ReviewsCache;
use crate::corpus::Corpus;

/// Event name for "the corpus was mutated".
pub const CORPUS_CHANGED: &str = "corpus.changed";

impl<C: Corpus + 'static> ReviewsCache<C> {
    /// Mark this cache stale whenever `emitter` fires [`CORPUS_CHANGED`].
    ///
    /// The emitter delivers on its own threads, so the flag flips shortly
    /// after `emit` returns rather than before.
    pub fn listen(&self, emitter: &mut EventEmitter) {
        let cache = self.clone();
        emitter.on(CORPUS_CHANGED, move |change: String| {
            tracing::debug!(change = %change, "corpus change notification");
            cache.mark_stale();
        });
    }
}
