//! Owner resolution over the meta-commit ancestry graph.
//!
//! A change's meta history is an append-only chain: every meta commit points
//! at its predecessor through its first parent, and the root commit records
//! who created the change. Resolving an owner walks first parents until a
//! parentless commit is reached and returns that commit's author name.

use std::collections::HashSet;

use crate::corpus::{ChangeRecord, Corpus, CorpusError};

/// Walks first-parent chains to find the author of a change's root meta commit.
#[derive(Debug, Clone, Copy)]
pub struct OwnerResolver {
    max_depth: usize,
}

impl Default for OwnerResolver {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl OwnerResolver {
    /// Create a resolver that gives up after `max_depth` parent steps.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolve the owner of a change. Returns the empty string when the change
    /// has no meta commit, the chain references an unknown commit, or the
    /// chain is cyclic or deeper than the cap.
    ///
    /// Corpus read failures are returned as errors.
    pub fn resolve<C: Corpus + ?Sized>(
        &self,
        corpus: &C,
        change: &ChangeRecord,
    ) -> Result<String, CorpusError> {
        let Some(start) = change.meta.as_deref() else {
            return Ok(String::new());
        };
        self.resolve_from(corpus, start)
    }

    /// Resolve starting from an arbitrary meta commit hash.
    pub fn resolve_from<C: Corpus + ?Sized>(
        &self,
        corpus: &C,
        hash: &str,
    ) -> Result<String, CorpusError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = hash.to_string();

        for _ in 0..=self.max_depth {
            if !seen.insert(current.clone()) {
                tracing::warn!(commit = %current, "meta commit ancestry is cyclic; owner unresolved");
                return Ok(String::new());
            }

            let Some(commit) = corpus.meta_commit(&current)? else {
                tracing::debug!(commit = %current, "meta commit not in corpus; owner unresolved");
                return Ok(String::new());
            };

            // Only the first parent counts; merges into meta history are ignored.
            match commit.parents.into_iter().next() {
                Some(parent) => current = parent,
                None => return Ok(commit.author.name),
            }
        }

        tracing::warn!(
            start = %hash,
            max_depth = self.max_depth,
            "meta commit ancestry exceeds depth cap; owner unresolved"
        );
        Ok(String::new())
    }
}
