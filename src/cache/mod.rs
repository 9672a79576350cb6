//! ReviewsCache - the lazily rebuilt open-changes view.
//!
//! The cache holds one entry, the current [`Snapshot`], plus a staleness flag.
//! Readers take the shared lock and clone the `Arc`. When the flag is set, the
//! first reader to get the exclusive lock rebuilds from the corpus and
//! publishes the result; everyone queued behind it sees the new snapshot.
//!
//! ## Example
//!
//! ```ignore
//! use open_reviews::{InMemoryCorpus, ReviewsCache, ReviewsConfig};
//!
//! let corpus = Arc::new(InMemoryCorpus::new());
//! let cache = ReviewsCache::new(corpus.clone(), ReviewsConfig::default());
//! cache.init()?;
//!
//! // Corpus mutated somewhere else:
//! cache.mark_stale();
//!
//! // Next request rebuilds, later ones hit the fast path.
//! let mine = cache.query(Some("Gopher"))?;
//! ```

mod refresher;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::config::ReviewsConfig;
use crate::corpus::Corpus;
use crate::error::ReviewsError;
use crate::owner::OwnerResolver;
use crate::view::{filter_by_owner, Snapshot, ViewBuilder};

pub use refresher::{RefreshStats, RefreshWorkerThread};

struct CacheState {
    snapshot: Arc<Snapshot>,
    stale: bool,
}

/// Concurrency-safe holder of the current reviews snapshot.
///
/// Clone-friendly (cloning shares the same state and corpus handle), so one
/// instance can be handed to every request worker.
pub struct ReviewsCache<C: Corpus> {
    corpus: Arc<C>,
    builder: ViewBuilder,
    config: ReviewsConfig,
    state: Arc<RwLock<CacheState>>,
}

impl<C: Corpus> Clone for ReviewsCache<C> {
    fn clone(&self) -> Self {
        Self {
            corpus: Arc::clone(&self.corpus),
            builder: self.builder,
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<C: Corpus> ReviewsCache<C> {
    /// Create a cache over `corpus`. Starts empty and stale; nothing is read
    /// from the corpus until [`init`](Self::init) or the first [`get`](Self::get).
    pub fn new(corpus: Arc<C>, config: ReviewsConfig) -> Self {
        Self {
            corpus,
            builder: ViewBuilder::new(OwnerResolver::new(config.max_ancestry_depth)),
            config,
            state: Arc::new(RwLock::new(CacheState {
                snapshot: Arc::new(Snapshot::empty()),
                stale: true,
            })),
        }
    }

    /// Build the first snapshot eagerly.
    pub fn init(&self) -> Result<Arc<Snapshot>, ReviewsError> {
        self.get()
    }

    pub fn config(&self) -> &ReviewsConfig {
        &self.config
    }

    /// Flag the current snapshot as out of date. Idempotent. Blocks only while
    /// a rebuild holds the exclusive lock, so a rebuild in flight cannot clear
    /// a mark made after it started reading.
    pub fn mark_stale(&self) {
        let mut state = self.write_state("mark stale");
        if !state.stale {
            tracing::debug!(generation = state.snapshot.generation, "reviews data marked stale");
        }
        state.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.read_state("staleness check").stale
    }

    /// Generation of the currently published snapshot.
    pub fn generation(&self) -> u64 {
        self.read_state("generation read").snapshot.generation
    }

    /// Return the current snapshot, rebuilding first if it is stale.
    ///
    /// On a failed rebuild the error is returned, the previous snapshot stays
    /// published and the cache stays stale so the next call retries.
    pub fn get(&self) -> Result<Arc<Snapshot>, ReviewsError> {
        {
            let state = self.read_state("snapshot read");
            if !state.stale {
                return Ok(Arc::clone(&state.snapshot));
            }
        }
        self.rebuild()
    }

    /// Mark stale and rebuild now.
    pub fn refresh(&self) -> Result<Arc<Snapshot>, ReviewsError> {
        self.mark_stale();
        self.rebuild()
    }

    /// Caller-facing query: the current view, narrowed to `owner` when one is
    /// given. `None` and `Some("")` both return the full view.
    pub fn query(&self, owner: Option<&str>) -> Result<Arc<Snapshot>, ReviewsError> {
        let snapshot = self.get()?;
        Ok(filter_by_owner(&snapshot, owner.unwrap_or_default()))
    }

    /// Rebuild only if stale. Returns `true` when this call built and
    /// published a new snapshot, `false` when it was fresh or another caller
    /// rebuilt while this one waited for the lock.
    pub(crate) fn refresh_if_stale(&self) -> Result<bool, ReviewsError> {
        if !self.is_stale() {
            return Ok(false);
        }
        let (_, built) = self.rebuild_tracked()?;
        Ok(built)
    }

    fn rebuild(&self) -> Result<Arc<Snapshot>, ReviewsError> {
        self.rebuild_tracked().map(|(snapshot, _)| snapshot)
    }

    fn rebuild_tracked(&self) -> Result<(Arc<Snapshot>, bool), ReviewsError> {
        let mut state = self.write_state("snapshot rebuild");

        // Someone else rebuilt while we waited for the lock.
        if !state.stale {
            return Ok((Arc::clone(&state.snapshot), false));
        }

        let generation = state.snapshot.generation + 1;
        let started = Instant::now();
        tracing::info!(
            generation,
            max_ancestry_depth = self.builder.resolver().max_depth(),
            "updating reviews data"
        );

        let snapshot = match self.builder.build(self.corpus.as_ref(), generation) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    serving_generation = state.snapshot.generation,
                    "reviews rebuild failed; keeping previous snapshot"
                );
                return Err(err.into());
            }
        };

        tracing::info!(
            generation,
            projects = snapshot.projects.len(),
            changes = snapshot.change_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reviews data updated"
        );

        state.snapshot = Arc::clone(&snapshot);
        state.stale = false;
        Ok((snapshot, true))
    }

    // A panicking rebuild poisons the lock before it reaches the publish
    // step, so the guarded state is still the old snapshot with `stale` set.
    fn read_state(&self, operation: &'static str) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|poisoned| {
            tracing::warn!(operation, "recovering reviews cache after a panicked rebuild");
            self.state.clear_poison();
            poisoned.into_inner()
        })
    }

    fn write_state(&self, operation: &'static str) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|poisoned| {
            tracing::warn!(operation, "recovering reviews cache after a panicked rebuild");
            self.state.clear_poison();
            poisoned.into_inner()
        })
    }
}
