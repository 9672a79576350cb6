//! Views - immutable, sorted snapshots of the open changes in a corpus.
//!
//! A [`Snapshot`] is built in one piece by [`ViewBuilder`] and published as an
//! `Arc<Snapshot>`. Once published it is never mutated, only replaced, so a
//! reader holding one always sees a single build generation.
//!
//! ## Example
//!
//! ```ignore
//! use open_reviews::{filter_by_owner, ViewBuilder};
//!
//! let snapshot = Arc::new(ViewBuilder::default().build(&corpus, 1)?);
//! let mine = filter_by_owner(&snapshot, "Gopher");
//! ```

mod builder;
mod filter;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use builder::{ViewBuilder, LAST_UPDATE_FORMAT};
pub use filter::filter_by_owner;

/// An open change as shown in the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotChange {
    pub id: String,
    pub number: u64,
    pub subject: String,
    /// Resolved owner name, empty if it could not be resolved.
    pub owner: String,
    pub last_update: DateTime<Utc>,
    /// `last_update` rendered as `YYYY-MM-DD`.
    pub formatted_last_update: String,
}

/// A project and its open changes, oldest activity first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotProject {
    pub name: String,
    pub changes: Vec<SnapshotChange>,
}

/// The full view: projects by name, each with changes by last update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Snapshot {
    pub projects: Vec<SnapshotProject>,
    /// Rebuild counter. Zero for the placeholder published before the first build.
    pub generation: u64,
    /// When the build finished. `None` before the first build.
    pub built_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The placeholder held by a cache that has never built.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn project(&self, name: &str) -> Option<&SnapshotProject> {
        self.projects.iter().find(|project| project.name == name)
    }

    /// Total number of changes across all projects.
    pub fn change_count(&self) -> usize {
        self.projects.iter().map(|project| project.changes.len()).sum()
    }
}
