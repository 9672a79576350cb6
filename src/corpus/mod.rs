//! Corpus - the read contract the reviews view is derived from.
//!
//! The corpus owns project and change history; this crate only reads it.
//! Enumeration order is unspecified everywhere, so callers sort.
//!
//! ## Example
//!
//! ```ignore
//! use open_reviews::{Corpus, InMemoryCorpus};
//!
//! let corpus = InMemoryCorpus::new();
//! corpus.add_project("go")?;
//! corpus.put_change("go", change)?;
//!
//! for project in corpus.projects()? {
//!     let open = corpus.open_changes(&project.name)?;
//! }
//! ```

mod in_memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use in_memory::InMemoryCorpus;

/// Error type for corpus reads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorpusError {
    /// The corpus cannot serve reads right now.
    #[error("corpus unavailable: {0}")]
    Unavailable(String),
    /// A project vanished between enumeration and lookup.
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    /// Storage-level failure.
    #[error("corpus storage error: {0}")]
    Storage(String),
}

/// A project known to the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A review message posted on a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMessage {
    pub date: DateTime<Utc>,
    pub body: String,
}

impl ChangeMessage {
    pub fn new(date: DateTime<Utc>, body: impl Into<String>) -> Self {
        Self {
            date,
            body: body.into(),
        }
    }
}

/// An open change as the corpus stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Opaque identifier, unique within the corpus.
    pub id: String,
    /// Review number shown to humans.
    pub number: u64,
    /// First line of the change description.
    pub subject: String,
    /// Commit time of the change's base commit.
    pub commit_time: DateTime<Utc>,
    /// Review messages, oldest first.
    pub messages: Vec<ChangeMessage>,
    /// Hash of the change's meta commit, if the corpus tracks one.
    pub meta: Option<String>,
}

impl ChangeRecord {
    pub fn new(
        id: impl Into<String>,
        number: u64,
        subject: impl Into<String>,
        commit_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            number,
            subject: subject.into(),
            commit_time,
            messages: Vec::new(),
            meta: None,
        }
    }

    pub fn with_message(mut self, message: ChangeMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_meta(mut self, hash: impl Into<String>) -> Self {
        self.meta = Some(hash.into());
        self
    }

    /// Time of the latest activity: the last message if any, otherwise the
    /// base commit. Messages are appended chronologically, so the last one
    /// is the newest.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.messages
            .last()
            .map(|message| message.date)
            .unwrap_or(self.commit_time)
    }
}

/// Commit author identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A node in a change's meta-commit ancestry graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaCommit {
    pub hash: String,
    pub author: Author,
    /// Parent hashes in commit order. Only the first is ever followed.
    pub parents: Vec<String>,
}

impl MetaCommit {
    pub fn new(hash: impl Into<String>, author: Author) -> Self {
        Self {
            hash: hash.into(),
            author,
            parents: Vec::new(),
        }
    }

    pub fn with_parent(mut self, hash: impl Into<String>) -> Self {
        self.parents.push(hash.into());
        self
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// Read access to a change-tracking corpus.
///
/// Implementations must be safe to read from many threads at once; the
/// cache calls these only while rebuilding.
pub trait Corpus: Send + Sync {
    /// Enumerate every project. Order is unspecified.
    fn projects(&self) -> Result<Vec<ProjectRecord>, CorpusError>;

    /// Enumerate the currently open changes of a project. Order is unspecified.
    fn open_changes(&self, project: &str) -> Result<Vec<ChangeRecord>, CorpusError>;

    /// Look up a meta commit by hash. Returns `None` for unknown hashes.
    fn meta_commit(&self, hash: &str) -> Result<Option<MetaCommit>, CorpusError>;
}
