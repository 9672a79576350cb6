mod cache;
mod config;
mod corpus;
mod error;
#[cfg(feature = "emitter")]
mod notify;
mod owner;
mod view;

pub use cache::{RefreshStats, RefreshWorkerThread, ReviewsCache};
pub use config::ReviewsConfig;
pub use corpus::{
    Author, ChangeMessage, ChangeRecord, Corpus, CorpusError, InMemoryCorpus, MetaCommit,
    ProjectRecord,
};
pub use error::ReviewsError;
#[cfg(feature = "emitter")]
pub use notify::CORPUS_CHANGED;
pub use owner::OwnerResolver;
pub use view::{
    filter_by_owner, Snapshot, SnapshotChange, SnapshotProject, ViewBuilder, LAST_UPDATE_FORMAT,
};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
