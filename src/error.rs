use thiserror::Error;

use crate::corpus::CorpusError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewsError {
    /// The corpus failed while a rebuild was reading it. The previous
    /// snapshot stays published and the cache stays stale.
    #[error("reviews rebuild aborted: {0}")]
    Corpus(#[from] CorpusError),
}
