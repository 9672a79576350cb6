use chrono::Utc;

use super::{Snapshot, SnapshotChange, SnapshotProject};
use crate::corpus::{ChangeRecord, Corpus, CorpusError};
use crate::owner::OwnerResolver;

/// Display format of [`SnapshotChange::formatted_last_update`].
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d";

/// Builds a [`Snapshot`] from the current state of a corpus.
///
/// Deterministic for a fixed corpus state. Any corpus error aborts the build;
/// nothing partial is ever returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewBuilder {
    resolver: OwnerResolver,
}

impl ViewBuilder {
    pub fn new(resolver: OwnerResolver) -> Self {
        Self { resolver }
    }

    pub(crate) fn resolver(&self) -> &OwnerResolver {
        &self.resolver
    }

    /// Build a snapshot stamped with `generation`.
    pub fn build<C: Corpus + ?Sized>(
        &self,
        corpus: &C,
        generation: u64,
    ) -> Result<Snapshot, CorpusError> {
        let mut projects = Vec::new();

        for record in corpus.projects()? {
            let mut changes = corpus
                .open_changes(&record.name)?
                .iter()
                .map(|change| self.project_change(corpus, change))
                .collect::<Result<Vec<_>, _>>()?;

            // Stable: ties keep corpus order.
            changes.sort_by(|a, b| a.last_update.cmp(&b.last_update));

            projects.push(SnapshotProject {
                name: record.name,
                changes,
            });
        }

        projects.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Snapshot {
            projects,
            generation,
            built_at: Some(Utc::now()),
        })
    }

    fn project_change<C: Corpus + ?Sized>(
        &self,
        corpus: &C,
        change: &ChangeRecord,
    ) -> Result<SnapshotChange, CorpusError> {
        let last_update = change.last_update();
        Ok(SnapshotChange {
            id: change.id.clone(),
            number: change.number,
            subject: change.subject.clone(),
            owner: self.resolver.resolve(corpus, change)?,
            last_update,
            formatted_last_update: last_update.format(LAST_UPDATE_FORMAT).to_string(),
        })
    }
}
