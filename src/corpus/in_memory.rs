//! InMemoryCorpus - HashMap-backed corpus for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{ChangeMessage, ChangeRecord, Corpus, CorpusError, MetaCommit, ProjectRecord};

#[derive(Default)]
struct CorpusData {
    /// project name -> change id -> open change
    projects: HashMap<String, HashMap<String, ChangeRecord>>,
    commits: HashMap<String, MetaCommit>,
}

/// In-memory corpus backed by `Arc<RwLock<..>>`.
///
/// Clone-friendly (cloning shares the same underlying storage). Mutations do
/// not notify anyone; whoever mutates is responsible for marking caches stale.
#[derive(Clone, Default)]
pub struct InMemoryCorpus {
    storage: Arc<RwLock<CorpusData>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project. Re-adding an existing project is a no-op.
    pub fn add_project(&self, name: &str) -> Result<(), CorpusError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        storage.projects.entry(name.to_string()).or_default();
        Ok(())
    }

    /// Insert or replace an open change, creating the project if needed.
    pub fn put_change(&self, project: &str, change: ChangeRecord) -> Result<(), CorpusError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        storage
            .projects
            .entry(project.to_string())
            .or_default()
            .insert(change.id.clone(), change);
        Ok(())
    }

    /// Remove a change from the open set (merged or abandoned).
    /// Returns true if it was open.
    pub fn close_change(&self, project: &str, id: &str) -> Result<bool, CorpusError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        let changes = storage
            .projects
            .get_mut(project)
            .ok_or_else(|| CorpusError::ProjectNotFound(project.to_string()))?;
        Ok(changes.remove(id).is_some())
    }

    /// Append a review message to an open change.
    pub fn add_message(
        &self,
        project: &str,
        id: &str,
        message: ChangeMessage,
    ) -> Result<(), CorpusError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        let change = storage
            .projects
            .get_mut(project)
            .ok_or_else(|| CorpusError::ProjectNotFound(project.to_string()))?
            .get_mut(id)
            .ok_or_else(|| CorpusError::Storage(format!("no open change {} in {}", id, project)))?;
        change.messages.push(message);
        Ok(())
    }

    /// Insert or replace a meta commit in the ancestry graph.
    pub fn put_meta_commit(&self, commit: MetaCommit) -> Result<(), CorpusError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        storage.commits.insert(commit.hash.clone(), commit);
        Ok(())
    }
}

impl Corpus for InMemoryCorpus {
    fn projects(&self) -> Result<Vec<ProjectRecord>, CorpusError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        Ok(storage.projects.keys().map(ProjectRecord::new).collect())
    }

    fn open_changes(&self, project: &str) -> Result<Vec<ChangeRecord>, CorpusError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        storage
            .projects
            .get(project)
            .map(|changes| changes.values().cloned().collect())
            .ok_or_else(|| CorpusError::ProjectNotFound(project.to_string()))
    }

    fn meta_commit(&self, hash: &str) -> Result<Option<MetaCommit>, CorpusError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| CorpusError::Storage("lock poisoned".into()))?;
        Ok(storage.commits.get(hash).cloned())
    }
}
