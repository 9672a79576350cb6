use std::sync::Arc;

use super::{Snapshot, SnapshotProject};

/// Narrow a snapshot to the changes owned by `owner` (exact, case-sensitive).
///
/// An empty `owner` returns the same `Arc` untouched. Otherwise a new snapshot
/// is returned holding only projects with at least one matching change, in
/// their original order; the input is never modified.
pub fn filter_by_owner(snapshot: &Arc<Snapshot>, owner: &str) -> Arc<Snapshot> {
    if owner.is_empty() {
        return Arc::clone(snapshot);
    }

    let projects = snapshot
        .projects
        .iter()
        .filter_map(|project| {
            let changes: Vec<_> = project
                .changes
                .iter()
                .filter(|change| change.owner == owner)
                .cloned()
                .collect();
            (!changes.is_empty()).then(|| SnapshotProject {
                name: project.name.clone(),
                changes,
            })
        })
        .collect();

    Arc::new(Snapshot {
        projects,
        generation: snapshot.generation,
        built_at: snapshot.built_at,
    })
}
