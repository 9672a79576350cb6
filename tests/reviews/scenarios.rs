use std::sync::Arc;

use open_reviews::{
    ChangeMessage, ChangeRecord, CorpusError, InMemoryCorpus, MetaCommit, ReviewsCache,
    ReviewsConfig, ReviewsError,
};

use crate::support::{at, author, root_meta, InstrumentedCorpus};

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn message_moves_change_after_untouched_one() {
    let corpus = InMemoryCorpus::new();
    corpus
        .put_change(
            "x",
            ChangeRecord::new("reviewed", 2, "net/http: fix", at(2020, 1, 1))
                .with_message(ChangeMessage::new(at(2020, 2, 1), "Patch Set 2: Code-Review+2")),
        )
        .unwrap();
    corpus
        .put_change("x", ChangeRecord::new("quiet", 1, "os: doc", at(2020, 1, 1)))
        .unwrap();
    let cache = ReviewsCache::new(Arc::new(corpus), ReviewsConfig::default());

    let snapshot = cache.get().unwrap();
    let changes = &snapshot.project("x").unwrap().changes;
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].id, "quiet");
    assert_eq!(changes[0].formatted_last_update, "2020-01-01");
    assert_eq!(changes[1].id, "reviewed");
    assert_eq!(changes[1].formatted_last_update, "2020-02-01");
}

#[test]
fn projects_listed_alphabetically() {
    let corpus = InMemoryCorpus::new();
    corpus
        .put_change("beta", ChangeRecord::new("b", 1, "b", at(2020, 1, 1)))
        .unwrap();
    corpus
        .put_change("alpha", ChangeRecord::new("a", 2, "a", at(2020, 1, 1)))
        .unwrap();
    let cache = ReviewsCache::new(Arc::new(corpus), ReviewsConfig::default());

    let snapshot = cache.get().unwrap();
    let names: Vec<_> = snapshot.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn owner_is_author_of_root_meta_commit() {
    let corpus = InMemoryCorpus::new();
    // A <- B <- C, C has no parents.
    corpus
        .put_meta_commit(MetaCommit::new("A", author("Gobot")).with_parent("B"))
        .unwrap();
    corpus
        .put_meta_commit(MetaCommit::new("B", author("Reviewer")).with_parent("C"))
        .unwrap();
    corpus
        .put_meta_commit(MetaCommit::new("C", author("Gopher")))
        .unwrap();
    corpus
        .put_change(
            "go",
            ChangeRecord::new("c1", 12345, "cmd/go: cache", at(2020, 1, 1)).with_meta("A"),
        )
        .unwrap();
    let cache = ReviewsCache::new(Arc::new(corpus), ReviewsConfig::default());

    let snapshot = cache.get().unwrap();
    assert_eq!(snapshot.projects[0].changes[0].owner, "Gopher");
}

#[test]
fn cyclic_meta_history_does_not_hang_the_build() {
    let corpus = InMemoryCorpus::new();
    corpus
        .put_meta_commit(MetaCommit::new("A", author("Ann")).with_parent("B"))
        .unwrap();
    corpus
        .put_meta_commit(MetaCommit::new("B", author("Bob")).with_parent("A"))
        .unwrap();
    corpus
        .put_change("go", ChangeRecord::new("c1", 1, "loop", at(2020, 1, 1)).with_meta("A"))
        .unwrap();
    let cache = ReviewsCache::new(Arc::new(corpus), ReviewsConfig::default());

    let snapshot = cache.get().unwrap();
    assert_eq!(snapshot.projects[0].changes[0].owner, "");
    assert!(cache.query(Some("Ann")).unwrap().is_empty());
}

// ============================================================================
// Filtering through the query surface
// ============================================================================

fn two_owner_corpus() -> InMemoryCorpus {
    let corpus = InMemoryCorpus::new();
    let ann = root_meta(&corpus, "m-ann", "Ann");
    let bob = root_meta(&corpus, "m-bob", "Bob");
    corpus
        .put_change("go", ChangeRecord::new("g1", 1, "g1", at(2020, 1, 3)).with_meta(&ann))
        .unwrap();
    corpus
        .put_change("go", ChangeRecord::new("g2", 2, "g2", at(2020, 1, 1)).with_meta(&bob))
        .unwrap();
    corpus
        .put_change("go", ChangeRecord::new("g3", 3, "g3", at(2020, 1, 2)).with_meta(&ann))
        .unwrap();
    corpus
        .put_change("tools", ChangeRecord::new("t1", 4, "t1", at(2020, 1, 1)).with_meta(&bob))
        .unwrap();
    corpus
        .put_change("net", ChangeRecord::new("n1", 5, "n1", at(2020, 1, 1)))
        .unwrap();
    corpus
}

#[test]
fn owner_query_keeps_order_and_drops_empty_projects() {
    let cache = ReviewsCache::new(Arc::new(two_owner_corpus()), ReviewsConfig::default());

    let ann = cache.query(Some("Ann")).unwrap();
    assert_eq!(ann.projects.len(), 1);
    assert_eq!(ann.projects[0].name, "go");
    let ids: Vec<_> = ann.projects[0].changes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["g3", "g1"]);

    let bob = cache.query(Some("Bob")).unwrap();
    let names: Vec<_> = bob.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["go", "tools"]);
}

#[test]
fn empty_owner_query_is_the_cached_snapshot() {
    let cache = ReviewsCache::new(Arc::new(two_owner_corpus()), ReviewsConfig::default());

    let cached = cache.get().unwrap();
    assert!(Arc::ptr_eq(&cached, &cache.query(None).unwrap()));
    assert!(Arc::ptr_eq(&cached, &cache.query(Some("")).unwrap()));
}

#[test]
fn filtering_does_not_touch_the_cache() {
    let cache = ReviewsCache::new(Arc::new(two_owner_corpus()), ReviewsConfig::default());
    let before = cache.get().unwrap();

    let _ = cache.query(Some("Ann")).unwrap();

    let after = cache.get().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.change_count(), 5);
}

// ============================================================================
// Staleness
// ============================================================================

#[test]
fn mark_stale_then_get_reflects_corpus() {
    let corpus = InMemoryCorpus::new();
    corpus
        .put_change("go", ChangeRecord::new("c1", 1, "c1", at(2020, 1, 1)))
        .unwrap();
    let cache = ReviewsCache::new(Arc::new(corpus.clone()), ReviewsConfig::default());
    assert_eq!(cache.init().unwrap().change_count(), 1);

    corpus.close_change("go", "c1").unwrap();
    corpus
        .put_change("go", ChangeRecord::new("c2", 2, "c2", at(2020, 3, 1)))
        .unwrap();
    cache.mark_stale();

    let snapshot = cache.get().unwrap();
    assert!(!cache.is_stale());
    assert_eq!(snapshot.generation, 2);
    let ids: Vec<_> = snapshot.projects[0].changes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c2"]);
}

#[test]
fn new_message_reorders_after_rebuild() {
    let corpus = InMemoryCorpus::new();
    corpus
        .put_change("go", ChangeRecord::new("old", 1, "old", at(2020, 1, 1)))
        .unwrap();
    corpus
        .put_change("go", ChangeRecord::new("new", 2, "new", at(2020, 1, 2)))
        .unwrap();
    let cache = ReviewsCache::new(Arc::new(corpus.clone()), ReviewsConfig::default());
    assert_eq!(cache.get().unwrap().projects[0].changes[0].id, "old");

    corpus
        .add_message("go", "old", ChangeMessage::new(at(2020, 5, 1), "ping"))
        .unwrap();
    cache.mark_stale();

    let changes = cache.get().unwrap().projects[0].changes.clone();
    assert_eq!(changes[0].id, "new");
    assert_eq!(changes[1].id, "old");
    assert_eq!(changes[1].formatted_last_update, "2020-05-01");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn enumeration_failure_surfaces_and_retries() {
    let instrumented = Arc::new(InstrumentedCorpus::new(two_owner_corpus()));
    let cache = ReviewsCache::new(instrumented.clone(), ReviewsConfig::default());
    let good = cache.init().unwrap();

    instrumented.fail_enumeration(true);
    cache.mark_stale();

    assert_eq!(
        cache.get().unwrap_err(),
        ReviewsError::Corpus(CorpusError::Unavailable("maintner mirror down".into()))
    );
    assert!(cache.query(Some("Ann")).is_err());
    assert!(cache.is_stale());
    assert_eq!(cache.generation(), good.generation);

    instrumented.fail_enumeration(false);
    let recovered = cache.get().unwrap();
    assert_eq!(recovered.generation, good.generation + 1);
    assert_eq!(recovered.projects, good.projects);
}

#[test]
fn meta_lookup_failure_aborts_whole_build() {
    let instrumented = Arc::new(InstrumentedCorpus::new(two_owner_corpus()));
    instrumented.fail_meta_lookups(true);
    let cache = ReviewsCache::new(instrumented.clone(), ReviewsConfig::default());

    let err = cache.get().unwrap_err();
    assert!(matches!(err, ReviewsError::Corpus(CorpusError::Storage(_))));
    assert_eq!(cache.generation(), 0);
    assert!(cache.is_stale());
}

// ============================================================================
// Renderer hand-off
// ============================================================================

#[test]
fn snapshot_serializes_display_fields() {
    let cache = ReviewsCache::new(Arc::new(two_owner_corpus()), ReviewsConfig::default());
    let snapshot = cache.query(Some("Bob")).unwrap();

    let json = serde_json::to_value(&*snapshot).unwrap();
    let tools = &json["projects"][1];
    assert_eq!(tools["name"], "tools");
    assert_eq!(tools["changes"][0]["id"], "t1");
    assert_eq!(tools["changes"][0]["number"], 4);
    assert_eq!(tools["changes"][0]["owner"], "Bob");
    assert_eq!(tools["changes"][0]["formatted_last_update"], "2020-01-01");
    assert_eq!(json["generation"], 1);
}
