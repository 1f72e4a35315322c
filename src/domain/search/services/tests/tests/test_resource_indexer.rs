// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::{Arc, Mutex};

use catalog_search::*;
use catalog_search_inmem::InMemoryPercolateQueryRepository;
use catalog_search_services::*;

use crate::harness::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_reindex_all_stages_chunks_then_switches() {
    let harness = ResourceIndexerHarness::new(
        FakeResourceDocumentProvider::with_resources([
            course_document(1, "Calculus I"),
            course_document(2, "Calculus II"),
            course_document(3, "Linear Algebra"),
            course_document(4, "Differential Equations"),
            course_document(5, "Probability"),
        ]),
        None,
    );

    harness
        .indexer
        .reindex_all(vec![ObjectType::Course])
        .await
        .unwrap();

    harness.assert_events(&[
        "create_index:course",
        "bulk_index:course:reindexing:2",
        "bulk_index:course:reindexing:2",
        "bulk_index:course:reindexing:1",
        "switch:course:catalog_course_test",
    ]);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_reindex_all_failure_leaves_default_aliases_untouched() {
    let harness = ResourceIndexerHarness::new(
        FakeResourceDocumentProvider::with_resources([
            course_document(1, "Calculus I"),
            course_document(2, "Calculus II"),
            program_document(10, "Data Science"),
        ]),
        Some(ObjectType::Program),
    );

    let err = harness
        .indexer
        .reindex_all(vec![ObjectType::Course, ObjectType::Program])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReindexAllError::TypeFailed {
            object_type: ObjectType::Program,
            ..
        }
    ));

    // The course corpus was staged, but nothing switched and the
    // half-built indices were swept
    harness.assert_events(&[
        "create_index:course",
        "bulk_index:course:reindexing:2",
        "create_index:program",
        "bulk_index_failed:program",
        "delete_orphaned",
    ]);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_reindex_all_provisions_the_percolator_index() {
    let harness = ResourceIndexerHarness::new(FakeResourceDocumentProvider::default(), None);

    let stored = harness
        .percolate_query_repo
        .upsert_query(
            SubscriptionSourceType::SearchSubscription,
            serde_json::json!({"q": ["math"]}),
            serde_json::json!({"match_all": {}}),
            "math",
        )
        .await
        .unwrap();

    harness
        .indexer
        .reindex_all(vec![ObjectType::Percolator])
        .await
        .unwrap();

    // The saved-search set is replayed into the staged index before the swap
    let replayed = format!("percolate_index:{}", stored.id);
    harness.assert_events(&[
        "create_index:percolator",
        replayed.as_str(),
        "switch:percolator:catalog_percolator_test",
    ]);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_reindex_all_default_set_includes_the_percolator() {
    let harness = ResourceIndexerHarness::new(FakeResourceDocumentProvider::default(), None);

    harness.indexer.reindex_all(vec![]).await.unwrap();

    let events = harness.events.lock().unwrap().clone();
    assert!(events.contains(&"create_index:percolator".to_string()));
    assert!(events.contains(&"switch:percolator:catalog_percolator_test".to_string()));
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_index_resources_deindexes_resources_the_provider_dropped() {
    let harness = ResourceIndexerHarness::new(
        FakeResourceDocumentProvider::with_resources([course_document(1, "Calculus I")]),
        None,
    );

    harness
        .indexer
        .index_resources(ObjectType::Course, vec![1, 2], IndexSelector::All)
        .await
        .unwrap();

    harness.assert_events(&["bulk_index:course:all:1", "bulk_deindex:course:2"]);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_run_content_files_index_and_vanished_run_fallback() {
    let provider = FakeResourceDocumentProvider::default();
    provider.add_run_content(
        7,
        vec![
            ContentFileDocument {
                key: "lecture-01.pdf".to_string(),
                resource_id: 42,
                run_id: 7,
                ..Default::default()
            },
            ContentFileDocument {
                key: "lecture-02.pdf".to_string(),
                resource_id: 42,
                run_id: 7,
                ..Default::default()
            },
        ],
    );
    let harness = ResourceIndexerHarness::new(provider, None);

    harness
        .indexer
        .index_run_content_files(7, IndexSelector::All)
        .await
        .unwrap();

    // Run 9 is unknown to the provider, so its children are deleted by query
    harness
        .indexer
        .index_run_content_files(9, IndexSelector::All)
        .await
        .unwrap();

    harness.assert_events(&["bulk_index:course:all:2", "delete_children:9"]);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct ResourceIndexerHarness {
    indexer: ResourceIndexerImpl,
    percolate_query_repo: Arc<InMemoryPercolateQueryRepository>,
    events: Arc<Mutex<Vec<String>>>,
}

impl ResourceIndexerHarness {
    fn new(provider: FakeResourceDocumentProvider, fail_bulk_for: Option<ObjectType>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));

        let repo = match fail_bulk_for {
            Some(object_type) => FakeSearchIndexRepository::failing_bulk_for(
                events.clone(),
                object_type,
            ),
            None => FakeSearchIndexRepository::new(events.clone()),
        };

        let config = ResourceIndexerConfig {
            indexing_chunk_size: 2,
            // Sequential chunk tasks keep the event trace deterministic
            max_concurrent_chunk_tasks: 1,
            retry_policy: RetryPolicy::default(),
        };

        let percolate_query_repo = Arc::new(InMemoryPercolateQueryRepository::new());
        let indexer = ResourceIndexerImpl::new(
            Arc::new(config),
            Arc::new(repo),
            Arc::new(provider),
            percolate_query_repo.clone(),
        );

        Self {
            indexer,
            percolate_query_repo,
            events,
        }
    }

    fn assert_events(&self, expected: &[&str]) {
        let got = self.events.lock().unwrap().clone();
        let expected = expected.iter().map(ToString::to_string).collect::<Vec<_>>();
        pretty_assertions::assert_eq!(got, expected);
    }
}
