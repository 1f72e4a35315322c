// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use catalog_search::*;
use catalog_search_inmem::InMemoryPercolateQueryRepository;
use catalog_search_services::*;
use internal_error::InternalError;

use crate::harness::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn saved_search(q: &str, topic: &[&str]) -> CatalogSearchRequest {
    CatalogSearchRequest {
        q: Some(q.to_string()),
        topic: topic.iter().map(ToString::to_string).collect(),
        ..Default::default()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_equivalent_saved_searches_share_one_stored_query() {
    let harness = SubscriptionMatcherHarness::new();

    let a = harness
        .matcher
        .register_saved_search(
            1,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("math", &["Algebra", "Calculus"]),
            "math basics",
        )
        .await
        .unwrap();

    // Same search with reordered values, registered by another user
    let b = harness
        .matcher
        .register_saved_search(
            2,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("math", &["Calculus", "Algebra"]),
            "more math",
        )
        .await
        .unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(b.users, BTreeSet::from([1, 2]));
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_unsubscribing_last_user_retires_the_stored_query() {
    let harness = SubscriptionMatcherHarness::new();

    let query = harness
        .matcher
        .register_saved_search(
            1,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("physics", &[]),
            "physics",
        )
        .await
        .unwrap();

    harness.matcher.unsubscribe(1, query.id).await.unwrap();

    assert!(matches!(
        harness.percolate_query_repo.get_by_id(query.id).await,
        Err(GetPercolateQueryError::NotFound { .. })
    ));
    assert!(
        harness
            .events
            .lock()
            .unwrap()
            .contains(&format!("percolate_deindex:{}", query.id))
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_match_resource_expands_to_one_row_per_subscriber() {
    let harness = SubscriptionMatcherHarness::new();

    let algebra = harness
        .matcher
        .register_saved_search(
            1,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("algebra", &["Algebra"]),
            "algebra",
        )
        .await
        .unwrap();
    harness
        .matcher
        .register_saved_search(
            2,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("algebra", &["Algebra"]),
            "algebra too",
        )
        .await
        .unwrap();
    let anything = harness
        .matcher
        .register_saved_search(
            3,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("anything", &[]),
            "anything",
        )
        .await
        .unwrap();

    let rows = harness
        .matcher
        .match_resource(ObjectType::Course, 42)
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);

    let algebra_rows: Vec<_> = rows.iter().filter(|r| r.query_id == algebra.id).collect();
    assert_eq!(
        algebra_rows.iter().map(|r| r.user).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(algebra_rows[0].group_label, "Algebra");
    assert!(algebra_rows[0].source_url.contains("topic=Algebra"));

    // A query with no facet filters falls back to its saved label
    let anything_row = rows.iter().find(|r| r.query_id == anything.id).unwrap();
    assert_eq!(anything_row.group_label, "anything");
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_match_of_unknown_resource_yields_no_rows() {
    let harness = SubscriptionMatcherHarness::new();

    harness
        .matcher
        .register_saved_search(
            1,
            SubscriptionSourceType::SearchSubscription,
            &saved_search("math", &[]),
            "math",
        )
        .await
        .unwrap();

    let rows = harness
        .matcher
        .match_resource(ObjectType::Course, 999)
        .await
        .unwrap();

    assert_eq!(rows, Vec::<PercolateMatchRow>::new());
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_realignment_merges_duplicates_onto_lowest_id() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let search_repo = Arc::new(FakeSearchIndexRepository::new(events.clone()));
    let percolate_query_repo = Arc::new(DuplicatePermittingRepository::default());
    let provider = Arc::new(FakeResourceDocumentProvider::default());

    let channel_params = serde_json::json!({"offered_by": ["OCW"]});
    let id_a = percolate_query_repo.insert(channel_params.clone(), BTreeSet::from([1, 2]));
    let id_b = percolate_query_repo.insert(channel_params.clone(), BTreeSet::from([2, 3]));
    let id_distinct =
        percolate_query_repo.insert(serde_json::json!({"offered_by": ["MITx"]}), BTreeSet::new());

    let matcher = SubscriptionMatcherImpl::new(
        Arc::new(SubscriptionMatcherConfig::default()),
        percolate_query_repo.clone(),
        search_repo,
        provider,
    );

    let report = matcher.realign_channel_subscriptions().await.unwrap();

    assert_eq!(report.queries_merged, 1);
    assert_eq!(report.queries_deleted, 1);
    assert_eq!(report.users_moved, 2);

    // The canonical row is the lowest id and unites both subscriber sets
    let canonical = percolate_query_repo.get_by_id(id_a).await.unwrap();
    assert_eq!(canonical.users, BTreeSet::from([1, 2, 3]));
    assert!(matches!(
        percolate_query_repo.get_by_id(id_b).await,
        Err(GetPercolateQueryError::NotFound { .. })
    ));
    percolate_query_repo.get_by_id(id_distinct).await.unwrap();

    // A second pass is a no-op
    let report = matcher.realign_channel_subscriptions().await.unwrap();
    assert_eq!(report, RealignmentReport::default());
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct SubscriptionMatcherHarness {
    matcher: SubscriptionMatcherImpl,
    percolate_query_repo: Arc<InMemoryPercolateQueryRepository>,
    events: Arc<Mutex<Vec<String>>>,
}

impl SubscriptionMatcherHarness {
    fn new() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let search_repo = Arc::new(FakeSearchIndexRepository::new(events.clone()));
        let percolate_query_repo = Arc::new(InMemoryPercolateQueryRepository::new());
        let provider = Arc::new(FakeResourceDocumentProvider::with_resources([
            course_document(42, "Linear Algebra"),
        ]));

        let matcher = SubscriptionMatcherImpl::new(
            Arc::new(SubscriptionMatcherConfig::default()),
            percolate_query_repo.clone(),
            search_repo,
            provider,
        );

        Self {
            matcher,
            percolate_query_repo,
            events,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Unlike the real repositories this one lets equivalent rows coexist, which
/// is exactly the drift realignment has to repair
#[derive(Default)]
struct DuplicatePermittingRepository {
    state: Mutex<(PercolateQueryId, Vec<PercolateQuery>)>,
}

impl DuplicatePermittingRepository {
    fn insert(&self, original_query: serde_json::Value, users: BTreeSet<UserId>) -> PercolateQueryId {
        let mut guard = self.state.lock().unwrap();
        guard.0 += 1;
        let id = guard.0;
        guard.1.push(PercolateQuery {
            id,
            source_type: SubscriptionSourceType::ChannelSubscription,
            original_query,
            query: serde_json::json!({"match_all": {}}),
            display_label: format!("channel-{id}"),
            users,
        });
        id
    }
}

#[async_trait::async_trait]
impl PercolateQueryRepository for DuplicatePermittingRepository {
    async fn upsert_query(
        &self,
        source_type: SubscriptionSourceType,
        original_query: serde_json::Value,
        query: serde_json::Value,
        display_label: &str,
    ) -> Result<PercolateQuery, InternalError> {
        let mut guard = self.state.lock().unwrap();
        guard.0 += 1;
        let id = guard.0;
        let row = PercolateQuery {
            id,
            source_type,
            original_query,
            query,
            display_label: display_label.to_string(),
            users: BTreeSet::new(),
        };
        guard.1.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<PercolateQuery, GetPercolateQueryError> {
        self.state
            .lock()
            .unwrap()
            .1
            .iter()
            .find(|q| q.id == query_id)
            .cloned()
            .ok_or(GetPercolateQueryError::NotFound { query_id })
    }

    async fn get_by_ids(
        &self,
        query_ids: &[PercolateQueryId],
    ) -> Result<Vec<PercolateQuery>, InternalError> {
        let guard = self.state.lock().unwrap();
        Ok(guard
            .1
            .iter()
            .filter(|q| query_ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn list_by_source_type(
        &self,
        source_type: SubscriptionSourceType,
    ) -> Result<Vec<PercolateQuery>, InternalError> {
        let guard = self.state.lock().unwrap();
        Ok(guard
            .1
            .iter()
            .filter(|q| q.source_type == source_type)
            .cloned()
            .collect())
    }

    async fn add_user(
        &self,
        query_id: PercolateQueryId,
        user: UserId,
    ) -> Result<(), GetPercolateQueryError> {
        let mut guard = self.state.lock().unwrap();
        let query = guard
            .1
            .iter_mut()
            .find(|q| q.id == query_id)
            .ok_or(GetPercolateQueryError::NotFound { query_id })?;
        query.users.insert(user);
        Ok(())
    }

    async fn remove_user(
        &self,
        query_id: PercolateQueryId,
        user: UserId,
    ) -> Result<(), GetPercolateQueryError> {
        let mut guard = self.state.lock().unwrap();
        let query = guard
            .1
            .iter_mut()
            .find(|q| q.id == query_id)
            .ok_or(GetPercolateQueryError::NotFound { query_id })?;
        query.users.remove(&user);
        Ok(())
    }

    async fn move_users(
        &self,
        from: PercolateQueryId,
        to: PercolateQueryId,
    ) -> Result<(), GetPercolateQueryError> {
        let mut guard = self.state.lock().unwrap();

        let from_idx = guard
            .1
            .iter()
            .position(|q| q.id == from)
            .ok_or(GetPercolateQueryError::NotFound { query_id: from })?;
        let moved = std::mem::take(&mut guard.1[from_idx].users);

        let to_query = guard
            .1
            .iter_mut()
            .find(|q| q.id == to)
            .ok_or(GetPercolateQueryError::NotFound { query_id: to })?;
        to_query.users.extend(moved);
        Ok(())
    }

    async fn delete_query(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<(), GetPercolateQueryError> {
        let mut guard = self.state.lock().unwrap();
        let idx = guard
            .1
            .iter()
            .position(|q| q.id == query_id)
            .ok_or(GetPercolateQueryError::NotFound { query_id })?;
        guard.1.remove(idx);
        Ok(())
    }
}
