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
use catalog_search_services::SearchIndexingListenerImpl;
use internal_error::InternalError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_upsert_indexes_percolates_and_sends_grouped_digests() {
    let harness = ListenerHarness::new(vec![
        match_row(1, 10, "Mathematics"),
        match_row(1, 11, "Physics"),
        match_row(2, 10, "Mathematics"),
    ]);

    harness
        .listener
        .on_resource_upserted(ObjectType::Course, 42)
        .await
        .unwrap();

    harness.assert_events(&["index:course:42:all", "match:course:42"]);

    let digests = harness.sent_digests.lock().unwrap().clone();
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].user, 1);
    assert_eq!(
        digests[0]
            .sections
            .iter()
            .map(|s| s.label.as_str())
            .collect::<Vec<_>>(),
        vec!["Mathematics", "Physics"]
    );
    assert_eq!(digests[1].user, 2);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_upsert_without_matches_sends_nothing() {
    let harness = ListenerHarness::new(Vec::new());

    harness
        .listener
        .on_resource_upserted(ObjectType::Video, 7)
        .await
        .unwrap();

    harness.assert_events(&["index:video:7:all", "match:video:7"]);
    assert!(harness.sent_digests.lock().unwrap().is_empty());
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_unpublish_and_run_events_map_to_deindexing() {
    let harness = ListenerHarness::new(Vec::new());

    harness
        .listener
        .on_resource_unpublished(ObjectType::Course, 42)
        .await
        .unwrap();
    harness
        .listener
        .on_resource_deleted(ObjectType::Program, 10)
        .await
        .unwrap();
    harness.listener.on_run_upserted(7).await.unwrap();
    harness.listener.on_run_unpublished(7).await.unwrap();

    harness.assert_events(&[
        "deindex:course:42",
        "deindex:program:10",
        "index_run:7:all",
        "deindex_run:7",
    ]);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn match_row(user: UserId, query_id: PercolateQueryId, label: &str) -> PercolateMatchRow {
    PercolateMatchRow {
        user,
        query_id,
        source_type: SubscriptionSourceType::SearchSubscription,
        group_label: label.to_string(),
        source_url: format!("https://learn.example.org/search?topic={label}"),
        resource: serde_json::json!({"id": 42}),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct ListenerHarness {
    listener: SearchIndexingListenerImpl,
    events: Arc<Mutex<Vec<String>>>,
    sent_digests: Arc<Mutex<Vec<UserDigest>>>,
}

impl ListenerHarness {
    fn new(match_rows: Vec<PercolateMatchRow>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sent_digests = Arc::new(Mutex::new(Vec::new()));

        let listener = SearchIndexingListenerImpl::new(
            Arc::new(RecordingIndexer {
                events: events.clone(),
            }),
            Arc::new(RecordingMatcher {
                events: events.clone(),
                match_rows,
            }),
            Arc::new(RecordingDigestSender {
                sent: sent_digests.clone(),
            }),
        );

        Self {
            listener,
            events,
            sent_digests,
        }
    }

    fn assert_events(&self, expected: &[&str]) {
        let got = self.events.lock().unwrap().clone();
        let expected = expected.iter().map(ToString::to_string).collect::<Vec<_>>();
        pretty_assertions::assert_eq!(got, expected);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn selector_name(selector: IndexSelector) -> &'static str {
    match selector {
        IndexSelector::Current => "current",
        IndexSelector::Reindexing => "reindexing",
        IndexSelector::All => "all",
    }
}

struct RecordingIndexer {
    events: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl ResourceIndexer for RecordingIndexer {
    async fn index_resources(
        &self,
        object_type: ObjectType,
        ids: Vec<ResourceId>,
        selector: IndexSelector,
    ) -> Result<(), IndexResourcesError> {
        self.events.lock().unwrap().push(format!(
            "index:{object_type}:{}:{}",
            ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            selector_name(selector)
        ));
        Ok(())
    }

    async fn deindex_resources(
        &self,
        object_type: ObjectType,
        ids: Vec<ResourceId>,
    ) -> Result<(), IndexResourcesError> {
        self.events.lock().unwrap().push(format!(
            "deindex:{object_type}:{}",
            ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
        ));
        Ok(())
    }

    async fn index_run_content_files(
        &self,
        run_id: RunId,
        selector: IndexSelector,
    ) -> Result<(), IndexResourcesError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("index_run:{run_id}:{}", selector_name(selector)));
        Ok(())
    }

    async fn deindex_run_content_files(&self, run_id: RunId) -> Result<(), IndexResourcesError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("deindex_run:{run_id}"));
        Ok(())
    }

    async fn reindex_all(&self, _object_types: Vec<ObjectType>) -> Result<(), ReindexAllError> {
        self.events.lock().unwrap().push("reindex_all".to_string());
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct RecordingMatcher {
    events: Arc<Mutex<Vec<String>>>,
    match_rows: Vec<PercolateMatchRow>,
}

#[async_trait::async_trait]
impl SubscriptionMatcher for RecordingMatcher {
    async fn register_saved_search(
        &self,
        _user: UserId,
        _source_type: SubscriptionSourceType,
        _original: &CatalogSearchRequest,
        _display_label: &str,
    ) -> Result<PercolateQuery, RegisterSavedSearchError> {
        unimplemented!()
    }

    async fn unsubscribe(
        &self,
        _user: UserId,
        _query_id: PercolateQueryId,
    ) -> Result<(), UnsubscribeError> {
        unimplemented!()
    }

    async fn match_resource(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<Vec<PercolateMatchRow>, MatchResourceError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("match:{object_type}:{id}"));
        Ok(self.match_rows.clone())
    }

    async fn realign_channel_subscriptions(
        &self,
    ) -> Result<RealignmentReport, RealignSubscriptionsError> {
        unimplemented!()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct RecordingDigestSender {
    sent: Arc<Mutex<Vec<UserDigest>>>,
}

#[async_trait::async_trait]
impl DigestSender for RecordingDigestSender {
    async fn send_digests(&self, digests: Vec<UserDigest>) -> Result<(), InternalError> {
        self.sent.lock().unwrap().extend(digests);
        Ok(())
    }
}
