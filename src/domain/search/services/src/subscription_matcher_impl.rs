// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog_search::*;
use internal_error::ResultIntoInternal;

use crate::SubscriptionMatcherConfig;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component(pub)]
#[dill::interface(dyn SubscriptionMatcher)]
pub struct SubscriptionMatcherImpl {
    config: Arc<SubscriptionMatcherConfig>,
    percolate_query_repo: Arc<dyn PercolateQueryRepository>,
    search_repo: Arc<dyn SearchIndexRepository>,
    document_provider: Arc<dyn ResourceDocumentProvider>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl SubscriptionMatcherImpl {
    /// Search-defining parameters of a request: the text query plus every
    /// non-empty facet filter. Pagination and sorting do not identify a
    /// subscription.
    fn subscription_params(original: &CatalogSearchRequest) -> serde_json::Value {
        let mut params = serde_json::Map::new();

        if let Some(q) = &original.q {
            if !q.is_empty() {
                params.insert("q".to_string(), serde_json::json!(q));
            }
        }

        for facet in ALL_FACET_FIELDS {
            let values = original.facet_values(facet);
            if !values.is_empty() {
                params.insert(facet.to_string(), serde_json::json!(values));
            }
        }

        serde_json::Value::Object(params)
    }

    /// Digest section heading for a stored query, from its most specific
    /// facet: department, then topic, then offered_by, then the saved
    /// label. Raw values resolve through the configured display-name map.
    fn group_label(&self, query: &PercolateQuery) -> String {
        let normalized = query.normalized_original_query();

        for key in ["department", "topic", "offered_by"] {
            if let Some(value) = normalized
                .get(key)
                .and_then(|v| v.as_array())
                .and_then(|values| values.first())
                .and_then(|v| v.as_str())
            {
                return self
                    .config
                    .facet_display_names
                    .get(value)
                    .cloned()
                    .unwrap_or_else(|| value.to_string());
            }
        }

        query.display_label.clone()
    }

    /// Link back to the saved search, rebuilt from the surviving non-empty
    /// parameters
    fn source_url(&self, query: &PercolateQuery) -> String {
        let normalized = query.normalized_original_query();

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(params) = normalized.as_object() {
            for (key, values) in params {
                if let Some(values) = values.as_array() {
                    for value in values {
                        match value.as_str() {
                            Some(s) => serializer.append_pair(key, s),
                            None => serializer.append_pair(key, &value.to_string()),
                        };
                    }
                }
            }
        }
        let query_string = serializer.finish();

        if query_string.is_empty() {
            self.config.saved_search_base_url.clone()
        } else {
            format!("{}?{}", self.config.saved_search_base_url, query_string)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl SubscriptionMatcher for SubscriptionMatcherImpl {
    #[tracing::instrument(
        level = "info",
        name = "SubscriptionMatcherImpl_register_saved_search",
        skip_all,
        fields(user, source_type = %source_type)
    )]
    async fn register_saved_search(
        &self,
        user: UserId,
        source_type: SubscriptionSourceType,
        original: &CatalogSearchRequest,
        display_label: &str,
    ) -> Result<PercolateQuery, RegisterSavedSearchError> {
        let original_params = Self::subscription_params(original);
        let compiled = self.search_repo.build_subscription_query(original);

        let query = self
            .percolate_query_repo
            .upsert_query(source_type, original_params, compiled, display_label)
            .await?;

        self.percolate_query_repo
            .add_user(query.id, user)
            .await
            .int_err()?;

        let query = self
            .percolate_query_repo
            .get_by_id(query.id)
            .await
            .int_err()?;

        self.search_repo.index_percolate_query(&query).await?;

        Ok(query)
    }

    #[tracing::instrument(
        level = "info",
        name = "SubscriptionMatcherImpl_unsubscribe",
        skip_all,
        fields(user, query_id)
    )]
    async fn unsubscribe(
        &self,
        user: UserId,
        query_id: PercolateQueryId,
    ) -> Result<(), UnsubscribeError> {
        self.percolate_query_repo
            .remove_user(query_id, user)
            .await?;

        let query = self.percolate_query_repo.get_by_id(query_id).await?;

        // The last subscriber leaving retires the stored query entirely
        if query.users.is_empty() {
            self.search_repo.deindex_percolate_query(query_id).await?;
            self.percolate_query_repo.delete_query(query_id).await?;
            tracing::info!(query_id, "Deleted saved search with no subscribers left");
        }

        Ok(())
    }

    #[tracing::instrument(
        level = "info",
        name = "SubscriptionMatcherImpl_match_resource",
        skip_all,
        fields(object_type = %object_type, id)
    )]
    async fn match_resource(
        &self,
        object_type: ObjectType,
        id: ResourceId,
    ) -> Result<Vec<PercolateMatchRow>, MatchResourceError> {
        let mut documents = self
            .document_provider
            .documents_for_resources(object_type, &[id])
            .await?;

        let Some(document) = documents.pop() else {
            return Ok(Vec::new());
        };
        let resource = document.into_search_document().source;

        let matched_ids = self.search_repo.percolate_document(&resource).await?;
        if matched_ids.is_empty() {
            return Ok(Vec::new());
        }

        let queries = self
            .percolate_query_repo
            .get_by_ids(&matched_ids)
            .await?;

        let mut rows = Vec::new();
        for query in queries {
            let group_label = self.group_label(&query);
            let source_url = self.source_url(&query);

            for user in &query.users {
                rows.push(PercolateMatchRow {
                    user: *user,
                    query_id: query.id,
                    source_type: query.source_type,
                    group_label: group_label.clone(),
                    source_url: source_url.clone(),
                    resource: resource.clone(),
                });
            }
        }

        tracing::info!(
            num_queries = matched_ids.len(),
            num_rows = rows.len(),
            "Percolated resource against saved searches",
        );

        Ok(rows)
    }

    #[tracing::instrument(
        level = "info",
        name = "SubscriptionMatcherImpl_realign_channel_subscriptions",
        skip_all
    )]
    async fn realign_channel_subscriptions(
        &self,
    ) -> Result<RealignmentReport, RealignSubscriptionsError> {
        let queries = self
            .percolate_query_repo
            .list_by_source_type(SubscriptionSourceType::ChannelSubscription)
            .await?;

        // Group equivalent rows by their normalized parameters
        let mut groups: BTreeMap<String, Vec<PercolateQuery>> = BTreeMap::new();
        for query in queries {
            groups
                .entry(query.normalized_original_query().to_string())
                .or_default()
                .push(query);
        }

        let mut report = RealignmentReport::default();

        for (_, mut group) in groups {
            if group.len() < 2 {
                continue;
            }

            // Lowest id is the canonical row; the rest fold into it
            group.sort_by_key(|q| q.id);
            let canonical_id = group[0].id;

            for duplicate in &group[1..] {
                report.users_moved += duplicate.users.len();

                self.percolate_query_repo
                    .move_users(duplicate.id, canonical_id)
                    .await
                    .int_err()?;
                self.search_repo
                    .deindex_percolate_query(duplicate.id)
                    .await?;
                self.percolate_query_repo
                    .delete_query(duplicate.id)
                    .await
                    .int_err()?;

                report.queries_deleted += 1;
            }

            // Re-index the canonical row so the percolator alias holds
            // exactly one document per surviving subscription
            let canonical = self
                .percolate_query_repo
                .get_by_id(canonical_id)
                .await
                .int_err()?;
            self.search_repo.index_percolate_query(&canonical).await?;

            report.queries_merged += 1;
        }

        tracing::info!(
            queries_merged = report.queries_merged,
            queries_deleted = report.queries_deleted,
            users_moved = report.users_moved,
            "Realigned channel subscriptions",
        );

        Ok(report)
    }
}
