// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use catalog_search::*;
use dill::*;
use internal_error::InternalError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct InMemoryPercolateQueryRepository {
    state: Arc<Mutex<State>>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
struct State {
    queries_by_id: BTreeMap<PercolateQueryId, PercolateQuery>,
    next_id: PercolateQueryId,
}

impl State {
    fn new() -> Self {
        Self {
            queries_by_id: BTreeMap::new(),
            next_id: 1,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[component(pub)]
#[interface(dyn PercolateQueryRepository)]
#[scope(Singleton)]
impl InMemoryPercolateQueryRepository {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::new())),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl PercolateQueryRepository for InMemoryPercolateQueryRepository {
    async fn upsert_query(
        &self,
        source_type: SubscriptionSourceType,
        original_query: serde_json::Value,
        query: serde_json::Value,
        display_label: &str,
    ) -> Result<PercolateQuery, InternalError> {
        let mut guard = self.state.lock().unwrap();

        let normalized = normalize_original_query(&original_query);

        // Uniqueness is on (source_type, normalized original query), so two
        // parameter orderings of the same search share one row
        let existing = guard
            .queries_by_id
            .values()
            .find(|q| q.source_type == source_type && q.normalized_original_query() == normalized)
            .cloned();

        if let Some(existing) = existing {
            return Ok(existing);
        }

        let id = guard.next_id;
        guard.next_id += 1;

        let row = PercolateQuery {
            id,
            source_type,
            original_query,
            query,
            display_label: display_label.to_string(),
            users: Default::default(),
        };

        guard.queries_by_id.insert(id, row.clone());
        Ok(row)
    }

    async fn get_by_id(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<PercolateQuery, GetPercolateQueryError> {
        let guard = self.state.lock().unwrap();
        guard
            .queries_by_id
            .get(&query_id)
            .cloned()
            .ok_or(GetPercolateQueryError::NotFound { query_id })
    }

    async fn get_by_ids(
        &self,
        query_ids: &[PercolateQueryId],
    ) -> Result<Vec<PercolateQuery>, InternalError> {
        let guard = self.state.lock().unwrap();
        Ok(query_ids
            .iter()
            .filter_map(|id| guard.queries_by_id.get(id).cloned())
            .collect())
    }

    async fn list_by_source_type(
        &self,
        source_type: SubscriptionSourceType,
    ) -> Result<Vec<PercolateQuery>, InternalError> {
        let guard = self.state.lock().unwrap();
        Ok(guard
            .queries_by_id
            .values()
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
            .queries_by_id
            .get_mut(&query_id)
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
            .queries_by_id
            .get_mut(&query_id)
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

        if !guard.queries_by_id.contains_key(&to) {
            return Err(GetPercolateQueryError::NotFound { query_id: to });
        }

        let moved = std::mem::take(
            &mut guard
                .queries_by_id
                .get_mut(&from)
                .ok_or(GetPercolateQueryError::NotFound { query_id: from })?
                .users,
        );

        guard
            .queries_by_id
            .get_mut(&to)
            .unwrap()
            .users
            .extend(moved);

        Ok(())
    }

    async fn delete_query(
        &self,
        query_id: PercolateQueryId,
    ) -> Result<(), GetPercolateQueryError> {
        let mut guard = self.state.lock().unwrap();
        guard
            .queries_by_id
            .remove(&query_id)
            .map(|_| ())
            .ok_or(GetPercolateQueryError::NotFound { query_id })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
