// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod os_search_response;

pub(crate) use os_search_response::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

use std::collections::BTreeMap;
use std::time::Duration;

use catalog_search::SearchBackendError;
use internal_error::{ErrorIntoInternal, ResultIntoInternal};
use opensearch::cluster::ClusterHealthParts;
use opensearch::http::request::JsonBody;
use opensearch::http::response::Response;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::indices::{
    IndicesCreateParts,
    IndicesDeleteParts,
    IndicesExistsAliasParts,
    IndicesGetAliasParts,
    IndicesRefreshParts,
};
use opensearch::{
    BulkParts,
    CountParts,
    DeleteByQueryParts,
    DeleteParts,
    IndexParts,
    OpenSearch,
    SearchParts,
};

use crate::OpenSearchCatalogConfig;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Thin wrapper over the OpenSearch transport that owns error
/// classification: connection failures and timeouts are transient, engine
/// 4xx responses are bad requests, everything else is internal.
pub(crate) struct OsClient {
    client: OpenSearch,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl OsClient {
    pub fn init(config: &OpenSearchCatalogConfig) -> Result<Self, SearchBackendError> {
        let conn_pool = SingleNodeConnectionPool::new(config.url.clone());
        let transport = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .int_err()?;

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    fn classify_transport_error(e: opensearch::Error) -> SearchBackendError {
        if e.is_timeout() || e.status_code().is_none() {
            return SearchBackendError::Transient {
                reason: e.to_string(),
            };
        }
        match e.status_code() {
            Some(status) if status.is_client_error() => SearchBackendError::BadRequest {
                reason: e.to_string(),
            },
            _ => SearchBackendError::Internal(e.int_err()),
        }
    }

    async fn into_json(response: Response) -> Result<serde_json::Value, SearchBackendError> {
        let status = response.status_code();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(Self::classify_transport_error);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable response body: {e}>"));

        if status.is_client_error() {
            Err(SearchBackendError::BadRequest {
                reason: format!("{status}: {body}"),
            })
        } else {
            Err(SearchBackendError::Internal(
                internal_error::InternalError::new(format!(
                    "Search engine returned {status}: {body}"
                )),
            ))
        }
    }

    //////////////////////////////////////////////////////////////////////////////////////////////////////////////////

    pub async fn cluster_health(&self) -> Result<serde_json::Value, SearchBackendError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await
    }

    pub async fn create_index(
        &self,
        index: &str,
        body: serde_json::Value,
    ) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await?;
        Ok(())
    }

    pub async fn delete_index(&self, index: &str) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await?;
        Ok(())
    }

    pub async fn refresh_index(&self, index: &str) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await?;
        Ok(())
    }

    /// Applies a set of alias add/remove actions in one atomic call
    pub async fn update_aliases(
        &self,
        actions: Vec<serde_json::Value>,
    ) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .indices()
            .update_aliases()
            .body(serde_json::json!({"actions": actions}))
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await?;
        Ok(())
    }

    pub async fn alias_exists(&self, alias: &str) -> Result<bool, SearchBackendError> {
        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Ok(response.status_code().is_success())
    }

    /// Catalog of all indices and the aliases each carries
    pub async fn index_aliases(&self) -> Result<BTreeMap<String, Vec<String>>, SearchBackendError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::None)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        let body = Self::into_json(response).await?;

        let mut catalog = BTreeMap::new();
        if let Some(indices) = body.as_object() {
            for (index, info) in indices {
                let aliases = info["aliases"]
                    .as_object()
                    .map(|aliases| aliases.keys().cloned().collect())
                    .unwrap_or_default();
                catalog.insert(index.clone(), aliases);
            }
        }
        Ok(catalog)
    }

    pub async fn bulk(
        &self,
        index: &str,
        body: Vec<JsonBody<serde_json::Value>>,
    ) -> Result<serde_json::Value, SearchBackendError> {
        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await
    }

    pub async fn search(
        &self,
        indices: &[&str],
        body: serde_json::Value,
    ) -> Result<OsSearchResponse, SearchBackendError> {
        let response = self
            .client
            .search(SearchParts::Index(indices))
            .body(body)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        let body = Self::into_json(response).await?;
        serde_json::from_value(body).int_err().map_err(Into::into)
    }

    pub async fn count(&self, index: &str) -> Result<u64, SearchBackendError> {
        let response = self
            .client
            .count(CountParts::Index(&[index]))
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        let body = Self::into_json(response).await?;
        Ok(body["count"].as_u64().unwrap_or(0))
    }

    pub async fn delete_by_query(
        &self,
        indices: &[&str],
        body: serde_json::Value,
    ) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(indices))
            .body(body)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await?;
        Ok(())
    }

    pub async fn put_document(
        &self,
        index: &str,
        id: &str,
        body: serde_json::Value,
    ) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(body)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;
        Self::into_json(response).await?;
        Ok(())
    }

    /// Deletes a document, treating absence as success
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchBackendError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(Self::classify_transport_error)?;

        if response.status_code().as_u16() == 404 {
            return Ok(());
        }
        Self::into_json(response).await?;
        Ok(())
    }
}
