// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use catalog_search::SearchDocument;
use opensearch::http::request::JsonBody;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Per-document overhead of the NDJSON framing: the action line plus two
/// newlines, approximated generously
const ACTION_LINE_OVERHEAD: usize = 128;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn document_size(document: &SearchDocument) -> usize {
    // Falling back to zero just disables size-based splitting for a
    // document that cannot be serialized; the write itself will report it
    let source_size = serde_json::to_string(&document.source)
        .map(|s| s.len())
        .unwrap_or(0);
    source_size + document.id.len() + ACTION_LINE_OVERHEAD
}

fn batch_size(documents: &[SearchDocument]) -> usize {
    documents.iter().map(document_size).sum()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Partitions documents into `chunk_size` batches, then recursively
/// re-splits any batch whose serialized size exceeds `max_request_size`.
/// A single document over the ceiling is logged and dropped rather than
/// failing the whole run.
pub(crate) fn plan_chunks(
    documents: Vec<SearchDocument>,
    chunk_size: usize,
    max_request_size: usize,
) -> Vec<Vec<SearchDocument>> {
    let mut chunks = Vec::new();
    for chunk in documents.chunks(chunk_size.max(1)) {
        split_oversized(chunk.to_vec(), max_request_size, &mut chunks);
    }
    chunks
}

fn split_oversized(
    batch: Vec<SearchDocument>,
    max_request_size: usize,
    out: &mut Vec<Vec<SearchDocument>>,
) {
    let size = batch_size(&batch);
    if size <= max_request_size {
        if !batch.is_empty() {
            out.push(batch);
        }
        return;
    }

    if batch.len() == 1 {
        // Cannot split further; the engine would reject the request anyway
        tracing::warn!(
            document_id = %batch[0].id,
            size,
            max_request_size,
            "Skipping document exceeding the bulk request size ceiling",
        );
        return;
    }

    // Split proportionally to the overshoot, always making progress
    let split_factor = size.div_ceil(max_request_size);
    let upper_bound = (batch.len() - 1).max(2);
    let num_sub_batches = batch
        .len()
        .div_ceil(split_factor)
        .clamp(2, upper_bound);
    let sub_batch_len = batch.len().div_ceil(num_sub_batches);

    for sub_batch in batch.chunks(sub_batch_len) {
        split_oversized(sub_batch.to_vec(), max_request_size, out);
    }
}

/// Write order of a bulk upsert: every planned chunk goes to every active
/// alias, chunk-major
pub(crate) fn plan_bulk_requests<'a>(
    aliases: &'a [String],
    chunks: &'a [Vec<SearchDocument>],
) -> Vec<(&'a str, &'a [SearchDocument])> {
    chunks
        .iter()
        .flat_map(|chunk| {
            aliases
                .iter()
                .map(move |alias| (alias.as_str(), chunk.as_slice()))
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// NDJSON body of a bulk upsert: an `index` action line (with routing for
/// child documents) followed by the source line, per document
pub(crate) fn index_body(documents: &[SearchDocument]) -> Vec<JsonBody<serde_json::Value>> {
    let mut body = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        let mut action = serde_json::json!({"index": {"_id": document.id}});
        if let Some(routing) = &document.routing {
            action["index"]["routing"] = serde_json::json!(routing);
        }
        body.push(action.into());
        body.push(document.source.clone().into());
    }
    body
}

/// NDJSON body of a bulk delete
pub(crate) fn delete_body(ids: &[String]) -> Vec<JsonBody<serde_json::Value>> {
    ids.iter()
        .map(|id| serde_json::json!({"delete": {"_id": id}}).into())
        .collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Per-item failures of a bulk response. `not_found` deletes are fine:
/// deindexing is idempotent and the document may never have existed.
pub(crate) fn extract_bulk_errors(response_body: &serde_json::Value) -> Vec<serde_json::Value> {
    if response_body["errors"] != serde_json::Value::Bool(true) {
        return Vec::new();
    }

    let Some(items) = response_body["items"].as_array() else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    for item in items {
        for (operation, outcome) in item.as_object().into_iter().flatten() {
            if operation == "delete" && outcome["status"] == 404 {
                continue;
            }
            if !outcome["error"].is_null() {
                errors.push(outcome["error"].clone());
            }
        }
    }
    errors
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
