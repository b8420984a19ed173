//! Content endpoints over the tiered resolver.

use std::collections::{BTreeMap, BTreeSet};

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde_json::{Value, json};
use vellum_core::db::Record;
use vellum_core::{Envelope, Error};

use super::AppState;
use crate::error::ApiError;

/// Header carrying the caller identity set by the upstream auth layer.
pub const CALLER_HEADER: &str = "x-vellum-user";

/// GET /api/content
///
/// Every registered name with its store address and, when the store holds
/// the record, who last wrote it and when.
pub async fn list_content(State(state): State<AppState>) -> Result<Json<Envelope>, ApiError> {
    let registry = state.resolver.registry();
    let names = registry.names();
    let mappings: Vec<_> = names.iter().filter_map(|name| registry.get(name)).collect();

    let collections: BTreeSet<&str> = mappings.iter().map(|m| m.collection.as_str()).collect();
    let mut stored: BTreeMap<&str, Vec<Record>> = BTreeMap::new();
    for collection in collections {
        stored.insert(collection, state.db.list_records(collection).await?);
    }

    let entries = mappings
        .iter()
        .map(|mapping| {
            let record = stored
                .get(mapping.collection.as_str())
                .and_then(|records| records.iter().find(|r| r.record_id == mapping.record_id));
            json!({
                "name": mapping.name,
                "collection": mapping.collection,
                "recordId": mapping.record_id,
                "stored": record.is_some(),
                "updatedAt": record.map(|r| r.updated_at.as_str()),
                "updatedBy": record.map(|r| r.updated_by.as_str()),
            })
        })
        .collect();

    Ok(Json(Envelope::ok(Value::Array(entries))))
}

/// GET /api/content/:name
pub async fn get_content(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Envelope>, ApiError> {
    match state.resolver.resolve(&name).await? {
        Some(data) => Ok(Json(Envelope::ok(data))),
        None => Err(ApiError::NotFound(name)),
    }
}

/// PUT /api/content/:name
pub async fn put_content(
    State(state): State<AppState>, Path(name): Path<String>, headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, ApiError> {
    if !state.resolver.registry().contains(&name) {
        return Err(Error::UnmappedName(name).into());
    }
    let caller = caller_identity(&headers).ok_or(ApiError::Unauthorized)?;
    let Json(payload) = body.map_err(|e| ApiError::BadBody(e.body_text()))?;

    let stored = state.resolver.persist(&name, payload, caller).await?;
    Ok(Json(Envelope::ok(stored)))
}

fn caller_identity(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|caller| !caller.is_empty())
}
