//! Request handlers
//!
//! Handlers parse and validate the request, then run the blocking service
//! call on tokio's blocking pool under the request deadline. An expired
//! deadline abandons the call; the store stays consistent either way.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use timetravel_core::{date, Record, UpdateMap};
use timetravel_service::RecordService;

use super::error::ApiError;
use super::AppState;

/// Query string accepted by the record routes
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// `YYYY-MM-DD`; absent or empty means "now"
    pub effective_date: Option<String>,
}

impl AsOfQuery {
    /// Unwrap an extracted query; a malformed query string is a bad date
    fn from_extracted(
        query: Result<Query<AsOfQuery>, QueryRejection>,
    ) -> Result<Self, ApiError> {
        query.map(|Query(q)| q).map_err(|_| ApiError::InvalidEffectiveDate)
    }

    fn date(&self) -> Result<Option<NaiveDate>, ApiError> {
        match self.effective_date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => date::parse_date(raw)
                .map(Some)
                .ok_or(ApiError::InvalidEffectiveDate),
        }
    }
}

/// Parse a path id; the service rejects non-positive values
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::InvalidId)
}

/// Decode a sparse update body: `{ "key": "value" | null, ... }`
fn parse_updates(body: &[u8]) -> Result<UpdateMap, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidBody)
}

async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&RecordService) -> timetravel_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    let task = tokio::task::spawn_blocking(move || f(&service));
    match tokio::time::timeout(state.request_timeout, task).await {
        Err(_) => Err(ApiError::Timeout),
        Ok(Err(join)) => Err(ApiError::Internal(format!("worker failed: {}", join))),
        Ok(Ok(result)) => result.map_err(ApiError::from),
    }
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `GET /records/:id[?effective_date=YYYY-MM-DD]`
pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&raw_id)?;
    let as_of = AsOfQuery::from_extracted(query)?.date()?;
    let record = run_blocking(&state, move |svc| svc.get_as_of(id, as_of)).await?;
    Ok(Json(record))
}

/// `POST /records/:id[?effective_date=YYYY-MM-DD]`
///
/// Creates the record on first write, merges into it afterwards.
pub async fn post_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&raw_id)?;
    let updates = parse_updates(&body)?;
    let effective = AsOfQuery::from_extracted(query)?.date()?;
    let record = run_blocking(&state, move |svc| svc.upsert(id, updates, effective)).await?;
    Ok(Json(record))
}

/// `GET /records/:id/versions`, newest first
pub async fn get_versions(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let history = run_blocking(&state, move |svc| svc.history(id)).await?;
    Ok(Json(history.into_versions()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-3").unwrap(), -3);
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidId)));
        assert!(matches!(parse_id("1.5"), Err(ApiError::InvalidId)));
        assert!(matches!(parse_id(""), Err(ApiError::InvalidId)));
    }

    #[test]
    fn parse_updates_requires_string_or_null_values() {
        let updates = parse_updates(br#"{"a":"1","b":null}"#).unwrap();
        assert_eq!(updates.get("a"), Some(&Some("1".to_string())));
        assert_eq!(updates.get("b"), Some(&None));

        assert!(matches!(parse_updates(br#"{"a":1}"#), Err(ApiError::InvalidBody)));
        assert!(matches!(parse_updates(b"[]"), Err(ApiError::InvalidBody)));
        assert!(matches!(parse_updates(b""), Err(ApiError::InvalidBody)));
    }

    #[test]
    fn as_of_query_parsing() {
        let q = |s: Option<&str>| AsOfQuery {
            effective_date: s.map(str::to_string),
        };
        assert_eq!(q(None).date().unwrap(), None);
        assert_eq!(q(Some("")).date().unwrap(), None);
        assert!(q(Some("2024-05-06")).date().unwrap().is_some());
        for bad in ["06/05/2024", "-0001-01-01", "+10000-01-01"] {
            assert!(matches!(q(Some(bad)).date(), Err(ApiError::InvalidEffectiveDate)));
        }
        assert!(q(Some("9999-12-31")).date().unwrap().is_some());
    }
}
