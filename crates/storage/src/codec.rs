//! Column codecs for the relational backend
//!
//! Data and update maps are stored as JSON text. Timestamps are stored as
//! fixed-width UTC RFC 3339 text with microseconds, so that text order in
//! SQL equals time order.

use chrono::{DateTime, Utc};
use timetravel_core::{Error, RecordData, Result, UpdateMap};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Encode a timestamp column
pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Decode a timestamp column
pub fn decode_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::serialization(format!("bad timestamp '{}': {}", text, e)))
}

/// Encode the `data` column
pub fn encode_data(data: &RecordData) -> Result<String> {
    Ok(serde_json::to_string(data)?)
}

/// Decode the `data` column
pub fn decode_data(text: &str) -> Result<RecordData> {
    Ok(serde_json::from_str(text)?)
}

/// Encode the `updates` column (NULL for genesis rows)
pub fn encode_updates(updates: Option<&UpdateMap>) -> Result<Option<String>> {
    updates
        .map(serde_json::to_string)
        .transpose()
        .map_err(Error::from)
}

/// Decode the `updates` column
pub fn decode_updates(text: Option<&str>) -> Result<Option<UpdateMap>> {
    text.map(serde_json::from_str)
        .transpose()
        .map_err(Error::from)
}
