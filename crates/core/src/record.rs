//! Record versions
//!
//! A [`Record`] is one immutable version of a record's key/value state.
//! Stores hand out owned `Record`s; mutating a returned value never
//! touches stored state.
//!
//! ## JSON shape
//!
//! ```text
//! {"id":1,"data":{"name":"Bob"},"updates":{"age":null},
//!  "effective_date":"2024-01-01T00:00:00Z","created_date":"..."}
//! ```
//!
//! `updates` is omitted on the genesis version. The store sequence is
//! internal and never serialized.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::date;
use crate::types::{RecordId, Sequence};

/// Key/value state of a record version
pub type RecordData = BTreeMap<String, String>;

/// Sparse update: `Some(value)` sets a key, `None` deletes it
pub type UpdateMap = BTreeMap<String, Option<String>>;

/// One version of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// External identifier, shared by every version of the record
    pub id: RecordId,

    /// State after this version was applied
    pub data: RecordData,

    /// Update map that produced this version (absent on genesis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<UpdateMap>,

    /// When this version takes effect
    pub effective_date: DateTime<Utc>,

    /// When this version was written
    pub created_date: DateTime<Utc>,

    /// Store-assigned insertion order
    #[serde(skip)]
    pub sequence: Sequence,
}

impl Record {
    /// Build the first version of a record
    ///
    /// The genesis version takes effect when it is written.
    pub fn genesis(id: RecordId, data: RecordData, sequence: Sequence, now: DateTime<Utc>) -> Self {
        Record {
            id,
            data,
            updates: None,
            effective_date: now,
            created_date: now,
            sequence,
        }
    }

    /// Build a version produced by applying `updates`
    pub fn revision(
        id: RecordId,
        data: RecordData,
        updates: UpdateMap,
        sequence: Sequence,
        effective_date: DateTime<Utc>,
        created_date: DateTime<Utc>,
    ) -> Self {
        Record {
            id,
            data,
            updates: Some(updates),
            effective_date,
            created_date,
            sequence,
        }
    }

    /// True for the version written by create
    #[inline]
    pub fn is_genesis(&self) -> bool {
        self.updates.is_none()
    }

    /// True if this version is in effect on or before `date`
    #[inline]
    pub fn is_effective_by(&self, date: NaiveDate) -> bool {
        date::is_on_or_before(self.effective_date, date)
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: i64) -> RecordId {
        RecordId::new(raw).unwrap()
    }

    fn data(pairs: &[(&str, &str)]) -> RecordData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_genesis_has_no_updates() {
        let now = date::now();
        let r = Record::genesis(id(1), data(&[("name", "Alice")]), Sequence::new(1), now);
        assert!(r.is_genesis());
        assert_eq!(r.effective_date, now);
        assert_eq!(r.created_date, now);
        assert_eq!(r.get("name"), Some("Alice"));
    }

    #[test]
    fn test_revision_keeps_updates() {
        let now = date::now();
        let mut updates = UpdateMap::new();
        updates.insert("age".into(), None);
        let r = Record::revision(
            id(1),
            RecordData::new(),
            updates.clone(),
            Sequence::new(2),
            now,
            now,
        );
        assert!(!r.is_genesis());
        assert_eq!(r.updates, Some(updates));
    }

    #[test]
    fn test_json_omits_sequence_and_genesis_updates() {
        let now = date::now();
        let r = Record::genesis(id(3), data(&[("a", "1")]), Sequence::new(77), now);
        let json = serde_json::to_value(&r).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["data"]["a"], "1");
        assert!(json.get("updates").is_none());
        assert!(json.get("sequence").is_none());
        assert!(json.get("effective_date").is_some());
        assert!(json.get("created_date").is_some());
    }

    #[test]
    fn test_json_renders_deletions_as_null() {
        let now = date::now();
        let mut updates = UpdateMap::new();
        updates.insert("gone".into(), None);
        updates.insert("kept".into(), Some("v".into()));
        let r = Record::revision(
            id(3),
            data(&[("kept", "v")]),
            updates,
            Sequence::new(2),
            now,
            now,
        );

        let json = serde_json::to_value(&r).unwrap();
        assert!(json["updates"]["gone"].is_null());
        assert_eq!(json["updates"]["kept"], "v");
    }

    #[test]
    fn test_is_effective_by() {
        let day = date::parse_date("2024-03-10").unwrap();
        let effective = date::start_of_day(day);
        let mut r = Record::genesis(id(1), RecordData::new(), Sequence::new(1), effective);
        assert!(r.is_effective_by(day));
        assert!(!r.is_effective_by(date::parse_date("2024-03-09").unwrap()));

        r.effective_date = date::start_of_day(date::parse_date("2024-03-11").unwrap());
        assert!(!r.is_effective_by(day));
    }
}
