//! Comment records as persisted in the storage slot

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// Alphabet for the random id suffix
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique, immutable identifier of a comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Number of random base-36 characters after the millisecond prefix
    pub const SUFFIX_LEN: usize = 7;

    /// Generate an id: creation time in Unix millis followed by a random base-36 suffix
    pub fn generate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut id = now.timestamp_millis().to_string();
        for _ in 0..Self::SUFFIX_LEN {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            id.push(ID_ALPHABET[idx] as char);
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CommentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Older snapshots may carry numeric ids or `null`; both are accepted.
/// `null` becomes an empty id which the store backfills on load.
fn deserialize_id<'de, D>(deserializer: D) -> Result<CommentId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => CommentId(s),
        Some(RawId::Number(n)) => CommentId(n.to_string()),
        None => CommentId::default(),
    })
}

/// Dates are normally RFC 3339. Hand-edited or older snapshots may hold a
/// local date-time without offset, or a bare date; those are read as UTC.
fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized date '{}'", raw)))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A single comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Empty only for legacy records that have not been backfilled yet
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: CommentId,
    pub author: String,
    pub text: String,
    /// Creation time, bumped on every edit. Serialized as ISO 8601.
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        id: CommentId,
        author: impl Into<String>,
        text: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            text: text.into(),
            date,
        }
    }

    /// Replace the text and bump the date; id and author never change
    pub fn apply_edit(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.text = text.into();
        self.date = now;
    }
}
