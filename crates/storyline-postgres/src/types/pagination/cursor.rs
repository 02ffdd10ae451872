//! Opaque cursor tokens for keyset pagination.
//!
//! A [`Cursor`] names a record's position in the `(timestamp, id)` order. On
//! the wire it travels as a URL-safe base64 token of a versioned payload:
//!
//! ```text
//! v1:<unix nanoseconds>:<hyphenated lowercase uuid>
//! ```
//!
//! Decoding is strict. Anything that is not the exact re-encoding of the value
//! it decodes to is rejected, so `decode(encode(c)) == c` and
//! `encode(decode(t)) == t` both hold.

use std::fmt;
use std::str::FromStr;

use base64::prelude::*;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current token format version.
const CURSOR_VERSION: &str = "v1";

/// Field separator inside the decoded payload.
const SEPARATOR: char = ':';

/// Reasons a cursor token can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64 or not UTF-8 once decoded.
    #[error("cursor is not valid base64url text")]
    Encoding,

    /// The payload carries a version this build does not understand.
    #[error("unsupported cursor version `{0}`")]
    UnsupportedVersion(String),

    /// The payload does not have the expected number of fields.
    #[error("cursor payload is malformed")]
    Malformed,

    /// The timestamp field is not an in-range nanosecond count.
    #[error("cursor timestamp is invalid")]
    Timestamp,

    /// The id field is not a UUID.
    #[error("cursor id is invalid")]
    Id,

    /// The token decodes, but is not the canonical encoding of its value.
    #[error("cursor is not in canonical form")]
    NonCanonical,
}

/// A position in the `(timestamp, id)` sort order.
///
/// Ordering compares the timestamp first and the id second, which is the
/// same tuple order the range store sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cursor {
    /// Timestamp of the record.
    pub timestamp: Timestamp,
    /// ID of the record (tiebreaker for equal timestamps).
    pub id: Uuid,
}

impl Cursor {
    /// Creates a new cursor from a timestamp and ID.
    pub fn new(timestamp: Timestamp, id: Uuid) -> Self {
        Self { timestamp, id }
    }

    /// Encodes the cursor as an opaque URL-safe token.
    pub fn encode(&self) -> String {
        let payload = format!(
            "{CURSOR_VERSION}{SEPARATOR}{}{SEPARATOR}{}",
            self.timestamp.as_nanosecond(),
            self.id.hyphenated()
        );
        BASE64_URL_SAFE_NO_PAD.encode(payload.as_bytes())
    }

    /// Decodes a token produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Encoding)?;
        let payload = String::from_utf8(bytes).map_err(|_| CursorError::Encoding)?;

        let (version, fields) = payload
            .split_once(SEPARATOR)
            .ok_or(CursorError::Malformed)?;
        if version != CURSOR_VERSION {
            return Err(CursorError::UnsupportedVersion(version.to_owned()));
        }

        let (nanos, id) = fields
            .split_once(SEPARATOR)
            .ok_or(CursorError::Malformed)?;
        let nanos: i128 = nanos.parse().map_err(|_| CursorError::Timestamp)?;
        let timestamp = Timestamp::from_nanosecond(nanos).map_err(|_| CursorError::Timestamp)?;
        let id = Uuid::try_parse(id).map_err(|_| CursorError::Id)?;

        let cursor = Self::new(timestamp, id);
        if cursor.encode() != token {
            return Err(CursorError::NonCanonical);
        }

        Ok(cursor)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.encode()
    }
}

impl TryFrom<String> for Cursor {
    type Error = CursorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decode(&value)
    }
}

/// Records that occupy a position in the cursor order.
pub trait HasCursor {
    /// Returns the cursor for this record.
    fn cursor(&self) -> Cursor;
}

impl HasCursor for Cursor {
    #[inline]
    fn cursor(&self) -> Cursor {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Cursor {
        let timestamp = Timestamp::from_second(1_700_000_000).unwrap();
        let id = Uuid::parse_str("0190f2a1-7c4e-7b3a-9d2f-1a2b3c4d5e6f").unwrap();
        Cursor::new(timestamp, id)
    }

    fn token(payload: &str) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(payload)
    }

    #[test]
    fn cursor_encode_decode_roundtrip() {
        let cursor = Cursor::new(Timestamp::now(), Uuid::now_v7());
        let decoded = Cursor::decode(&cursor.encode()).expect("decode should succeed");
        assert_eq!(cursor, decoded);
    }

    #[test]
    fn cursor_payload_layout() {
        let cursor = sample();
        let payload = BASE64_URL_SAFE_NO_PAD.decode(cursor.encode()).unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            "v1:1700000000000000000:0190f2a1-7c4e-7b3a-9d2f-1a2b3c4d5e6f"
        );
    }

    #[test]
    fn cursor_keeps_sub_microsecond_precision() {
        let timestamp = Timestamp::from_nanosecond(1_700_000_000_123_456_789).unwrap();
        let cursor = Cursor::new(timestamp, Uuid::nil());
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap().timestamp, timestamp);
    }

    #[test]
    fn cursor_before_epoch() {
        let timestamp = Timestamp::from_second(-86_400).unwrap();
        let cursor = Cursor::new(timestamp, Uuid::nil());
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn cursor_decode_invalid() {
        assert_eq!(Cursor::decode("invalid!"), Err(CursorError::Encoding));
        assert_eq!(Cursor::decode(""), Err(CursorError::Malformed));
        assert_eq!(
            Cursor::decode(&token("not:valid:cursor")),
            Err(CursorError::UnsupportedVersion("not".into()))
        );
    }

    #[test]
    fn cursor_rejects_unknown_version() {
        let payload = "v2:0:00000000-0000-0000-0000-000000000000";
        assert_eq!(
            Cursor::decode(&token(payload)),
            Err(CursorError::UnsupportedVersion("v2".into()))
        );
    }

    #[test]
    fn cursor_rejects_missing_fields() {
        assert_eq!(Cursor::decode(&token("v1")), Err(CursorError::Malformed));
        assert_eq!(Cursor::decode(&token("v1:12")), Err(CursorError::Malformed));
    }

    #[test]
    fn cursor_rejects_bad_fields() {
        let bad_timestamp = token("v1:yesterday:00000000-0000-0000-0000-000000000000");
        assert_eq!(Cursor::decode(&bad_timestamp), Err(CursorError::Timestamp));

        let out_of_range = format!("v1:{}:00000000-0000-0000-0000-000000000000", i128::MAX);
        assert_eq!(Cursor::decode(&token(&out_of_range)), Err(CursorError::Timestamp));

        assert_eq!(Cursor::decode(&token("v1:0:not-a-uuid")), Err(CursorError::Id));
    }

    #[test]
    fn cursor_rejects_non_canonical_tokens() {
        let uppercase = token("v1:0:0190F2A1-7C4E-7B3A-9D2F-1A2B3C4D5E6F");
        assert_eq!(Cursor::decode(&uppercase), Err(CursorError::NonCanonical));

        let simple = token("v1:0:0190f2a17c4e7b3a9d2f1a2b3c4d5e6f");
        assert_eq!(Cursor::decode(&simple), Err(CursorError::NonCanonical));

        let padded_number = token("v1:+0:0190f2a1-7c4e-7b3a-9d2f-1a2b3c4d5e6f");
        assert_eq!(Cursor::decode(&padded_number), Err(CursorError::NonCanonical));
    }

    #[test]
    fn cursor_order_is_timestamp_then_id() {
        let early = Timestamp::from_second(10).unwrap();
        let late = Timestamp::from_second(20).unwrap();
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);

        assert!(Cursor::new(early, high) < Cursor::new(late, low));
        assert!(Cursor::new(early, low) < Cursor::new(early, high));
    }

    #[test]
    fn cursor_serde_uses_token() {
        let cursor = sample();
        let json = serde_json::to_string(&cursor).unwrap();
        assert_eq!(json, format!("\"{}\"", cursor.encode()));

        let parsed: Cursor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cursor);
        assert!(serde_json::from_str::<Cursor>("\"garbage\"").is_err());
    }
}
