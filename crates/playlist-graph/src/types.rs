use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point in time used for edge fence dates
pub type Timestamp = DateTime<Utc>;

/// Identifies a playlist on the music service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistRef {
    /// Stable unique key of the playlist
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether the sync process owns write access to this playlist
    #[serde(default)]
    pub can_edit: bool,
}

impl PlaylistRef {
    /// Create a new playlist reference
    pub fn new(id: impl Into<String>, name: impl Into<String>, can_edit: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            can_edit,
        }
    }
}

/// Serde adapter for fence dates.
///
/// Reads either an RFC 3339 string or a backend-native `{seconds, nanoseconds}`
/// object (underscore-prefixed field names are accepted too). Always writes
/// RFC 3339, with as many fractional digits as needed to keep the full precision.
pub(crate) mod timestamp {
    use super::Timestamp;
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Native {
            #[serde(alias = "_seconds")]
            seconds: i64,
            #[serde(alias = "_nanoseconds", default)]
            nanoseconds: u32,
        },
    }

    pub fn serialize<S>(date: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|date| date.with_timezone(&Utc))
                .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", text, e))),
            RawTimestamp::Native {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(seconds, nanoseconds).single().ok_or_else(|| {
                D::Error::custom(format!(
                    "timestamp out of range: {}s {}ns",
                    seconds, nanoseconds
                ))
            }),
        }
    }
}
