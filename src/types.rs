//! Core types for examprep-client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Subject assigned to articles with a blank or missing subject
pub const SUBJECT_OTHER: &str = "other";

/// Unique identifier for an article, opaque to the client
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub String);

impl ArticleId {
    /// Create a new ArticleId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ArticleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for ArticleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ArticleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A study note as returned by the service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: ArticleId,

    /// Title (non-empty)
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Markdown body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Free-text subject label, see [`normalize_subject`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Attached filenames, keys into the remote file store
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<String>,

    /// Marked as favorite
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorite: bool,

    /// Pinned to the top of the list
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinned: bool,

    /// Creation time; unparsable values decode as None
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// Last modification time; unparsable values decode as None
    #[serde(
        rename = "updatedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Subject used for grouping and filtering
    pub fn normalized_subject(&self) -> String {
        normalize_subject(self.subject.as_deref())
    }

    /// Creation time in milliseconds since the epoch; missing counts as 0
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.map(|t| t.timestamp_millis()).unwrap_or(0)
    }
}

/// Lowercase, trimmed subject; blank or missing becomes [`SUBJECT_OTHER`]
///
/// Idempotent: normalizing an already-normalized subject returns it unchanged.
pub fn normalize_subject(subject: Option<&str>) -> String {
    let s = subject.unwrap_or_default().trim().to_lowercase();
    if s.is_empty() {
        SUBJECT_OTHER.to_string()
    } else {
        s
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// Body of `POST /articles`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    /// Title (required)
    pub title: String,
    /// Markdown body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Subject label (required)
    pub subject: String,
    /// Attached filenames
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body of `PUT /articles/:id`; only the fields that are set are sent
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New Markdown body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Replacement file list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Favorite flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    /// Pinned flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl ArticleUpdate {
    /// Update carrying only the favorite flag
    pub fn favorite(value: bool) -> Self {
        Self {
            favorite: Some(value),
            ..Default::default()
        }
    }

    /// Update carrying only the pinned flag
    pub fn pinned(value: bool) -> Self {
        Self {
            pinned: Some(value),
            ..Default::default()
        }
    }

    /// True when no field would be sent
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Authenticated session persisted between runs
///
/// The service returns the token together with user fields; those are kept
/// verbatim so a round trip through storage loses nothing.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    #[serde(default)]
    pub token: String,

    /// Remaining user fields (username, email, id, ...)
    #[serde(flatten)]
    pub user: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    /// Session holding only a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: serde_json::Map::new(),
        }
    }

    /// Token, if non-blank
    pub fn bearer_token(&self) -> Option<&str> {
        let t = self.token.trim();
        (!t.is_empty()).then_some(t)
    }

    /// Username reported by the service, if any
    pub fn username(&self) -> Option<&str> {
        self.user.get("username").and_then(|v| v.as_str())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Body of `POST /auth/login`
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    /// Account name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Account password
    pub password: String,
}

/// Response of `POST /upload` and `GET /upload/uploads`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FileList {
    /// Stored filenames
    #[serde(default)]
    pub files: Vec<String>,
}

/// Article list ordering applied after the pinned/favorite keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first
    #[default]
    DateDesc,
    /// Oldest first
    DateAsc,
    /// Title A-Z
    TitleAsc,
    /// Title Z-A
    TitleDesc,
}

impl SortKey {
    /// All keys in the order they are offered
    pub const ALL: [SortKey; 4] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
    ];

    /// Wire name (`date_desc`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "date_desc",
            SortKey::DateAsc => "date_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "Date (newest)",
            SortKey::DateAsc => "Date (oldest)",
            SortKey::TitleAsc => "Title (A-Z)",
            SortKey::TitleDesc => "Title (Z-A)",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| crate::error::Error::InvalidInput(format!("unknown sort key: {s}")))
    }
}
