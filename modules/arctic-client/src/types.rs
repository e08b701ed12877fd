use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::error::{ArcticError, Result};

/// Fields requested from the post search endpoint.
pub const POST_FIELDS: &str = "id,title,selftext,created_utc,score,num_comments,author";

/// Fields requested from the comment search endpoint.
pub const COMMENT_FIELDS: &str = "id,body,created_utc,score,author,link_id,parent_id";

/// Bodies the archive uses for moderated or deleted content.
const REMOVED_BODIES: &[&str] = &["[deleted]", "[removed]"];

/// Permanent link for a post id. Stable across scans so downstream
/// consumers can cite it as evidence.
pub fn permalink(post_id: &str) -> String {
    format!("https://www.reddit.com/comments/{post_id}/")
}

// --- Normalized types ---

/// A submission returned by post search, with missing fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub score: i64,
    pub created_utc: i64,
    pub num_comments: i64,
    pub author: String,
    pub permalink: String,
}

/// A top-level comment returned by comment search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub score: i64,
    pub created_utc: i64,
    pub author: String,
}

// --- Wire types ---

/// A post exactly as the archive returns it. Every field may be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub selftext: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub score: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub created_utc: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub num_comments: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: Option<String>,
}

impl RawPost {
    /// Convert to a normalized Post. Posts without an id are dropped.
    pub fn into_post(self) -> Option<Post> {
        let id = self.id.filter(|id| !id.is_empty())?;
        Some(Post {
            permalink: permalink(&id),
            id,
            title: self.title.unwrap_or_default(),
            selftext: self.selftext.unwrap_or_default(),
            score: self.score.unwrap_or(0),
            created_utc: self.created_utc.unwrap_or(0),
            num_comments: self.num_comments.unwrap_or(0),
            author: self.author.unwrap_or_default(),
        })
    }
}

/// A comment exactly as the archive returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub score: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub created_utc: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub parent_id: Option<String>,
}

impl RawComment {
    /// Top-level comments answer the post itself (`t3_` parent) or carry no
    /// parent at all. Replies to other comments and removed bodies are dropped.
    pub fn into_top_level(self) -> Option<Comment> {
        if let Some(parent) = self.parent_id.as_deref() {
            if !parent.is_empty() && !parent.starts_with("t3_") {
                return None;
            }
        }
        let body = self.body.unwrap_or_default();
        if body.is_empty() || REMOVED_BODIES.contains(&body.as_str()) {
            return None;
        }
        Some(Comment {
            id: self.id.unwrap_or_default(),
            body,
            score: self.score.unwrap_or(0),
            created_utc: self.created_utc.unwrap_or(0),
            author: self.author.unwrap_or_default(),
        })
    }
}

// --- Envelope parsing ---

/// Extract the `data` array from a search response body.
fn data_array(body: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|_| ArcticError::Format("Invalid JSON response from Arctic Shift.".into()))?;
    let serde_json::Value::Object(mut envelope) = value else {
        return Err(ArcticError::Format("Unexpected response format.".into()));
    };
    match envelope.remove("data") {
        Some(serde_json::Value::Array(items)) => Ok(items),
        Some(_) => Err(ArcticError::Format(
            "Unexpected response. 'data' is not an array.".into(),
        )),
        None => Err(ArcticError::Format(
            "Unexpected response. 'data' is missing.".into(),
        )),
    }
}

/// Parse a post search response. Non-object items and items without an id are skipped.
pub fn parse_posts(body: &str) -> Result<Vec<Post>> {
    Ok(data_array(body)?
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|item| serde_json::from_value::<RawPost>(item).ok())
        .filter_map(RawPost::into_post)
        .collect())
}

/// Parse a comment search response, keeping only live top-level comments.
pub fn parse_comments(body: &str) -> Result<Vec<Comment>> {
    Ok(data_array(body)?
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|item| serde_json::from_value::<RawComment>(item).ok())
        .filter_map(RawComment::into_top_level)
        .collect())
}

/// Pull the human-readable `error` field out of a 400 response, if present.
pub fn error_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default, deserialize_with = "lenient_string")]
        error: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(body).ok()?.error
}

// --- Lenient field decoding ---
//
// The archive is assembled from years of dumps; numeric fields occasionally
// arrive as floats or strings and text fields as numbers.

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(n)) => Some(n),
        Some(Loose::Float(f)) if f.is_finite() => Some(f as i64),
        Some(Loose::Text(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(s)) => Some(s),
        Some(Loose::Int(n)) => Some(n.to_string()),
        Some(Loose::Float(f)) => Some(f.to_string()),
        _ => None,
    })
}
