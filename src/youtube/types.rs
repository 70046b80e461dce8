//! Wire types for the two list endpoints
//!
//! Only the fields the pipeline reads are modelled. Everything else in the
//! API's responses is ignored during deserialization.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// One decoded list response
///
/// `items` is required: a body without it is rejected as malformed.
/// `next_page_token` is absent on the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// A `playlistItem` resource requested with `part=contentDetails`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    pub content_details: PlaylistItemContentDetails,
}

impl PlaylistItem {
    pub fn video_id(&self) -> &str {
        &self.content_details.video_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// A `video` resource requested with `part=snippet,statistics`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoItem {
    pub id: String,

    pub snippet: VideoSnippet,

    /// Missing entirely for some videos; treated as all counts absent
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
}

/// Engagement counters
///
/// The API sends counts as decimal strings and omits them when the owner has
/// hidden them. A count that is present but not a non-negative integer fails
/// decoding of the whole page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount", default, deserialize_with = "deserialize_count")]
    pub view_count: Option<u64>,

    #[serde(rename = "likeCount", default, deserialize_with = "deserialize_count")]
    pub like_count: Option<u64>,

    #[serde(rename = "commentCount", default, deserialize_with = "deserialize_count")]
    pub comment_count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(u64),
    Text(String),
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCount::Number(count)) => Ok(Some(count)),
        Some(RawCount::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid count '{}'", text))),
    }
}
