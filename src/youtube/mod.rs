//! YouTube Data API access
//!
//! This module contains the upstream side of the pipeline:
//! - Wire types for the playlistItems and videos list endpoints
//! - The single-page fetcher with timeout and error classification
//! - Lazy cursor-following streams over both endpoints

mod fetcher;
mod paging;
mod types;

pub use fetcher::{build_http_client, Endpoint, ListRequest, YouTubeClient};
pub use paging::stream_items;
pub use types::{
    Page, PlaylistItem, PlaylistItemContentDetails, VideoItem, VideoSnippet, VideoStatistics,
};
