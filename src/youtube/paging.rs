//! Cursor-following item streams
//!
//! A list endpoint is exposed as a lazy `Stream` of items. The stream fetches
//! the first page without a cursor, yields its items in order, and fetches
//! the next page with `nextPageToken` until a page carries none. The cursor
//! lives in the unfold state, so traversal depth does not grow with the
//! number of pages.
//!
//! At most one page is held at a time. A stream cannot resume from a partial
//! position: building it again starts over from the first page.

use crate::youtube::fetcher::{ListRequest, YouTubeClient};
use crate::youtube::types::{PlaylistItem, VideoItem};
use crate::{HarvestError, Result};
use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;

/// Traversal position between pages
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    First,
    Next(String),
    Exhausted,
}

/// Streams every item of a list endpoint, following page cursors
///
/// Items are yielded in page order, then in order within each page. An empty
/// page still has its cursor followed. A fetch failure is yielded as the
/// final `Err` item and ends the stream.
pub fn stream_items<'a, T>(
    client: &'a YouTubeClient,
    request: ListRequest,
) -> impl Stream<Item = Result<T>> + 'a
where
    T: DeserializeOwned + 'a,
{
    stream::try_unfold(Cursor::First, move |cursor| {
        let request = request.clone();
        async move {
            let token = match cursor {
                Cursor::Exhausted => return Ok(None),
                Cursor::First => None,
                Cursor::Next(token) => Some(token),
            };

            let page = client.fetch_page::<T>(&request, token.as_deref()).await?;
            let next = match page.next_page_token {
                Some(token) => Cursor::Next(token),
                None => Cursor::Exhausted,
            };

            Ok::<_, HarvestError>(Some((page.items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, HarvestError>)))
    .try_flatten()
}

impl YouTubeClient {
    /// Streams the members of a playlist
    pub fn playlist_items<'a>(
        &'a self,
        playlist_id: &str,
    ) -> impl Stream<Item = Result<PlaylistItem>> + 'a {
        stream_items(self, ListRequest::playlist_items(playlist_id))
    }

    /// Streams the video records matching an id
    ///
    /// A lookup by id returns at most one video, but the traversal does not
    /// rely on it.
    pub fn videos<'a>(&'a self, video_id: &str) -> impl Stream<Item = Result<VideoItem>> + 'a {
        stream_items(self, ListRequest::videos(video_id))
    }
}
