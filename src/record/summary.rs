use crate::youtube::VideoItem;
use std::fmt;

/// Flat, typed view of one video's metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Normalizes a raw video record
///
/// Absent counts become 0; videos with hidden statistics are common.
pub fn summarize(video: &VideoItem) -> VideoSummary {
    let stats = &video.statistics;
    VideoSummary {
        video_id: video.id.clone(),
        title: video.snippet.title.clone(),
        views: stats.view_count.unwrap_or(0),
        likes: stats.like_count.unwrap_or(0),
        comments: stats.comment_count.unwrap_or(0),
    }
}

impl fmt::Display for VideoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} (views: {}, likes: {}, comments: {})",
            self.video_id, self.title, self.views, self.likes, self.comments
        )
    }
}
