/// Pipeline state definitions for tracking run progress
///
/// A run moves through these states in order; any failure jumps to `Failed`.
use std::fmt;

/// The stage a harvest run is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing fetched yet
    Init,

    /// Consuming the playlist item stream
    StreamingPlaylist,

    /// Consuming the video stream for one playlist item
    StreamingVideos,

    /// Normalizing and enqueuing one video
    Publishing,

    /// Waiting for outstanding deliveries
    Draining,

    // ===== Terminal States =====
    /// All records resolved
    Done,

    /// Aborted by an unhandled error; no partial resume
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` may follow this state
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Init, StreamingPlaylist)
                | (StreamingPlaylist, StreamingVideos)
                | (StreamingPlaylist, Draining)
                | (StreamingVideos, Publishing)
                | (StreamingVideos, StreamingPlaylist)
                | (Publishing, StreamingVideos)
                | (Draining, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::StreamingPlaylist => "streaming_playlist",
            Self::StreamingVideos => "streaming_videos",
            Self::Publishing => "publishing",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
