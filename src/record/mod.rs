//! Records flowing from the API side to the stream side
//!
//! `VideoSummary` is the normalized, typed form of one video. `PublishRecord`
//! is what actually travels to the broker: a string key and an encoded value.

mod summary;

pub use summary::{summarize, VideoSummary};

/// One keyed message ready for the producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    /// The video id, sent as plain UTF-8
    pub key: String,

    /// Schema-framed value bytes
    pub payload: Vec<u8>,
}
