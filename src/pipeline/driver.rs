//! Harvest driver - joins playlist membership to video statistics
//!
//! The driver walks the playlist stream and, for each member, the video
//! stream for its id. Each video is normalized and handed to the publisher.
//! Once the playlist is exhausted the publisher is drained exactly once.
//! Everything runs on one task; only delivery reports arrive from elsewhere.

use crate::pipeline::state::PipelineState;
use crate::pipeline::stats::RunSummary;
use crate::publish::{DeliveryReport, Publisher};
use crate::record::summarize;
use crate::youtube::YouTubeClient;
use crate::{HarvestError, Result};
use chrono::Utc;
use futures::{pin_mut, TryStreamExt};

/// Runs one harvest of one playlist
pub struct Harvester {
    client: YouTubeClient,
    playlist_id: String,
    publisher: Option<Publisher>,
    fail_on_delivery_error: bool,
    state: PipelineState,
}

impl Harvester {
    /// Creates a harvester
    ///
    /// # Arguments
    ///
    /// * `client` - Upstream API client
    /// * `playlist_id` - Playlist to harvest
    /// * `publisher` - Where records go; `None` only logs the summaries
    pub fn new(
        client: YouTubeClient,
        playlist_id: impl Into<String>,
        publisher: Option<Publisher>,
    ) -> Self {
        Self {
            client,
            playlist_id: playlist_id.into(),
            publisher,
            fail_on_delivery_error: false,
            state: PipelineState::Init,
        }
    }

    /// Fail the run after draining if any record was not delivered
    pub fn fail_on_delivery_error(mut self, enabled: bool) -> Self {
        self.fail_on_delivery_error = enabled;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn publisher(&self) -> Option<&Publisher> {
        self.publisher.as_ref()
    }

    /// Runs the harvest to completion
    ///
    /// A harvester runs once. Any error leaves it in
    /// [`PipelineState::Failed`]; records enqueued before the failure are not
    /// drained.
    pub async fn run(&mut self) -> Result<RunSummary> {
        match self.harvest().await {
            Ok(summary) => {
                tracing::info!(
                    "Harvest completed: {} videos from {} playlist items in {} requests",
                    summary.videos,
                    summary.playlist_items,
                    summary.fetches
                );
                Ok(summary)
            }
            Err(e) => {
                if self.state.can_transition_to(PipelineState::Failed) {
                    tracing::debug!(from = %self.state, "state -> failed");
                    self.state = PipelineState::Failed;
                }
                tracing::error!("Harvest failed: {}", e);
                Err(e)
            }
        }
    }

    async fn harvest(&mut self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let client = &self.client;
        let publisher = &mut self.publisher;
        let state = &mut self.state;

        advance(state, PipelineState::StreamingPlaylist)?;
        tracing::info!("Harvesting playlist {}", self.playlist_id);

        let mut playlist_items = 0u64;
        let mut videos = 0u64;

        let playlist = client.playlist_items(&self.playlist_id);
        pin_mut!(playlist);

        while let Some(item) = playlist.try_next().await? {
            playlist_items += 1;
            let video_id = item.video_id();

            advance(state, PipelineState::StreamingVideos)?;
            let matches = client.videos(video_id);
            pin_mut!(matches);

            while let Some(video) = matches.try_next().await? {
                advance(state, PipelineState::Publishing)?;

                let summary = summarize(&video);
                tracing::info!("GOT {}", summary);

                if let Some(publisher) = publisher.as_mut() {
                    publisher.publish(video_id, &summary)?;
                }
                videos += 1;

                advance(state, PipelineState::StreamingVideos)?;
            }

            advance(state, PipelineState::StreamingPlaylist)?;
        }

        advance(state, PipelineState::Draining)?;
        let delivery = match publisher.as_mut() {
            Some(publisher) => publisher.drain().await?,
            None => DeliveryReport::default(),
        };

        if self.fail_on_delivery_error && delivery.failed > 0 {
            return Err(HarvestError::Delivery(format!(
                "{} of {} records were not delivered",
                delivery.failed, delivery.enqueued
            )));
        }

        advance(state, PipelineState::Done)?;

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            playlist_items,
            videos,
            fetches: client.fetch_count(),
            published: publisher.is_some(),
            delivery,
        })
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) -> Result<()> {
    if !state.can_transition_to(next) {
        return Err(HarvestError::InvalidTransition {
            from: *state,
            to: next,
        });
    }
    tracing::debug!(from = %state, to = %next, "state transition");
    *state = next;
    Ok(())
}
