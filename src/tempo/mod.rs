//! Tempo acquisition from the companion playback service
//!
//! Polls at most once per interval, extracts the handful of fields the
//! fixture cares about and publishes them as a whole [`MusicSnapshot`].
//! A failed poll leaves the previous snapshot untouched.

mod client;
mod extract;
mod snapshot;

pub use client::{
    AsyncPlaybackClient, FetchError, PlaybackClient, PlaybackRequest, PlaybackResponse,
};
pub use extract::{
    FieldSource, MISSING_FLOAT, MISSING_INT, ScanExtractor, extract_float, extract_int,
    extract_string,
};
pub use snapshot::{ART_CAPACITY, ArtUrl, BPM_THRESHOLD, MusicSnapshot, TITLE_CAPACITY, Title};

use embassy_time::Instant;

use crate::config::TempoConfig;
use crate::shared::SharedState;

/// Default receive buffer for a playback body
pub const BODY_BUFFER_SIZE: usize = 1024;

const LOG_TAG: &str = "tempo";

/// Poller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next interval
    Idle,
    /// A request is in flight
    Polling,
}

/// Result of one acquisition step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Less than one interval since the last attempt
    Throttled,
    /// Another request is still in flight
    Busy,
    /// A new snapshot was published
    Updated,
    /// The request failed; the previous snapshot stays
    Failed(FetchError),
}

/// Throttled playback poller
pub struct TempoAcquisition<const BODY: usize = BODY_BUFFER_SIZE> {
    config: TempoConfig,
    state: PollState,
    last_attempt: Option<Instant>,
    body: [u8; BODY],
}

impl<const BODY: usize> TempoAcquisition<BODY> {
    pub const fn new(config: TempoConfig) -> Self {
        Self {
            config,
            state: PollState::Idle,
            last_attempt: None,
            body: [0; BODY],
        }
    }

    pub const fn state(&self) -> PollState {
        self.state
    }

    pub const fn config(&self) -> &TempoConfig {
        &self.config
    }

    /// Time of the last poll attempt, successful or not
    pub const fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Poll with a blocking client if an interval has passed
    ///
    /// Blocks for at most the configured request timeout.
    pub fn step<C: PlaybackClient>(
        &mut self,
        now: Instant,
        client: &mut C,
        shared: &SharedState,
    ) -> PollOutcome {
        if let Some(outcome) = self.begin(now) {
            return outcome;
        }
        let request = PlaybackRequest {
            endpoint: self.config.endpoint,
            timeout: self.config.request_timeout(),
        };
        let result = client.get(&request, &mut self.body);
        self.finish(now, result, shared)
    }

    /// Poll with an async client if an interval has passed
    ///
    /// For running the poll in its own task so a slow service never
    /// delays the animation tick. `finished_at` supplies the completion
    /// time used to stamp the snapshot.
    pub async fn step_async<C: AsyncPlaybackClient>(
        &mut self,
        now: Instant,
        client: &mut C,
        shared: &SharedState,
        finished_at: impl FnOnce() -> Instant,
    ) -> PollOutcome {
        if let Some(outcome) = self.begin(now) {
            return outcome;
        }
        let request = PlaybackRequest {
            endpoint: self.config.endpoint,
            timeout: self.config.request_timeout(),
        };
        let result = client.get(&request, &mut self.body).await;
        self.finish(finished_at(), result, shared)
    }

    /// Check the throttle and enter `Polling`
    ///
    /// Returns an outcome when no request should be made.
    fn begin(&mut self, now: Instant) -> Option<PollOutcome> {
        if self.state == PollState::Polling && !self.is_abandoned(now) {
            return Some(PollOutcome::Busy);
        }
        if let Some(last) = self.last_attempt {
            if now.saturating_duration_since(last) < self.config.poll_interval {
                return Some(PollOutcome::Throttled);
            }
        }
        self.last_attempt = Some(now);
        self.state = PollState::Polling;
        None
    }

    /// A dropped `step_async` future leaves the state at `Polling`; once a
    /// full interval plus timeout has passed the request cannot be alive
    fn is_abandoned(&self, now: Instant) -> bool {
        self.last_attempt.is_none_or(|last| {
            now.saturating_duration_since(last)
                >= self.config.poll_interval + self.config.request_timeout()
        })
    }

    /// Publish the response and return to `Idle`
    fn finish(
        &mut self,
        now: Instant,
        result: Result<PlaybackResponse, FetchError>,
        shared: &SharedState,
    ) -> PollOutcome {
        self.state = PollState::Idle;
        match self.publish(now, result, shared) {
            Ok(()) => PollOutcome::Updated,
            Err(err) => {
                log_status!(now, LOG_TAG, "poll failed: {}", err);
                PollOutcome::Failed(err)
            }
        }
    }

    fn publish(
        &self,
        now: Instant,
        result: Result<PlaybackResponse, FetchError>,
        shared: &SharedState,
    ) -> Result<(), FetchError> {
        let response = result?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }
        if response.body_len == 0 {
            return Err(FetchError::EmptyBody);
        }
        let body = self
            .body
            .get(..response.body_len)
            .ok_or(FetchError::BodyTooLarge)?;
        let text = core::str::from_utf8(body).map_err(|_| FetchError::InvalidUtf8)?;
        if text.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        let fields = ScanExtractor::new(text);
        let snapshot =
            shared.music.with(|previous| MusicSnapshot::from_fields(&fields, previous, now));
        log_status!(
            now,
            LOG_TAG,
            "track={:?} bpm={} valid={}",
            snapshot.track.as_str(),
            snapshot.bpm,
            snapshot.valid
        );
        shared.music.replace(snapshot);
        Ok(())
    }
}
