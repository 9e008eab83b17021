//! Periodic, read-only status reporting

use embassy_time::{Duration, Instant};

use crate::color::Intensity;
use crate::config::TempoConfig;
use crate::mode::OperationMode;
use crate::shared::SharedState;
use crate::tempo::MusicSnapshot;

const LOG_TAG: &str = "status";

/// Point-in-time view for status endpoints and logs
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub mode: OperationMode,
    pub party_hz: f32,
    /// Last triple the engine wrote, if any
    pub output: Option<Intensity>,
    pub music: MusicSnapshot,
    /// The snapshot is no older than one poll interval plus grace
    pub music_fresh: bool,
}

impl StatusReport {
    /// Collect a report from shared state
    pub fn collect(
        shared: &SharedState,
        output: Option<Intensity>,
        tempo: &TempoConfig,
        now: Instant,
    ) -> Self {
        let music = shared.music.get();
        let music_fresh = music.valid && !music.is_stale(now, tempo.poll_interval, tempo.grace);
        Self {
            mode: shared.mode.get(),
            party_hz: shared.party_hz.get(),
            output,
            music,
            music_fresh,
        }
    }
}

/// Decides when the periodic status check is due
#[derive(Debug, Clone)]
pub struct StatusReporter {
    interval: Duration,
    last: Option<Instant>,
}

impl StatusReporter {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns if a report is due, and if so marks it as done
    pub fn is_due(&mut self, now: Instant) -> bool {
        let due = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Log a report
    pub fn log(report: &StatusReport, now: Instant) {
        log_status!(
            now,
            LOG_TAG,
            "mode={} hz={} out={:?} track={:?} bpm={} fresh={}",
            report.mode.as_str(),
            report.party_hz,
            report.output.map(Intensity::to_array),
            report.music.track.as_str(),
            report.music.bpm,
            report.music_fresh
        );
    }
}
