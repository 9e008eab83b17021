//! Timing constants and configuration structs

use embassy_time::Duration;

use crate::filter::SensorCalibration;
use crate::mode::{ChannelOrder, ModeProfile};

/// Control loop period
pub const TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Period of the observational status check
pub const STATUS_INTERVAL: Duration = Duration::from_millis(2000);

/// Minimum spacing between two playback polls
pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Upper bound for a single playback request
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Extra age a snapshot may reach before it counts as stale
pub const SNAPSHOT_GRACE: Duration = Duration::from_millis(1000);

/// Samples per analog control in the moving average
pub const INPUT_WINDOW: usize = 8;

/// Companion playback service
pub const DEFAULT_ENDPOINT: &str = "http://192.168.1.10:3000/playback";

/// Lower bound of the shared animation frequency
pub const PARTY_HZ_MIN: f32 = 0.05;

/// Upper bound of the shared animation frequency
pub const PARTY_HZ_MAX: f32 = 5.0;

/// Animation frequency on boot
pub const DEFAULT_PARTY_HZ: f32 = 0.6;

/// What happens to the output when the fixture enters `Off`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffPolicy {
    /// Leave the last written output alone
    Hold,
    /// Zero the output only for an explicit remote power-off
    #[default]
    BlackoutOnRemote,
    /// Zero the output on every transition into `Off`
    Blackout,
}

/// Mode engine configuration
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Available modes for this deployment
    pub profile: ModeProfile,
    /// Wiring of the analog controls to output channels
    pub channel_order: ChannelOrder,
    pub off_policy: OffPolicy,
    pub calibration: SensorCalibration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(ModeProfile::Music)
    }
}

impl EngineConfig {
    pub const fn new(profile: ModeProfile) -> Self {
        Self {
            profile,
            channel_order: ChannelOrder::Bgr,
            off_policy: OffPolicy::BlackoutOnRemote,
            calibration: SensorCalibration::new(),
        }
    }
}

/// Playback polling configuration
#[derive(Debug, Clone, Copy)]
pub struct TempoConfig {
    pub endpoint: &'static str,
    pub poll_interval: Duration,
    request_timeout: Duration,
    pub grace: Duration,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl TempoConfig {
    pub const fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            poll_interval: POLL_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            grace: SNAPSHOT_GRACE,
        }
        .with_request_timeout(REQUEST_TIMEOUT)
    }

    /// Set the request timeout
    ///
    /// The timeout is kept strictly below the poll interval so a hung
    /// request can never stall the loop for a whole poll period.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        let ceiling = self.poll_interval.as_millis().saturating_sub(1);
        let millis = if timeout.as_millis() > ceiling {
            ceiling
        } else {
            timeout.as_millis()
        };
        self.request_timeout = Duration::from_millis(millis);
        self
    }

    /// Set the poll interval, re-clamping the request timeout
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        let timeout = self.request_timeout;
        self.with_request_timeout(timeout)
    }

    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Tick loop configuration
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub status_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfig {
    pub const fn new() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            status_interval: STATUS_INTERVAL,
        }
    }
}
