#![no_std]

#[macro_use]
mod log;

pub mod color;
pub mod command;
pub mod config;
pub mod engine;
pub mod filter;
pub mod math;
pub mod mode;
pub mod scene;
pub mod scheduler;
pub mod shared;
pub mod status;
pub mod tempo;

pub use color::{INTENSITY_MAX, Intensity, Rgb, hue_to_intensity, scale_to_intensity};
pub use command::{CommandError, CommandQueue, CommandReceiver, CommandSender, RemoteCommand};
pub use config::{EngineConfig, OffPolicy, SchedulerConfig, TempoConfig};
pub use engine::{ModeEngine, TickOutcome, UnsupportedMode};
pub use filter::{ChannelLevels, InputFilter, MovingAverage, RawInputs, SensorCalibration};
pub use mode::{ChannelOrder, ModeProfile, OperationMode};
pub use scene::Scene;
pub use scheduler::{DetachedPoller, InlinePoller, Peripherals, TickResult, TickScheduler};
pub use shared::SharedState;
pub use status::StatusReport;
pub use tempo::{MusicSnapshot, PollOutcome, TempoAcquisition};
pub use embassy_time::{Duration, Instant};

/// Abstract light actuator
///
/// Implement this trait to drive the PWM channels of the fixture.
/// Values are in device intensity units and applied immediately.
pub trait OutputSink {
    /// Set the three channel intensities
    fn set_intensities(&mut self, level: Intensity);
}

/// Source of raw analog control readings
pub trait InputSampler {
    /// Read the three controls once
    fn sample(&mut self) -> RawInputs;
}

/// External controller for the local tempo mode
///
/// Receives the smoothed control levels every tick and may write the
/// output itself.
pub trait LocalTempoController {
    fn update<S: OutputSink>(&mut self, levels: ChannelLevels, sink: &mut S);
}

/// Stand-in for fixtures without analog controls
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInputs;

impl InputSampler for NoInputs {
    fn sample(&mut self) -> RawInputs {
        RawInputs::default()
    }
}

/// Stand-in for fixtures without a local tempo controller
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalTempo;

impl LocalTempoController for NoLocalTempo {
    fn update<S: OutputSink>(&mut self, _levels: ChannelLevels, _sink: &mut S) {}
}
