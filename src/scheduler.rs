//! Cooperative tick loop
//!
//! Portable pacing without async or platform timers: the caller sleeps for
//! the returned duration between ticks. Each tick polls the tempo service
//! if due, runs the mode engine and, every status interval, collects a
//! status report.

use embassy_time::{Duration, Instant};

use crate::config::{SchedulerConfig, TempoConfig};
use crate::engine::{ModeEngine, TickOutcome};
use crate::shared::SharedState;
use crate::status::{StatusReport, StatusReporter};
use crate::tempo::{BODY_BUFFER_SIZE, PlaybackClient, PollOutcome, TempoAcquisition};
use crate::{InputSampler, LocalTempoController, OutputSink};

/// Tempo polling strategy of the tick loop
pub trait TempoPoller {
    /// Called once per tick; returns what the poll did, if anything ran
    fn poll(&mut self, now: Instant, shared: &SharedState) -> Option<PollOutcome>;

    /// Polling configuration, for snapshot freshness
    fn config(&self) -> TempoConfig;
}

/// Polls from inside the tick with a blocking client
///
/// A slow service stalls the tick for up to the request timeout.
pub struct InlinePoller<C: PlaybackClient, const BODY: usize = BODY_BUFFER_SIZE> {
    acquisition: TempoAcquisition<BODY>,
    client: C,
}

impl<C: PlaybackClient, const BODY: usize> InlinePoller<C, BODY> {
    pub const fn new(config: TempoConfig, client: C) -> Self {
        Self {
            acquisition: TempoAcquisition::new(config),
            client,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: PlaybackClient, const BODY: usize> TempoPoller for InlinePoller<C, BODY> {
    fn poll(&mut self, now: Instant, shared: &SharedState) -> Option<PollOutcome> {
        Some(self.acquisition.step(now, &mut self.client, shared))
    }

    fn config(&self) -> TempoConfig {
        *self.acquisition.config()
    }
}

/// Polling runs in another task via [`TempoAcquisition::step_async`]
pub struct DetachedPoller {
    config: TempoConfig,
}

impl DetachedPoller {
    pub const fn new(config: TempoConfig) -> Self {
        Self { config }
    }
}

impl TempoPoller for DetachedPoller {
    fn poll(&mut self, _now: Instant, _shared: &SharedState) -> Option<PollOutcome> {
        None
    }

    fn config(&self) -> TempoConfig {
        self.config
    }
}

/// Result of a scheduler tick
#[derive(Debug, Clone)]
pub struct TickResult {
    /// The deadline for the next tick
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule)
    pub sleep_duration: Duration,
    pub outcome: TickOutcome,
    /// Present when a poll ran this tick
    pub poll: Option<PollOutcome>,
    /// Present when the status check was due
    pub status: Option<StatusReport>,
}

/// Owns the engine and its collaborators and paces them
///
/// ```ignore
/// let mut scheduler = TickScheduler::new(engine, io, poller, SchedulerConfig::new());
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     block_for(result.sleep_duration);
/// }
/// ```
pub struct TickScheduler<'a, I, S, L, P, const COMMAND_QUEUE_SIZE: usize>
where
    I: InputSampler,
    S: OutputSink,
    L: LocalTempoController,
    P: TempoPoller,
{
    engine: ModeEngine<'a, COMMAND_QUEUE_SIZE>,
    io: Peripherals<I, S, L>,
    poller: P,
    status: StatusReporter,
    next_tick: Option<Instant>,
    tick_interval: Duration,
}

/// Hardware facing collaborators of the engine
pub struct Peripherals<I, S, L> {
    pub inputs: I,
    pub sink: S,
    pub local: L,
}

impl<'a, I, S, L, P, const COMMAND_QUEUE_SIZE: usize> TickScheduler<'a, I, S, L, P, COMMAND_QUEUE_SIZE>
where
    I: InputSampler,
    S: OutputSink,
    L: LocalTempoController,
    P: TempoPoller,
{
    pub fn new(
        engine: ModeEngine<'a, COMMAND_QUEUE_SIZE>,
        io: Peripherals<I, S, L>,
        poller: P,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            io,
            poller,
            status: StatusReporter::new(config.status_interval),
            next_tick: None,
            tick_interval: config.tick_interval,
        }
    }

    /// Run one tick and return timing information
    ///
    /// The caller is responsible for waiting until `next_deadline` before
    /// calling `tick` again.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        // Skip the backlog after a long stall (e.g. a slow poll) instead of
        // bursting through missed ticks
        let max_drift = self.tick_interval + self.tick_interval;
        let mut next_tick = match self.next_tick {
            Some(deadline) if now <= deadline + max_drift => deadline,
            _ => now,
        };

        let shared = self.engine.shared();
        let poll = self.poller.poll(now, shared);

        let outcome = self.engine.tick(
            now,
            &mut self.io.inputs,
            &mut self.io.sink,
            &mut self.io.local,
        );

        let status = self.status.is_due(now).then(|| {
            let report =
                StatusReport::collect(shared, self.engine.last_output(), &self.poller.config(), now);
            StatusReporter::log(&report, now);
            report
        });

        next_tick += self.tick_interval;
        self.next_tick = Some(next_tick);

        TickResult {
            next_deadline: next_tick,
            sleep_duration: next_tick.saturating_duration_since(now),
            outcome,
            poll,
            status,
        }
    }

    pub fn engine(&self) -> &ModeEngine<'a, COMMAND_QUEUE_SIZE> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ModeEngine<'a, COMMAND_QUEUE_SIZE> {
        &mut self.engine
    }

    pub fn peripherals(&self) -> &Peripherals<I, S, L> {
        &self.io
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<I, S, L> {
        &mut self.io
    }
}
