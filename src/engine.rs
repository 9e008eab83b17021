use core::fmt;

use embassy_time::Instant;

use crate::color::Intensity;
use crate::command::{CommandReceiver, RemoteCommand};
use crate::config::{EngineConfig, OffPolicy};
use crate::filter::{ChannelLevels, InputFilter};
use crate::mode::{ModeProfile, MusicPulse, OperationMode, PartyAnimation};
use crate::shared::SharedState;
use crate::{InputSampler, LocalTempoController, OutputSink};

const LOG_TAG: &str = "engine";

/// Requested mode is not part of the deployment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedMode(pub OperationMode);

impl fmt::Display for UnsupportedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode {} is not available on this fixture", self.0.as_str())
    }
}

/// What a tick did with the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine wrote this triple
    Wrote(Intensity),
    /// The local tempo controller received these levels
    Delegated(ChannelLevels),
    /// Nothing computed this tick
    Idle,
}

/// Who asked for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Local,
    Remote,
}

/// Mode state machine - picks the color strategy for every tick
///
/// Mode changes only happen through [`ModeEngine::set_mode`],
/// [`ModeEngine::cycle_mode`] or queued remote commands, all of which run
/// between ticks.
pub struct ModeEngine<'a, const COMMAND_QUEUE_SIZE: usize> {
    // External dependencies and configuration
    commands: CommandReceiver<'a, COMMAND_QUEUE_SIZE>,
    shared: &'a SharedState,
    config: EngineConfig,

    // Internal state
    mode: OperationMode,
    filter: InputFilter,
    party: PartyAnimation,
    pulse: MusicPulse,
    /// Direct write requested by a command, applied on the next tick
    pending: Option<Intensity>,
    last_output: Option<Intensity>,
}

impl<'a, const COMMAND_QUEUE_SIZE: usize> ModeEngine<'a, COMMAND_QUEUE_SIZE> {
    /// Create an engine in the profile's initial mode
    pub fn new(
        commands: CommandReceiver<'a, COMMAND_QUEUE_SIZE>,
        shared: &'a SharedState,
        config: &EngineConfig,
    ) -> Self {
        let mode = config.profile.initial_mode();
        shared.mode.publish(mode);
        Self {
            commands,
            shared,
            config: *config,
            mode,
            filter: InputFilter::new(config.calibration),
            party: PartyAnimation::new(),
            pulse: MusicPulse::new(),
            pending: None,
            last_output: None,
        }
    }

    /// Run one control step
    ///
    /// Drains queued commands, then produces this tick's output for the
    /// active mode. Analog inputs are only sampled by modes that use them.
    pub fn tick<I, S, L>(
        &mut self,
        now: Instant,
        inputs: &mut I,
        sink: &mut S,
        local: &mut L,
    ) -> TickOutcome
    where
        I: InputSampler,
        S: OutputSink,
        L: LocalTempoController,
    {
        self.process_commands(now);

        if let Some(level) = self.pending.take() {
            self.write(sink, level);
        }

        match self.mode {
            OperationMode::Manual => {
                let levels = self.filter.observe(inputs.sample());
                let level = self.config.channel_order.apply(levels);
                self.write(sink, level);
                TickOutcome::Wrote(level)
            }
            OperationMode::LocalTempo => {
                let levels = self.filter.observe(inputs.sample());
                local.update(levels, sink);
                TickOutcome::Delegated(levels)
            }
            OperationMode::Party => {
                let level = self.party.render(now, self.shared.party_hz.get());
                self.write(sink, level);
                TickOutcome::Wrote(level)
            }
            OperationMode::Music => {
                self.retune_from_tempo();
                let level = self.pulse.render(now, self.shared.party_hz.get());
                self.write(sink, level);
                TickOutcome::Wrote(level)
            }
            OperationMode::Remote => TickOutcome::Idle,
            OperationMode::Off => {
                self.party.reset();
                self.pulse.reset();
                TickOutcome::Idle
            }
        }
    }

    /// Switch mode from a local source (button, boot code)
    pub fn set_mode(&mut self, mode: OperationMode, now: Instant) -> Result<(), UnsupportedMode> {
        self.transition(mode, now, Origin::Local)
    }

    /// Advance to the next mode of the profile
    pub fn cycle_mode(&mut self, now: Instant) -> OperationMode {
        let next = self.config.profile.next_after(self.mode);
        // `next_after` only yields modes of the profile
        let _ = self.transition(next, now, Origin::Local);
        self.mode
    }

    /// Apply a remote command immediately
    ///
    /// Normally commands arrive through the queue and are applied at the
    /// start of a tick; this is the same path without the queue.
    pub fn apply_command(&mut self, command: RemoteCommand, now: Instant) {
        match command {
            RemoteCommand::SetMode(mode) => {
                if let Err(err) = self.transition(mode, now, Origin::Remote) {
                    log_status!(now, LOG_TAG, "rejected remote mode: {}", err);
                }
            }
            RemoteCommand::SetColor(color) => self.write_direct(Intensity::from(color), now),
            RemoteCommand::SetPartyHz(hz) => {
                let stored = self.shared.party_hz.set(hz);
                log_status!(now, LOG_TAG, "party hz set to {}", stored);
                if self.config.profile.supports(OperationMode::Party) {
                    // Only fails for modes outside the profile
                    let _ = self.transition(OperationMode::Party, now, Origin::Remote);
                }
            }
            RemoteCommand::Scene(scene) => {
                log_status!(now, LOG_TAG, "scene {}", scene.as_str());
                self.write_direct(scene.intensity(), now);
            }
            RemoteCommand::PowerOff => {
                if self.transition(OperationMode::Off, now, Origin::Remote).is_ok() {
                    self.pending = Some(Intensity::OFF);
                }
            }
            RemoteCommand::CycleMode => {
                self.cycle_mode(now);
            }
        }
    }

    pub const fn mode(&self) -> OperationMode {
        self.mode
    }

    pub const fn profile(&self) -> ModeProfile {
        self.config.profile
    }

    /// Last triple written by the engine
    pub const fn last_output(&self) -> Option<Intensity> {
        self.last_output
    }

    pub const fn party(&self) -> &PartyAnimation {
        &self.party
    }

    pub const fn pulse(&self) -> &MusicPulse {
        &self.pulse
    }

    /// Smoothed analog levels
    pub fn input_levels(&self) -> ChannelLevels {
        self.filter.levels()
    }

    pub const fn shared(&self) -> &'a SharedState {
        self.shared
    }

    fn process_commands(&mut self, now: Instant) {
        while let Some(command) = self.commands.try_receive() {
            self.apply_command(command, now);
        }
    }

    fn transition(
        &mut self,
        mode: OperationMode,
        now: Instant,
        origin: Origin,
    ) -> Result<(), UnsupportedMode> {
        if !self.config.profile.supports(mode) {
            return Err(UnsupportedMode(mode));
        }
        if mode == self.mode {
            return Ok(());
        }

        match self.mode {
            OperationMode::Party => self.party.reset(),
            OperationMode::Music => self.pulse.reset(),
            _ => {}
        }
        self.filter.reset();

        if mode == OperationMode::Off && self.blackout_on_off(origin) {
            self.pending = Some(Intensity::OFF);
        }

        log_status!(
            now,
            LOG_TAG,
            "mode {} -> {}",
            self.mode.as_str(),
            mode.as_str()
        );
        self.mode = mode;
        self.shared.mode.publish(mode);
        Ok(())
    }

    /// Take remote control and write `level` on the next tick
    fn write_direct(&mut self, level: Intensity, now: Instant) {
        if self.mode != OperationMode::Remote {
            if let Err(err) = self.transition(OperationMode::Remote, now, Origin::Remote) {
                log_status!(now, LOG_TAG, "ignored direct write: {}", err);
                return;
            }
        }
        self.pending = Some(level);
    }

    fn blackout_on_off(&self, origin: Origin) -> bool {
        match self.config.off_policy {
            OffPolicy::Hold => false,
            OffPolicy::BlackoutOnRemote => origin == Origin::Remote,
            OffPolicy::Blackout => true,
        }
    }

    /// Follow the playback tempo: one pulse per beat
    fn retune_from_tempo(&self) {
        let bpm = self
            .shared
            .music
            .with(|snapshot| snapshot.has_tempo().then_some(snapshot.bpm));
        if let Some(bpm) = bpm {
            self.shared.party_hz.set(bpm / 60.0);
        }
    }

    fn write<S: OutputSink>(&mut self, sink: &mut S, level: Intensity) {
        sink.set_intensities(level);
        self.last_output = Some(level);
    }
}
