//! Music mode brightness pulse

use core::f32::consts::TAU;

use embassy_time::Instant;

use crate::color::{Intensity, level_to_intensity};
use crate::config::PARTY_HZ_MIN;
use crate::math::DeltaClock;

/// Lowest brightness of the pulse, the fixture never fully blacks out
pub const MIN_LEVEL: f32 = 0.15;

/// Sine brightness oscillation at the shared frequency
#[derive(Debug, Clone, Default)]
pub struct MusicPulse {
    phase: f32,
    clock: DeltaClock,
}

impl MusicPulse {
    pub const fn new() -> Self {
        Self {
            phase: 0.0,
            clock: DeltaClock::new(),
        }
    }

    /// Advance the phase and return the white level for this tick
    pub fn render(&mut self, now: Instant, hz: f32) -> Intensity {
        let dt = self.clock.delta_seconds(now);
        self.advance(dt, hz);
        Intensity::gray(level_to_intensity(Self::brightness_at(self.phase)))
    }

    /// Advance the phase by `dt` seconds; frequencies below the shared
    /// minimum are raised to it
    pub fn advance(&mut self, dt: f32, hz: f32) {
        self.phase += dt * hz.max(PARTY_HZ_MIN) * TAU;
        if self.phase > TAU {
            self.phase = libm::fmodf(self.phase, TAU);
        }
    }

    /// Brightness fraction for a phase: `MIN_LEVEL` at the trough, `1.0` at
    /// the crest
    pub fn brightness_at(phase: f32) -> f32 {
        let wave = (libm::sinf(phase) + 1.0) / 2.0;
        MIN_LEVEL + wave * (1.0 - MIN_LEVEL)
    }

    /// Current brightness fraction
    pub fn brightness(&self) -> f32 {
        Self::brightness_at(self.phase)
    }

    /// Current phase in radians
    pub const fn phase(&self) -> f32 {
        self.phase
    }

    /// Timestamp of the last advance
    pub const fn last_tick(&self) -> Option<Instant> {
        self.clock.last()
    }

    /// Restart from phase zero; the next tick sees no elapsed time
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.clock.reset();
    }
}
