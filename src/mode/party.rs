//! Party mode hue rotation

use embassy_time::Instant;

use crate::color::{Intensity, hue_to_intensity};
use crate::math::DeltaClock;

/// Hue is only folded back into one turn once it passes this bound
const HUE_FOLD_THRESHOLD: f32 = 720.0;

/// Continuously rotating hue
///
/// The hue grows by `dt * hz * 360` degrees per tick. It is reduced modulo
/// 360 only after it exceeds 720, which keeps the value bounded without
/// folding on every tick.
#[derive(Debug, Clone, Default)]
pub struct PartyAnimation {
    hue: f32,
    clock: DeltaClock,
}

impl PartyAnimation {
    pub const fn new() -> Self {
        Self {
            hue: 0.0,
            clock: DeltaClock::new(),
        }
    }

    /// Advance the hue and return the color for this tick
    pub fn render(&mut self, now: Instant, hz: f32) -> Intensity {
        let dt = self.clock.delta_seconds(now);
        self.advance(dt, hz);
        hue_to_intensity(self.hue)
    }

    /// Advance the hue by `dt` seconds at `hz` turns per second
    pub fn advance(&mut self, dt: f32, hz: f32) {
        self.hue += dt * hz * 360.0;
        if self.hue > HUE_FOLD_THRESHOLD {
            self.hue = libm::fmodf(self.hue, 360.0);
        }
    }

    /// Current hue in degrees
    pub const fn hue(&self) -> f32 {
        self.hue
    }

    /// Timestamp of the last advance
    pub const fn last_tick(&self) -> Option<Instant> {
        self.clock.last()
    }

    /// Restart from hue zero; the next tick sees no elapsed time
    pub fn reset(&mut self) {
        self.hue = 0.0;
        self.clock.reset();
    }
}
