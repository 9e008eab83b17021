use embassy_time::Instant;

/// Linearly re-map `value` from one range to another
///
/// Integer math with truncating division, same as the Arduino `map()`.
/// The input is not clamped; callers clamp first when they need to.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let in_span = in_max as i64 - in_min as i64;
    if in_span == 0 {
        return out_min;
    }
    let out_span = out_max as i64 - out_min as i64;
    ((value as i64 - in_min as i64) * out_span / in_span + out_min as i64) as i32
}

/// Reduce an angle in degrees into `[0, 360)`
#[inline]
pub fn wrap_degrees(hue: f32) -> f32 {
    let wrapped = libm::fmodf(hue, 360.0);
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Monotonic delta helper for animations
///
/// Returns the seconds elapsed between consecutive calls. The first call
/// after construction or [`DeltaClock::reset`] yields `0.0`, so a restarted
/// animation never sees the time it spent inactive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaClock {
    last: Option<Instant>,
}

impl DeltaClock {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous call
    #[allow(clippy::cast_precision_loss)]
    pub fn delta_seconds(&mut self, now: Instant) -> f32 {
        let Some(last) = self.last.replace(now) else {
            return 0.0;
        };
        now.saturating_duration_since(last).as_micros() as f32 / 1_000_000.0
    }

    /// Forget the last timestamp
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Timestamp of the previous call, if any
    pub const fn last(&self) -> Option<Instant> {
        self.last
    }
}
