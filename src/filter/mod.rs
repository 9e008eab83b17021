//! Input smoothing for the analog controls
//!
//! Raw readings are clamped to the calibrated sensor range, rescaled into
//! device intensity units and then averaged over a fixed circular window.

mod moving_average;

pub use moving_average::MovingAverage;

use crate::color::INTENSITY_MAX;
use crate::config::INPUT_WINDOW;
use crate::math::map_range;

/// Raw readings of the three analog controls (e.g. millivolts)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub first: u16,
    pub second: u16,
    pub third: u16,
}

impl RawInputs {
    pub const fn new(first: u16, second: u16, third: u16) -> Self {
        Self {
            first,
            second,
            third,
        }
    }
}

/// Smoothed control levels in device intensity units, in physical control
/// order (left, middle, right)
pub type ChannelLevels = [u16; 3];

/// Calibrated usable span of the analog sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCalibration {
    /// Readings at or below this are treated as zero
    pub raw_min: u16,
    /// Readings at or above this are treated as full scale
    pub raw_max: u16,
    /// Output level for a full scale reading
    pub out_max: u16,
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorCalibration {
    /// Potentiometers read through an attenuated ADC: 5..=950 mV
    pub const fn new() -> Self {
        Self {
            raw_min: 5,
            raw_max: 950,
            out_max: INTENSITY_MAX,
        }
    }

    /// Clamp a raw reading to the calibrated span, then rescale it
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn scale(&self, raw: u16) -> u16 {
        let (low, high) = if self.raw_min <= self.raw_max {
            (self.raw_min, self.raw_max)
        } else {
            (self.raw_max, self.raw_min)
        };
        let clamped = raw.clamp(low, high);
        map_range(
            i32::from(clamped),
            i32::from(low),
            i32::from(high),
            0,
            i32::from(self.out_max),
        ) as u16
    }
}

/// Three independent moving averages, one per analog control
#[derive(Debug, Clone)]
pub struct InputFilter<const N: usize = INPUT_WINDOW> {
    calibration: SensorCalibration,
    channels: [MovingAverage<N>; 3],
}

impl<const N: usize> InputFilter<N> {
    pub const fn new(calibration: SensorCalibration) -> Self {
        Self {
            calibration,
            channels: [MovingAverage::new(), MovingAverage::new(), MovingAverage::new()],
        }
    }

    /// Calibrate and record one reading per control, returning the averages
    pub fn observe(&mut self, raw: RawInputs) -> ChannelLevels {
        let [first, second, third] = &mut self.channels;
        [
            first.observe(self.calibration.scale(raw.first)),
            second.observe(self.calibration.scale(raw.second)),
            third.observe(self.calibration.scale(raw.third)),
        ]
    }

    /// Current averages without recording a new sample
    pub fn levels(&self) -> ChannelLevels {
        let [first, second, third] = &self.channels;
        [first.average(), second.average(), third.average()]
    }

    /// Zero every window
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }
}
