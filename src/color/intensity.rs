use super::Rgb;
use crate::math::map_range;

/// Highest device intensity (11-bit PWM)
pub const INTENSITY_MAX: u16 = 2047;

/// Per-channel intensities in device units (`0..=INTENSITY_MAX`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Intensity {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Intensity {
    /// All channels dark
    pub const OFF: Self = Self { r: 0, g: 0, b: 0 };

    /// All channels at full intensity
    pub const FULL: Self = Self::gray(INTENSITY_MAX);

    /// Create a new intensity triple, clamping each channel to the device range
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Same level on every channel
    pub const fn gray(level: u16) -> Self {
        let level = clamp_channel(level);
        Self {
            r: level,
            g: level,
            b: level,
        }
    }

    /// Channels as an array in `[r, g, b]` order
    pub const fn to_array(self) -> [u16; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb> for Intensity {
    fn from(color: Rgb) -> Self {
        scale_to_intensity(i32::from(color.r), i32::from(color.g), i32::from(color.b))
    }
}

const fn clamp_channel(value: u16) -> u16 {
    if value > INTENSITY_MAX { INTENSITY_MAX } else { value }
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
const fn scale_channel(value: i32) -> u16 {
    let value = if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value
    };
    // floor(value * 2047 / 255), never rounded up
    map_range(value, 0, 255, 0, INTENSITY_MAX as i32) as u16
}

/// Convert an 8-bit color into device intensities
///
/// Each channel is clamped to `0..=255` and scaled with floor division:
/// `v * 2047 / 255`. So 255 maps to 2047, 128 to 1027 and 1 to 8.
pub const fn scale_to_intensity(r: i32, g: i32, b: i32) -> Intensity {
    Intensity {
        r: scale_channel(r),
        g: scale_channel(g),
        b: scale_channel(b),
    }
}

/// Convert a brightness fraction (`0.0..=1.0`) into a device level
///
/// Out of range and NaN inputs clamp to the nearest bound (NaN to zero).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
pub fn level_to_intensity(level: f32) -> u16 {
    let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    (level * INTENSITY_MAX as f32) as u16
}
