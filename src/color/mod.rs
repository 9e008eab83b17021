mod hue;
mod intensity;

pub use hue::{hsv_to_intensity, hue_to_intensity};
pub use intensity::{INTENSITY_MAX, Intensity, level_to_intensity, scale_to_intensity};
use smart_leds::RGB8;

/// 8-bit color as requested by remote clients
pub type Rgb = RGB8;
