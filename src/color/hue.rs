use super::{INTENSITY_MAX, Intensity};
use crate::math::wrap_degrees;

/// Convert a fully saturated, full value hue (degrees) into intensities
///
/// The hue may be any real number; it is reduced modulo 360 first.
#[inline]
pub fn hue_to_intensity(hue: f32) -> Intensity {
    hsv_to_intensity(hue, 1.0, 1.0)
}

/// Convert HSV (hue in degrees, saturation and value in `0.0..=1.0`) into
/// device intensities using the six sector decomposition
///
/// Sector `>= 5` (and anything the table does not recognise, such as a hue
/// that rounds up to exactly 360) takes the last branch: red at chroma with
/// blue following `x`. At the 360 boundary `x` is zero, which lands on pure
/// red, the same as sector 0 at its start.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
pub fn hsv_to_intensity(hue: f32, saturation: f32, value: f32) -> Intensity {
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let h = wrap_degrees(hue) / 60.0;
    let c = v * s;
    let x = c * (1.0 - libm::fabsf(libm::fmodf(h, 2.0) - 1.0));
    let m = v - c;

    let (r, g, b) = if (0.0..1.0).contains(&h) {
        (c, x, 0.0)
    } else if (1.0..2.0).contains(&h) {
        (x, c, 0.0)
    } else if (2.0..3.0).contains(&h) {
        (0.0, c, x)
    } else if (3.0..4.0).contains(&h) {
        (0.0, x, c)
    } else if (4.0..5.0).contains(&h) {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let scale = f32::from(INTENSITY_MAX);
    Intensity {
        r: ((r + m) * scale) as u16,
        g: ((g + m) * scale) as u16,
        b: ((b + m) * scale) as u16,
    }
}
