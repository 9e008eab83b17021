use crate::color::Intensity;
use crate::filter::ChannelLevels;

/// Mapping from analog controls (left, middle, right) to output channels
///
/// Named after the output order: `Bgr` sends the left control to blue and
/// the right control to red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ChannelOrder {
    /// Route control levels to output channels
    pub const fn apply(self, levels: ChannelLevels) -> Intensity {
        let [left, middle, right] = levels;
        let (r, g, b) = match self {
            Self::Rgb => (left, middle, right),
            Self::Rbg => (left, right, middle),
            Self::Grb => (middle, left, right),
            Self::Gbr => (right, left, middle),
            Self::Brg => (middle, right, left),
            Self::Bgr => (right, middle, left),
        };
        Intensity::new(r, g, b)
    }
}
