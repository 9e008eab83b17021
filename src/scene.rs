//! Fixed color presets for remote control

use crate::color::Intensity;

const SCENE_NAME_SUNSET: &str = "sunset";
const SCENE_NAME_OCEAN: &str = "ocean";
const SCENE_NAME_FOREST: &str = "forest";
const SCENE_NAME_FOCUS: &str = "focus";
const SCENE_NAME_CALM: &str = "calm";
const SCENE_NAME_OFF: &str = "off";

/// Named preset written directly to the output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scene {
    Sunset,
    Ocean,
    Forest,
    Focus,
    Calm,
    /// All channels dark
    Off,
}

impl Scene {
    pub const ALL: [Scene; 6] = [
        Scene::Sunset,
        Scene::Ocean,
        Scene::Forest,
        Scene::Focus,
        Scene::Calm,
        Scene::Off,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunset => SCENE_NAME_SUNSET,
            Self::Ocean => SCENE_NAME_OCEAN,
            Self::Forest => SCENE_NAME_FOREST,
            Self::Focus => SCENE_NAME_FOCUS,
            Self::Calm => SCENE_NAME_CALM,
            Self::Off => SCENE_NAME_OFF,
        }
    }

    /// Parse a scene name, ignoring ASCII case
    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|scene| scene.as_str().eq_ignore_ascii_case(s))
    }

    /// Device intensities of the preset
    pub const fn intensity(self) -> Intensity {
        match self {
            Self::Sunset => Intensity::new(1900, 750, 180),
            Self::Ocean => Intensity::new(250, 1100, 1900),
            Self::Forest => Intensity::new(250, 1600, 450),
            Self::Focus => Intensity::new(1450, 1500, 1400),
            Self::Calm => Intensity::new(900, 1050, 1200),
            Self::Off => Intensity::OFF,
        }
    }
}
