//! Operation modes and the per-deployment mode sets
//!
//! Every fixture knows the same closed list of modes, but a deployment
//! profile decides which of them are reachable. Analog builds have the
//! potentiometer modes; music builds trade them for the tempo pulse.

mod channel_order;
mod music;
mod party;

pub use channel_order::ChannelOrder;
pub use music::{MIN_LEVEL, MusicPulse};
pub use party::PartyAnimation;

const MODE_NAME_MANUAL: &str = "rgb";
const MODE_NAME_LOCAL_TEMPO: &str = "ltt";
const MODE_NAME_PARTY: &str = "party";
const MODE_NAME_MUSIC: &str = "music";
const MODE_NAME_REMOTE: &str = "wifi";
const MODE_NAME_OFF: &str = "off";

const MODE_ALIAS_REMOTE: &str = "remote";
const MODE_ALIAS_OFF: &str = "sleep";

const MODE_ID_MANUAL: u8 = 0;
const MODE_ID_LOCAL_TEMPO: u8 = 1;
const MODE_ID_PARTY: u8 = 2;
const MODE_ID_MUSIC: u8 = 3;
const MODE_ID_REMOTE: u8 = 4;
const MODE_ID_OFF: u8 = 5;

/// Mutually exclusive operating states of the fixture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationMode {
    /// Potentiometers drive the channels directly
    Manual = MODE_ID_MANUAL,
    /// Potentiometers feed an external tempo controller
    LocalTempo = MODE_ID_LOCAL_TEMPO,
    /// Hue rotation at the shared frequency
    Party = MODE_ID_PARTY,
    /// Brightness pulse synced to the playback tempo
    Music = MODE_ID_MUSIC,
    /// Output is written by remote commands only
    Remote = MODE_ID_REMOTE,
    /// No color computation
    Off = MODE_ID_OFF,
}

impl OperationMode {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            MODE_ID_MANUAL => Self::Manual,
            MODE_ID_LOCAL_TEMPO => Self::LocalTempo,
            MODE_ID_PARTY => Self::Party,
            MODE_ID_MUSIC => Self::Music,
            MODE_ID_REMOTE => Self::Remote,
            MODE_ID_OFF => Self::Off,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => MODE_NAME_MANUAL,
            Self::LocalTempo => MODE_NAME_LOCAL_TEMPO,
            Self::Party => MODE_NAME_PARTY,
            Self::Music => MODE_NAME_MUSIC,
            Self::Remote => MODE_NAME_REMOTE,
            Self::Off => MODE_NAME_OFF,
        }
    }

    /// Parse a wire name, ignoring ASCII case
    ///
    /// Also accepts the aliases `remote` (for `wifi`) and `sleep` (for `off`).
    pub fn parse_from_str(s: &str) -> Option<Self> {
        const NAMES: [(&str, OperationMode); 8] = [
            (MODE_NAME_MANUAL, OperationMode::Manual),
            (MODE_NAME_LOCAL_TEMPO, OperationMode::LocalTempo),
            (MODE_NAME_PARTY, OperationMode::Party),
            (MODE_NAME_MUSIC, OperationMode::Music),
            (MODE_NAME_REMOTE, OperationMode::Remote),
            (MODE_ALIAS_REMOTE, OperationMode::Remote),
            (MODE_NAME_OFF, OperationMode::Off),
            (MODE_ALIAS_OFF, OperationMode::Off),
        ];
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, mode)| mode)
    }

    /// Returns if the mode reads the analog controls
    pub const fn uses_inputs(self) -> bool {
        matches!(self, Self::Manual | Self::LocalTempo)
    }
}

/// Set of modes available on a deployment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModeProfile {
    /// Fixture with three potentiometers and a local tempo controller
    Analog,
    /// Networked fixture following a playback service
    #[default]
    Music,
}

const ANALOG_MODES: [OperationMode; 5] = [
    OperationMode::Manual,
    OperationMode::LocalTempo,
    OperationMode::Party,
    OperationMode::Remote,
    OperationMode::Off,
];

const MUSIC_MODES: [OperationMode; 4] = [
    OperationMode::Party,
    OperationMode::Music,
    OperationMode::Remote,
    OperationMode::Off,
];

impl ModeProfile {
    /// Modes in button cycling order
    pub const fn modes(self) -> &'static [OperationMode] {
        match self {
            Self::Analog => &ANALOG_MODES,
            Self::Music => &MUSIC_MODES,
        }
    }

    pub fn supports(self, mode: OperationMode) -> bool {
        self.modes().contains(&mode)
    }

    /// Mode the fixture starts in
    pub const fn initial_mode(self) -> OperationMode {
        OperationMode::Remote
    }

    /// Next mode when cycling with the local button
    ///
    /// A mode outside the profile restarts the cycle from the first mode.
    pub fn next_after(self, mode: OperationMode) -> OperationMode {
        let modes = self.modes();
        match modes.iter().position(|&candidate| candidate == mode) {
            Some(index) => modes[(index + 1) % modes.len()],
            None => modes[0],
        }
    }
}
