use embassy_time::{Duration, Instant};
use heapless::String;

use super::extract::{FieldSource, extract_float, extract_int, extract_string};

/// Tempo at or below this is treated as unknown
pub const BPM_THRESHOLD: f32 = 0.1;

pub const TITLE_CAPACITY: usize = 64;
pub const ART_CAPACITY: usize = 160;

pub type Title = String<TITLE_CAPACITY>;
pub type ArtUrl = String<ART_CAPACITY>;

const KEY_TRACK: &str = "track";
const KEY_ARTIST: &str = "artist";
const KEY_ALBUM_ART: &str = "albumArt";
const KEY_NEXT_TRACK: &str = "nextTrack";
const KEY_NEXT_ARTIST: &str = "nextArtist";
const KEY_DURATION: &str = "durationMs";
const KEY_PROGRESS: &str = "progressMs";
const KEY_BPM: &str = "bpm";

/// Latest playback metadata
///
/// Built in one piece from a poll response and swapped in whole; it is
/// never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicSnapshot {
    pub track: Title,
    pub artist: Title,
    pub album_art: ArtUrl,
    pub next_track: Title,
    pub next_artist: Title,
    /// Track length, `-1` when the service did not report it
    pub duration_ms: i64,
    /// Playback position, `-1` when the service did not report it
    pub progress_ms: i64,
    /// Beats per minute, `0.0` when unknown
    pub bpm: f32,
    /// When the poll that produced this snapshot completed
    pub updated_at: Instant,
    /// A track is playing
    pub valid: bool,
    /// Fingerprint of the full, untruncated track title
    pub track_id: u32,
}

impl Default for MusicSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl MusicSnapshot {
    /// Snapshot before any successful poll
    pub const fn empty() -> Self {
        Self {
            track: String::new(),
            artist: String::new(),
            album_art: String::new(),
            next_track: String::new(),
            next_artist: String::new(),
            duration_ms: -1,
            progress_ms: -1,
            bpm: 0.0,
            updated_at: Instant::from_ticks(0),
            valid: false,
            track_id: fingerprint(""),
        }
    }

    /// Build a snapshot from response fields
    ///
    /// When the response carries no usable tempo but the same track is
    /// still playing, the previous tempo is carried forward. A new or
    /// unknown track with no tempo gets `0.0`.
    pub fn from_fields<S: FieldSource + ?Sized>(
        fields: &S,
        previous: &MusicSnapshot,
        now: Instant,
    ) -> Self {
        let raw_track = extract_string(fields, KEY_TRACK);
        let track: Title = bounded(raw_track);
        let track_id = fingerprint(raw_track);
        let parsed_bpm = extract_float(fields, KEY_BPM);

        // Titles longer than the capacity share a prefix, so the stored
        // title alone cannot tell them apart
        let same_track = previous.track == track && previous.track_id == track_id;
        let bpm = if parsed_bpm > 0.0 {
            parsed_bpm
        } else if previous.valid && same_track && previous.bpm > BPM_THRESHOLD {
            previous.bpm
        } else {
            0.0
        };

        Self {
            valid: !track.is_empty(),
            track,
            artist: bounded(extract_string(fields, KEY_ARTIST)),
            album_art: bounded(extract_string(fields, KEY_ALBUM_ART)),
            next_track: bounded(extract_string(fields, KEY_NEXT_TRACK)),
            next_artist: bounded(extract_string(fields, KEY_NEXT_ARTIST)),
            duration_ms: extract_int(fields, KEY_DURATION),
            progress_ms: extract_int(fields, KEY_PROGRESS),
            bpm,
            updated_at: now,
            track_id,
        }
    }

    /// Returns if the tempo is usable for retuning
    pub fn has_tempo(&self) -> bool {
        self.bpm > BPM_THRESHOLD
    }

    /// Returns if the snapshot is older than one poll interval plus grace
    pub fn is_stale(&self, now: Instant, poll_interval: Duration, grace: Duration) -> bool {
        now.saturating_duration_since(self.updated_at) > poll_interval + grace
    }
}

/// 32-bit FNV-1a hash
#[allow(clippy::cast_lossless)]
const fn fingerprint(value: &str) -> u32 {
    let bytes = value.as_bytes();
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// Copy `value` into a bounded string, truncating on a char boundary
fn bounded<const N: usize>(value: &str) -> String<N> {
    let mut end = value.len().min(N);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // Cannot fail: `end <= N` bytes
    let _ = out.push_str(&value[..end]);
    out
}
