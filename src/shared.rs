//! State shared between the tick loop, the poll path and status readers
//!
//! Every cell is guarded by a critical section and only ever written or read
//! whole, so a reader never sees a half-written value regardless of which
//! task or interrupt it runs in.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;

use crate::config::{DEFAULT_PARTY_HZ, PARTY_HZ_MAX, PARTY_HZ_MIN};
use crate::mode::OperationMode;
use crate::tempo::MusicSnapshot;

/// Shared animation frequency in cycles per second
pub struct PartyHz {
    inner: Mutex<Cell<f32>>,
}

impl PartyHz {
    pub const fn new(hz: f32) -> Self {
        Self {
            inner: Mutex::new(Cell::new(hz)),
        }
    }

    pub fn get(&self) -> f32 {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Store a new frequency clamped to `[PARTY_HZ_MIN, PARTY_HZ_MAX]`
    ///
    /// Non-finite values are ignored. Returns the stored value.
    pub fn set(&self, hz: f32) -> f32 {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            if hz.is_finite() {
                cell.set(hz.clamp(PARTY_HZ_MIN, PARTY_HZ_MAX));
            }
            cell.get()
        })
    }
}

impl Default for PartyHz {
    fn default() -> Self {
        Self::new(DEFAULT_PARTY_HZ)
    }
}

/// Latest music snapshot, replaced atomically
pub struct SnapshotCell {
    inner: Mutex<RefCell<MusicSnapshot>>,
}

impl SnapshotCell {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(MusicSnapshot::empty())),
        }
    }

    /// Copy of the current snapshot
    pub fn get(&self) -> MusicSnapshot {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().clone())
    }

    /// Run `f` against the current snapshot without copying it
    pub fn with<R>(&self, f: impl FnOnce(&MusicSnapshot) -> R) -> R {
        critical_section::with(|cs| f(&self.inner.borrow(cs).borrow()))
    }

    /// Swap in a new snapshot, returning the old one
    pub fn replace(&self, snapshot: MusicSnapshot) -> MusicSnapshot {
        critical_section::with(|cs| self.inner.borrow(cs).replace(snapshot))
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Published copy of the active mode for observers outside the tick loop
pub struct ModeCell {
    inner: Mutex<Cell<OperationMode>>,
}

impl ModeCell {
    pub const fn new(mode: OperationMode) -> Self {
        Self {
            inner: Mutex::new(Cell::new(mode)),
        }
    }

    pub fn get(&self) -> OperationMode {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    pub(crate) fn publish(&self, mode: OperationMode) {
        critical_section::with(|cs| self.inner.borrow(cs).set(mode));
    }
}

/// Everything the tick loop shares with other paths
///
/// Meant to live in a `static`:
///
/// ```ignore
/// static SHARED: SharedState = SharedState::new();
/// ```
pub struct SharedState {
    pub party_hz: PartyHz,
    pub music: SnapshotCell,
    pub mode: ModeCell,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            party_hz: PartyHz::new(DEFAULT_PARTY_HZ),
            music: SnapshotCell::new(),
            mode: ModeCell::new(OperationMode::Remote),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
