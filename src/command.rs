//! Remote command intake
//!
//! Network handlers run outside the tick loop. They push commands into a
//! bounded queue guarded by a critical section, and the engine drains it at
//! the start of every tick, so a mode change always lands between two
//! ticks and never in the middle of one.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use heapless::Deque;

use crate::color::Rgb;
use crate::mode::OperationMode;
use crate::scene::Scene;

/// Command issued by the remote control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    /// Switch to a mode
    SetMode(OperationMode),
    /// Write a color directly to the output (switches to remote control)
    SetColor(Rgb),
    /// Retune the shared animation frequency and switch to party
    SetPartyHz(f32),
    /// Write a preset directly to the output (switches to remote control)
    Scene(Scene),
    /// Switch off; zeroes the output unless the off policy holds it
    PowerOff,
    /// Advance to the next mode of the profile, like the local button
    CycleMode,
}

/// The queue was full; the command is handed back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueFull(pub RemoteCommand);

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command queue full, dropped {:?}", self.0)
    }
}

/// Bounded command queue shared between handlers and the tick loop
pub struct CommandQueue<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<RemoteCommand, SIZE>>>,
}

impl<const SIZE: usize> CommandQueue<SIZE> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for command producers
    pub const fn sender(&self) -> CommandSender<'_, SIZE> {
        CommandSender { queue: self }
    }

    /// Handle for the engine
    pub const fn receiver(&self) -> CommandReceiver<'_, SIZE> {
        CommandReceiver { queue: self }
    }

    /// Queue a command
    pub fn try_send(&self, command: RemoteCommand) -> Result<(), QueueFull> {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .borrow_mut()
                .push_back(command)
                .map_err(QueueFull)
        })
    }

    /// Take the oldest command
    pub fn try_receive(&self) -> Option<RemoteCommand> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for CommandQueue<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle for a [`CommandQueue`]
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const SIZE: usize> {
    queue: &'a CommandQueue<SIZE>,
}

impl<const SIZE: usize> CommandSender<'_, SIZE> {
    pub fn try_send(&self, command: RemoteCommand) -> Result<(), QueueFull> {
        self.queue.try_send(command)
    }

    /// Queue a mode change by wire name
    ///
    /// Unknown names are rejected here, before they reach the engine.
    pub fn try_send_mode_name(&self, name: &str) -> Result<(), CommandError> {
        let mode = OperationMode::parse_from_str(name).ok_or(CommandError::UnknownMode)?;
        self.queue
            .try_send(RemoteCommand::SetMode(mode))
            .map_err(CommandError::QueueFull)
    }

    /// Queue a scene by name
    pub fn try_send_scene_name(&self, name: &str) -> Result<(), CommandError> {
        let scene = Scene::parse_from_str(name).ok_or(CommandError::UnknownScene)?;
        self.queue
            .try_send(RemoteCommand::Scene(scene))
            .map_err(CommandError::QueueFull)
    }
}

/// Consumer handle for a [`CommandQueue`]
#[derive(Clone, Copy)]
pub struct CommandReceiver<'a, const SIZE: usize> {
    queue: &'a CommandQueue<SIZE>,
}

impl<const SIZE: usize> CommandReceiver<'_, SIZE> {
    pub fn try_receive(&self) -> Option<RemoteCommand> {
        self.queue.try_receive()
    }
}

/// Rejected remote command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandError {
    /// Mode name is not one of the known modes
    UnknownMode,
    /// Scene name is not one of the presets
    UnknownScene,
    QueueFull(QueueFull),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownMode => write!(f, "unknown mode"),
            CommandError::UnknownScene => write!(f, "unknown scene"),
            CommandError::QueueFull(err) => err.fmt(f),
        }
    }
}
