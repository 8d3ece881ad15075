//! Communication backend and keyboard overlay traits, and the backend set.

use core::future::Future;
use heapless::Vec;

use crate::mode::GameModeId;
use crate::types::{InputState, SharedInputState};

/// Maximum number of backends active at once.
pub const MAX_BACKENDS: usize = 4;

/// Error type for report sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendError {
    /// Transport I/O error.
    Io,
    /// Host not ready (e.g., USB not enumerated).
    NotReady,
    /// Report dropped (e.g., host not polling fast enough).
    Dropped,
    /// Send did not complete within the backend's time bound.
    Timeout,
}

/// Host-facing protocol a backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BackendKind {
    /// USB HID gamepad.
    UsbHid = 0,
    /// Text report lines on a serial port (debug channel).
    SerialReport = 1,
}

impl TryFrom<u8> for BackendKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::UsbHid),
            1 => Ok(Self::SerialReport),
            other => Err(other),
        }
    }
}

/// A component that turns the current input into a protocol report and
/// sends it to a host.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait CommunicationBackend {
    /// Send one report built from [`inputs`](Self::inputs).
    ///
    /// Implementations must bound how long this takes. Failure is reported,
    /// never raised: the caller moves on to the next backend.
    fn send_report(&mut self) -> impl Future<Output = Result<(), BackendError>>;

    /// The input state this backend reports from.
    fn inputs(&self) -> &'static SharedInputState;

    /// Called when the active game mode changes.
    fn set_game_mode(&mut self, _mode: GameModeId) {}

    /// Which protocol this backend speaks.
    fn kind(&self) -> BackendKind;
}

/// Optional overlay that sends a keyboard report derived from the input.
pub trait KeyboardMode {
    /// Send the keyboard report for `inputs`.
    fn send_report(&mut self, inputs: &InputState)
        -> impl Future<Output = Result<(), BackendError>>;
}

/// Keyboard overlay type for boards that have none.
///
/// Uninhabited: `Option<NoKeyboard>` is always `None`.
#[derive(Debug)]
pub enum NoKeyboard {}

impl KeyboardMode for NoKeyboard {
    async fn send_report(&mut self, _inputs: &InputState) -> Result<(), BackendError> {
        match *self {}
    }
}

/// Ordered set of backends, filled once at boot and never resized.
///
/// The first backend is the primary one: its input view is what the
/// secondary core writes and what the keyboard overlay reads.
pub struct BackendSet<B, const N: usize = MAX_BACKENDS> {
    backends: Vec<B, N>,
}

impl<B: CommunicationBackend, const N: usize> BackendSet<B, N> {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Add a backend during boot. Returns it back if the set is full.
    pub fn push(&mut self, backend: B) -> Result<(), B> {
        self.backends.push(backend)
    }

    /// Number of backends.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// `true` if no backend was constructed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// The primary backend, if any.
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Option<&B> {
        self.backends.first()
    }

    /// Backends in boot order.
    pub fn iter(&self) -> core::slice::Iter<'_, B> {
        self.backends.iter()
    }

    /// Backends in boot order, mutably.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, B> {
        self.backends.iter_mut()
    }
}

impl<B: CommunicationBackend, const N: usize> Default for BackendSet<B, N> {
    fn default() -> Self {
        Self::new()
    }
}
