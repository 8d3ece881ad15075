//! Input source trait and error types.

use crate::types::InputState;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Pin or bus read failed.
    Io,
    /// Device did not answer (e.g., an unplugged peripheral).
    Disconnected,
    /// Device answered with data that could not be decoded.
    InvalidData,
}

/// Trait for anything that can populate an [`InputState`].
///
/// This abstracts the source of input data, allowing debounced GPIO
/// buttons, analog peripherals and virtual sources to be used
/// interchangeably.
///
/// # Contract
///
/// - Callable repeatedly, from a tight loop.
/// - No heap allocation after construction.
/// - Completes within a short bounded time; never waits for an event.
/// - Only writes the fields it owns, so several sources can feed one state.
pub trait InputSource {
    /// Update `inputs` in place from the device.
    ///
    /// On error the fields this source owns keep their previous value.
    fn update_inputs(&mut self, inputs: &mut InputState) -> Result<(), InputError>;
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn update_inputs(&mut self, inputs: &mut InputState) -> Result<(), InputError> {
        (**self).update_inputs(inputs)
    }
}
