//! Core input types: Buttons, AnalogStick, InputState, SharedInputState.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use portable_atomic::{AtomicI16, AtomicU32, AtomicU8, Ordering};

/// Button state represented as a bitfield, one bit per logical button.
///
/// Buttons are named after their physical position on the controller
/// rather than a console layout, because game modes decide what each
/// position means:
///
/// - `LF*`: left hand fingers
/// - `LT*`: left thumb
/// - `MB*`: middle buttons
/// - `RT*`: right thumb
/// - `RF*`: right hand fingers
///
/// # Example
///
/// ```
/// use controller_core::Buttons;
///
/// let held = Buttons::LT1 | Buttons::MB1;
/// assert!(held.contains(Buttons::LT1));
/// assert!(!held.contains(Buttons::LT1 | Buttons::LF4));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u32);

impl Buttons {
    pub const LF1: Self = Self(1 << 0);
    pub const LF2: Self = Self(1 << 1);
    pub const LF3: Self = Self(1 << 2);
    pub const LF4: Self = Self(1 << 3);
    pub const LF5: Self = Self(1 << 4);

    pub const LT1: Self = Self(1 << 5);
    pub const LT2: Self = Self(1 << 6);

    pub const MB1: Self = Self(1 << 7);
    pub const MB2: Self = Self(1 << 8);
    pub const MB3: Self = Self(1 << 9);

    pub const RT1: Self = Self(1 << 10);
    pub const RT2: Self = Self(1 << 11);
    pub const RT3: Self = Self(1 << 12);
    pub const RT4: Self = Self(1 << 13);
    pub const RT5: Self = Self(1 << 14);

    pub const RF1: Self = Self(1 << 15);
    pub const RF2: Self = Self(1 << 16);
    pub const RF3: Self = Self(1 << 17);
    pub const RF4: Self = Self(1 << 18);
    pub const RF5: Self = Self(1 << 19);
    pub const RF6: Self = Self(1 << 20);
    pub const RF7: Self = Self(1 << 21);
    pub const RF8: Self = Self(1 << 22);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Check if all of the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, buttons: Buttons) -> bool {
        (self.0 & buttons.0) == buttons.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, buttons: Buttons, pressed: bool) {
        if pressed {
            self.0 |= buttons.0;
        } else {
            self.0 &= !buttons.0;
        }
    }

    /// Get the raw bitfield.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bitwise union usable in `const` contexts.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Buttons) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Analog stick with X/Y axes.
///
/// Range: [-32768, 32767] for full precision.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogStick {
    pub x: i16,
    pub y: i16,
}

impl AnalogStick {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub const NEUTRAL: Self = Self { x: 0, y: 0 };
}

/// Snapshot of every logical input for one frame.
///
/// Input sources mutate an `InputState` in place; it is never reallocated.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputState {
    pub buttons: Buttons,
    pub left_stick: AnalogStick,
    pub right_stick: AnalogStick,
    pub left_trigger: u8,
    pub right_trigger: u8,
}

impl InputState {
    /// No buttons pressed, sticks centered, triggers released.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            left_stick: AnalogStick::NEUTRAL,
            right_stick: AnalogStick::NEUTRAL,
            left_trigger: 0,
            right_trigger: 0,
        }
    }
}

/// The live input state shared between the two cores.
///
/// Written by the secondary core, read by the primary core, without a lock.
/// Every field is its own atomic and is valid on its own, so a reader may
/// see fields from two consecutive samples but never a half-written field.
/// The full button word is stored with a single atomic write, so each
/// button bit always changes atomically.
pub struct SharedInputState {
    buttons: AtomicU32,
    left_x: AtomicI16,
    left_y: AtomicI16,
    right_x: AtomicI16,
    right_y: AtomicI16,
    left_trigger: AtomicU8,
    right_trigger: AtomicU8,
}

impl SharedInputState {
    /// Create a neutral shared state. Usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buttons: AtomicU32::new(0),
            left_x: AtomicI16::new(0),
            left_y: AtomicI16::new(0),
            right_x: AtomicI16::new(0),
            right_y: AtomicI16::new(0),
            left_trigger: AtomicU8::new(0),
            right_trigger: AtomicU8::new(0),
        }
    }

    /// Publish a complete sample, one atomic store per field.
    #[inline]
    pub fn store(&self, state: &InputState) {
        self.buttons.store(state.buttons.raw(), Ordering::Relaxed);
        self.left_x.store(state.left_stick.x, Ordering::Relaxed);
        self.left_y.store(state.left_stick.y, Ordering::Relaxed);
        self.right_x.store(state.right_stick.x, Ordering::Relaxed);
        self.right_y.store(state.right_stick.y, Ordering::Relaxed);
        self.left_trigger.store(state.left_trigger, Ordering::Relaxed);
        self.right_trigger.store(state.right_trigger, Ordering::Relaxed);
    }

    /// Read the most recent value of every field.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> InputState {
        InputState {
            buttons: self.buttons(),
            left_stick: AnalogStick::new(
                self.left_x.load(Ordering::Relaxed),
                self.left_y.load(Ordering::Relaxed),
            ),
            right_stick: AnalogStick::new(
                self.right_x.load(Ordering::Relaxed),
                self.right_y.load(Ordering::Relaxed),
            ),
            left_trigger: self.left_trigger.load(Ordering::Relaxed),
            right_trigger: self.right_trigger.load(Ordering::Relaxed),
        }
    }

    /// Read only the button word.
    #[inline]
    #[must_use]
    pub fn buttons(&self) -> Buttons {
        Buttons(self.buttons.load(Ordering::Relaxed))
    }
}

impl Default for SharedInputState {
    fn default() -> Self {
        Self::new()
    }
}
