//! Write-once readiness gate between the two cores.

use core::ptr;
use portable_atomic::{AtomicPtr, Ordering};

/// Error type for gate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateError {
    /// The gate was already published; it is set exactly once.
    AlreadyPublished,
}

/// A single nullable reference that signals "boot finished".
///
/// Null until [`publish`](Self::publish) is called, then set for good.
/// The publish is a release store and [`get`](Self::get) an acquire load,
/// so a core that sees the reference also sees every write the publishing
/// core made before publishing it.
pub struct ReadinessGate<T: 'static> {
    ptr: AtomicPtr<T>,
}

impl<T: Sync + 'static> ReadinessGate<T> {
    /// Create an unpublished gate. Usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Publish `value`. Succeeds only the first time.
    pub fn publish(&self, value: &'static T) -> Result<(), GateError> {
        self.ptr
            .compare_exchange(
                ptr::null_mut(),
                ptr::from_ref(value).cast_mut(),
                Ordering::Release,
                Ordering::Relaxed,
            )
            .map(|_| ())
            .map_err(|_| GateError::AlreadyPublished)
    }

    /// The published reference, or `None` before publication.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&'static T> {
        let p = self.ptr.load(Ordering::Acquire);
        // SAFETY: the only non-null value ever stored is a `&'static T`,
        // and `T: Sync` makes sharing it across cores sound.
        unsafe { p.as_ref() }
    }

    /// `true` once published.
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.get().is_some()
    }

    /// Spin until the gate is published, calling `relax` between polls.
    ///
    /// `relax` should be a processor hint such as `nop`/`wfe`, not a sleep.
    pub fn wait(&self, mut relax: impl FnMut()) -> &'static T {
        loop {
            if let Some(value) = self.get() {
                return value;
            }
            relax();
        }
    }
}

impl<T: Sync + 'static> Default for ReadinessGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
