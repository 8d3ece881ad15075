//! Secondary-core input poller.

use crate::gate::ReadinessGate;
use crate::input::{InputError, InputSource};
use crate::types::{InputState, SharedInputState};

/// Continuously samples an input source into the published shared state.
///
/// Runs alone on the secondary core. It only ever sees the primary
/// backend's [`SharedInputState`] through the gate, never the backend set.
pub struct SecondaryPoller<I> {
    source: I,
    local: InputState,
    last_error: Option<InputError>,
}

impl<I: InputSource> SecondaryPoller<I> {
    #[must_use]
    pub fn new(source: I) -> Self {
        Self {
            source,
            local: InputState::neutral(),
            last_error: None,
        }
    }

    /// Wait for the gate, then poll forever.
    ///
    /// `relax` is called on every spin of the pre-publish busy-wait.
    pub fn run(mut self, gate: &ReadinessGate<SharedInputState>, relax: impl FnMut()) -> ! {
        let shared = gate.wait(relax);
        info!("Input poller started");
        loop {
            let _ = self.poll_once(shared);
        }
    }

    /// Take one sample and store it into `shared`.
    ///
    /// On error nothing is stored, so readers keep the last good sample.
    /// An error is logged once per streak, not on every iteration.
    pub fn poll_once(&mut self, shared: &SharedInputState) -> Result<(), InputError> {
        match self.source.update_inputs(&mut self.local) {
            Ok(()) => {
                if self.last_error.take().is_some() {
                    info!("Input source recovered");
                }
                shared.store(&self.local);
                Ok(())
            }
            Err(e) => {
                if self.last_error.replace(e) != Some(e) {
                    warn!("Input error: {:?}", e);
                }
                Err(e)
            }
        }
    }

    /// The most recent local sample.
    #[must_use]
    pub fn local(&self) -> &InputState {
        &self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{leak_shared, ScriptedInput};
    use crate::types::Buttons;

    #[test]
    fn test_poll_stores_sample() {
        let shared = leak_shared();
        let mut poller = SecondaryPoller::new(ScriptedInput::new(&[Ok(Buttons::RF2)]));

        assert_eq!(poller.poll_once(shared), Ok(()));
        assert_eq!(shared.buttons(), Buttons::RF2);
        assert_eq!(poller.local().buttons, Buttons::RF2);
    }

    #[test]
    fn test_failed_poll_keeps_last_good_sample() {
        let shared = leak_shared();
        let mut poller = SecondaryPoller::new(ScriptedInput::new(&[
            Ok(Buttons::LF3),
            Err(InputError::Io),
            Err(InputError::Io),
            Ok(Buttons::LF4),
        ]));

        assert!(poller.poll_once(shared).is_ok());
        assert_eq!(poller.poll_once(shared), Err(InputError::Io));
        assert_eq!(poller.poll_once(shared), Err(InputError::Io));
        assert_eq!(shared.buttons(), Buttons::LF3);

        assert!(poller.poll_once(shared).is_ok());
        assert_eq!(shared.buttons(), Buttons::LF4);
    }

    #[test]
    fn test_poller_waits_for_gate_then_writes_published_state() {
        extern crate std;
        use std::boxed::Box;
        use std::thread;
        use std::time::{Duration, Instant};

        let gate: &'static ReadinessGate<SharedInputState> =
            Box::leak(Box::new(ReadinessGate::new()));
        let shared = leak_shared();

        thread::spawn(move || {
            SecondaryPoller::new(ScriptedInput::repeating(Buttons::MB3))
                .run(gate, core::hint::spin_loop)
        });

        // Nothing is written before publication.
        thread::sleep(Duration::from_millis(20));
        assert!(shared.buttons().is_empty());

        gate.publish(shared).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while shared.buttons() != Buttons::MB3 {
            assert!(Instant::now() < deadline, "poller never wrote the state");
            thread::yield_now();
        }
    }
}
