//! Boot sequencing and the per-tick report pipeline.
//!
//! The primary core runs [`BootSequencer::run`] once and then
//! [`Orchestrator::run`] forever. The secondary core runs a
//! [`SecondaryPoller`](crate::poller::SecondaryPoller) that waits on the
//! same [`ReadinessGate`] the boot sequencer publishes.

use crate::backend::{
    BackendError, BackendSet, CommunicationBackend, KeyboardMode, NoKeyboard, MAX_BACKENDS,
};
use crate::config::Config;
use crate::gate::{GateError, ReadinessGate};
use crate::input::{InputError, InputSource};
use crate::mode::{GameModeId, ModeSelector};
use crate::persistence::Persistence;
use crate::types::{Buttons, InputState, SharedInputState};

/// Hooks into the platform that only the boot sequence uses.
pub trait BootPlatform {
    /// Hand control to the recovery/update bootloader. Never returns.
    fn enter_bootloader(&mut self) -> !;

    /// Show that the firmware booted (e.g., turn the status LED on).
    fn indicate_booted(&mut self);
}

/// Error type for boot failures. All of these are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// The first input sample could not be taken, so the maintenance
    /// check could not run.
    InputUnavailable(InputError),
    /// No backend could be constructed.
    NoBackends,
    /// The readiness gate had already been published.
    GateAlreadyPublished,
}

impl From<GateError> for BootError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::AlreadyPublished => BootError::GateAlreadyPublished,
        }
    }
}

/// Runs the one-time boot sequence on the primary core.
pub struct BootSequencer<'a, S, P, H> {
    source: &'a mut S,
    storage: &'a mut P,
    platform: &'a mut H,
    maintenance_combo: Buttons,
}

impl<'a, S: InputSource, P: Persistence, H: BootPlatform> BootSequencer<'a, S, P, H> {
    /// Create a sequencer.
    ///
    /// `maintenance_combo` is the button combination that, held at power-on,
    /// enters the bootloader. An empty combination disables the check.
    pub fn new(
        source: &'a mut S,
        storage: &'a mut P,
        platform: &'a mut H,
        maintenance_combo: Buttons,
    ) -> Self {
        Self {
            source,
            storage,
            platform,
            maintenance_combo,
        }
    }

    /// Boot and return the orchestrator for the tick loop.
    ///
    /// Steps, in order:
    /// 1. Sample the input source.
    /// 2. Enter the bootloader if the maintenance combination is held.
    /// 3. Signal "booted".
    /// 4. Load the config; on failure use the default and save it.
    /// 5. Build the backends with `build`.
    /// 6. Publish the primary backend's input state through `gate`.
    /// 7. Register the mode activation bindings and pick the starting mode
    ///    from the boot sample.
    pub fn run<B, K, F, const N: usize>(
        self,
        gate: &ReadinessGate<SharedInputState>,
        build: F,
    ) -> Result<Orchestrator<B, K, N>, BootError>
    where
        B: CommunicationBackend,
        K: KeyboardMode,
        F: FnOnce(&Config) -> (BackendSet<B, N>, Option<K>),
    {
        let mut sample = InputState::neutral();
        if let Err(e) = self.source.update_inputs(&mut sample) {
            error!("Boot input sample failed: {:?}", e);
            return Err(BootError::InputUnavailable(e));
        }

        // Before anything else, so a bad config can never block recovery.
        if !self.maintenance_combo.is_empty() && sample.buttons.contains(self.maintenance_combo) {
            info!("Maintenance combination held, entering bootloader");
            self.platform.enter_bootloader();
        }

        self.platform.indicate_booted();

        let config = load_or_init_config(self.storage);

        let (mut backends, keyboard) = build(&config);
        let primary = match backends.primary() {
            Some(backend) => backend.inputs(),
            None => {
                error!("No communication backend could be initialized");
                return Err(BootError::NoBackends);
            }
        };
        info!("{} backend(s) initialized", backends.len());

        gate.publish(primary)?;

        let mut selector = ModeSelector::new();
        selector.register_bindings(&config.game_modes);
        let mode = selector.select(&sample, &config).mode;
        info!("Game mode: {:?}", mode);
        for backend in backends.iter_mut() {
            backend.set_game_mode(mode);
        }

        Ok(Orchestrator {
            config,
            backends,
            primary,
            selector,
            keyboard,
            failing: [false; N],
        })
    }
}

/// Load the stored config, or persist and return the default one.
fn load_or_init_config<P: Persistence>(storage: &mut P) -> Config {
    let mut config = Config::default();
    match storage.load_config(&mut config) {
        Ok(()) => {
            info!("Config loaded");
        }
        Err(e) => {
            warn!("Config load failed ({:?}), using defaults", e);
            config = Config::default();
            match storage.save_config(&config) {
                Ok(()) => info!("Default config saved"),
                Err(e) => warn!("Saving default config failed: {:?}", e),
            }
        }
    }
    config
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickSummary {
    /// Active mode during this tick.
    pub mode: GameModeId,
    /// Backends whose report was sent.
    pub sent: usize,
    /// Backends whose send failed.
    pub failed: usize,
    /// Result of the keyboard overlay report, if one is configured.
    pub keyboard: Option<Result<(), BackendError>>,
}

/// The primary core's runtime context: config, backends and mode state.
pub struct Orchestrator<B, K = NoKeyboard, const N: usize = MAX_BACKENDS> {
    config: Config,
    backends: BackendSet<B, N>,
    primary: &'static SharedInputState,
    selector: ModeSelector,
    keyboard: Option<K>,
    /// Per-backend "last send failed" flags, for edge-triggered logging.
    failing: [bool; N],
}

impl<B: CommunicationBackend, K: KeyboardMode, const N: usize> Orchestrator<B, K, N> {
    /// Run the tick pipeline forever.
    pub async fn run(&mut self) -> ! {
        loop {
            self.tick().await;
            // Let the platform's other tasks (e.g. the USB stack) run.
            embassy_futures::yield_now().await;
        }
    }

    /// One pipeline iteration: select mode, send every report, then the
    /// keyboard overlay.
    pub async fn tick(&mut self) -> TickSummary {
        let inputs = self.primary.snapshot();
        let selection = self.selector.select(&inputs, &self.config);
        if selection.changed {
            info!("Game mode: {:?}", selection.mode);
            for backend in self.backends.iter_mut() {
                backend.set_game_mode(selection.mode);
            }
        }

        let mut sent = 0;
        let mut failed = 0;
        for (backend, failing) in self.backends.iter_mut().zip(self.failing.iter_mut()) {
            match backend.send_report().await {
                Ok(()) => {
                    if *failing {
                        info!("{:?} backend recovered", backend.kind());
                    }
                    *failing = false;
                    sent += 1;
                }
                Err(e) => {
                    if !*failing {
                        warn!("{:?} backend send failed: {:?}", backend.kind(), e);
                    }
                    *failing = true;
                    failed += 1;
                }
            }
        }

        let keyboard = match self.keyboard.as_mut() {
            Some(kb) => Some(kb.send_report(&self.primary.snapshot()).await),
            None => None,
        };

        TickSummary {
            mode: selection.mode,
            sent,
            failed,
            keyboard,
        }
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The backend set, in dispatch order.
    #[must_use]
    pub fn backends(&self) -> &BackendSet<B, N> {
        &self.backends
    }

    /// Active mode. Always set once boot has returned.
    #[must_use]
    pub fn mode(&self) -> Option<GameModeId> {
        self.selector.current()
    }
}
