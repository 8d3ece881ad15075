//! Platform-agnostic core of a dual-core game-controller adapter.
//!
//! This crate holds everything that does not touch hardware: the input
//! model, the config record, mode selection, and the orchestration of the
//! boot sequence, the per-tick report pipeline and the secondary-core
//! input poller. It builds for `no_std` targets and on host for testing.
//!
//! # Overview
//!
//! - [`types`]: Input data ([`InputState`], [`Buttons`]) and the cross-core
//!   [`SharedInputState`]
//! - [`input`]: Input source trait ([`InputSource`])
//! - [`debounce`]: Debounced GPIO buttons ([`DebouncedButtonInput`])
//! - [`backend`]: Report backends ([`CommunicationBackend`], [`BackendSet`])
//! - [`config`]: Adapter configuration and its binary record ([`Config`])
//! - [`persistence`]: Config storage trait ([`Persistence`])
//! - [`mode`]: Game-mode selection ([`ModeSelector`])
//! - [`gate`]: One-shot cross-core publish ([`ReadinessGate`])
//! - [`orchestrator`]: Boot and tick loop ([`BootSequencer`], [`Orchestrator`])
//! - [`poller`]: Secondary-core loop ([`SecondaryPoller`])
//! - [`pinout`]: Board wiring description and its compile-time check
//! - [`report_line`]: Text line sent by the serial report backend
//!
//! # Data flow
//!
//! ```text
//! core1: InputSource --> SecondaryPoller --> SharedInputState
//!                                                 |
//! core0: Orchestrator::tick <---------------------+
//!          |-> ModeSelector
//!          |-> every CommunicationBackend::send_report
//!          '-> KeyboardMode::send_report (optional)
//! ```
//!
//! The secondary core does nothing until the primary core has built its
//! backends and published the primary backend's [`SharedInputState`]
//! through the [`ReadinessGate`].
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through `defmt` and derive `defmt::Format`
//! - **`log`**: Log through the `log` facade instead

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod backend;
pub mod config;
pub mod debounce;
pub mod gate;
pub mod input;
pub mod mode;
pub mod orchestrator;
pub mod persistence;
pub mod pinout;
pub mod poller;
pub mod report_line;
pub mod types;

#[cfg(test)]
mod test_util;

// Re-export main types at crate root
pub use backend::{
    BackendError, BackendKind, BackendSet, CommunicationBackend, KeyboardMode, NoKeyboard,
    MAX_BACKENDS,
};
pub use config::{Config, ConfigError, GameModeConfig, MAX_ENCODED_LEN, MAX_GAME_MODES};
pub use debounce::{Clock, DebouncedButtonInput, DEFAULT_HOLD_OFF_US};
pub use gate::{GateError, ReadinessGate};
pub use input::{InputError, InputSource};
pub use mode::{ActivationBinding, GameModeId, ModeSelection, ModeSelector};
pub use orchestrator::{BootError, BootPlatform, BootSequencer, Orchestrator, TickSummary};
pub use persistence::{Persistence, PersistenceError};
pub use pinout::{board_is_consistent, GpioButtonMapping, Pinout};
pub use poller::SecondaryPoller;
pub use report_line::{encode_report_line, ReportLine, REPORT_LINE_CAPACITY};
pub use types::{AnalogStick, Buttons, InputState, SharedInputState};
