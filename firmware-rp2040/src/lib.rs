//! Dual-core game-controller adapter firmware for RP2040.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) based adapter board:
//! 1. Core 0 boots: maintenance check, config load, backend setup
//! 2. Core 1 polls the debounced buttons into the shared input state
//! 3. Core 0 sends every backend's report each tick
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | Buttons  | see [`board::BUTTON_MAPPINGS`] | Active-low, internal pull-ups |
//! | UART1 TX | 8    | Serial report output |
//! | LED      | 25   | On when booted, blinking on fatal error |
//!
//! Hold `RT2` (GPIO 15) while plugging in to reboot into the USB bootloader.
//!
//! # Architecture
//!
//! - **Core 0**: embassy executor with the USB device task and the tick task
//!   running [`controller_core::Orchestrator`]
//! - **Core 1**: a busy loop running [`controller_core::SecondaryPoller`]
//!
//! # Modules
//!
//! - [`board`]: Pin tables and the button input
//! - [`backend`]: [`Backend`] variants and [`initialize_backends`]
//! - [`usb_hid`]: USB HID gamepad backend ([`UsbHidBackend`])
//! - [`serial_report`]: UART text report backend ([`SerialReportBackend`])
//! - [`flash_store`]: Config persistence ([`FlashPersistence`])
//! - [`platform`]: LED and bootloader entry ([`RpPlatform`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

pub mod backend;
pub mod board;
pub mod clock;
pub mod flash_store;
pub mod platform;
pub mod serial_report;
pub mod usb_hid;

pub use backend::{initialize_backends, Backend, BackendResources};
pub use flash_store::FlashPersistence;
pub use platform::RpPlatform;
pub use serial_report::SerialReportBackend;
pub use usb_hid::{UsbDriver, UsbHidBackend};
