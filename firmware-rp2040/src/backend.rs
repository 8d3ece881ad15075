//! The board's backend variants and their construction from the config.

use controller_core::{
    BackendError, BackendKind, BackendSet, CommunicationBackend, Config, GameModeId,
    SharedInputState,
};
use defmt::{info, warn};
use embassy_rp::uart::{Async, UartTx};
use embassy_usb::UsbDevice;

use crate::serial_report::SerialReportBackend;
use crate::usb_hid::{UsbDriver, UsbHidBackend};

/// Every backend this board can run.
pub enum Backend {
    UsbHid(UsbHidBackend),
    SerialReport(SerialReportBackend),
}

impl CommunicationBackend for Backend {
    async fn send_report(&mut self) -> Result<(), BackendError> {
        match self {
            Self::UsbHid(b) => b.send_report().await,
            Self::SerialReport(b) => b.send_report().await,
        }
    }

    fn inputs(&self) -> &'static SharedInputState {
        match self {
            Self::UsbHid(b) => b.inputs(),
            Self::SerialReport(b) => b.inputs(),
        }
    }

    fn set_game_mode(&mut self, mode: GameModeId) {
        match self {
            Self::UsbHid(b) => b.set_game_mode(mode),
            Self::SerialReport(b) => b.set_game_mode(mode),
        }
    }

    fn kind(&self) -> BackendKind {
        match self {
            Self::UsbHid(b) => b.kind(),
            Self::SerialReport(b) => b.kind(),
        }
    }
}

/// Hardware the backends are built from.
///
/// Each resource can back at most one backend; it is taken on first use.
pub struct BackendResources {
    pub usb: Option<UsbDriver>,
    pub report_uart: Option<UartTx<'static, Async>>,
    /// Set once the USB backend is built; must be run by the USB task.
    pub usb_device: Option<UsbDevice<'static, UsbDriver>>,
}

/// Build the backends `config` lists, in order.
///
/// Kinds whose hardware is missing or already taken are skipped with a
/// warning. The result may be empty.
pub fn initialize_backends(
    config: &Config,
    inputs: &'static SharedInputState,
    resources: &mut BackendResources,
) -> BackendSet<Backend> {
    let mut backends = BackendSet::new();

    for &kind in &config.backends {
        let backend = match kind {
            BackendKind::UsbHid => resources.usb.take().map(|driver| {
                let (backend, device) = UsbHidBackend::configure(driver, inputs);
                resources.usb_device = Some(device);
                Backend::UsbHid(backend)
            }),
            BackendKind::SerialReport => resources.report_uart.take().map(|tx| {
                Backend::SerialReport(SerialReportBackend::new(tx, inputs, config.default_mode))
            }),
        };

        match backend {
            Some(backend) => {
                if backends.push(backend).is_err() {
                    warn!("Backend set full, dropping {:?}", kind);
                } else {
                    info!("{:?} backend initialized", kind);
                }
            }
            None => warn!("{:?} backend unavailable, skipped", kind),
        }
    }

    backends
}
