//! USB HID gamepad backend.

use controller_core::{
    BackendError, BackendKind, CommunicationBackend, InputState, SharedInputState,
};
use defmt::Format;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::{with_timeout, Duration};
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use static_cell::StaticCell;

pub type UsbDriver = Driver<'static, USB>;

/// Upper bound on one report write, so a host that stops polling cannot
/// stall the tick loop.
pub const SEND_TIMEOUT: Duration = Duration::from_millis(8);

/// USB HID gamepad report.
///
/// This matches [`REPORT_DESCRIPTOR`].
/// Total size: 9 bytes (buttons: 3, sticks: 4x1, triggers: 2x1)
///
/// Note: Stick values are scaled from i16 to i8 for HID compatibility.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
pub struct HidReport {
    /// Button bitfield (low 24 bits used)
    pub buttons: u32,
    pub left_stick_x: i8,
    pub left_stick_y: i8,
    pub right_stick_x: i8,
    pub right_stick_y: i8,
    pub left_trigger: u8,
    pub right_trigger: u8,
}

impl HidReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 9;

    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let buttons = self.buttons.to_le_bytes();
        [
            buttons[0],
            buttons[1],
            buttons[2],
            self.left_stick_x as u8,
            self.left_stick_y as u8,
            self.right_stick_x as u8,
            self.right_stick_y as u8,
            self.left_trigger,
            self.right_trigger,
        ]
    }
}

impl From<&InputState> for HidReport {
    fn from(state: &InputState) -> Self {
        Self {
            buttons: state.buttons.raw() & 0x00FF_FFFF,
            // Scale i16 to i8 by taking the high byte
            left_stick_x: (state.left_stick.x >> 8) as i8,
            left_stick_y: (state.left_stick.y >> 8) as i8,
            right_stick_x: (state.right_stick.x >> 8) as i8,
            right_stick_y: (state.right_stick.y >> 8) as i8,
            left_trigger: state.left_trigger,
            right_trigger: state.right_trigger,
        }
    }
}

/// HID Gamepad Report Descriptor.
///
/// - 24 buttons
/// - 2 analog sticks (X/Y each, signed 8-bit)
/// - 2 triggers (unsigned 8-bit)
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (24 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x18, //   Usage Maximum (Button 24)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x18, //   Report Count (24)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Left Stick ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x95, 0x02, //   Report Count (2)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Right Stick ---
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Triggers ---
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static HID_STATE: StaticCell<State> = StaticCell::new();

/// Sends the shared input state as a HID gamepad report.
pub struct UsbHidBackend {
    writer: HidWriter<'static, UsbDriver, { HidReport::SIZE }>,
    inputs: &'static SharedInputState,
}

impl UsbHidBackend {
    /// Build the USB device with one HID gamepad interface.
    ///
    /// Returns the backend and the device, which must be run by its own
    /// task. May only be called once.
    pub fn configure(
        driver: UsbDriver,
        inputs: &'static SharedInputState,
    ) -> (Self, UsbDevice<'static, UsbDriver>) {
        let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
        usb_config.manufacturer = Some("Rust Controller");
        usb_config.product = Some("Dual-Core Controller Adapter");
        usb_config.serial_number = Some("001");
        usb_config.max_power = 100;
        usb_config.max_packet_size_0 = 64;

        let mut builder = Builder::new(
            driver,
            usb_config,
            CONFIG_DESCRIPTOR.init([0; 256]),
            BOS_DESCRIPTOR.init([0; 256]),
            MSOS_DESCRIPTOR.init([0; 256]),
            CONTROL_BUF.init([0; 64]),
        );

        let hid_config = embassy_usb::class::hid::Config {
            report_descriptor: REPORT_DESCRIPTOR,
            request_handler: None,
            poll_ms: 1,
            max_packet_size: HidReport::SIZE as u16,
            hid_subclass: embassy_usb::class::hid::HidSubclass::No,
            hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
        };
        let writer = HidWriter::new(&mut builder, HID_STATE.init(State::new()), hid_config);

        (Self { writer, inputs }, builder.build())
    }
}

impl CommunicationBackend for UsbHidBackend {
    async fn send_report(&mut self) -> Result<(), BackendError> {
        let report = HidReport::from(&self.inputs.snapshot());
        match with_timeout(SEND_TIMEOUT, self.writer.write(&report.as_bytes())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(EndpointError::Disabled)) => Err(BackendError::NotReady),
            Ok(Err(EndpointError::BufferOverflow)) => Err(BackendError::Io),
            Err(_) => Err(BackendError::Timeout),
        }
    }

    fn inputs(&self) -> &'static SharedInputState {
        self.inputs
    }

    fn kind(&self) -> BackendKind {
        BackendKind::UsbHid
    }
}
