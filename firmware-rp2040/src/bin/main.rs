#![no_std]
#![no_main]

use controller_core::{
    BootSequencer, NoKeyboard, Orchestrator, ReadinessGate, SecondaryPoller, SharedInputState,
};
use controller_firmware_rp2040::board::{self, MAINTENANCE_COMBO};
use controller_firmware_rp2040::serial_report::REPORT_BAUD;
use controller_firmware_rp2040::{
    initialize_backends, Backend, BackendResources, FlashPersistence, RpPlatform, UsbDriver,
};
use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Executor;
use embassy_rp::bind_interrupts;
use embassy_rp::flash::Flash;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::USB;
use embassy_rp::uart::{Config as UartConfig, UartTx};
use embassy_rp::usb::Driver;
use embassy_usb::UsbDevice;
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

const CORE1_STACK_SIZE: usize = 4096;

/// Live input state, written by core 1 and read by every backend.
static SHARED_INPUTS: SharedInputState = SharedInputState::new();

/// Opened by core 0 once the backends exist; core 1 waits on it.
static GATE: ReadinessGate<SharedInputState> = ReadinessGate::new();

static mut CORE1_STACK: Stack<CORE1_STACK_SIZE> = Stack::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    info!("Controller adapter starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let mut platform = RpPlatform::new(Output::new(p.PIN_25, Level::Low));
    // Same order as `board::BUTTON_MAPPINGS`.
    let mut buttons = board::button_input([
        p.PIN_2.into(),  // LF1
        p.PIN_3.into(),  // LF2
        p.PIN_4.into(),  // LF3
        p.PIN_5.into(),  // LF4
        p.PIN_1.into(),  // LF5
        p.PIN_6.into(),  // LT1
        p.PIN_7.into(),  // LT2
        p.PIN_0.into(),  // MB1
        p.PIN_10.into(), // MB2
        p.PIN_11.into(), // MB3
        p.PIN_14.into(), // RT1
        p.PIN_15.into(), // RT2
        p.PIN_13.into(), // RT3
        p.PIN_12.into(), // RT4
        p.PIN_16.into(), // RT5
        p.PIN_26.into(), // RF1
        p.PIN_21.into(), // RF2
        p.PIN_19.into(), // RF3
        p.PIN_17.into(), // RF4
        p.PIN_27.into(), // RF5
        p.PIN_22.into(), // RF6
        p.PIN_20.into(), // RF7
        p.PIN_18.into(), // RF8
    ]);
    let mut storage = FlashPersistence::new(Flash::new_blocking(p.FLASH));

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = REPORT_BAUD;
    let mut resources = BackendResources {
        usb: Some(Driver::new(p.USB, Irqs)),
        report_uart: Some(UartTx::new(p.UART1, p.PIN_8, p.DMA_CH0, uart_config)),
        usb_device: None,
    };

    // Flash is written here at the latest, so boot runs before core 1 starts.
    let boot = BootSequencer::new(&mut buttons, &mut storage, &mut platform, MAINTENANCE_COMBO)
        .run(&GATE, |config| {
            let backends = initialize_backends(config, &SHARED_INPUTS, &mut resources);
            (backends, None::<NoKeyboard>)
        });
    let orchestrator = match boot {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Boot failed: {:?}", e);
            platform.halt();
        }
    };

    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || SecondaryPoller::new(buttons).run(&GATE, cortex_m::asm::nop),
    );

    let usb_device = resources.usb_device.take();
    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        if let Some(device) = usb_device {
            spawner.spawn(usb_task(device).unwrap());
        }
        spawner.spawn(tick_task(orchestrator).unwrap());
        info!("Controller adapter running");
    })
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// Tick task - sends every backend's report, forever.
#[embassy_executor::task]
async fn tick_task(mut orchestrator: Orchestrator<Backend>) {
    orchestrator.run().await
}
