//! Serial report backend: a text line per report over UART TX.
//!
//! Line format is [`controller_core::report_line`]. Intended for a logic
//! analyzer or a USB-serial dongle during bring-up.

use controller_core::{
    encode_report_line, BackendError, BackendKind, CommunicationBackend, GameModeId,
    SharedInputState,
};
use embassy_rp::uart::{Async, UartTx};
use embassy_time::{with_timeout, Duration, Instant};

/// Baud rate of the report UART.
pub const REPORT_BAUD: u32 = 115_200;

/// Minimum time between two lines. One line takes about 4 ms at
/// [`REPORT_BAUD`], so this keeps the UART from becoming the tick bottleneck.
pub const REPORT_INTERVAL: Duration = Duration::from_millis(10);

const WRITE_TIMEOUT: Duration = Duration::from_millis(8);

pub struct SerialReportBackend {
    tx: UartTx<'static, Async>,
    inputs: &'static SharedInputState,
    mode: GameModeId,
    last_sent: Option<Instant>,
}

impl SerialReportBackend {
    #[must_use]
    pub fn new(
        tx: UartTx<'static, Async>,
        inputs: &'static SharedInputState,
        mode: GameModeId,
    ) -> Self {
        Self {
            tx,
            inputs,
            mode,
            last_sent: None,
        }
    }
}

impl CommunicationBackend for SerialReportBackend {
    async fn send_report(&mut self) -> Result<(), BackendError> {
        let now = Instant::now();
        if self
            .last_sent
            .is_some_and(|last| now.duration_since(last) < REPORT_INTERVAL)
        {
            return Ok(());
        }
        self.last_sent = Some(now);

        let line =
            encode_report_line(self.mode, &self.inputs.snapshot()).map_err(|_| BackendError::Io)?;
        match with_timeout(WRITE_TIMEOUT, self.tx.write(line.as_bytes())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(BackendError::Io),
            Err(_) => Err(BackendError::Timeout),
        }
    }

    fn inputs(&self) -> &'static SharedInputState {
        self.inputs
    }

    fn set_game_mode(&mut self, mode: GameModeId) {
        self.mode = mode;
    }

    fn kind(&self) -> BackendKind {
        BackendKind::SerialReport
    }
}
