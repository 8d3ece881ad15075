//! Text encoding of the serial report line.
//!
//! ```text
//! R<mode>:<buttons>:<lx>:<ly>:<rx>:<ry>:<lt>:<rt>*<crc>\n
//! ```
//!
//! `<mode>` is the [`GameModeId`] code, `<buttons>` six uppercase hex
//! digits, axes and triggers signed/unsigned decimal, `<crc>` two uppercase
//! hex digits of CRC-8/SMBUS over everything before the `*`.

use core::fmt::Write;

use crc::{Crc, CRC_8_SMBUS};
use heapless::String;

use crate::mode::GameModeId;
use crate::types::InputState;

/// Longest line [`encode_report_line`] can produce, with headroom.
pub const REPORT_LINE_CAPACITY: usize = 64;

pub type ReportLine = String<REPORT_LINE_CAPACITY>;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Format one report line for `inputs` in `mode`.
pub fn encode_report_line(
    mode: GameModeId,
    inputs: &InputState,
) -> Result<ReportLine, core::fmt::Error> {
    let mut line = ReportLine::new();
    write!(
        line,
        "R{}:{:06X}:{}:{}:{}:{}:{}:{}",
        mode as u8,
        inputs.buttons.raw(),
        inputs.left_stick.x,
        inputs.left_stick.y,
        inputs.right_stick.x,
        inputs.right_stick.y,
        inputs.left_trigger,
        inputs.right_trigger,
    )?;
    let crc = CRC8.checksum(line.as_bytes());
    writeln!(line, "*{:02X}", crc)?;
    Ok(line)
}
