//! Adapter configuration, its compiled-in default, and its storage record.
//!
//! # Record format
//!
//! All multi-byte fields are little-endian.
//!
//! ```text
//! "CCFG" | format: u8 | default_mode: u8
//!        | mode_count: u8 | (mode: u8, binding: u32) * mode_count
//!        | backend_count: u8 | backend: u8 * backend_count
//!        | crc32: u32
//! ```
//!
//! The CRC (CRC-32/ISO-HDLC) covers every byte before it.

use crc::{Crc, CRC_32_ISO_HDLC};
use heapless::Vec;

use crate::backend::{BackendKind, MAX_BACKENDS};
use crate::mode::GameModeId;
use crate::types::Buttons;

/// Maximum number of game modes in a configuration.
pub const MAX_GAME_MODES: usize = 8;

/// Record magic.
pub const CONFIG_MAGIC: [u8; 4] = *b"CCFG";

/// Current record format revision.
pub const CONFIG_FORMAT: u8 = 1;

const HEADER_LEN: usize = CONFIG_MAGIC.len() + 2;
const MODE_ENTRY_LEN: usize = 5;
const CRC_LEN: usize = 4;

/// Size of the largest possible record.
pub const MAX_ENCODED_LEN: usize =
    HEADER_LEN + 1 + MAX_GAME_MODES * MODE_ENTRY_LEN + 1 + MAX_BACKENDS + CRC_LEN;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// "Mod X" thumb button, used with Start as the shared prefix of every
/// default activation binding.
const MOD_X: Buttons = Buttons::LT1;
const START: Buttons = Buttons::MB1;
const MODE_PREFIX: Buttons = MOD_X.union(START);

/// Error type for decoding or encoding a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage is erased (all bytes 0xFF).
    Empty,
    /// Record does not start with [`CONFIG_MAGIC`].
    BadMagic,
    /// Record was written by an incompatible firmware.
    UnsupportedFormat(u8),
    /// Record ends before its declared length.
    Truncated,
    /// CRC mismatch.
    Checksum,
    /// Unknown game mode code.
    InvalidMode(u8),
    /// Unknown backend code.
    InvalidBackend(u8),
    /// More game modes or backends than fit in memory.
    TooMany,
    /// Output buffer is smaller than the record.
    BufferTooSmall,
}

/// One game mode entry of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameModeConfig {
    pub mode: GameModeId,
    /// Buttons that, held together, activate this mode.
    pub activation_binding: Buttons,
}

impl GameModeConfig {
    #[must_use]
    pub const fn new(mode: GameModeId, activation_binding: Buttons) -> Self {
        Self {
            mode,
            activation_binding,
        }
    }
}

/// In-memory adapter configuration.
///
/// Loaded once at boot and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Mode used when no activation binding has been held yet.
    pub default_mode: GameModeId,
    /// Game modes in priority order.
    pub game_modes: Vec<GameModeConfig, MAX_GAME_MODES>,
    /// Backends to start, in report dispatch order.
    pub backends: Vec<BackendKind, MAX_BACKENDS>,
}

const DEFAULT_GAME_MODES: [GameModeConfig; 5] = [
    GameModeConfig::new(GameModeId::Melee, MODE_PREFIX.union(Buttons::LF4)),
    GameModeConfig::new(GameModeId::ProjectM, MODE_PREFIX.union(Buttons::LF3)),
    GameModeConfig::new(GameModeId::Ultimate, MODE_PREFIX.union(Buttons::LF2)),
    GameModeConfig::new(GameModeId::Fgc, MODE_PREFIX.union(Buttons::LF1)),
    GameModeConfig::new(GameModeId::RivalsOfAether, MODE_PREFIX.union(Buttons::RF1)),
];

const DEFAULT_BACKENDS: [BackendKind; 2] = [BackendKind::UsbHid, BackendKind::SerialReport];

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: GameModeId::Melee,
            game_modes: Vec::from_array(DEFAULT_GAME_MODES),
            backends: Vec::from_array(DEFAULT_BACKENDS),
        }
    }
}

impl Config {
    /// Size of this configuration's record in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN
            + 1
            + self.game_modes.len() * MODE_ENTRY_LEN
            + 1
            + self.backends.len()
            + CRC_LEN
    }

    /// Write the record into `buf`, returning the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        let len = self.encoded_len();
        if buf.len() < len {
            return Err(ConfigError::BufferTooSmall);
        }

        buf[..4].copy_from_slice(&CONFIG_MAGIC);
        buf[4] = CONFIG_FORMAT;
        buf[5] = self.default_mode as u8;

        let mut pos = HEADER_LEN;
        buf[pos] = self.game_modes.len() as u8;
        pos += 1;
        for gm in &self.game_modes {
            buf[pos] = gm.mode as u8;
            buf[pos + 1..pos + MODE_ENTRY_LEN]
                .copy_from_slice(&gm.activation_binding.raw().to_le_bytes());
            pos += MODE_ENTRY_LEN;
        }

        buf[pos] = self.backends.len() as u8;
        pos += 1;
        for kind in &self.backends {
            buf[pos] = *kind as u8;
            pos += 1;
        }

        let crc = CRC32.checksum(&buf[..pos]);
        buf[pos..pos + CRC_LEN].copy_from_slice(&crc.to_le_bytes());
        Ok(len)
    }

    /// Parse a record from the start of `data`. Trailing bytes are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, ConfigError> {
        let head = &data[..data.len().min(MAX_ENCODED_LEN)];
        if !head.is_empty() && head.iter().all(|&b| b == 0xFF) {
            return Err(ConfigError::Empty);
        }
        if data.len() < HEADER_LEN {
            return Err(ConfigError::Truncated);
        }
        if data[..4] != CONFIG_MAGIC {
            return Err(ConfigError::BadMagic);
        }
        if data[4] != CONFIG_FORMAT {
            return Err(ConfigError::UnsupportedFormat(data[4]));
        }

        // Locate the end of the record before trusting any field.
        let mode_count = usize::from(byte_at(data, HEADER_LEN)?);
        if mode_count > MAX_GAME_MODES {
            return Err(ConfigError::TooMany);
        }
        let backends_at = HEADER_LEN + 1 + mode_count * MODE_ENTRY_LEN;
        let backend_count = usize::from(byte_at(data, backends_at)?);
        if backend_count > MAX_BACKENDS {
            return Err(ConfigError::TooMany);
        }
        let crc_at = backends_at + 1 + backend_count;
        if data.len() < crc_at + CRC_LEN {
            return Err(ConfigError::Truncated);
        }
        let mut stored = [0u8; CRC_LEN];
        stored.copy_from_slice(&data[crc_at..crc_at + CRC_LEN]);
        if CRC32.checksum(&data[..crc_at]) != u32::from_le_bytes(stored) {
            return Err(ConfigError::Checksum);
        }

        let default_mode = GameModeId::try_from(data[5]).map_err(ConfigError::InvalidMode)?;

        let mut game_modes = Vec::new();
        for entry in data[HEADER_LEN + 1..backends_at].chunks_exact(MODE_ENTRY_LEN) {
            let mode = GameModeId::try_from(entry[0]).map_err(ConfigError::InvalidMode)?;
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&entry[1..]);
            game_modes
                .push(GameModeConfig::new(mode, Buttons(u32::from_le_bytes(raw))))
                .map_err(|_| ConfigError::TooMany)?;
        }

        let mut backends = Vec::new();
        for &code in &data[backends_at + 1..crc_at] {
            let kind = BackendKind::try_from(code).map_err(ConfigError::InvalidBackend)?;
            backends.push(kind).map_err(|_| ConfigError::TooMany)?;
        }

        Ok(Self {
            default_mode,
            game_modes,
            backends,
        })
    }
}

#[inline]
fn byte_at(data: &[u8], pos: usize) -> Result<u8, ConfigError> {
    data.get(pos).copied().ok_or(ConfigError::Truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(config: &Config) -> ([u8; MAX_ENCODED_LEN], usize) {
        let mut buf = [0u8; MAX_ENCODED_LEN];
        let len = config.encode(&mut buf).unwrap();
        (buf, len)
    }

    #[test]
    fn test_default_config_contents() {
        let config = Config::default();
        assert_eq!(config.default_mode, GameModeId::Melee);
        assert_eq!(config.game_modes.len(), 5);
        assert_eq!(config.game_modes[0].mode, GameModeId::Melee);
        assert!(config.game_modes[0]
            .activation_binding
            .contains(Buttons::LT1 | Buttons::MB1 | Buttons::LF4));
        assert_eq!(
            config.backends.as_slice(),
            &[BackendKind::UsbHid, BackendKind::SerialReport]
        );
    }

    #[test]
    fn test_default_modes_are_all_present_in_order() {
        let modes: heapless::Vec<GameModeId, MAX_GAME_MODES> =
            Config::default().game_modes.iter().map(|m| m.mode).collect();
        assert_eq!(
            modes.as_slice(),
            &[
                GameModeId::Melee,
                GameModeId::ProjectM,
                GameModeId::Ultimate,
                GameModeId::Fgc,
                GameModeId::RivalsOfAether,
            ]
        );
        assert!(Config::default()
            .game_modes
            .iter()
            .all(|m| m.activation_binding.contains(MODE_PREFIX)));
    }

    #[test]
    fn test_default_record_decodes_to_default() {
        let config = Config::default();
        let (buf, len) = encoded(&config);
        assert_eq!(len, config.encoded_len());
        assert_eq!(&buf[..4], b"CCFG");
        assert_eq!(Config::decode(&buf[..len]), Ok(config));
    }

    #[test]
    fn test_largest_record_fits_max_len() {
        let mut config = Config::default();
        while config.game_modes.len() < MAX_GAME_MODES {
            config
                .game_modes
                .push(GameModeConfig::new(GameModeId::Fgc, Buttons::RF8))
                .unwrap();
        }
        while config.backends.len() < MAX_BACKENDS {
            config.backends.push(BackendKind::UsbHid).unwrap();
        }
        assert_eq!(config.encoded_len(), MAX_ENCODED_LEN);
        let (buf, len) = encoded(&config);
        assert_eq!(Config::decode(&buf[..len]), Ok(config));
    }

    #[test]
    fn test_erased_flash_is_empty() {
        let erased = [0xFFu8; 256];
        assert_eq!(Config::decode(&erased), Err(ConfigError::Empty));
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let config = Config::default();
        let mut buf = [0xFFu8; 256];
        let len = config.encode(&mut buf).unwrap();
        assert!(len < buf.len());
        assert_eq!(Config::decode(&buf), Ok(config));
    }

    #[test]
    fn test_bad_magic() {
        let (mut buf, len) = encoded(&Config::default());
        buf[0] = b'X';
        assert_eq!(Config::decode(&buf[..len]), Err(ConfigError::BadMagic));
    }

    #[test]
    fn test_unsupported_format() {
        let (mut buf, len) = encoded(&Config::default());
        buf[4] = 9;
        assert_eq!(
            Config::decode(&buf[..len]),
            Err(ConfigError::UnsupportedFormat(9))
        );
    }

    #[test]
    fn test_corrupted_byte_fails_checksum() {
        let (mut buf, len) = encoded(&Config::default());
        buf[HEADER_LEN + 2] ^= 0x01;
        assert_eq!(Config::decode(&buf[..len]), Err(ConfigError::Checksum));
    }

    #[test]
    fn test_truncated_record() {
        let (buf, len) = encoded(&Config::default());
        assert_eq!(
            Config::decode(&buf[..len - 1]),
            Err(ConfigError::Truncated)
        );
        assert_eq!(Config::decode(&buf[..3]), Err(ConfigError::Truncated));
    }

    #[test]
    fn test_unknown_backend_with_valid_crc() {
        let mut config = Config::default();
        config.backends.clear();
        config.backends.push(BackendKind::UsbHid).unwrap();
        let (mut buf, len) = encoded(&config);

        let crc_at = len - CRC_LEN;
        buf[crc_at - 1] = 0x42;
        let crc = CRC32.checksum(&buf[..crc_at]);
        buf[crc_at..len].copy_from_slice(&crc.to_le_bytes());

        assert_eq!(
            Config::decode(&buf[..len]),
            Err(ConfigError::InvalidBackend(0x42))
        );
    }

    #[test]
    fn test_encode_into_small_buffer() {
        let mut buf = [0u8; 8];
        assert_eq!(
            Config::default().encode(&mut buf),
            Err(ConfigError::BufferTooSmall)
        );
    }
}
