//! Non-volatile configuration storage trait.

use crate::config::{Config, ConfigError};

/// Error type for persistence operations.
///
/// Always recoverable: the boot sequencer falls back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    /// Storage read failed.
    Read,
    /// Storage erase failed.
    Erase,
    /// Storage write failed.
    Write,
    /// Storage was readable but did not hold a valid record.
    Config(ConfigError),
}

impl From<ConfigError> for PersistenceError {
    fn from(err: ConfigError) -> Self {
        PersistenceError::Config(err)
    }
}

/// Loads and saves the adapter configuration.
pub trait Persistence {
    /// Replace `out` with the stored configuration.
    ///
    /// On error `out` is left untouched.
    fn load_config(&mut self, out: &mut Config) -> Result<(), PersistenceError>;

    /// Store `config` so that the next [`load_config`](Self::load_config)
    /// returns an equal value.
    fn save_config(&mut self, config: &Config) -> Result<(), PersistenceError>;
}
