//! Config persistence in the last flash sector.

use controller_core::{Config, Persistence, PersistenceError, MAX_ENCODED_LEN};
use defmt::warn;
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE, PAGE_SIZE};
use embassy_rp::peripherals::FLASH;

/// Size of the on-board QSPI flash.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the config sector from the start of flash.
///
/// `memory.x` keeps the program out of this sector.
pub const CONFIG_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

const _: () = assert!(MAX_ENCODED_LEN <= PAGE_SIZE);

pub type ConfigFlash = Flash<'static, FLASH, Blocking, FLASH_SIZE>;

/// Stores the config record at [`CONFIG_OFFSET`].
///
/// Must only be used while the second core is not running or is parked by
/// the flash driver, since flash is not executable during erase/write.
pub struct FlashPersistence {
    flash: ConfigFlash,
}

impl FlashPersistence {
    #[must_use]
    pub fn new(flash: ConfigFlash) -> Self {
        Self { flash }
    }
}

impl Persistence for FlashPersistence {
    fn load_config(&mut self, out: &mut Config) -> Result<(), PersistenceError> {
        let mut record = [0u8; MAX_ENCODED_LEN];
        self.flash
            .blocking_read(CONFIG_OFFSET, &mut record)
            .map_err(|e| {
                warn!("Flash read failed: {:?}", e);
                PersistenceError::Read
            })?;
        *out = Config::decode(&record)?;
        Ok(())
    }

    fn save_config(&mut self, config: &Config) -> Result<(), PersistenceError> {
        // One full page, erased-state padding after the record.
        let mut page = [0xFFu8; PAGE_SIZE];
        config.encode(&mut page)?;

        self.flash
            .blocking_erase(CONFIG_OFFSET, CONFIG_OFFSET + ERASE_SIZE as u32)
            .map_err(|e| {
                warn!("Flash erase failed: {:?}", e);
                PersistenceError::Erase
            })?;
        self.flash
            .blocking_write(CONFIG_OFFSET, &page)
            .map_err(|e| {
                warn!("Flash write failed: {:?}", e);
                PersistenceError::Write
            })
    }
}
