//! Battery-backed SRAM (DS1307, MCP7941x) and the MCP7941x EEPROM.
//!
//! Offsets are relative to the start of the SRAM window and absolute inside
//! the EEPROM. Accesses that do not fit are skipped without touching the bus.

use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::{console::debug, rtc::Rtc, shared::Error};

pub const UNIQUE_ID_LEN: usize = 8;

impl<I2C, E> Rtc<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn write_sram(&mut self, offset: u8, value: u8) -> Result<(), Error<E>> {
        self.write_sram_bulk(offset, &[value])
    }

    /// Zero when the offset lies outside the window
    pub fn read_sram(&mut self, offset: u8) -> Result<u8, Error<E>> {
        let mut value = [0_u8; 1];
        self.read_sram_bulk(offset, &mut value)?;
        Ok(value[0])
    }

    pub fn write_sram_bulk(&mut self, offset: u8, data: &[u8]) -> Result<(), Error<E>> {
        let Some(window) = self.profile()?.sram else {
            return Ok(());
        };
        let Some(register) = window.locate(offset, data.len()) else {
            return Ok(());
        };
        self.transport
            .with_address(window.address, |transport| transport.write(register, data))
    }

    /// Leaves `buffer` untouched when the range lies outside the window
    pub fn read_sram_bulk(&mut self, offset: u8, buffer: &mut [u8]) -> Result<(), Error<E>> {
        let Some(window) = self.profile()?.sram else {
            return Ok(());
        };
        let Some(register) = window.locate(offset, buffer.len()) else {
            return Ok(());
        };
        self.transport
            .with_address(window.address, |transport| transport.read(register, buffer))
    }

    /// Set the block-protect bits, covering the whole array
    pub fn eeprom_write_protect_on(&mut self) -> Result<(), Error<E>> {
        self.set_eeprom_protection(true)
    }

    pub fn eeprom_write_protect_off(&mut self) -> Result<(), Error<E>> {
        self.set_eeprom_protection(false)
    }

    fn set_eeprom_protection(&mut self, protected: bool) -> Result<(), Error<E>> {
        let Some(eeprom) = self.profile()?.eeprom else {
            return Ok(());
        };
        debug!("[DEBUG] [RTC] EEPROM protection {}", protected);
        self.transport.with_address(eeprom.address, |transport| {
            transport.modify_register(eeprom.status, |value| {
                if protected {
                    value | eeprom.protect_mask
                } else {
                    value & !eeprom.protect_mask
                }
            })
        })?;
        Ok(())
    }

    /// Whether any block-protect bit is set; `false` without an EEPROM
    pub fn eeprom_is_locked(&mut self) -> Result<bool, Error<E>> {
        let Some(eeprom) = self.profile()?.eeprom else {
            return Ok(false);
        };
        let status = self.transport.with_address(eeprom.address, |transport| {
            transport.read_register(eeprom.status)
        })?;
        Ok(status & eeprom.protect_mask != 0)
    }

    /// Write `data` at `address`, one page write per page touched. Returns
    /// `false`, with nothing sent, when the range does not fit the array.
    ///
    /// The chip needs its write cycle time between page writes; pacing them
    /// is up to the bus implementation or the caller.
    pub fn write_eeprom(&mut self, address: u8, data: &[u8]) -> Result<bool, Error<E>> {
        let Some(eeprom) = self.profile()?.eeprom else {
            return Ok(false);
        };
        if !eeprom.contains(address, data.len()) {
            return Ok(false);
        }

        self.transport.with_address(eeprom.address, |transport| {
            let mut pointer = address as usize;
            let mut rest = data;
            while !rest.is_empty() {
                // A page write wraps at the page boundary, so never cross one
                let room = eeprom.page_size - pointer % eeprom.page_size;
                let (page, tail) = rest.split_at(room.min(rest.len()));
                transport.write(pointer as u8, page)?;
                pointer += page.len();
                rest = tail;
            }
            Ok(())
        })?;
        Ok(true)
    }

    /// Returns `false`, leaving `buffer` untouched, when the range does not fit
    pub fn read_eeprom(&mut self, address: u8, buffer: &mut [u8]) -> Result<bool, Error<E>> {
        let Some(eeprom) = self.profile()?.eeprom else {
            return Ok(false);
        };
        if !eeprom.contains(address, buffer.len()) {
            return Ok(false);
        }
        self.transport
            .with_address(eeprom.address, |transport| transport.read(address, buffer))?;
        Ok(true)
    }

    /// Factory or user programmed EUI, `None` without an EEPROM
    pub fn read_unique_id(&mut self) -> Result<Option<[u8; UNIQUE_ID_LEN]>, Error<E>> {
        let Some(eeprom) = self.profile()?.eeprom else {
            return Ok(None);
        };
        let mut id = [0_u8; UNIQUE_ID_LEN];
        self.transport.with_address(eeprom.address, |transport| {
            transport.read(eeprom.unique_id, &mut id)
        })?;
        Ok(Some(id))
    }

    /// Unlock the protected block with the two-byte sequence on the clock
    /// slave, then write the id through the EEPROM slave
    pub fn write_unique_id(&mut self, id: &[u8; UNIQUE_ID_LEN]) -> Result<(), Error<E>> {
        let Some(eeprom) = self.profile()?.eeprom else {
            return Ok(());
        };
        debug!("[DEBUG] [RTC] Writing unique id");
        for key in eeprom.unlock_sequence {
            self.transport.write_register(eeprom.unlock, key)?;
        }
        self.transport.with_address(eeprom.address, |transport| {
            transport.write(eeprom.unique_id, id)
        })
    }
}
