//! Register-level access to whichever I2C slave is currently selected

use embedded_hal::blocking::i2c::{Write, WriteRead};
use heapless::Vec;

use crate::{console::trace, shared::Error};

/// Data bytes carried by one write frame, behind the register pointer
pub const MAX_FRAME: usize = 64;

pub struct Transport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Transport<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// 7-bit address the next transfer goes to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Point subsequent transfers at another slave, returning the previous one
    pub fn select(&mut self, address: u8) -> u8 {
        core::mem::replace(&mut self.address, address)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Transport<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Burst read starting at `register`
    pub fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<E>> {
        trace!(
            "[TRACE] [RTC] Read {} byte(s) at {} from {}",
            buffer.len(),
            register,
            self.address
        );
        self.i2c
            .write_read(self.address, &[register], buffer)
            .map_err(Error::Transport)
    }

    /// Burst write starting at `register`. Data longer than one frame goes out
    /// as consecutive frames with the pointer advanced to match.
    pub fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Error<E>> {
        trace!(
            "[TRACE] [RTC] Write {} byte(s) at {} to {}",
            data.len(),
            register,
            self.address
        );
        let mut pointer = register;
        for chunk in data.chunks(MAX_FRAME) {
            let mut frame: Vec<u8, { MAX_FRAME + 1 }> = Vec::new();
            // Chunks never exceed the frame capacity
            let _ = frame.push(pointer);
            let _ = frame.extend_from_slice(chunk);
            self.i2c
                .write(self.address, &frame)
                .map_err(Error::Transport)?;
            pointer = pointer.wrapping_add(chunk.len() as u8);
        }
        Ok(())
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, Error<E>> {
        let mut value = [0_u8; 1];
        self.read(register, &mut value)?;
        Ok(value[0])
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        self.write(register, &[value])
    }

    /// Read-modify-write of a single register, returning the value written
    pub fn modify_register<F>(&mut self, register: u8, f: F) -> Result<u8, Error<E>>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = f(self.read_register(register)?);
        self.write_register(register, value)?;
        Ok(value)
    }

    /// Run `f` against another slave and switch back afterwards, even on error
    pub fn with_address<T, F>(&mut self, address: u8, f: F) -> Result<T, Error<E>>
    where
        F: FnOnce(&mut Self) -> Result<T, Error<E>>,
    {
        let previous = self.select(address);
        let result = f(self);
        self.select(previous);
        result
    }
}
