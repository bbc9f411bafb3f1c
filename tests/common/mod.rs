//! A register file standing in for the chips on the bus.
//!
//! Every slave address gets its own 256-byte bank with an auto-incrementing
//! register pointer, the way the real parts behave. Clones share the same
//! registers, so a test can hand one to `Rtc` and inspect the other.

use std::{cell::RefCell, collections::HashMap, convert::Infallible, rc::Rc};

use embedded_hal::blocking::i2c::{Write, WriteRead};

#[derive(Default)]
struct Registers {
    banks: HashMap<u8, [u8; 256]>,
    reads: usize,
    writes: usize,
}

impl Registers {
    fn bank(&mut self, address: u8) -> &mut [u8; 256] {
        self.banks.entry(address).or_insert([0; 256])
    }
}

#[derive(Clone, Default)]
pub struct RegisterBus {
    registers: Rc<RefCell<Registers>>,
}

#[allow(dead_code)]
impl RegisterBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, address: u8, register: u8, value: u8) {
        self.registers.borrow_mut().bank(address)[register as usize] = value;
    }

    pub fn load(&self, address: u8, register: u8, values: &[u8]) {
        for (offset, value) in values.iter().enumerate() {
            self.set(address, register.wrapping_add(offset as u8), *value);
        }
    }

    pub fn get(&self, address: u8, register: u8) -> u8 {
        self.registers.borrow_mut().bank(address)[register as usize]
    }

    /// Write transactions seen so far
    pub fn writes(&self) -> usize {
        self.registers.borrow().writes
    }

    /// Write-read transactions seen so far
    pub fn reads(&self) -> usize {
        self.registers.borrow().reads
    }
}

impl Write for RegisterBus {
    type Error = Infallible;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut registers = self.registers.borrow_mut();
        registers.writes += 1;
        if let Some((pointer, data)) = bytes.split_first() {
            let bank = registers.bank(address);
            for (offset, value) in data.iter().enumerate() {
                bank[pointer.wrapping_add(offset as u8) as usize] = *value;
            }
        }
        Ok(())
    }
}

impl WriteRead for RegisterBus {
    type Error = Infallible;

    fn write_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        let mut registers = self.registers.borrow_mut();
        registers.reads += 1;
        let pointer = bytes.first().copied().unwrap_or(0);
        let bank = registers.bank(address);
        for (offset, value) in buffer.iter_mut().enumerate() {
            *value = bank[pointer.wrapping_add(offset as u8) as usize];
        }
        Ok(())
    }
}
