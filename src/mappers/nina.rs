//! AVE NINA-03 / NINA-06 (Mapper 79).
//!
//! A latch decoded where `(addr & 0xE100) == 0x4100`: bit 3 selects the
//! 32 KiB PRG bank, bits 0-2 the 8 KiB CHR bank.

use crate::mapper::{Board, CartMemory, open_bus};

#[derive(Debug, Clone, Default)]
pub struct Nina {
    prg_bank: u8,
    chr_bank: u8,
}

impl Nina {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for Nina {
    fn name(&self) -> &'static str {
        "NINA-03/06"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x2000, self.chr_bank as usize, addr),
            0x8000..=0xFFFF => mem.read_prg(0x8000, self.prg_bank as usize, addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => mem.write_chr(0x2000, self.chr_bank as usize, addr, value),
            0x4020..=0x5FFF if addr & 0xE100 == 0x4100 => {
                self.prg_bank = (value >> 3) & 0x01;
                self.chr_bank = value & 0x07;
                mem.bank_switched(0x8000, 0x8000);
                mem.bank_switched(0x0000, 0x2000);
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
