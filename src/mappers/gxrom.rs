//! GxROM (Mapper 66).
//!
//! - PRG: 32K switchable at $8000-$FFFF (bits 4-5 of the latch)
//! - CHR: 8K switchable (bits 0-1 of the latch)
//! - Mirroring: hard-wired

use crate::mapper::{Board, CartMemory, open_bus};

#[derive(Debug, Clone, Default)]
pub struct Gxrom {
    prg_bank: u8,
    chr_bank: u8,
}

impl Gxrom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for Gxrom {
    fn name(&self) -> &'static str {
        "GxROM"
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
            0x8000..=0xFFFF => {
                self.prg_bank = (value >> 4) & 0x03;
                self.chr_bank = value & 0x03;
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
