//! AxROM (Mapper 7): 32 KiB PRG switch with single-screen mirroring.
//!
//! - PRG: 32K switchable at $8000-$FFFF (bits 0-2 of the latch)
//! - CHR: 8K, almost always RAM
//! - Mirroring: single-screen, page selected by bit 4

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};

#[derive(Debug, Clone, Default)]
pub struct Axrom {
    latch: u8,
}

impl Axrom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for Axrom {
    fn name(&self) -> &'static str {
        "AxROM"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x2000, 0, addr),
            0x8000..=0xFFFF => mem.read_prg(0x8000, (self.latch & 0x07) as usize, addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => mem.write_chr(0x2000, 0, addr, value),
            0x8000..=0xFFFF => {
                self.latch = value;
                mem.bank_switched(0x8000, 0x8000);
            }
            _ => {}
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(if self.latch & 0x10 != 0 {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        })
    }

    fn reset(&mut self) {
        self.latch = 0;
    }
}
