//! Camerica / Codemasters (Mapper 71).
//!
//! A 16 KiB PRG bank is selected by writes at $C000-$FFFF; the last bank is
//! fixed at $C000. Fire Hawk's board variant also decodes $8000-$9FFF, where
//! bit 4 picks a single-screen page. Until that register is written the
//! header's mirroring stays in effect.

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};

#[derive(Debug, Clone, Default)]
pub struct Camerica {
    prg_bank: u8,
    single_screen: Option<Mirroring>,
}

impl Camerica {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for Camerica {
    fn name(&self) -> &'static str {
        "Camerica"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x2000, 0, addr),
            0x8000..=0xBFFF => mem.read_prg(0x4000, self.prg_bank as usize, addr),
            0xC000..=0xFFFF => mem.read_prg(0x4000, mem.last_prg_bank(0x4000), addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => mem.write_chr(0x2000, 0, addr, value),
            0x8000..=0x9FFF => {
                self.single_screen = Some(if value & 0x10 != 0 {
                    Mirroring::SingleScreenUpper
                } else {
                    Mirroring::SingleScreenLower
                });
            }
            0xC000..=0xFFFF => {
                self.prg_bank = value;
                mem.bank_switched(0x8000, 0x4000);
            }
            _ => {}
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        self.single_screen
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
