//! Color Dreams (Mapper 11).
//!
//! One latch at $8000-$FFFF: bits 0-1 select the 32K PRG bank, bits 4-7 the
//! 8K CHR bank. Mirroring is hard-wired.

use crate::mapper::{Board, CartMemory, open_bus};

#[derive(Debug, Clone, Default)]
pub struct ColorDreams {
    prg_bank: u8,
    chr_bank: u8,
}

impl ColorDreams {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for ColorDreams {
    fn name(&self) -> &'static str {
        "Color Dreams"
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
                self.prg_bank = value & 0x03;
                self.chr_bank = value >> 4;
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

#[cfg(test)]
mod tests {
    use crate::mappers::tests::cart;

    #[test]
    fn one_latch_selects_prg_and_chr() {
        let mut c = cart(11, 8, 8);
        c.write(0x8000, 0x32);
        assert_eq!(c.read(0x8000), 8);
        assert_eq!(c.read(0x0000), 24);
        c.write(0x8000, 0x07);
        assert_eq!(c.read(0x8000), 12);
        assert_eq!(c.read(0x0000), 0);
    }
}
