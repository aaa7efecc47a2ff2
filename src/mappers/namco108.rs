//! Namco 108 / DxROM (Mapper 206).
//!
//! The MMC3 ancestor: the same bank-select/bank-data pair at $8000/$8001,
//! but a fixed layout (no PRG mode, no CHR inversion), no IRQ, no PRG RAM
//! and hard-wired mirroring. PRG registers are 4 bits wide and CHR
//! registers 6 bits.

use crate::mapper::{Board, CartMemory, open_bus};
use crate::mappers::mmc3::chr_bank_1k;

#[derive(Debug, Clone, Default)]
pub struct Namco108 {
    bank_regs: [u8; 8],
    bank_select: u8,
}

impl Namco108 {
    pub fn new() -> Self {
        Self::default()
    }

    fn prg_bank_at(&self, mem: &CartMemory, addr: u16) -> usize {
        let last = mem.last_prg_bank(0x2000);
        match (addr >> 13) & 3 {
            0 => (self.bank_regs[6] & 0x0F) as usize,
            1 => (self.bank_regs[7] & 0x0F) as usize,
            2 => last.saturating_sub(1),
            _ => last,
        }
    }
}

impl Board for Namco108 {
    fn name(&self) -> &'static str {
        "Namco 108"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x400, chr_bank_1k(&self.bank_regs, false, addr), addr),
            0x8000..=0xFFFF => mem.read_prg(0x2000, self.prg_bank_at(mem, addr), addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                let bank = chr_bank_1k(&self.bank_regs, false, addr);
                mem.write_chr(0x400, bank, addr, value);
            }
            0x8000..=0x9FFF if addr & 1 == 0 => self.bank_select = value & 0x07,
            0x8000..=0x9FFF => {
                let target = self.bank_select as usize;
                self.bank_regs[target] = value & 0x3F;
                if target >= 6 {
                    mem.bank_switched(0x8000, 0x4000);
                } else {
                    mem.bank_switched(0x0000, 0x2000);
                }
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
    fn fixed_layout_with_two_switchable_prg_windows() {
        let mut c = cart(206, 4, 4); // 8 x 8K PRG, 32 x 1K CHR
        assert_eq!(c.mapper_name(), "Namco 108");
        c.write(0x8000, 6);
        c.write(0x8001, 3);
        c.write(0x8000, 7);
        c.write(0x8001, 0x12); // 4-bit mask -> 2
        assert_eq!(c.read(0x8000), 3);
        assert_eq!(c.read(0xA000), 2);
        assert_eq!(c.read(0xC000), 6);
        assert_eq!(c.read(0xE000), 7);
    }

    #[test]
    fn chr_registers() {
        let mut c = cart(206, 2, 4);
        c.write(0x8000, 1);
        c.write(0x8001, 7);
        c.write(0x8000, 5);
        c.write(0x8001, 30);
        assert_eq!(c.read(0x0800), 6);
        assert_eq!(c.read(0x0C00), 7);
        assert_eq!(c.read(0x1C00), 30);
    }

    #[test]
    fn upper_registers_are_ignored() {
        let mut c = cart(206, 4, 4);
        c.write(0x8000, 6);
        c.write(0x8001, 1);
        c.write(0xA000, 1);
        c.write(0xC001, 5);
        assert_eq!(c.read(0x8000), 1);
        assert_eq!(c.read(0x6000), 0x60);
    }
}
