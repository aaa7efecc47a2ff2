//! UxROM (Mapper 2): 16 KiB PRG switch at $8000-$BFFF, last bank fixed at
//! $C000-$FFFF. CHR is usually 8 KiB RAM; mirroring is hard-wired.

use crate::mapper::{Board, CartMemory, open_bus};

#[derive(Debug, Clone, Default)]
pub struct Uxrom {
    prg_bank: u8,
}

impl Uxrom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for Uxrom {
    fn name(&self) -> &'static str {
        "UxROM"
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
            0x8000..=0xFFFF => {
                self.prg_bank = value;
                mem.bank_switched(0x8000, 0x4000);
                log::trace!("uxrom: PRG bank {value}");
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.prg_bank = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::mappers::tests::cart;

    #[test]
    fn switchable_low_window_and_fixed_last_bank() {
        let mut c = cart(2, 8, 0);
        assert_eq!(c.read(0x8000), 0);
        assert_eq!(c.read(0xC000), 14);
        c.write(0x8000, 3);
        assert_eq!(c.read(0x8000), 6);
        assert_eq!(c.read(0xBFFF), 7);
        assert_eq!(c.read(0xFFFF), 15);
    }

    #[test]
    fn bank_wraps_and_chr_ram_is_writable() {
        let mut c = cart(2, 4, 0);
        c.write(0xFFFF, 9);
        assert_eq!(c.read(0x8000), 2);
        c.write(0x0123, 0x77);
        assert_eq!(c.read(0x0123), 0x77);
        assert_eq!(c.read(0x6000), 0x60);
    }
}
