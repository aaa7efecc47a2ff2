/*
CNROM (Mapper 3).

Characteristics:
- PRG: Fixed (16 KiB mirrored or 32 KiB direct) at $8000-$FFFF.
- CHR: 8 KiB bank selected by any write to $8000-$FFFF.
- Mirroring: hard-wired from the header.
- No IRQ.

The bank value is applied modulo the number of 8 KiB CHR banks, which also
covers oversize homebrew images.
*/

use crate::mapper::{Board, CartMemory, open_bus};

#[derive(Debug, Clone, Default)]
pub struct Cnrom {
    chr_bank: u8,
}

impl Cnrom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for Cnrom {
    fn name(&self) -> &'static str {
        "CNROM"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x2000, self.chr_bank as usize, addr),
            0x8000..=0xFFFF => mem.read_prg(0x8000, 0, addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => mem.write_chr(0x2000, self.chr_bank as usize, addr, value),
            0x8000..=0xFFFF => {
                self.chr_bank = value;
                mem.bank_switched(0x0000, 0x2000);
                log::trace!("cnrom: CHR bank {value}");
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.chr_bank = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::mappers::tests::cart;

    #[test]
    fn prg_16k_is_mirrored() {
        let mut c = cart(3, 1, 4);
        assert_eq!(c.read(0x8000), c.read(0xC000));
        assert_eq!(c.read(0xBFFF), 1);
    }

    #[test]
    fn chr_bank_switch_and_wrap() {
        let mut c = cart(3, 2, 4);
        assert_eq!(c.read(0x0000), 0);
        c.write(0x8000, 2);
        assert_eq!(c.read(0x0000), 16);
        assert_eq!(c.read(0x1FFF), 23);
        c.write(0xFFFF, 5);
        assert_eq!(c.read(0x0000), 8);
    }

    #[test]
    fn chr_rom_is_read_only_and_reset_returns_to_bank_zero() {
        let mut c = cart(3, 2, 2);
        c.write(0x8000, 1);
        c.write(0x0000, 0xEE);
        assert_eq!(c.read(0x0000), 8);
        c.reset();
        assert_eq!(c.read(0x0000), 0);
    }
}
