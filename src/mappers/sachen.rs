/*!
Sachen SA-015 / SA-630 boards built around a 74LS374N (Mappers 150 and 243).

Eight 3-bit registers behind an index/data pair decoded on
`(addr & 0x4101)`: $4100 selects the register, $4101 writes it. Reading the
pair returns the selected register in the low three bits with open bus above.

- R5: 32 KiB PRG bank.
- R2, R4, R6: pieces of the 8 KiB CHR bank; the two ids wire them in a
  different order.
- R7 bits 1-2: mirroring. Mode 0 is L-shaped on 150 and diagonal on 243.
*/

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Sachen150,
    Sachen243,
}

#[derive(Debug, Clone)]
pub struct Sachen {
    layout: Layout,
    index: u8,
    regs: [u8; 8],
}

impl Sachen {
    pub fn new(id: u8) -> Self {
        Self {
            layout: if id == 243 { Layout::Sachen243 } else { Layout::Sachen150 },
            index: 0,
            regs: [0; 8],
        }
    }

    fn chr_bank(&self) -> usize {
        let r = &self.regs;
        let bank = match self.layout {
            Layout::Sachen150 => ((r[2] & 1) << 3) | ((r[4] & 1) << 2) | (r[6] & 3),
            Layout::Sachen243 => ((r[2] & 1) << 3) | ((r[6] & 3) << 1) | (r[4] & 1),
        };
        bank as usize
    }

    #[inline]
    fn is_port(addr: u16) -> bool {
        (0x4100..=0x7FFF).contains(&addr) && addr & 0x4100 == 0x4100
    }
}

impl Board for Sachen {
    fn name(&self) -> &'static str {
        match self.layout {
            Layout::Sachen150 => "Sachen SA-015",
            Layout::Sachen243 => "Sachen SA-020A",
        }
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x2000, self.chr_bank(), addr),
            0x8000..=0xFFFF => mem.read_prg(0x8000, self.regs[5] as usize, addr),
            _ if Self::is_port(addr) => {
                (open_bus(addr) & 0xF8) | (self.regs[self.index as usize] & 0x07)
            }
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                let bank = self.chr_bank();
                mem.write_chr(0x2000, bank, addr, value);
            }
            _ if Self::is_port(addr) => {
                if addr & 0x0001 == 0 {
                    self.index = value & 0x07;
                    return;
                }
                let reg = self.index as usize;
                self.regs[reg] = value & 0x07;
                match reg {
                    5 => mem.bank_switched(0x8000, 0x8000),
                    2 | 4 | 6 => mem.bank_switched(0x0000, 0x2000),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(match (self.regs[7] >> 1) & 0x03 {
            0 if self.layout == Layout::Sachen243 => Mirroring::Diagonal,
            0 => Mirroring::LShaped,
            1 => Mirroring::Horizontal,
            2 => Mirroring::Vertical,
            _ => Mirroring::SingleScreenUpper,
        })
    }

    fn reset(&mut self) {
        self.index = 0;
        self.regs = [0; 8];
    }
}

#[cfg(test)]
mod tests {
    use crate::mapper::Mirroring;
    use crate::mappers::tests::cart;

    fn poke(c: &mut crate::cartridge::Cartridge, reg: u8, value: u8) {
        c.write(0x4100, reg);
        c.write(0x4101, value);
    }

    #[test]
    fn prg_register_and_readback() {
        let mut c = cart(150, 8, 8);
        poke(&mut c, 5, 2);
        assert_eq!(c.read(0x8000), 8);
        assert_eq!(c.read(0x4101), 0x42);
        // Only three bits are stored.
        poke(&mut c, 5, 0xFB);
        assert_eq!(c.read(0x4100), 0x43);
    }

    #[test]
    fn chr_wiring_differs_between_ids() {
        let mut a = cart(150, 8, 8);
        poke(&mut a, 4, 1);
        poke(&mut a, 6, 3);
        assert_eq!(a.read(0x0000), 56);

        let mut b = cart(243, 8, 8);
        poke(&mut b, 4, 1);
        poke(&mut b, 6, 1);
        assert_eq!(b.read(0x0000), 24);
    }

    #[test]
    fn chr_bank_bits_land_in_order() {
        // (register, value, 8 KiB bank) for each single set bit.
        let sa020a = [(4, 1, 1), (6, 1, 2), (6, 2, 4), (2, 1, 8)];
        let sa015 = [(6, 1, 1), (6, 2, 2), (4, 1, 4), (2, 1, 8)];
        for (id, wiring) in [(243u8, sa020a), (150, sa015)] {
            for (reg, value, bank) in wiring {
                let mut c = cart(id, 8, 16);
                poke(&mut c, reg, value);
                assert_eq!(
                    c.read(0x0000),
                    bank * 8,
                    "mapper {id}: R{reg}={value} should select CHR bank {bank}"
                );
            }
        }
    }

    #[test]
    fn mirroring_modes() {
        let mut a = cart(150, 8, 8);
        assert_eq!(a.mirroring(), Mirroring::LShaped);
        poke(&mut a, 7, 2);
        assert_eq!(a.mirroring(), Mirroring::Horizontal);
        poke(&mut a, 7, 4);
        assert_eq!(a.mirroring(), Mirroring::Vertical);
        poke(&mut a, 7, 6);
        assert_eq!(a.mirroring(), Mirroring::SingleScreenUpper);

        let b = cart(243, 8, 8);
        assert_eq!(b.mirroring(), Mirroring::Diagonal);
    }

    #[test]
    fn registers_decode_on_a8_and_a14() {
        let mut c = cart(150, 8, 8);
        c.write(0x4000 + 0x0100, 5);
        c.write(0x5101, 3);
        assert_eq!(c.read(0x8000), 12);
        // A8 clear: ignored.
        c.write(0x4001, 1);
        assert_eq!(c.read(0x8000), 12);
    }
}
