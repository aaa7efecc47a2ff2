/*!
Mapper 34: two unrelated boards share the id.

- BNROM: any write to $8000-$FFFF selects a 32 KiB PRG bank. CHR is 8 KiB
  (usually RAM).
- NINA-001: recognised by more than 8 KiB of CHR. Registers overlay the top
  of save RAM: $7FFD selects the 32 KiB PRG bank (bit 0), $7FFE the 4 KiB CHR
  bank at $0000 and $7FFF the 4 KiB CHR bank at $1000. The written byte also
  lands in save RAM.
*/

use crate::mapper::{Board, CartMemory, open_bus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Bnrom,
    Nina001,
}

#[derive(Debug, Clone)]
pub struct Bnrom {
    variant: Variant,
    prg_bank: u8,
    chr_banks: [u8; 2],
}

impl Bnrom {
    pub fn new(mem: &CartMemory) -> Self {
        let variant = if mem.chr_len() > 0x2000 {
            Variant::Nina001
        } else {
            Variant::Bnrom
        };
        Self {
            variant,
            prg_bank: 0,
            chr_banks: [0, 1],
        }
    }

    fn chr_bank(&self, addr: u16) -> usize {
        self.chr_banks[((addr >> 12) & 1) as usize] as usize
    }
}

impl Board for Bnrom {
    fn name(&self) -> &'static str {
        match self.variant {
            Variant::Bnrom => "BNROM",
            Variant::Nina001 => "NINA-001",
        }
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match (self.variant, addr) {
            (Variant::Bnrom, 0x0000..=0x1FFF) => mem.read_chr(0x2000, 0, addr),
            (Variant::Nina001, 0x0000..=0x1FFF) => mem.read_chr(0x1000, self.chr_bank(addr), addr),
            (Variant::Nina001, 0x6000..=0x7FFF) => mem.read_save(addr),
            (_, 0x8000..=0xFFFF) => mem.read_prg(0x8000, self.prg_bank as usize, addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match (self.variant, addr) {
            (Variant::Bnrom, 0x0000..=0x1FFF) => mem.write_chr(0x2000, 0, addr, value),
            (Variant::Bnrom, 0x8000..=0xFFFF) => {
                self.prg_bank = value;
                mem.bank_switched(0x8000, 0x8000);
            }
            (Variant::Nina001, 0x0000..=0x1FFF) => {
                let bank = self.chr_bank(addr);
                mem.write_chr(0x1000, bank, addr, value);
            }
            (Variant::Nina001, 0x6000..=0x7FFF) => {
                mem.write_save(addr, value);
                match addr {
                    0x7FFD => {
                        self.prg_bank = value & 0x01;
                        mem.bank_switched(0x8000, 0x8000);
                    }
                    0x7FFE => {
                        self.chr_banks[0] = value & 0x0F;
                        mem.bank_switched(0x0000, 0x1000);
                    }
                    0x7FFF => {
                        self.chr_banks[1] = value & 0x0F;
                        mem.bank_switched(0x1000, 0x1000);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.prg_bank = 0;
        self.chr_banks = [0, 1];
    }
}
