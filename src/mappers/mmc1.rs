//! MMC1 (Mapper 1, SxROM).
//!
//! Implements:
//! - Serial shift register writes (5 bits, LSB first) to control / CHR0 /
//!   CHR1 / PRG registers, selected by the address of the fifth write
//! - PRG banking modes (32K switch, or 16K with fixed first or fixed last)
//! - CHR banking (8K or 4K+4K)
//! - Mirroring control (single-screen lower/upper, vertical, horizontal)
//! - PRG RAM disable (PRG register bit 4)
//! - SUROM: 512 KiB PRG, outer 256 KiB half selected by CHR0 bit 4

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};

const POWER_ON_CONTROL: u8 = 0x0C;
const SUROM_PRG_LEN: usize = 512 * 1024;

#[derive(Debug, Clone)]
pub struct Mmc1 {
    // 5-bit registers
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,

    // Serial latch
    shift_reg: u8,
    shift_count: u8,
}

impl Default for Mmc1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmc1 {
    pub fn new() -> Self {
        Self {
            control: POWER_ON_CONTROL,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            shift_reg: 0,
            shift_count: 0,
        }
    }

    #[inline]
    fn prg_mode(&self) -> u8 {
        (self.control >> 2) & 0x03
    }

    #[inline]
    fn chr_4k_mode(&self) -> bool {
        self.control & 0x10 != 0
    }

    #[inline]
    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0
    }

    /// 16 KiB bank offset of the selected 256 KiB half (SUROM only).
    fn outer_bank(&self, mem: &CartMemory) -> usize {
        if mem.prg_len() >= SUROM_PRG_LEN {
            (self.chr_bank0 & 0x10) as usize
        } else {
            0
        }
    }

    /// 16 KiB bank shown at `addr` ($8000-$FFFF).
    fn prg_bank_at(&self, mem: &CartMemory, addr: u16) -> usize {
        let outer = self.outer_bank(mem);
        let bank = (self.prg_bank & 0x0F) as usize;
        let last = if mem.prg_len() >= SUROM_PRG_LEN {
            outer | 0x0F
        } else {
            mem.last_prg_bank(0x4000)
        };
        let upper = addr >= 0xC000;
        match self.prg_mode() {
            0 | 1 => outer | (bank & !1) | upper as usize,
            2 => {
                if upper {
                    outer | bank
                } else {
                    outer
                }
            }
            _ => {
                if upper {
                    last
                } else {
                    outer | bank
                }
            }
        }
    }

    fn chr_bank_at(&self, addr: u16) -> usize {
        if self.chr_4k_mode() {
            if addr < 0x1000 {
                self.chr_bank0 as usize
            } else {
                self.chr_bank1 as usize
            }
        } else {
            (self.chr_bank0 & 0x1E) as usize | ((addr >> 12) & 1) as usize
        }
    }

    fn commit_register(&mut self, mem: &mut CartMemory, addr: u16, value5: u8) {
        match addr {
            0x8000..=0x9FFF => {
                self.control = value5;
                mem.bank_switched(0x0000, 0x2000);
                mem.bank_switched(0x8000, 0x8000);
            }
            0xA000..=0xBFFF => {
                self.chr_bank0 = value5;
                mem.bank_switched(0x0000, 0x2000);
                if mem.prg_len() >= SUROM_PRG_LEN {
                    mem.bank_switched(0x8000, 0x8000);
                }
            }
            0xC000..=0xDFFF => {
                self.chr_bank1 = value5;
                mem.bank_switched(0x1000, 0x1000);
            }
            _ => {
                self.prg_bank = value5;
                mem.bank_switched(0x8000, 0x8000);
            }
        }
        log::trace!("mmc1: register {:04X} <- {:02X}", addr & 0xE000, value5);
    }

    fn serial_write(&mut self, mem: &mut CartMemory, addr: u16, data: u8) {
        if data & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.control |= POWER_ON_CONTROL;
            mem.bank_switched(0x8000, 0x8000);
            return;
        }
        self.shift_reg |= (data & 1) << self.shift_count;
        self.shift_count += 1;
        if self.shift_count == 5 {
            let value5 = self.shift_reg & 0x1F;
            self.shift_reg = 0;
            self.shift_count = 0;
            self.commit_register(mem, addr, value5);
        }
    }
}

impl Board for Mmc1 {
    fn name(&self) -> &'static str {
        "MMC1"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x1000, self.chr_bank_at(addr), addr),
            0x6000..=0x7FFF if self.prg_ram_enabled() => mem.read_save(addr),
            0x8000..=0xFFFF => mem.read_prg(0x4000, self.prg_bank_at(mem, addr), addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                let bank = self.chr_bank_at(addr);
                mem.write_chr(0x1000, bank, addr, value);
            }
            0x6000..=0x7FFF if self.prg_ram_enabled() => mem.write_save(addr, value),
            0x8000..=0xFFFF => self.serial_write(mem, addr, value),
            _ => {}
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(match self.control & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        })
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::Cartridge;
    use crate::mapper::Mirroring;
    use crate::mappers::tests::cart;

    fn write_serial(c: &mut Cartridge, addr: u16, value5: u8) {
        for i in 0..5 {
            c.write(addr, (value5 >> i) & 1);
        }
    }

    #[test]
    fn power_on_fixes_last_bank_high() {
        let mut c = cart(1, 16, 0);
        assert_eq!(c.mapper_name(), "MMC1");
        // 16 KiB bank n starts with 8 KiB tag 2n.
        assert_eq!(c.read(0x8000), 0);
        assert_eq!(c.read(0xC000), 30);
    }

    #[test]
    fn prg_mode_fix_upper_switch_low() {
        let mut c = cart(1, 8, 1);
        write_serial(&mut c, 0x8000, 0b01111);
        write_serial(&mut c, 0xE000, 5);
        assert_eq!(c.read(0x8000), 10);
        assert_eq!(c.read(0xC000), 14);
    }

    #[test]
    fn prg_mode_fix_first_switch_high() {
        let mut c = cart(1, 8, 1);
        write_serial(&mut c, 0x8000, 0b01011);
        write_serial(&mut c, 0xE000, 3);
        assert_eq!(c.read(0x8000), 0);
        assert_eq!(c.read(0xC000), 6);
    }

    #[test]
    fn prg_32k_mode_ignores_low_bit() {
        let mut c = cart(1, 8, 1);
        write_serial(&mut c, 0x8000, 0b00011);
        write_serial(&mut c, 0xE000, 3);
        assert_eq!(c.read(0x8000), 4);
        assert_eq!(c.read(0xC000), 6);
    }

    #[test]
    fn reset_bit_mid_sequence_discards_shift_and_fixes_last_bank() {
        let mut c = cart(1, 16, 0);
        write_serial(&mut c, 0x8000, 0b00000); // 32K mode
        write_serial(&mut c, 0xE000, 2);
        assert_eq!(c.read(0x8000), 4);
        assert_eq!(c.read(0xC000), 6);

        c.write(0xE000, 1);
        c.write(0xE000, 1);
        c.write(0xE000, 0x80);
        assert_eq!(c.read(0x8000), 4);
        assert_eq!(c.read(0xC000), 30);

        // The two discarded bits must not leak into the next value.
        write_serial(&mut c, 0xE000, 5);
        assert_eq!(c.read(0x8000), 10);
    }

    #[test]
    fn chr_8k_and_4k_modes() {
        let mut c = cart(1, 2, 4);
        write_serial(&mut c, 0x8000, 0b00000);
        write_serial(&mut c, 0xA000, 0b00011);
        // 8K mode drops bit 0: 4K banks 2 and 3 -> 1K tags 8 and 12.
        assert_eq!(c.read(0x0000), 8);
        assert_eq!(c.read(0x1000), 12);

        write_serial(&mut c, 0x8000, 0b10000);
        write_serial(&mut c, 0xA000, 1);
        write_serial(&mut c, 0xC000, 6);
        assert_eq!(c.read(0x0000), 4);
        assert_eq!(c.read(0x1000), 24);
    }

    #[test]
    fn mirroring_follows_control() {
        let mut c = cart(1, 2, 1);
        for (bits, mode) in [
            (0, Mirroring::SingleScreenLower),
            (1, Mirroring::SingleScreenUpper),
            (2, Mirroring::Vertical),
            (3, Mirroring::Horizontal),
        ] {
            write_serial(&mut c, 0x8000, 0b01100 | bits);
            assert_eq!(c.mirroring(), mode);
        }
    }

    #[test]
    fn prg_ram_disable_bit() {
        let mut c = cart(1, 2, 1);
        c.write(0x6000, 0x42);
        assert_eq!(c.read(0x6000), 0x42);
        write_serial(&mut c, 0xE000, 0x10);
        assert_eq!(c.read(0x6000), 0x60);
        c.write(0x6000, 0x99);
        write_serial(&mut c, 0xE000, 0x00);
        assert_eq!(c.read(0x6000), 0x42);
    }

    #[test]
    fn surom_outer_bank_from_chr0() {
        let mut c = cart(1, 32, 0);
        assert_eq!(c.read(0xC000), 30);
        write_serial(&mut c, 0xA000, 0x10);
        assert_eq!(c.read(0x8000), 32);
        assert_eq!(c.read(0xC000), 62);
    }

    #[test]
    fn reset_restores_power_on_layout() {
        let mut c = cart(1, 8, 1);
        write_serial(&mut c, 0x8000, 0b00000);
        write_serial(&mut c, 0xE000, 2);
        c.reset();
        assert_eq!(c.read(0x8000), 0);
        assert_eq!(c.read(0xC000), 14);
    }
}
