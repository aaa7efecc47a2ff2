/*!
Jaleco SS88006 (Mapper 18).

Every bank register is written one nibble at a time. A write to the low
nibble address stages the value; the following high nibble write commits
the merged byte, so a bank never shows a half-updated index.

Register map (A0 selects low/high nibble):
- $8000/$8001 PRG at $8000, $8002/$8003 PRG at $A000, $9000/$9001 PRG at
  $C000. $E000-$FFFF is fixed to the last 8 KiB bank.
- $9002: bit 0 enables save RAM, bit 1 allows writes to it.
- $A000-$D003: eight 1 KiB CHR slots, two per 4 KiB page of addresses
  ($x000/$x001 then $x002/$x003).
- $E000-$E003: IRQ reload value, least significant nibble first.
- $F000: acknowledge and copy the reload value into the counter.
- $F001: acknowledge; bit 0 enables counting, bits 1-3 narrow the counter to
  12, 8 or 4 bits (highest set bit wins).
- $F002: mirroring (0 horizontal, 1 vertical, 2/3 single screen).

The counter is clocked once per CPU cycle. Only the selected low bits
decrement; the IRQ fires when they reach zero.
*/

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};
use crate::mappers::irq::{CpuClock, IrqLine};

const PRG_SLOTS: usize = 3;
const CHR_SLOTS: usize = 8;

#[derive(Debug, Clone)]
pub struct Jaleco {
    prg: [u8; PRG_SLOTS],
    chr: [u8; CHR_SLOTS],
    staged_prg: [u8; PRG_SLOTS],
    staged_chr: [u8; CHR_SLOTS],

    ram_enabled: bool,
    ram_writable: bool,
    mirroring: Option<Mirroring>,

    irq_reload: u16,
    irq_counter: u16,
    irq_mask: u16,
    irq_enabled: bool,
    irq: IrqLine,
    clock: CpuClock,
}

impl Default for Jaleco {
    fn default() -> Self {
        Self::new()
    }
}

impl Jaleco {
    pub fn new() -> Self {
        Self {
            prg: [0, 1, 2],
            chr: [0, 1, 2, 3, 4, 5, 6, 7],
            staged_prg: [0; PRG_SLOTS],
            staged_chr: [0; CHR_SLOTS],
            ram_enabled: false,
            ram_writable: false,
            mirroring: None,
            irq_reload: 0,
            irq_counter: 0,
            irq_mask: 0xFFFF,
            irq_enabled: false,
            irq: IrqLine::default(),
            clock: CpuClock::default(),
        }
    }

    fn prg_bank_at(&self, mem: &CartMemory, addr: u16) -> usize {
        match (addr >> 13) & 3 {
            3 => mem.last_prg_bank(0x2000),
            slot => (self.prg[slot as usize] & 0x3F) as usize,
        }
    }

    fn write_prg_nibble(&mut self, mem: &mut CartMemory, slot: usize, high: bool, value: u8) {
        if high {
            self.prg[slot] = (value << 4) | self.staged_prg[slot];
            mem.bank_switched(0x8000 + slot as u16 * 0x2000, 0x2000);
        } else {
            self.staged_prg[slot] = value & 0x0F;
        }
    }

    fn write_chr_nibble(&mut self, mem: &mut CartMemory, slot: usize, high: bool, value: u8) {
        if high {
            self.chr[slot] = (value << 4) | self.staged_chr[slot];
            mem.bank_switched(slot as u16 * 0x400, 0x400);
        } else {
            self.staged_chr[slot] = value & 0x0F;
        }
    }

    fn write_register(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        let high = addr & 1 != 0;
        match addr & 0xF003 {
            0x8000 | 0x8001 => self.write_prg_nibble(mem, 0, high, value),
            0x8002 | 0x8003 => self.write_prg_nibble(mem, 1, high, value),
            0x9000 | 0x9001 => self.write_prg_nibble(mem, 2, high, value),
            0x9002 => {
                self.ram_enabled = value & 0x01 != 0;
                self.ram_writable = value & 0x02 != 0;
            }
            0xA000..=0xD003 => {
                let slot = (((addr - 0xA000) >> 12) * 2 + ((addr >> 1) & 1)) as usize;
                self.write_chr_nibble(mem, slot, high, value);
            }
            0xE000..=0xE003 => {
                let shift = (addr & 3) * 4;
                self.irq_reload =
                    (self.irq_reload & !(0x000F << shift)) | (((value & 0x0F) as u16) << shift);
            }
            0xF000 => {
                self.irq.acknowledge();
                self.irq_counter = self.irq_reload;
            }
            0xF001 => {
                self.irq.acknowledge();
                self.irq_enabled = value & 0x01 != 0;
                self.irq_mask = if value & 0x08 != 0 {
                    0x000F
                } else if value & 0x04 != 0 {
                    0x00FF
                } else if value & 0x02 != 0 {
                    0x0FFF
                } else {
                    0xFFFF
                };
            }
            0xF002 => {
                self.mirroring = Some(match value & 0x03 {
                    0 => Mirroring::Horizontal,
                    1 => Mirroring::Vertical,
                    2 => Mirroring::SingleScreenLower,
                    _ => Mirroring::SingleScreenUpper,
                });
            }
            _ => log::trace!("jaleco: unmapped register write {addr:04X}={value:02X}"),
        }
    }

    fn clock_counter(&mut self) {
        let low = (self.irq_counter & self.irq_mask).wrapping_sub(1) & self.irq_mask;
        self.irq_counter = (self.irq_counter & !self.irq_mask) | low;
        if low == 0 {
            self.irq.raise();
        }
    }
}

impl Board for Jaleco {
    fn name(&self) -> &'static str {
        "Jaleco SS88006"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x400, self.chr[(addr >> 10) as usize] as usize, addr),
            0x6000..=0x7FFF if self.ram_enabled => mem.read_save(addr),
            0x8000..=0xFFFF => mem.read_prg(0x2000, self.prg_bank_at(mem, addr), addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                let bank = self.chr[(addr >> 10) as usize] as usize;
                mem.write_chr(0x400, bank, addr, value);
            }
            0x6000..=0x7FFF => {
                if self.ram_enabled && self.ram_writable {
                    mem.write_save(addr, value);
                }
            }
            0x8000..=0xFFFF => self.write_register(mem, addr, value),
            _ => {}
        }
    }

    fn step_video(&mut self, _scanline: u16, _cycle: u16, _bg: bool, _sprites: bool) {
        if self.clock.tick() && self.irq_enabled {
            self.clock_counter();
        }
    }

    fn take_irq(&mut self) -> bool {
        self.irq.take()
    }

    fn irq_cancelled(&mut self) -> bool {
        self.irq.take_cancel()
    }

    fn mirroring(&self) -> Option<Mirroring> {
        self.mirroring
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use crate::mapper::Mirroring;
    use crate::mappers::tests::cart;

    fn run_dots(c: &mut crate::cartridge::Cartridge, dots: usize) -> usize {
        (0..dots)
            .filter(|_| {
                c.step_video(0, 0, false, false);
                c.take_irq()
            })
            .count()
    }

    #[test]
    fn prg_nibbles_commit_on_high_write() {
        let mut c = cart(18, 8, 8);
        c.write(0x8000, 0x05);
        assert_eq!(c.read(0x8000), 0, "staged nibble must not switch yet");
        c.write(0x8001, 0x00);
        assert_eq!(c.read(0x8000), 5);

        c.write(0x8002, 0x03);
        c.write(0x8003, 0x01);
        assert_eq!(c.read(0xA000), 3); // 0x13 wraps over 16 banks
        assert_eq!(c.read(0xE000), 15);
    }

    #[test]
    fn chr_slots_and_mirroring() {
        let mut c = cart(18, 8, 8);
        c.write(0xD002, 0x04);
        c.write(0xD003, 0x02);
        assert_eq!(c.read(0x1C00), 36);
        c.write(0xA000, 0x09);
        c.write(0xA001, 0x00);
        assert_eq!(c.read(0x0000), 9);

        assert_eq!(c.mirroring(), Mirroring::Horizontal);
        c.write(0xF002, 1);
        assert_eq!(c.mirroring(), Mirroring::Vertical);
        c.write(0xF002, 3);
        assert_eq!(c.mirroring(), Mirroring::SingleScreenUpper);
    }

    #[test]
    fn save_ram_needs_enable_and_write_bits() {
        let mut c = cart(18, 8, 8);
        c.write(0x6000, 0x11);
        assert_eq!(c.read(0x6000), 0x60);
        c.write(0x9002, 0x01);
        c.write(0x6000, 0x11);
        assert_eq!(c.read(0x6000), 0x00);
        c.write(0x9002, 0x03);
        c.write(0x6000, 0x11);
        assert_eq!(c.read(0x6000), 0x11);
    }

    #[test]
    fn sixteen_bit_counter_fires_after_reload_cycles() {
        let mut c = cart(18, 8, 8);
        c.write(0xE000, 0x05);
        c.write(0xF000, 0);
        c.write(0xF001, 0x01);
        assert_eq!(run_dots(&mut c, 14), 0);
        assert_eq!(run_dots(&mut c, 1), 1);
        c.write(0xF000, 0);
        assert!(c.irq_cancelled());
    }

    #[test]
    fn four_bit_counter_keeps_high_bits() {
        let mut c = cart(18, 8, 8);
        c.write(0xE001, 0x03);
        c.write(0xE002, 0x02);
        c.write(0xE003, 0x01);
        c.write(0xF000, 0);
        c.write(0xF001, 0x09);
        // Low nibble starts at zero: a full 16-count period before the IRQ.
        assert_eq!(run_dots(&mut c, 47), 0);
        assert_eq!(run_dots(&mut c, 1), 1);
        assert_eq!(run_dots(&mut c, 48), 1);
    }

    #[test]
    fn disabled_counter_holds() {
        let mut c = cart(18, 8, 8);
        c.write(0xE000, 0x01);
        c.write(0xF000, 0);
        assert_eq!(run_dots(&mut c, 300), 0);
    }
}
