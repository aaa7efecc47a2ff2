/*!
MMC3 (Mapper 4, TxROM).

Registers (even/odd address pairs):
- $8000 bank select: bits 0-2 target register, bit 6 PRG mode, bit 7 CHR
  inversion. $8001 bank data.
- $A000 mirroring (bit 0: 0 = vertical, 1 = horizontal). $A001 PRG RAM
  control (bit 7 enable, bit 6 write protect).
- $C000 IRQ latch. $C001 IRQ reload (counter cleared, reloaded on next clock).
- $E000 IRQ disable + acknowledge. $E001 IRQ enable.

Banking:
- R0/R1 select 2 KiB CHR (low bit ignored), R2-R5 select 1 KiB CHR. CHR
  inversion swaps the $0000 and $1000 halves.
- R6/R7 select 8 KiB PRG. Mode 0: R6 at $8000, second-last fixed at $C000.
  Mode 1 swaps those two windows. R7 is always at $A000 and the last bank
  at $E000.

Scanline counter:
- Clocked from `step_video` at dot 260 of scanlines 0-239 and the pre-render
  line 261 while background or sprites are enabled.
- A clock reloads the counter from the latch when it is 0 or a reload is
  pending, then decrements it. Reaching 0 raises IRQ when enabled, so a
  latch of N requests an IRQ every N qualifying scanlines.
*/

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};
use crate::mappers::irq::IrqLine;

pub(crate) const COUNTER_DOT: u16 = 260;
pub(crate) const PRE_RENDER_LINE: u16 = 261;

/// 1 KiB CHR bank shown at `addr` for the MMC3-style register file.
pub(crate) fn chr_bank_1k(regs: &[u8; 8], inverted: bool, addr: u16) -> usize {
    let a = if inverted { addr ^ 0x1000 } else { addr };
    match (a >> 10) & 7 {
        0 => (regs[0] & 0xFE) as usize,
        1 => (regs[0] | 1) as usize,
        2 => (regs[1] & 0xFE) as usize,
        3 => (regs[1] | 1) as usize,
        slot => regs[slot as usize - 2] as usize,
    }
}

#[derive(Debug, Clone)]
pub struct Mmc3 {
    // Bank registers R0..R7
    bank_regs: [u8; 8],
    bank_select: u8,

    mirroring: Mirroring,
    prg_ram_enabled: bool,
    prg_ram_write_protect: bool,

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq: IrqLine,
}

impl Default for Mmc3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmc3 {
    pub fn new() -> Self {
        Self {
            bank_regs: [0, 2, 4, 5, 6, 7, 0, 1],
            bank_select: 0,
            mirroring: Mirroring::Vertical,
            prg_ram_enabled: true,
            prg_ram_write_protect: false,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq: IrqLine::default(),
        }
    }

    #[inline]
    fn prg_swap(&self) -> bool {
        self.bank_select & 0x40 != 0
    }

    #[inline]
    fn chr_inverted(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    fn prg_bank_at(&self, mem: &CartMemory, addr: u16) -> usize {
        let last = mem.last_prg_bank(0x2000);
        let second_last = last.saturating_sub(1);
        let r6 = (self.bank_regs[6] & 0x3F) as usize;
        let r7 = (self.bank_regs[7] & 0x3F) as usize;
        match (addr >> 13) & 3 {
            0 if self.prg_swap() => second_last,
            0 => r6,
            1 => r7,
            2 if self.prg_swap() => r6,
            2 => second_last,
            _ => last,
        }
    }

    fn write_register(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        let odd = addr & 1 != 0;
        match (addr & 0xE000, odd) {
            (0x8000, false) => {
                let changed = (self.bank_select ^ value) & 0xC0;
                self.bank_select = value;
                if changed & 0x40 != 0 {
                    mem.bank_switched(0x8000, 0x6000);
                }
                if changed & 0x80 != 0 {
                    mem.bank_switched(0x0000, 0x2000);
                }
            }
            (0x8000, true) => {
                let target = (self.bank_select & 0x07) as usize;
                self.bank_regs[target] = value;
                if target >= 6 {
                    mem.bank_switched(0x8000, 0x6000);
                } else {
                    mem.bank_switched(0x0000, 0x2000);
                }
                log::trace!("mmc3: R{target} <- {value:02X}");
            }
            (0xA000, false) => {
                self.mirroring = if value & 1 == 0 {
                    Mirroring::Vertical
                } else {
                    Mirroring::Horizontal
                };
            }
            (0xA000, true) => {
                self.prg_ram_enabled = value & 0x80 != 0;
                self.prg_ram_write_protect = value & 0x40 != 0;
            }
            (0xC000, false) => self.irq_latch = value,
            (0xC000, true) => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            (0xE000, false) => {
                self.irq_enabled = false;
                self.irq.acknowledge();
            }
            _ => self.irq_enabled = true,
        }
    }

    fn clock_counter(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        }
        self.irq_counter = self.irq_counter.saturating_sub(1);
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq.raise();
        }
    }
}

impl Board for Mmc3 {
    fn name(&self) -> &'static str {
        "MMC3"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => {
                let bank = chr_bank_1k(&self.bank_regs, self.chr_inverted(), addr);
                mem.read_chr(0x400, bank, addr)
            }
            0x6000..=0x7FFF if self.prg_ram_enabled => mem.read_save(addr),
            0x8000..=0xFFFF => mem.read_prg(0x2000, self.prg_bank_at(mem, addr), addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                let bank = chr_bank_1k(&self.bank_regs, self.chr_inverted(), addr);
                mem.write_chr(0x400, bank, addr, value);
            }
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled && !self.prg_ram_write_protect {
                    mem.write_save(addr, value);
                }
            }
            0x8000..=0xFFFF => self.write_register(mem, addr, value),
            _ => {}
        }
    }

    fn step_video(&mut self, scanline: u16, cycle: u16, bg: bool, sprites: bool) {
        if cycle == COUNTER_DOT && (bg || sprites) && (scanline < 240 || scanline == PRE_RENDER_LINE)
        {
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
        Some(self.mirroring)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
