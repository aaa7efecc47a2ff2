/*!
Konami VRC2 / VRC4 (Mappers 21, 22, 23, 25).

The boards only differ in which CPU address lines feed the chip's two
register-select pins. Each write is normalised to `(addr & 0xF000) | pins`
before decoding:

| id | pin 0   | pin 1   | board |
|----|---------|---------|-------|
| 21 | A1 / A6 | A2 / A7 | VRC4a/c |
| 22 | A1      | A0      | VRC2a (CHR index shifted right, no IRQ) |
| 23 | A0 / A2 | A1 / A3 | VRC2b/VRC4e |
| 25 | A1 / A3 | A0 / A2 | VRC4b/d |

Normalised registers:
- $8000 PRG 0, $A000 PRG 1 (8 KiB, 5 bits). $9002 bit 1 swaps PRG 0 with
  the fixed second-last bank at $C000. $E000 is always the last bank.
- $9000 mirroring (0 vertical, 1 horizontal, 2/3 single screen).
- $B000-$E003: eight CHR slots, low nibble on pin 0 clear, high on set.
- $F000/$F001 IRQ latch nibbles, $F002 control, $F003 acknowledge.

The IRQ counter counts up and reloads from the latch when it passes $FF.
In scanline mode a prescaler converts CPU cycles to scanlines (341 dots
split three per cycle); in cycle mode every CPU cycle clocks it.
*/

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};
use crate::mappers::irq::{CpuClock, IrqLine};

const PRESCALER_RELOAD: i16 = 341;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wiring {
    Vrc4ac,
    Vrc2a,
    Vrc2bVrc4e,
    Vrc4bd,
}

impl Wiring {
    fn for_id(id: u8) -> Self {
        match id {
            21 => Wiring::Vrc4ac,
            22 => Wiring::Vrc2a,
            25 => Wiring::Vrc4bd,
            _ => Wiring::Vrc2bVrc4e,
        }
    }

    fn pins(self, addr: u16) -> u16 {
        let bit = |n: u16| (addr >> n) & 1;
        let (p0, p1) = match self {
            Wiring::Vrc4ac => (bit(1) | bit(6), bit(2) | bit(7)),
            Wiring::Vrc2a => (bit(1), bit(0)),
            Wiring::Vrc2bVrc4e => (bit(0) | bit(2), bit(1) | bit(3)),
            Wiring::Vrc4bd => (bit(1) | bit(3), bit(0) | bit(2)),
        };
        p0 | (p1 << 1)
    }
}

#[derive(Debug, Clone)]
pub struct Vrc {
    wiring: Wiring,
    prg: [u8; 2],
    prg_swap: bool,
    chr: [u16; 8],
    mirroring: Option<Mirroring>,

    irq_latch: u8,
    irq_counter: u8,
    irq_enabled: bool,
    irq_enable_after_ack: bool,
    irq_cycle_mode: bool,
    prescaler: i16,
    irq: IrqLine,
    clock: CpuClock,
}

impl Vrc {
    pub fn new(id: u8) -> Self {
        Self {
            wiring: Wiring::for_id(id),
            prg: [0, 1],
            prg_swap: false,
            chr: [0; 8],
            mirroring: None,
            irq_latch: 0,
            irq_counter: 0,
            irq_enabled: false,
            irq_enable_after_ack: false,
            irq_cycle_mode: false,
            prescaler: PRESCALER_RELOAD,
            irq: IrqLine::default(),
            clock: CpuClock::default(),
        }
    }

    fn has_irq(&self) -> bool {
        self.wiring != Wiring::Vrc2a
    }

    fn prg_bank_at(&self, mem: &CartMemory, addr: u16) -> usize {
        let last = mem.last_prg_bank(0x2000);
        let second_last = last.saturating_sub(1);
        match (addr >> 13) & 3 {
            0 if self.prg_swap => second_last,
            0 => self.prg[0] as usize,
            1 => self.prg[1] as usize,
            2 if self.prg_swap => self.prg[0] as usize,
            2 => second_last,
            _ => last,
        }
    }

    fn chr_bank(&self, addr: u16) -> usize {
        let bank = self.chr[(addr >> 10) as usize] as usize;
        match self.wiring {
            Wiring::Vrc2a => bank >> 1,
            _ => bank,
        }
    }

    fn write_register(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        let pins = self.wiring.pins(addr);
        let reg = (addr & 0xF000) | pins;
        match reg {
            0x8000..=0x8003 => {
                self.prg[0] = value & 0x1F;
                mem.bank_switched(0x8000, 0x6000);
            }
            0x9000 | 0x9001 => {
                let mode = if self.wiring == Wiring::Vrc2a { value & 0x01 } else { value & 0x03 };
                self.mirroring = Some(match mode {
                    0 => Mirroring::Vertical,
                    1 => Mirroring::Horizontal,
                    2 => Mirroring::SingleScreenLower,
                    _ => Mirroring::SingleScreenUpper,
                });
            }
            0x9002 | 0x9003 => {
                if self.wiring != Wiring::Vrc2a {
                    self.prg_swap = value & 0x02 != 0;
                    mem.bank_switched(0x8000, 0x6000);
                }
            }
            0xA000..=0xA003 => {
                self.prg[1] = value & 0x1F;
                mem.bank_switched(0xA000, 0x2000);
            }
            0xB000..=0xE003 => {
                let slot = ((((reg >> 12) - 0xB) * 2) + (pins >> 1)) as usize;
                self.chr[slot] = if pins & 1 == 0 {
                    (self.chr[slot] & 0x1F0) | (value & 0x0F) as u16
                } else {
                    (self.chr[slot] & 0x00F) | (((value & 0x1F) as u16) << 4)
                };
                mem.bank_switched(slot as u16 * 0x400, 0x400);
            }
            0xF000..=0xF003 if self.has_irq() => self.write_irq(pins, value),
            _ => log::trace!("vrc: ignored write {addr:04X}={value:02X}"),
        }
    }

    fn write_irq(&mut self, pins: u16, value: u8) {
        match pins {
            0 => self.irq_latch = (self.irq_latch & 0xF0) | (value & 0x0F),
            1 => self.irq_latch = (self.irq_latch & 0x0F) | (value << 4),
            2 => {
                self.irq.acknowledge();
                self.irq_enable_after_ack = value & 0x01 != 0;
                self.irq_enabled = value & 0x02 != 0;
                self.irq_cycle_mode = value & 0x04 != 0;
                if self.irq_enabled {
                    self.irq_counter = self.irq_latch;
                    self.prescaler = PRESCALER_RELOAD;
                }
            }
            _ => {
                self.irq.acknowledge();
                self.irq_enabled = self.irq_enable_after_ack;
            }
        }
    }

    fn clock_counter(&mut self) {
        if self.irq_counter == 0xFF {
            self.irq_counter = self.irq_latch;
            self.irq.raise();
        } else {
            self.irq_counter += 1;
        }
    }
}

impl Board for Vrc {
    fn name(&self) -> &'static str {
        match self.wiring {
            Wiring::Vrc4ac => "Konami VRC4a/c",
            Wiring::Vrc2a => "Konami VRC2a",
            Wiring::Vrc2bVrc4e => "Konami VRC2b/VRC4e",
            Wiring::Vrc4bd => "Konami VRC4b/d",
        }
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x400, self.chr_bank(addr), addr),
            0x6000..=0x7FFF => mem.read_save(addr),
            0x8000..=0xFFFF => mem.read_prg(0x2000, self.prg_bank_at(mem, addr), addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                let bank = self.chr_bank(addr);
                mem.write_chr(0x400, bank, addr, value);
            }
            0x6000..=0x7FFF => mem.write_save(addr, value),
            0x8000..=0xFFFF => self.write_register(mem, addr, value),
            _ => {}
        }
    }

    fn step_video(&mut self, _scanline: u16, _cycle: u16, _bg: bool, _sprites: bool) {
        if !self.clock.tick() || !self.irq_enabled {
            return;
        }
        if self.irq_cycle_mode {
            self.clock_counter();
            return;
        }
        self.prescaler -= 3;
        if self.prescaler <= 0 {
            self.prescaler += PRESCALER_RELOAD;
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
        *self = Self {
            wiring: self.wiring,
            ..Self::new(0)
        };
    }
}
