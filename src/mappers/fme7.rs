/*!
Sunsoft FME-7 (Mapper 69).

$8000-$9FFF latches a command number, $A000-$BFFF supplies its parameter:

| cmd | effect |
|-----|--------|
| 0-7 | 1 KiB CHR bank for slot n |
| 8   | $6000 window: bits 0-5 bank, bit 6 RAM (else ROM), bit 7 RAM enable |
| 9-B | 8 KiB PRG at $8000 / $A000 / $C000 ($E000 fixed to last) |
| C   | mirroring: 0 vertical, 1 horizontal, 2/3 single screen |
| D   | IRQ control: bit 0 IRQ enable, bit 7 counter enable; acknowledges |
| E/F | counter low / high byte |

The 16-bit counter decrements once per CPU cycle while enabled and raises
IRQ when it wraps from $0000 to $FFFF.
*/

use crate::mapper::{Board, CartMemory, Mirroring, open_bus};
use crate::mappers::irq::{CpuClock, IrqLine};

#[derive(Debug, Clone)]
pub struct Fme7 {
    command: u8,
    chr: [u8; 8],
    prg: [u8; 3],
    window_bank: u8,
    window_is_ram: bool,
    ram_enabled: bool,
    mirroring: Option<Mirroring>,

    irq_counter: u16,
    irq_enabled: bool,
    counter_enabled: bool,
    irq: IrqLine,
    clock: CpuClock,
}

impl Default for Fme7 {
    fn default() -> Self {
        Self::new()
    }
}

impl Fme7 {
    pub fn new() -> Self {
        Self {
            command: 0,
            chr: [0, 1, 2, 3, 4, 5, 6, 7],
            prg: [0, 1, 2],
            window_bank: 0,
            window_is_ram: false,
            ram_enabled: false,
            mirroring: None,
            irq_counter: 0,
            irq_enabled: false,
            counter_enabled: false,
            irq: IrqLine::default(),
            clock: CpuClock::default(),
        }
    }

    fn write_parameter(&mut self, mem: &mut CartMemory, value: u8) {
        match self.command {
            0x0..=0x7 => {
                self.chr[self.command as usize] = value;
                mem.bank_switched(self.command as u16 * 0x400, 0x400);
            }
            0x8 => {
                self.window_bank = value & 0x3F;
                self.window_is_ram = value & 0x40 != 0;
                self.ram_enabled = value & 0x80 != 0;
                mem.bank_switched(0x6000, 0x2000);
            }
            0x9..=0xB => {
                let slot = (self.command - 0x9) as usize;
                self.prg[slot] = value & 0x3F;
                mem.bank_switched(0x8000 + slot as u16 * 0x2000, 0x2000);
            }
            0xC => {
                self.mirroring = Some(match value & 0x03 {
                    0 => Mirroring::Vertical,
                    1 => Mirroring::Horizontal,
                    2 => Mirroring::SingleScreenLower,
                    _ => Mirroring::SingleScreenUpper,
                });
            }
            0xD => {
                self.irq.acknowledge();
                self.irq_enabled = value & 0x01 != 0;
                self.counter_enabled = value & 0x80 != 0;
            }
            0xE => self.irq_counter = (self.irq_counter & 0xFF00) | value as u16,
            _ => self.irq_counter = (self.irq_counter & 0x00FF) | ((value as u16) << 8),
        }
    }

    fn prg_bank_at(&self, mem: &CartMemory, addr: u16) -> usize {
        match (addr >> 13) & 3 {
            3 => mem.last_prg_bank(0x2000),
            slot => self.prg[slot as usize] as usize,
        }
    }
}

impl Board for Fme7 {
    fn name(&self) -> &'static str {
        "Sunsoft FME-7"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x400, self.chr[(addr >> 10) as usize] as usize, addr),
            0x6000..=0x7FFF if !self.window_is_ram => {
                mem.read_prg(0x2000, self.window_bank as usize, addr)
            }
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
                if self.window_is_ram && self.ram_enabled {
                    mem.write_save(addr, value);
                }
            }
            0x8000..=0x9FFF => self.command = value & 0x0F,
            0xA000..=0xBFFF => self.write_parameter(mem, value),
            _ => {}
        }
    }

    fn step_video(&mut self, _scanline: u16, _cycle: u16, _bg: bool, _sprites: bool) {
        if !self.clock.tick() || !self.counter_enabled {
            return;
        }
        let previous = self.irq_counter;
        self.irq_counter = previous.wrapping_sub(1);
        if previous == 0 && self.irq_enabled {
            self.irq.raise();
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
