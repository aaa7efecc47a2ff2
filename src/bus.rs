/*!
Bus abstraction the processor executes against, plus a console-style
`SystemBus` that wires RAM, an I/O window, and the cartridge together.

Address map (SystemBus, CPU side):
- $0000-$07FF: 2KB internal RAM
- $0800-$1FFF: Mirrors of $0000-$07FF (mask with & 0x07FF)
- $2000-$401F: I/O window (video/audio/controller registers), forwarded to an
  attached device; open bus when nothing is attached
- $4020-$FFFF: Cartridge (mapper-controlled, including $6000-$7FFF save RAM)

Interrupt lines:
- NMI is requested by the video collaborator through `request_nmi`.
- IRQ edges come from the cartridge mapper (and from an attached I/O device);
  a mapper acknowledge that lands before the processor services the request
  is forwarded as a cancellation.

The processor pulls both through `Bus::take_interrupt` / `Bus::irq_cancelled`
once per step, so no callbacks cross the boundary.
*/

use crate::cartridge::Cartridge;
use crate::cpu::state::Interrupt;
use crate::mapper::{Mirroring, open_bus};

/// Byte-addressed memory/IO space as seen by the processor.
///
/// Implementations decide every address; the processor never assumes RAM.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;

    fn write(&mut self, addr: u16, value: u8);

    /// Little-endian word read (low byte at `addr`).
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Next interrupt edge raised since the last call (consumed once).
    fn take_interrupt(&mut self) -> Interrupt {
        Interrupt::None
    }

    /// True once after a raised IRQ was acknowledged by its source before
    /// the processor serviced it.
    fn irq_cancelled(&mut self) -> bool {
        false
    }
}

pub struct SystemBus {
    ram: [u8; 0x0800],
    io: Option<Box<dyn Bus>>,
    cartridge: Option<Cartridge>,

    nmi_pending: bool,
    irq_pending: bool,
    irq_cancel: bool,
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBus {
    pub fn new() -> Self {
        Self {
            ram: [0; 0x0800],
            io: None,
            cartridge: None,
            nmi_pending: false,
            irq_pending: false,
            irq_cancel: false,
        }
    }

    /// Convenience constructor for the common "console with a cartridge" setup.
    pub fn with_cartridge(cart: Cartridge) -> Self {
        let mut bus = Self::new();
        bus.attach_cartridge(cart);
        bus
    }

    pub fn attach_cartridge(&mut self, cart: Cartridge) {
        log::debug!(
            "bus: cartridge attached (mapper {} {})",
            cart.mapper_id(),
            cart.mapper_name()
        );
        self.cartridge = Some(cart);
        self.irq_pending = false;
        self.irq_cancel = false;
    }

    pub fn detach_cartridge(&mut self) -> Option<Cartridge> {
        self.irq_pending = false;
        self.cartridge.take()
    }

    /// Attach the device answering the $2000-$401F register window.
    pub fn attach_io(&mut self, io: Box<dyn Bus>) {
        self.io = Some(io);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Raise an NMI edge (vertical blank from the video collaborator).
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Forward one video step (one rendered pixel) to the cartridge mapper.
    pub fn step_video(&mut self, scanline: u16, cycle: u16, bg_enabled: bool, sprites_enabled: bool) {
        if let Some(cart) = self.cartridge.as_mut() {
            cart.step_video(scanline, cycle, bg_enabled, sprites_enabled);
        }
        self.poll_cartridge_irq();
    }

    /// Pattern-table read for the video collaborator ($0000-$1FFF).
    pub fn chr_read(&mut self, addr: u16) -> u8 {
        match self.cartridge.as_mut() {
            Some(cart) => cart.read(addr & 0x1FFF),
            None => open_bus(addr),
        }
    }

    /// Pattern-table write for the video collaborator ($0000-$1FFF).
    pub fn chr_write(&mut self, addr: u16, value: u8) {
        if let Some(cart) = self.cartridge.as_mut() {
            cart.write(addr & 0x1FFF, value);
        }
    }

    /// Nametable arrangement currently selected by the cartridge.
    pub fn mirroring(&self) -> Option<Mirroring> {
        self.cartridge.as_ref().map(Cartridge::mirroring)
    }

    fn poll_cartridge_irq(&mut self) {
        let Some(cart) = self.cartridge.as_mut() else {
            return;
        };
        if cart.irq_cancelled() {
            self.irq_pending = false;
            self.irq_cancel = true;
        }
        if cart.take_irq() {
            self.irq_pending = true;
        }
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x401F => match self.io.as_mut() {
                Some(io) => io.read(addr),
                None => open_bus(addr),
            },
            _ => match self.cartridge.as_mut() {
                Some(cart) => cart.read(addr),
                None => open_bus(addr),
            },
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x401F => {
                if let Some(io) = self.io.as_mut() {
                    io.write(addr, value);
                }
            }
            _ => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.write(addr, value);
                }
                self.poll_cartridge_irq();
            }
        }
    }

    fn take_interrupt(&mut self) -> Interrupt {
        if std::mem::take(&mut self.nmi_pending) {
            return Interrupt::Nmi;
        }
        if std::mem::take(&mut self.irq_pending) {
            return Interrupt::Irq;
        }
        match self.io.as_mut() {
            Some(io) => io.take_interrupt(),
            None => Interrupt::None,
        }
    }

    fn irq_cancelled(&mut self) -> bool {
        let io_cancel = self.io.as_mut().is_some_and(|io| io.irq_cancelled());
        std::mem::take(&mut self.irq_cancel) || io_cancel
    }
}
