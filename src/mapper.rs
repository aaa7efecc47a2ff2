/*!
Mapper subsystem: the `Board` contract every cartridge board implements, the
cartridge memory the boards index into, and NROM (mapper 0).

Address decode convention
=========================
- $0000-$1FFF: CHR (pattern tables), reached through `Cartridge::read/write`
  by the video collaborator. The CPU bus never forwards this range.
- $4020-$5FFF: unused by most boards (open bus).
- $6000-$7FFF: save RAM or a board-specific window.
- $8000-$FFFF: PRG ROM reads; writes are register writes and never modify
  PRG bytes.

Every bank index is reduced modulo the number of banks actually present, so
malformed images can't index out of range. Boards apply their published
register widths (masking) before handing an index to `CartMemory`.

Unclaimed addresses read as open bus: the high byte of the address.
*/

use crate::save_ram::SaveRam;

/// Nametable arrangement selected by the cartridge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleScreenLower,
    SingleScreenUpper,
    FourScreen,
    /// Tables 0 and 3 on page 0, tables 1 and 2 on page 1.
    Diagonal,
    /// Table 0 on page 0, the other three on page 1.
    LShaped,
}

impl Mirroring {
    /// Physical nametable page backing logical table `table` (0-3).
    pub fn nametable_page(self, table: u8) -> u8 {
        let pages: [u8; 4] = match self {
            Mirroring::Horizontal => [0, 0, 1, 1],
            Mirroring::Vertical => [0, 1, 0, 1],
            Mirroring::SingleScreenLower => [0, 0, 0, 0],
            Mirroring::SingleScreenUpper => [1, 1, 1, 1],
            Mirroring::FourScreen => [0, 1, 2, 3],
            Mirroring::Diagonal => [0, 1, 1, 0],
            Mirroring::LShaped => [0, 1, 1, 1],
        };
        pages[(table & 3) as usize]
    }
}

/// Change notifications for caching collaborators (disassemblers, tile caches).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapperEvent {
    BankSwitched { addr: u16, len: u16 },
    MirroringChanged(Mirroring),
}

/// Open-bus approximation: the high byte of the address.
#[inline]
pub const fn open_bus(addr: u16) -> u8 {
    (addr >> 8) as u8
}

// ---------------------------------------------------------------------------
// Cartridge memory
// ---------------------------------------------------------------------------

/// PRG/CHR/save-RAM storage owned by the cartridge and indexed by the board.
pub struct CartMemory {
    prg: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    save_ram: SaveRam,
    events: Vec<MapperEvent>,
    notify: bool,
}

impl std::fmt::Debug for CartMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartMemory")
            .field("prg_len", &self.prg.len())
            .field("chr_len", &self.chr.len())
            .field("chr_is_ram", &self.chr_is_ram)
            .field("notify", &self.notify)
            .finish()
    }
}

impl CartMemory {
    /// `chr` empty means the board carries 8 KiB of CHR RAM instead.
    pub fn new(prg: Vec<u8>, chr: Vec<u8>) -> Self {
        let chr_is_ram = chr.is_empty();
        let chr = if chr_is_ram { vec![0; 0x2000] } else { chr };
        Self {
            prg,
            chr,
            chr_is_ram,
            save_ram: SaveRam::new(),
            events: Vec::new(),
            notify: false,
        }
    }

    pub fn prg_len(&self) -> usize {
        self.prg.len()
    }

    pub fn chr_len(&self) -> usize {
        self.chr.len()
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    /// Number of `size`-byte PRG banks (at least 1).
    pub fn prg_banks(&self, size: usize) -> usize {
        (self.prg.len() / size).max(1)
    }

    pub fn chr_banks(&self, size: usize) -> usize {
        (self.chr.len() / size).max(1)
    }

    pub fn last_prg_bank(&self, size: usize) -> usize {
        self.prg_banks(size) - 1
    }

    /// Read PRG through a `size`-byte window showing `bank`.
    #[inline]
    pub fn read_prg(&self, size: usize, bank: usize, addr: u16) -> u8 {
        let index = bank_offset(self.prg_banks(size), size, bank, addr);
        self.prg[index % self.prg.len()]
    }

    #[inline]
    pub fn read_chr(&self, size: usize, bank: usize, addr: u16) -> u8 {
        let index = bank_offset(self.chr_banks(size), size, bank, addr);
        self.chr[index % self.chr.len()]
    }

    /// CHR write; ignored unless the board carries CHR RAM.
    #[inline]
    pub fn write_chr(&mut self, size: usize, bank: usize, addr: u16, value: u8) {
        if !self.chr_is_ram {
            return;
        }
        let index = bank_offset(self.chr_banks(size), size, bank, addr) % self.chr.len();
        self.chr[index] = value;
    }

    #[inline]
    pub fn read_save(&self, addr: u16) -> u8 {
        self.save_ram.read((addr & 0x1FFF) as usize)
    }

    #[inline]
    pub fn write_save(&mut self, addr: u16, value: u8) {
        self.save_ram.write((addr & 0x1FFF) as usize, value);
    }

    pub fn save_ram(&self) -> &SaveRam {
        &self.save_ram
    }

    pub fn save_ram_mut(&mut self) -> &mut SaveRam {
        &mut self.save_ram
    }

    /// Record that the window `[addr, addr + len)` now shows different bytes.
    pub fn bank_switched(&mut self, addr: u16, len: u16) {
        if self.notify {
            self.events.push(MapperEvent::BankSwitched { addr, len });
        }
    }

    pub fn mirroring_changed(&mut self, mirroring: Mirroring) {
        if self.notify {
            self.events.push(MapperEvent::MirroringChanged(mirroring));
        }
    }

    pub fn set_notifications(&mut self, on: bool) {
        self.notify = on;
        if !on {
            self.events.clear();
        }
    }

    pub fn take_events(&mut self) -> Vec<MapperEvent> {
        std::mem::take(&mut self.events)
    }
}

#[inline]
fn bank_offset(banks: usize, size: usize, bank: usize, addr: u16) -> usize {
    (bank % banks) * size + (addr as usize & (size - 1))
}

// ---------------------------------------------------------------------------
// Board contract
// ---------------------------------------------------------------------------

/// Behaviour shared by every cartridge board.
///
/// - `read`/`write` take full unmasked addresses over $0000-$FFFF.
/// - `step_video` is called once per rendered dot with the video
///   collaborator's scanline/dot position and rendering switches.
/// - `take_irq` reports a new IRQ edge once; `irq_cancelled` reports once
///   that an asserted IRQ was acknowledged by a register write.
/// - `mirroring` returns `Some` when the board controls nametable layout.
pub trait Board {
    fn name(&self) -> &'static str;

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8;

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8);

    fn step_video(&mut self, _scanline: u16, _cycle: u16, _bg: bool, _sprites: bool) {}

    fn take_irq(&mut self) -> bool {
        false
    }

    fn irq_cancelled(&mut self) -> bool {
        false
    }

    fn mirroring(&self) -> Option<Mirroring> {
        None
    }

    /// Power/reset: return registers and counters to their power-on state.
    fn reset(&mut self) {}
}

/// NROM (mapper 0).
///
/// - PRG: 16 KiB (mirrored into $C000) or 32 KiB at $8000-$FFFF.
/// - Save RAM at $6000-$7FFF.
/// - CHR: 8 KiB ROM, or RAM when the image has none.
#[derive(Clone, Debug, Default)]
pub struct Nrom;

impl Board for Nrom {
    fn name(&self) -> &'static str {
        "NROM"
    }

    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => mem.read_chr(0x2000, 0, addr),
            0x6000..=0x7FFF => mem.read_save(addr),
            0x8000..=0xFFFF => mem.read_prg(0x8000, 0, addr),
            _ => open_bus(addr),
        }
    }

    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => mem.write_chr(0x2000, 0, addr, value),
            0x6000..=0x7FFF => mem.write_save(addr, value),
            0x8000..=0xFFFF => log::trace!("nrom: write {value:02X} to ROM at {addr:04X} ignored"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(len: usize, unit: usize) -> Vec<u8> {
        (0..len).map(|i| (i / unit) as u8).collect()
    }

    #[test]
    fn nametable_pages() {
        assert_eq!(Mirroring::Horizontal.nametable_page(1), 0);
        assert_eq!(Mirroring::Horizontal.nametable_page(2), 1);
        assert_eq!(Mirroring::Vertical.nametable_page(2), 0);
        assert_eq!(Mirroring::SingleScreenUpper.nametable_page(0), 1);
        assert_eq!(Mirroring::Diagonal.nametable_page(3), 0);
        assert_eq!(Mirroring::LShaped.nametable_page(3), 1);
        assert_eq!(Mirroring::FourScreen.nametable_page(3), 3);
    }

    #[test]
    fn bank_indices_wrap_modulo_bank_count() {
        let mem = CartMemory::new(tagged(0x8000, 0x2000), tagged(0x2000, 0x400));
        assert_eq!(mem.prg_banks(0x2000), 4);
        assert_eq!(mem.read_prg(0x2000, 5, 0x8000), 1);
        assert_eq!(mem.read_prg(0x2000, 3, 0xFFFF), 3);
        assert_eq!(mem.read_chr(0x400, 9, 0x0000), 1);
        assert_eq!(mem.last_prg_bank(0x4000), 1);
    }

    #[test]
    fn chr_rom_is_read_only_and_chr_ram_is_synthesized() {
        let mut rom = CartMemory::new(vec![0; 0x4000], vec![0xCC; 0x2000]);
        rom.write_chr(0x2000, 0, 0x10, 0x11);
        assert_eq!(rom.read_chr(0x2000, 0, 0x10), 0xCC);

        let mut ram = CartMemory::new(vec![0; 0x4000], Vec::new());
        assert!(ram.chr_is_ram());
        assert_eq!(ram.chr_len(), 0x2000);
        ram.write_chr(0x2000, 0, 0x10, 0x11);
        assert_eq!(ram.read_chr(0x2000, 0, 0x10), 0x11);
    }

    #[test]
    fn events_only_queue_when_enabled() {
        let mut mem = CartMemory::new(vec![0; 0x4000], Vec::new());
        mem.bank_switched(0x8000, 0x4000);
        assert!(mem.take_events().is_empty());
        mem.set_notifications(true);
        mem.bank_switched(0x8000, 0x4000);
        mem.mirroring_changed(Mirroring::Vertical);
        assert_eq!(
            mem.take_events(),
            vec![
                MapperEvent::BankSwitched {
                    addr: 0x8000,
                    len: 0x4000
                },
                MapperEvent::MirroringChanged(Mirroring::Vertical),
            ]
        );
        assert!(mem.take_events().is_empty());
    }

    #[test]
    fn nrom_128_mirrors_upper_half() {
        let mut prg = vec![0u8; 0x4000];
        prg[0] = 0x12;
        prg[0x3FFF] = 0x34;
        let mem = CartMemory::new(prg, vec![0; 0x2000]);
        let mut nrom = Nrom;
        assert_eq!(nrom.read(&mem, 0x8000), 0x12);
        assert_eq!(nrom.read(&mem, 0xBFFF), 0x34);
        assert_eq!(nrom.read(&mem, 0xC000), 0x12);
        assert_eq!(nrom.read(&mem, 0xFFFF), 0x34);
    }

    #[test]
    fn nrom_256_maps_directly() {
        let mem = CartMemory::new(tagged(0x8000, 0x4000), vec![0; 0x2000]);
        let mut nrom = Nrom;
        assert_eq!(nrom.read(&mem, 0x8000), 0);
        assert_eq!(nrom.read(&mem, 0xC000), 1);
    }

    #[test]
    fn nrom_rom_writes_are_ignored_and_ram_works() {
        let mut mem = CartMemory::new(vec![0xAA; 0x8000], vec![0; 0x2000]);
        let mut nrom = Nrom;
        nrom.write(&mut mem, 0x8000, 0x55);
        assert_eq!(nrom.read(&mem, 0x8000), 0xAA);
        nrom.write(&mut mem, 0x6000, 0x42);
        assert_eq!(nrom.read(&mem, 0x6000), 0x42);
        assert!(mem.save_ram().is_dirty());
        assert_eq!(nrom.read(&mem, 0x5000), 0x50);
    }
}
