//! Shared test utilities: iNES image builders and a flat 64 KiB bus.
//!
//! Notes on iNES header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => CHR RAM)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, four-screen, mapper low nibble)
//! - byte 7 = Flags 7 (NES 2.0 indicator, mapper high nibble)
//! - byte 8 = PRG RAM size in 8 KiB units
//! - bytes 9..15 = padding/reserved
//!
//! Vectors:
//! - For 16 KiB PRG (NROM-128): vectors are at PRG offset 0x3FFA..=0x3FFF
//! - For 32 KiB PRG (NROM-256): vectors are at PRG offset 0x7FFA..=0x7FFF

#![allow(dead_code)]

use crate::bus::Bus;
use crate::cpu::state::{IRQ_VECTOR, Interrupt, NMI_VECTOR, RESET_VECTOR};

/// Build a minimal iNES image with configurable PRG/CHR sizes and flags.
/// PRG is filled with 0xAA and CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map(|_| 512).unwrap_or(0) + prg_16k * 16 * 1024 + chr_8k * 8 * 1024,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.resize(bytes.len() + prg_16k * 16 * 1024, 0xAA);
    bytes.resize(bytes.len() + chr_8k * 8 * 1024, 0xCC);
    bytes
}

/// Build a mapper test image whose banks identify themselves: every byte of
/// PRG holds its 8 KiB bank index and every byte of CHR its 1 KiB bank
/// index. `flags6_low` supplies the mirroring/battery/four-screen bits.
pub fn build_mapper_rom(mapper_id: u8, prg_16k: usize, chr_8k: usize, flags6_low: u8) -> Vec<u8> {
    let flags6 = (mapper_id << 4) | (flags6_low & 0x0B);
    let flags7 = mapper_id & 0xF0;
    let mut rom = build_ines(prg_16k, chr_8k, flags6, flags7, 1, None);

    let prg_start = 16;
    let chr_start = prg_start + prg_16k * 16 * 1024;
    for (i, b) in rom[prg_start..chr_start].iter_mut().enumerate() {
        *b = (i / 0x2000) as u8;
    }
    for (i, b) in rom[chr_start..].iter_mut().enumerate() {
        *b = (i / 0x0400) as u8;
    }
    rom
}

/// Build a simple NROM image that injects `prg` (up to 16 KiB) at the start
/// of a single 16 KiB PRG bank and sets the vectors (RESET/NMI/IRQ default
/// to 0x8000).
pub fn build_nrom_with_prg(
    prg: &[u8],
    chr_8k: usize,
    prg_ram_8k: u8,
    vectors: Option<(u16, u16, u16)>,
) -> Vec<u8> {
    assert!(
        prg.len() <= 16 * 1024,
        "Program must fit within a 16 KiB PRG bank"
    );

    let mut rom = build_ines(1, chr_8k, 0, 0, prg_ram_8k, None);
    let prg_start = 16;
    let prg_end = prg_start + 16 * 1024;
    rom[prg_start..(prg_start + prg.len())].copy_from_slice(prg);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_end], reset, nmi, irq);
    rom
}

/// Write the NMI, RESET and IRQ vectors into the tail of a 16 or 32 KiB PRG
/// slice. Panics on any other length.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!(
            "Unsupported PRG length for vector placement: {} bytes (expected 16 KiB or 32 KiB)",
            other
        ),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = value as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

// ---------------------------------------------------------------------------
// FlatRam: 64 KiB of plain memory for processor tests
// ---------------------------------------------------------------------------

/// Flat 64 KiB memory that records every processor write and lets a test
/// raise interrupt edges directly.
pub struct FlatRam {
    mem: Box<[u8; 0x10000]>,
    writes: Vec<(u16, u8)>,
    interrupt: Interrupt,
    cancel: bool,
}

impl Default for FlatRam {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatRam {
    pub fn new() -> Self {
        Self {
            mem: Box::new([0; 0x10000]),
            writes: Vec::new(),
            interrupt: Interrupt::None,
            cancel: false,
        }
    }

    /// Memory with `program` loaded at `origin`.
    pub fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut ram = Self::new();
        ram.load(origin, program);
        ram
    }

    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.poke(origin.wrapping_add(i as u16), *b);
        }
    }

    pub fn set_vectors(&mut self, reset: u16, nmi: u16, irq: u16) {
        for (vector, target) in [(RESET_VECTOR, reset), (NMI_VECTOR, nmi), (IRQ_VECTOR, irq)] {
            self.poke(vector, target as u8);
            self.poke(vector + 1, (target >> 8) as u8);
        }
    }

    /// Read without going through the bus (no side effects, not logged).
    pub fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    pub fn poke(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }

    /// Writes issued through `Bus::write`, oldest first.
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    pub fn raise(&mut self, kind: Interrupt) {
        self.interrupt = self.interrupt.max(kind);
    }

    pub fn cancel_irq(&mut self) {
        self.cancel = true;
    }
}

impl Bus for FlatRam {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.writes.push((addr, value));
        self.mem[addr as usize] = value;
    }

    fn take_interrupt(&mut self) -> Interrupt {
        std::mem::take(&mut self.interrupt)
    }

    fn irq_cancelled(&mut self) -> bool {
        std::mem::take(&mut self.cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom[8], 1);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn writes_vectors_for_16k_prg() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x3FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn writes_vectors_for_32k_prg() {
        let mut prg = vec![0u8; 32 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x7FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn mapper_rom_banks_are_tagged() {
        let rom = build_mapper_rom(66, 4, 2, 0x01);
        assert_eq!(rom[6], 0x21);
        assert_eq!(rom[7], 0x40);
        assert_eq!(rom[16], 0);
        assert_eq!(rom[16 + 0x2000], 1);
        assert_eq!(rom[16 + 0xFFFF], 7);
        let chr = 16 + 4 * 0x4000;
        assert_eq!(rom[chr + 0x0400], 1);
        assert_eq!(rom[chr + 0x3FFF], 15);
    }

    #[test]
    fn flat_ram_logs_bus_writes_only() {
        let mut ram = FlatRam::with_program(0x0400, &[0xEA]);
        ram.poke(0x10, 1);
        ram.write(0x11, 2);
        assert_eq!(ram.writes(), &[(0x11, 2)]);
        assert_eq!(ram.read(0x0400), 0xEA);
    }

    #[test]
    fn flat_ram_interrupt_edge_is_consumed() {
        let mut ram = FlatRam::new();
        ram.raise(Interrupt::Irq);
        ram.raise(Interrupt::Nmi);
        assert_eq!(ram.take_interrupt(), Interrupt::Nmi);
        assert_eq!(ram.take_interrupt(), Interrupt::None);
    }
}
