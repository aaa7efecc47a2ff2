/*!
addressing.rs - 6502 addressing modes and effective-address resolution.

Overview
========
Every resolver is a pure function of the processor state and the bus: it
reads the operand bytes that follow the opcode at PC (without moving PC)
and returns `(effective_address, page_crossed)`. The step loop advances PC
by the mode's operand size afterwards.

Page crossing is reported only by the indexed absolute modes and the
indirect-indexed mode: the high byte of the effective address differs from
the high byte of the un-indexed base. The step loop decides whether the
instruction pays the extra cycle for it.

Hardware quirks reproduced
==========================
- Pointer reads (JMP indirect, (zp,X), (zp),Y) increment only the low byte of
  the pointer, wrapping within the same 256-byte page.
- Relative operands are signed offsets from the address that follows the
  2-byte branch instruction.
*/

use crate::bus::Bus;
use crate::cpu::state::CpuState;

/// Addressing-mode enumeration (14-way, including the lockup slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
    /// Opcodes that jam the processor.
    Illegal,
}

impl AddrMode {
    /// Instruction size in bytes (opcode plus operand), fixed by mode.
    pub const fn size(self) -> u16 {
        match self {
            AddrMode::Implied | AddrMode::Accumulator | AddrMode::Illegal => 1,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::IndexedIndirect
            | AddrMode::IndirectIndexed
            | AddrMode::Relative => 2,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => 3,
        }
    }

    /// Resolver for this mode.
    pub const fn resolver(self) -> ResolveFn {
        match self {
            AddrMode::Implied | AddrMode::Accumulator | AddrMode::Illegal => addr_none,
            AddrMode::Immediate => addr_imm,
            AddrMode::ZeroPage => addr_zp,
            AddrMode::ZeroPageX => addr_zp_x,
            AddrMode::ZeroPageY => addr_zp_y,
            AddrMode::Absolute => addr_abs,
            AddrMode::AbsoluteX => addr_abs_x,
            AddrMode::AbsoluteY => addr_abs_y,
            AddrMode::Indirect => addr_ind,
            AddrMode::IndexedIndirect => addr_ind_x,
            AddrMode::IndirectIndexed => addr_ind_y,
            AddrMode::Relative => addr_rel,
        }
    }
}

/// Effective-address resolver: `(address, page_crossed)`.
pub type ResolveFn = fn(&CpuState, &mut dyn Bus) -> (u16, bool);

#[inline]
fn operand_byte(cpu: &CpuState, bus: &mut dyn Bus) -> u8 {
    bus.read(cpu.pc.wrapping_add(1))
}

#[inline]
fn operand_word(cpu: &CpuState, bus: &mut dyn Bus) -> u16 {
    let lo = bus.read(cpu.pc.wrapping_add(1)) as u16;
    let hi = bus.read(cpu.pc.wrapping_add(2)) as u16;
    (hi << 8) | lo
}

#[inline]
fn indexed(base: u16, index: u8) -> (u16, bool) {
    let addr = base.wrapping_add(index as u16);
    (addr, (base & 0xFF00) != (addr & 0xFF00))
}

// -------------------------
// Resolvers
// -------------------------

fn addr_none(cpu: &CpuState, _bus: &mut dyn Bus) -> (u16, bool) {
    (cpu.pc, false)
}

fn addr_imm(cpu: &CpuState, _bus: &mut dyn Bus) -> (u16, bool) {
    (cpu.pc.wrapping_add(1), false)
}

fn addr_zp(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    (operand_byte(cpu, bus) as u16, false)
}

fn addr_zp_x(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    (operand_byte(cpu, bus).wrapping_add(cpu.x) as u16, false)
}

fn addr_zp_y(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    (operand_byte(cpu, bus).wrapping_add(cpu.y) as u16, false)
}

fn addr_abs(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    (operand_word(cpu, bus), false)
}

fn addr_abs_x(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    indexed(operand_word(cpu, bus), cpu.x)
}

fn addr_abs_y(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    indexed(operand_word(cpu, bus), cpu.y)
}

fn addr_ind(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    let ptr = operand_word(cpu, bus);
    (read_word_page_wrapped(bus, ptr), false)
}

fn addr_ind_x(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    let zp = operand_byte(cpu, bus).wrapping_add(cpu.x);
    (read_word_page_wrapped(bus, zp as u16), false)
}

fn addr_ind_y(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    let zp = operand_byte(cpu, bus);
    let base = read_word_page_wrapped(bus, zp as u16);
    indexed(base, cpu.y)
}

fn addr_rel(cpu: &CpuState, bus: &mut dyn Bus) -> (u16, bool) {
    let offset = operand_byte(cpu, bus) as i8;
    let next = cpu.pc.wrapping_add(2);
    (next.wrapping_add_signed(offset as i16), false)
}

// -------------------------
// Low-level word helpers
// -------------------------

/// Read a little-endian pointer whose high byte comes from the same page:
/// only the low byte of `addr` is incremented. A pointer at $02FF takes its
/// high byte from $0200, and a zero-page pointer at $FF from $0000.
#[inline]
pub fn read_word_page_wrapped(bus: &mut dyn Bus, addr: u16) -> u16 {
    let lo = bus.read(addr) as u16;
    let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let hi = bus.read(hi_addr) as u16;
    (hi << 8) | lo
}
