/*!
state.rs - Canonical 6502 CPU architectural state (registers + flags) and
inline-friendly helpers.

Overview
========
`CpuState` is the single authoritative owner for all architecturally visible
registers, the cycle counter, bus-stall cycles, the pending interrupt latch
and the lockup flag. Instruction execution functions receive it by mutable
reference together with the bus, so the state itself never holds a bus.

6502 Status Register Bit Layout (for reference)
===============================================
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
Where:
  N = NEGATIVE
  V = OVERFLOW
  1 = UNUSED (always reads as 1)
  B = BREAK (PHP/BRK only; hardware IRQ/NMI push with B clear)
  D = DECIMAL (unused on NES but still toggled by instructions / flags)
  I = IRQ_DISABLE
  Z = ZERO
  C = CARRY
*/

use bitflags::bitflags;

use crate::bus::Bus;

bitflags! {
    /// Processor status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const IRQ_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

/// Stack page base ($0100-$01FF).
pub const STACK_BASE: u16 = 0x0100;
/// Stack pointer value after power-on and reset.
pub const SP_RESET: u8 = 0xFD;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles charged for reset and for interrupt entry.
pub const INTERRUPT_CYCLES: u64 = 7;

/// Interrupt latch kinds. Ordering encodes priority (NMI highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Interrupt {
    #[default]
    None,
    Irq,
    Nmi,
}

impl Interrupt {
    pub fn vector(self) -> Option<u16> {
        match self {
            Interrupt::None => None,
            Interrupt::Irq => Some(IRQ_VECTOR),
            Interrupt::Nmi => Some(NMI_VECTOR),
        }
    }
}

/// Pure architectural register / flag container for the 6502 CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
    /// Total cycles executed since power-on; never decreases.
    pub cycles: u64,
    /// Cycles the bus holds the processor before the next fetch.
    pub stall: u32,
    pub pending: Interrupt,
    /// Set by the lockup opcodes; cleared only by reset.
    pub halted: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: SP_RESET,
            pc: 0x0000,
            status: Status::IRQ_DISABLE | Status::UNUSED,
            cycles: 0,
            stall: 0,
            pending: Interrupt::None,
            halted: false,
        }
    }
}

macro_rules! flag_views {
    ($($get:ident, $set:ident => $flag:ident;)*) => {
        $(
            #[inline]
            pub fn $get(&self) -> bool {
                self.status.contains(Status::$flag)
            }

            #[inline]
            pub fn $set(&mut self, on: bool) {
                self.status.set(Status::$flag, on);
            }
        )*
    };
}

impl CpuState {
    /// Create a new CPU state using power-up defaults.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset sequence minus the vector fetch: registers A/X/Y survive, the
    /// stack pointer and interrupt mask are forced, latches are cleared and
    /// the reset itself is charged as cycles.
    pub fn reset(&mut self) {
        self.sp = SP_RESET;
        self.status.insert(Status::IRQ_DISABLE | Status::UNUSED);
        self.pending = Interrupt::None;
        self.stall = 0;
        self.halted = false;
        self.cycles += INTERRUPT_CYCLES;
    }

    // ---------------------------------------------------------------------
    // Flag views
    // ---------------------------------------------------------------------

    flag_views! {
        carry, set_carry => CARRY;
        zero, set_zero => ZERO;
        irq_disable, set_irq_disable => IRQ_DISABLE;
        decimal, set_decimal => DECIMAL;
        brk, set_brk => BREAK;
        unused, set_unused => UNUSED;
        overflow, set_overflow => OVERFLOW;
        negative, set_negative => NEGATIVE;
    }

    /// Raw status byte as the register file holds it.
    #[inline]
    pub fn status_byte(&self) -> u8 {
        self.status.bits()
    }

    /// Restore the status register from a byte (PLP/RTI). Bit 5 always reads
    /// set and bit 4 only exists on the pushed copy.
    #[inline]
    pub fn set_status(&mut self, v: u8) {
        self.status = (Status::from_bits_retain(v) | Status::UNUSED) - Status::BREAK;
    }

    /// Compose the status byte for pushing to stack (BRK/PHP vs. IRQ/NMI).
    pub fn status_for_push(&self, brk: bool) -> u8 {
        let mut v = self.status | Status::UNUSED;
        v.set(Status::BREAK, brk);
        v.bits()
    }

    /// Composite helper to update ZERO + NEGATIVE according to 6502 rules.
    #[inline]
    pub fn update_zn(&mut self, result: u8) {
        self.set_zero(result == 0);
        self.set_negative(result & 0x80 != 0);
    }

    // ---------------------------------------------------------------------
    // Interrupt latch
    // ---------------------------------------------------------------------

    /// Latch an interrupt request; a lower-priority request never replaces a
    /// pending higher-priority one.
    #[inline]
    pub fn request(&mut self, kind: Interrupt) {
        if kind > self.pending {
            self.pending = kind;
        }
    }

    /// Drop a pending IRQ that its source acknowledged before service.
    #[inline]
    pub fn cancel_irq(&mut self) {
        if self.pending == Interrupt::Irq {
            self.pending = Interrupt::None;
        }
    }

    /// Interrupt that would be serviced now, honoring the I mask.
    #[inline]
    pub fn serviceable_interrupt(&self) -> Interrupt {
        match self.pending {
            Interrupt::Irq if self.irq_disable() => Interrupt::None,
            other => other,
        }
    }

    // ---------------------------------------------------------------------
    // Stack Helpers
    // ---------------------------------------------------------------------
    //
    //   Push: write at 0x0100 | SP, then SP = SP - 1
    //   Pull: SP = SP + 1, then read at 0x0100 | SP

    #[inline]
    pub fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        bus.write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    #[inline]
    pub fn pop<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_BASE | self.sp as u16)
    }

    /// Push a word high byte first, so it pops back low byte first.
    #[inline]
    pub fn push16<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    #[inline]
    pub fn pop16<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pop(bus) as u16;
        let hi = self.pop(bus) as u16;
        (hi << 8) | lo
    }
}
