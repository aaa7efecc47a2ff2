/*!
core::Cpu - 6502 processor façade wrapping `CpuState`.

Step algorithm
==============
1. A halted (locked-up) processor does nothing and reports 0 cycles.
2. Pending bus stall: burn one cycle, no fetch.
3. Pull interrupt edges from the bus into the state latch (acknowledged IRQs
   are dropped first). A serviceable interrupt (NMI, or IRQ with I clear)
   is entered instead of fetching: push PC and status (B clear), set I, load
   the vector, charge 7 cycles. A masked IRQ stays latched.
4. Fetch the opcode, look up its `Instruction`, resolve the effective
   address (reads operands without moving PC).
5. Advance PC by the instruction size, charge the base cycles plus one if
   the instruction pays for a page cross and one occurred.
6. Run the execution function, which may move PC and charge branch cycles.

`step` returns the cycles consumed, which is always the difference of the
monotonic cycle counter across the call.
*/

use crate::bus::Bus;
use crate::cpu::state::{CpuState, INTERRUPT_CYCLES, Interrupt, RESET_VECTOR};
use crate::cpu::table::instruction;

/// Why `Cpu::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The cycle budget was spent.
    BudgetReached { cycles: u64 },
    /// PC landed on a breakpoint after an instruction completed.
    Breakpoint { pc: u16, cycles: u64 },
    /// A lockup opcode stopped the processor.
    Halted { pc: u16, opcode: u8, cycles: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    state: CpuState,
    /// Opcode that locked the processor up, kept so reporting never reads
    /// the bus again.
    halt_opcode: u8,
}

impl Cpu {
    /// Construct a new CPU with power‑up defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// Reset sequence: re-initialize the state, then load PC from $FFFC.
    pub fn reset(&mut self, bus: &mut dyn Bus) {
        self.state.reset();
        self.halt_opcode = 0;
        self.state.pc = bus.read_word(RESET_VECTOR);
        log::debug!("cpu: reset, PC={:04X}", self.state.pc);
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    pub fn cycles(&self) -> u64 {
        self.state.cycles
    }

    /// Hold the processor off the bus for `cycles` cycles (DMA and similar).
    pub fn stall(&mut self, cycles: u32) {
        self.state.stall = self.state.stall.saturating_add(cycles);
    }

    // ---------------------------------------------------------------------
    // Register accessors
    // ---------------------------------------------------------------------
    pub fn a(&self) -> u8 {
        self.state.a
    }
    pub fn x(&self) -> u8 {
        self.state.x
    }
    pub fn y(&self) -> u8 {
        self.state.y
    }
    pub fn sp(&self) -> u8 {
        self.state.sp
    }
    pub fn pc(&self) -> u16 {
        self.state.pc
    }
    pub fn status(&self) -> u8 {
        self.state.status_byte()
    }

    pub fn set_a(&mut self, v: u8) {
        self.state.a = v;
    }
    pub fn set_x(&mut self, v: u8) {
        self.state.x = v;
    }
    pub fn set_y(&mut self, v: u8) {
        self.state.y = v;
    }
    pub fn set_pc(&mut self, v: u16) {
        self.state.pc = v;
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Execute one instruction (or one stall cycle, or one interrupt entry).
    pub fn step(&mut self, bus: &mut dyn Bus) -> u64 {
        let s = &mut self.state;
        if s.halted {
            return 0;
        }
        if s.stall > 0 {
            s.stall -= 1;
            s.cycles += 1;
            return 1;
        }

        if bus.irq_cancelled() {
            s.cancel_irq();
        }
        s.request(bus.take_interrupt());

        let start = s.cycles;
        let kind = s.serviceable_interrupt();
        if kind != Interrupt::None {
            service_interrupt(s, bus, kind);
            return s.cycles - start;
        }

        let opcode = bus.read(s.pc);
        let ins = instruction(opcode);
        let (addr, crossed) = (ins.resolve)(s, bus);

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "{:04X}  {:02X}  {} {:04X}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
                s.pc,
                opcode,
                ins.name,
                addr,
                s.a,
                s.x,
                s.y,
                s.status_byte(),
                s.sp,
                s.cycles
            );
        }

        s.pc = s.pc.wrapping_add(ins.size());
        s.cycles += ins.cycles as u64;
        if crossed && ins.page_penalty {
            s.cycles += 1;
        }
        (ins.exec)(s, bus, addr);
        let spent = s.cycles - start;
        if s.halted {
            log::warn!("cpu: lockup on opcode {:02X} at {:04X}", opcode, s.pc);
            self.halt_opcode = opcode;
        }
        spent
    }

    /// Step until the budget is spent, a breakpoint is reached, or the
    /// processor locks up. Breakpoints are checked after each instruction,
    /// so a run starting on a breakpoint still makes progress.
    pub fn run(&mut self, bus: &mut dyn Bus, budget: u64, breakpoints: &[u16]) -> RunOutcome {
        let start = self.state.cycles;
        loop {
            let elapsed = self.state.cycles - start;
            if self.state.halted {
                let pc = self.state.pc;
                return RunOutcome::Halted {
                    pc,
                    opcode: self.halt_opcode,
                    cycles: elapsed,
                };
            }
            if elapsed >= budget {
                return RunOutcome::BudgetReached { cycles: elapsed };
            }
            self.step(bus);
            if !self.state.halted && breakpoints.contains(&self.state.pc) {
                return RunOutcome::Breakpoint {
                    pc: self.state.pc,
                    cycles: self.state.cycles - start,
                };
            }
        }
    }
}

/// Interrupt entry: push PC and status with B clear, set I, load the vector.
fn service_interrupt(s: &mut CpuState, bus: &mut dyn Bus, kind: Interrupt) {
    let Some(vector) = kind.vector() else {
        return;
    };
    let pc = s.pc;
    s.push16(bus, pc);
    let p = s.status_for_push(false);
    s.push(bus, p);
    s.set_irq_disable(true);
    s.pc = bus.read_word(vector);
    s.pending = Interrupt::None;
    s.cycles += INTERRUPT_CYCLES;
    log::trace!("cpu: {:?} entry {:04X} -> {:04X}", kind, pc, s.pc);
}
