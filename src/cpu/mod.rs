/*!
cpu::mod - Public façade for the 6502 CPU core.

Layout:

```text
state.rs      - Architectural state (registers, flags, cycles, latches).
addressing.rs - Addressing mode enum and effective-address resolvers.
execute.rs    - One execution function per instruction behaviour.
table.rs      - 256-entry opcode table binding mode, cycles and exec fn.
core/         - The `Cpu` facade: reset, interrupt entry, step, run.
```

Usage:
```rust,ignore
use nescore::{Cpu, SystemBus};

let mut cpu = Cpu::new();
cpu.reset(&mut bus);
cpu.step(&mut bus);
```
*/

pub mod addressing;
pub mod core;
pub mod execute;
pub mod state;
pub mod table;

pub use crate::cpu::addressing::AddrMode;
pub use crate::cpu::core::{Cpu, RunOutcome};
pub use crate::cpu::state::{CpuState, Interrupt, Status};
pub use crate::cpu::table::{Instruction, instruction};
