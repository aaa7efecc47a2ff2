#![doc = r#"
nescore: the processor and cartridge half of an NES emulator.

The host owns the loop. It steps the `Cpu` against a `Bus` (normally
`SystemBus`), feeds video timing into the cartridge through
`SystemBus::step_video`, and persists battery RAM between sessions.

Modules:
- bus: `Bus` trait and `SystemBus` (work RAM, I/O window, cartridge space)
- cartridge: `Cartridge` built from an iNES image; header-fix tables
- cpu: 6502 core (state, addressing modes, opcode table, processor facade)
- crc32: checksum used to key header fixes
- error: load-time error types
- mapper: `Board` contract, `CartMemory`, mirroring, NROM
- mappers: every other supported board plus the closed `Mapper` enum
- rom: iNES / NES 2.0 header and body parser
- save_ram: dirty-tracked battery RAM
- chr_export (feature `chr_export`): pattern tables as PNG

In tests, shared iNES builders and a flat RAM bus live under
`crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod crc32;
pub mod error;
pub mod mapper;
pub mod mappers;
pub mod rom;
pub mod save_ram;

#[cfg(feature = "chr_export")]
pub mod chr_export;

// Re-export commonly used types at the crate root for convenience.
pub use bus::{Bus, SystemBus};
pub use cartridge::{Cartridge, HeaderFix, KNOWN_HEADER_FIXES, LoadOptions};
pub use cpu::{Cpu, CpuState, Interrupt, RunOutcome, Status};
pub use error::{CartridgeError, FixupParseError, SaveRamError};
pub use mapper::{Board, MapperEvent, Mirroring};
pub use mappers::Mapper;
pub use rom::InesVersion;
pub use save_ram::SaveRam;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
