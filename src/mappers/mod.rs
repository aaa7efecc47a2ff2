/*
Module: mappers

Concrete boards plus the closed `Mapper` enum the cartridge owns. Every
supported iNES id resolves to exactly one variant in `Mapper::new`; the enum
forwards the `Board` contract to the variant with a plain `match`.

Implemented ids: 0, 1, 2, 3, 4, 7, 11, 18, 21, 22, 23, 25, 34, 66, 69, 71,
79, 150, 206, 243.
*/

pub mod axrom;
pub mod bnrom;
pub mod camerica;
pub mod cnrom;
pub mod color_dreams;
pub mod fme7;
pub mod gxrom;
pub mod irq;
pub mod jaleco;
pub mod mmc1;
pub mod mmc3;
pub mod namco108;
pub mod nina;
pub mod sachen;
pub mod uxrom;
pub mod vrc;

pub use axrom::Axrom;
pub use bnrom::Bnrom;
pub use camerica::Camerica;
pub use cnrom::Cnrom;
pub use color_dreams::ColorDreams;
pub use fme7::Fme7;
pub use gxrom::Gxrom;
pub use jaleco::Jaleco;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use namco108::Namco108;
pub use nina::Nina;
pub use sachen::Sachen;
pub use uxrom::Uxrom;
pub use vrc::Vrc;

use crate::error::CartridgeError;
use crate::mapper::{Board, CartMemory, Mirroring, Nrom};

/// The active board of a cartridge.
#[derive(Debug, Clone)]
pub enum Mapper {
    Nrom(Nrom),
    Mmc1(Mmc1),
    Uxrom(Uxrom),
    Cnrom(Cnrom),
    Mmc3(Mmc3),
    Axrom(Axrom),
    ColorDreams(ColorDreams),
    Jaleco(Jaleco),
    Vrc(Vrc),
    Bnrom(Bnrom),
    Gxrom(Gxrom),
    Fme7(Fme7),
    Camerica(Camerica),
    Nina(Nina),
    Sachen(Sachen),
    Namco108(Namco108),
}

macro_rules! dispatch {
    ($self:expr, $board:ident => $body:expr) => {
        match $self {
            Mapper::Nrom($board) => $body,
            Mapper::Mmc1($board) => $body,
            Mapper::Uxrom($board) => $body,
            Mapper::Cnrom($board) => $body,
            Mapper::Mmc3($board) => $body,
            Mapper::Axrom($board) => $body,
            Mapper::ColorDreams($board) => $body,
            Mapper::Jaleco($board) => $body,
            Mapper::Vrc($board) => $body,
            Mapper::Bnrom($board) => $body,
            Mapper::Gxrom($board) => $body,
            Mapper::Fme7($board) => $body,
            Mapper::Camerica($board) => $body,
            Mapper::Nina($board) => $body,
            Mapper::Sachen($board) => $body,
            Mapper::Namco108($board) => $body,
        }
    };
}

impl Mapper {
    /// Board for iNES mapper `id`. Some boards inspect the cartridge memory
    /// to tell apart variants sharing an id.
    pub fn new(id: u8, mem: &CartMemory) -> Result<Self, CartridgeError> {
        let mapper = match id {
            0 => Mapper::Nrom(Nrom),
            1 => Mapper::Mmc1(Mmc1::new()),
            2 => Mapper::Uxrom(Uxrom::new()),
            3 => Mapper::Cnrom(Cnrom::new()),
            4 => Mapper::Mmc3(Mmc3::new()),
            7 => Mapper::Axrom(Axrom::new()),
            11 => Mapper::ColorDreams(ColorDreams::new()),
            18 => Mapper::Jaleco(Jaleco::new()),
            21 | 22 | 23 | 25 => Mapper::Vrc(Vrc::new(id)),
            34 => Mapper::Bnrom(Bnrom::new(mem)),
            66 => Mapper::Gxrom(Gxrom::new()),
            69 => Mapper::Fme7(Fme7::new()),
            71 => Mapper::Camerica(Camerica::new()),
            79 => Mapper::Nina(Nina::new()),
            150 | 243 => Mapper::Sachen(Sachen::new(id)),
            206 => Mapper::Namco108(Namco108::new()),
            other => return Err(CartridgeError::UnsupportedMapper(other)),
        };
        log::debug!("mapper {id} -> {}", mapper.name());
        Ok(mapper)
    }
}

impl Board for Mapper {
    fn name(&self) -> &'static str {
        dispatch!(self, b => b.name())
    }

    #[inline]
    fn read(&mut self, mem: &CartMemory, addr: u16) -> u8 {
        dispatch!(self, b => b.read(mem, addr))
    }

    #[inline]
    fn write(&mut self, mem: &mut CartMemory, addr: u16, value: u8) {
        dispatch!(self, b => b.write(mem, addr, value))
    }

    #[inline]
    fn step_video(&mut self, scanline: u16, cycle: u16, bg: bool, sprites: bool) {
        dispatch!(self, b => b.step_video(scanline, cycle, bg, sprites))
    }

    fn take_irq(&mut self) -> bool {
        dispatch!(self, b => b.take_irq())
    }

    fn irq_cancelled(&mut self) -> bool {
        dispatch!(self, b => b.irq_cancelled())
    }

    fn mirroring(&self) -> Option<Mirroring> {
        dispatch!(self, b => b.mirroring())
    }

    fn reset(&mut self) {
        dispatch!(self, b => b.reset())
    }
}
