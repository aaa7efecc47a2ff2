/*!
iNES image parsing.

Layout
======
- 16-byte header: `NES\x1A`, PRG count (16 KiB units), CHR count (8 KiB
  units), flags 6, flags 7, PRG-RAM size, reserved bytes.
- Optional 512-byte trainer (flags 6 bit 2).
- PRG ROM, then CHR ROM.

NES 2.0 headers (`flags7 & 0x0C == 0x08`) are accepted. Their extra size
bits in byte 9 extend the bank counts; the exponent-multiplier size notation
is rejected as a format error. Mapper ids beyond 255 cannot be represented
and only the low eight bits are kept.
*/

use crate::crc32::Crc32;
use crate::error::CartridgeError;
use crate::mapper::Mirroring;

pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_BANK_LEN: usize = 16 * 1024;
pub const CHR_BANK_LEN: usize = 8 * 1024;

const MAGIC: &[u8; 4] = b"NES\x1A";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InesVersion {
    Ines1,
    Nes20,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InesHeader {
    pub prg_banks: usize,
    pub chr_banks: usize,
    pub flags6: u8,
    pub flags7: u8,
    pub prg_ram_8k: u8,
    pub version: InesVersion,
}

impl InesHeader {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Format("header shorter than 16 bytes"));
        }
        if &data[0..4] != MAGIC {
            return Err(CartridgeError::Format("missing NES<1A> signature"));
        }

        let flags6 = data[6];
        let flags7 = data[7];
        let version = if flags7 & 0x0C == 0x08 {
            InesVersion::Nes20
        } else {
            InesVersion::Ines1
        };

        let (prg_banks, chr_banks) = match version {
            InesVersion::Ines1 => (data[4] as usize, data[5] as usize),
            InesVersion::Nes20 => {
                let prg_msb = data[9] & 0x0F;
                let chr_msb = data[9] >> 4;
                if prg_msb == 0x0F || chr_msb == 0x0F {
                    return Err(CartridgeError::Format(
                        "NES 2.0 exponent size notation is not supported",
                    ));
                }
                (
                    ((prg_msb as usize) << 8) | data[4] as usize,
                    ((chr_msb as usize) << 8) | data[5] as usize,
                )
            }
        };

        Ok(Self {
            prg_banks,
            chr_banks,
            flags6,
            flags7,
            prg_ram_8k: data[8],
            version,
        })
    }

    pub fn mapper_id(&self) -> u8 {
        (self.flags7 & 0xF0) | (self.flags6 >> 4)
    }

    pub fn has_trainer(&self) -> bool {
        self.flags6 & 0x04 != 0
    }

    pub fn battery(&self) -> bool {
        self.flags6 & 0x02 != 0
    }

    pub fn four_screen(&self) -> bool {
        self.flags6 & 0x08 != 0
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.four_screen() {
            Mirroring::FourScreen
        } else if self.flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    pub fn prg_len(&self) -> usize {
        self.prg_banks * PRG_BANK_LEN
    }

    pub fn chr_len(&self) -> usize {
        self.chr_banks * CHR_BANK_LEN
    }
}

/// A parsed image: header plus the raw sections as stored in the file.
#[derive(Clone, Debug)]
pub struct RomImage {
    pub header: InesHeader,
    pub trainer: Option<Vec<u8>>,
    pub prg: Vec<u8>,
    /// CHR ROM as stored; empty when the header declares CHR RAM.
    pub chr: Vec<u8>,
    /// CRC-32 over trainer + PRG + CHR.
    pub crc32: u32,
}

impl RomImage {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = InesHeader::parse(data)?;
        let mut offset = HEADER_LEN;

        let trainer = if header.has_trainer() {
            let t = take(data, &mut offset, TRAINER_LEN, "trainer")?;
            Some(t.to_vec())
        } else {
            None
        };
        if header.prg_banks == 0 {
            return Err(CartridgeError::Format("image declares no PRG ROM"));
        }
        let prg = take(data, &mut offset, header.prg_len(), "PRG ROM")?.to_vec();
        let chr = take(data, &mut offset, header.chr_len(), "CHR ROM")?.to_vec();

        let mut crc = Crc32::new();
        if let Some(t) = &trainer {
            crc.update(t);
        }
        crc.update(&prg);
        crc.update(&chr);

        Ok(Self {
            header,
            trainer,
            prg,
            chr,
            crc32: crc.finish(),
        })
    }
}

fn take<'a>(
    data: &'a [u8],
    offset: &mut usize,
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    let available = data.len().saturating_sub(*offset);
    if available < len {
        return Err(CartridgeError::Truncated {
            section,
            needed: len,
            available,
        });
    }
    let slice = &data[*offset..*offset + len];
    *offset += len;
    Ok(slice)
}
