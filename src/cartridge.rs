/*!
Cartridge: a parsed iNES image, its memory, and the board that decodes it.

Loading
=======
1. `RomImage::parse` splits the file into header, trainer, PRG and CHR and
   computes the CRC-32 over trainer + PRG + CHR as stored.
2. The CRC is looked up in the host's fix table (`LoadOptions::header_fixes`)
   and then in `KNOWN_HEADER_FIXES`. The first match overrides the mapper id
   and, when given, the mirroring and battery flags.
3. The (possibly corrected) mapper id selects a `Mapper` variant; unknown
   ids fail with `CartridgeError::UnsupportedMapper`.

Access
======
- `read`/`write` take the full 16-bit address and go straight to the board.
  The video collaborator uses $0000-$1FFF, the CPU bus $4020-$FFFF.
- `mirroring()` resolves the layout in priority order: the header's
  four-screen bit, then the board's dynamic register, then the header.
- A write that changes the resolved mirroring queues
  `MapperEvent::MirroringChanged` when notifications are enabled.
*/

use std::fs;
use std::path::Path;

use crate::error::{CartridgeError, FixupParseError};
use crate::mapper::{Board, CartMemory, MapperEvent, Mirroring};
use crate::mappers::Mapper;
use crate::rom::{InesVersion, RomImage};
use crate::save_ram::SaveRam;

/// Correction for an image known to ship with a wrong header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeaderFix {
    pub crc32: u32,
    pub mapper_id: u8,
    pub mirroring: Option<Mirroring>,
    pub battery: Option<bool>,
}

impl HeaderFix {
    pub const fn new(
        crc32: u32,
        mapper_id: u8,
        mirroring: Option<Mirroring>,
        battery: Option<bool>,
    ) -> Self {
        Self {
            crc32,
            mapper_id,
            mirroring,
            battery,
        }
    }

    /// Parse a fix table: one `<crc32 hex> <mapper id> [h|v|4] [battery]`
    /// entry per line. `#` starts a comment; blank lines are skipped.
    pub fn parse_table(text: &str) -> Result<Vec<HeaderFix>, FixupParseError> {
        let mut fixes = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            fixes.push(Self::parse_line(line, content)?);
        }
        Ok(fixes)
    }

    fn parse_line(line: usize, content: &str) -> Result<HeaderFix, FixupParseError> {
        let fail = |reason: String| FixupParseError { line, reason };
        let mut fields = content.split_whitespace();

        let crc_text = fields.next().ok_or_else(|| fail("missing checksum".into()))?;
        let crc_digits = crc_text
            .strip_prefix("0x")
            .or_else(|| crc_text.strip_prefix("0X"))
            .unwrap_or(crc_text);
        let crc32 = u32::from_str_radix(crc_digits, 16)
            .map_err(|e| fail(format!("bad checksum {crc_text:?}: {e}")))?;

        let id_text = fields.next().ok_or_else(|| fail("missing mapper id".into()))?;
        let mapper_id = id_text
            .parse::<u8>()
            .map_err(|e| fail(format!("bad mapper id {id_text:?}: {e}")))?;

        let mut fix = HeaderFix {
            crc32,
            mapper_id,
            mirroring: None,
            battery: None,
        };
        for flag in fields {
            match flag.to_ascii_lowercase().as_str() {
                "h" => fix.mirroring = Some(Mirroring::Horizontal),
                "v" => fix.mirroring = Some(Mirroring::Vertical),
                "4" => fix.mirroring = Some(Mirroring::FourScreen),
                "battery" => fix.battery = Some(true),
                "nobattery" => fix.battery = Some(false),
                _ => return Err(fail(format!("unknown flag {flag:?}"))),
            }
        }
        Ok(fix)
    }
}

/// Dumps in circulation whose headers name the wrong board, keyed by the
/// CRC-32 of trainer + PRG + CHR.
pub const KNOWN_HEADER_FIXES: &[HeaderFix] = &[
    // Rainbow Islands (J)
    HeaderFix::new(0x9EA1_DC76, 2, Some(Mirroring::Horizontal), None),
    // Circus Charlie (J)
    HeaderFix::new(0x4E7D_B5AF, 0, Some(Mirroring::Horizontal), None),
    // F-1 Race (J)
    HeaderFix::new(0x5797_0078, 0, None, None),
    // Mach Rider (JU)
    HeaderFix::new(0xAF2B_BCBC, 0, None, None),
    // Castle of Deceit
    HeaderFix::new(0x345D_3A1A, 11, Some(Mirroring::Vertical), None),
    // Nekketsu Kakutou Densetsu (J)
    HeaderFix::new(0x3A16_94F9, 4, Some(Mirroring::Vertical), None),
];

/// Host choices applied while a cartridge is built.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Extra fixes, consulted before `KNOWN_HEADER_FIXES`.
    pub header_fixes: Vec<HeaderFix>,
    /// Queue `MapperEvent`s for `Cartridge::take_events`.
    pub notifications: bool,
}

impl LoadOptions {
    fn header_fix(&self, crc32: u32) -> Option<&HeaderFix> {
        self.header_fixes
            .iter()
            .chain(KNOWN_HEADER_FIXES)
            .find(|f| f.crc32 == crc32)
    }
}

pub struct Cartridge {
    memory: CartMemory,
    mapper: Mapper,

    // Metadata
    mapper_id: u8,
    mirroring: Mirroring,
    battery: bool,
    has_trainer: bool,
    ines_version: InesVersion,
    crc32: u32,
    prg_rom_len: usize,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("mapper_id", &self.mapper_id)
            .field("board", &self.mapper.name())
            .field("mirroring", &self.mirroring())
            .field("battery", &self.battery)
            .field("has_trainer", &self.has_trainer)
            .field("ines_version", &self.ines_version)
            .field("crc32", &format_args!("{:08X}", self.crc32))
            .field("prg_rom_len", &self.prg_rom_len)
            .field("chr_len", &self.memory.chr_len())
            .field("chr_is_ram", &self.memory.chr_is_ram())
            .finish()
    }
}

impl Cartridge {
    // -------------- Construction --------------

    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        Self::from_ines_bytes_with(data, &LoadOptions::default())
    }

    pub fn from_ines_bytes_with(data: &[u8], options: &LoadOptions) -> Result<Self, CartridgeError> {
        let image = RomImage::parse(data)?;
        let header = image.header;

        let mut mapper_id = header.mapper_id();
        let mut mirroring = header.mirroring();
        let mut battery = header.battery();
        if let Some(fix) = options.header_fix(image.crc32) {
            log::debug!(
                "cartridge: header fix for CRC {:08X}: mapper {} -> {}",
                image.crc32,
                mapper_id,
                fix.mapper_id
            );
            mapper_id = fix.mapper_id;
            mirroring = fix.mirroring.unwrap_or(mirroring);
            battery = fix.battery.unwrap_or(battery);
        }

        let prg_rom_len = image.prg.len();
        let mut memory = CartMemory::new(image.prg, image.chr);
        memory.set_notifications(options.notifications);
        let mapper = Mapper::new(mapper_id, &memory)?;

        log::debug!(
            "cartridge: mapper {} ({}), PRG {} KiB, CHR {} KiB{}, CRC {:08X}, {:?}",
            mapper_id,
            mapper.name(),
            prg_rom_len / 1024,
            memory.chr_len() / 1024,
            if memory.chr_is_ram() { " RAM" } else { "" },
            image.crc32,
            header.version
        );

        Ok(Self {
            memory,
            mapper,
            mapper_id,
            mirroring,
            battery,
            has_trainer: image.trainer.is_some(),
            ines_version: header.version,
            crc32: image.crc32,
            prg_rom_len,
        })
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    // -------------- Bus-facing access --------------

    #[inline]
    pub fn read(&mut self, addr: u16) -> u8 {
        self.mapper.read(&self.memory, addr)
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let before = self.mirroring();
        self.mapper.write(&mut self.memory, addr, value);
        let after = self.mirroring();
        if before != after {
            self.memory.mirroring_changed(after);
        }
    }

    /// One video dot: scanline, dot within the line, and the rendering
    /// switches. Drives scanline and CPU-cycle IRQ counters.
    #[inline]
    pub fn step_video(&mut self, scanline: u16, cycle: u16, bg_enabled: bool, sprites_enabled: bool) {
        self.mapper.step_video(scanline, cycle, bg_enabled, sprites_enabled);
    }

    pub fn take_irq(&mut self) -> bool {
        self.mapper.take_irq()
    }

    pub fn irq_cancelled(&mut self) -> bool {
        self.mapper.irq_cancelled()
    }

    pub fn reset(&mut self) {
        let before = self.mirroring();
        self.mapper.reset();
        log::debug!("cartridge: {} reset", self.mapper.name());
        let after = self.mirroring();
        if before != after {
            self.memory.mirroring_changed(after);
        }
    }

    // -------------- Accessors --------------

    pub fn mirroring(&self) -> Mirroring {
        if self.mirroring == Mirroring::FourScreen {
            return Mirroring::FourScreen;
        }
        self.mapper.mirroring().unwrap_or(self.mirroring)
    }

    pub fn mapper_id(&self) -> u8 {
        self.mapper_id
    }

    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn battery_backed(&self) -> bool {
        self.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }

    pub fn ines_version(&self) -> InesVersion {
        self.ines_version
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_rom_len
    }

    pub fn chr_len(&self) -> usize {
        self.memory.chr_len()
    }

    pub fn chr_is_ram(&self) -> bool {
        self.memory.chr_is_ram()
    }

    // -------------- Save RAM and notifications --------------

    pub fn save_ram(&self) -> &SaveRam {
        self.memory.save_ram()
    }

    pub fn save_ram_mut(&mut self) -> &mut SaveRam {
        self.memory.save_ram_mut()
    }

    pub fn set_notifications(&mut self, on: bool) {
        self.memory.set_notifications(on);
    }

    /// Drain queued bank-switch and mirroring notifications.
    pub fn take_events(&mut self) -> Vec<MapperEvent> {
        self.memory.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc32::{checksum, forge_suffix};
    use crate::test_utils::{build_ines, build_mapper_rom};

    #[test]
    fn parse_simple_nrom_32k_chr8k() {
        let data = build_ines(2, 1, 0b0000_0001, 0, 1, None);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");

        assert_eq!(cart.mapper_id(), 0);
        assert_eq!(cart.mapper_name(), "NROM");
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert_eq!(cart.prg_rom_len(), 32 * 1024);
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(!cart.chr_is_ram());
        assert_eq!(cart.read(0x8000), 0xAA);
        assert_eq!(cart.read(0xFFFF), 0xAA);
        assert_eq!(cart.read(0x0000), 0xCC);
    }

    #[test]
    fn parse_nrom_16k_chr_ram() {
        let data = build_ines(1, 0, 0, 0, 0, None);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");

        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
        assert_eq!(cart.prg_rom_len(), 16 * 1024);
        assert_eq!(cart.chr_len(), 8 * 1024);
        assert!(cart.chr_is_ram());
        assert_eq!(cart.read(0x8000), cart.read(0xC000));

        cart.write(0x0010, 0x5A);
        assert_eq!(cart.read(0x0010), 0x5A);
    }

    #[test]
    fn trainer_is_skipped_and_checksummed() {
        let mut trainer = [0u8; 512];
        for (i, b) in trainer.iter_mut().enumerate() {
            *b = (i & 0xFF) as u8;
        }
        let data = build_ines(1, 1, 0b0000_0100, 0, 1, Some(&trainer));
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert!(cart.has_trainer());
        assert_eq!(cart.read(0x8000), 0xAA);
        assert_eq!(cart.crc32(), checksum(&data[16..]));
    }

    #[test]
    fn crc_excludes_synthesized_chr_ram() {
        let data = build_ines(1, 0, 0, 0, 0, None);
        let cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert_eq!(cart.crc32(), checksum(&data[16..16 + 0x4000]));
    }

    #[test]
    fn nes2_headers_load() {
        let data = build_ines(1, 1, 0, 0b0000_1000, 1, None);
        let cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert_eq!(cart.ines_version(), InesVersion::Nes20);
        assert_eq!(cart.mapper_id(), 0);
    }

    #[test]
    fn bad_signature_and_unknown_mapper_fail() {
        let mut data = build_ines(1, 1, 0, 0, 1, None);
        data[0] = b'X';
        assert!(matches!(
            Cartridge::from_ines_bytes(&data),
            Err(CartridgeError::Format(_))
        ));

        let data = build_mapper_rom(5, 2, 1, 0);
        assert!(matches!(
            Cartridge::from_ines_bytes(&data),
            Err(CartridgeError::UnsupportedMapper(5))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Cartridge::from_ines_file("/nonexistent/definitely-missing.nes").unwrap_err();
        assert!(matches!(err, CartridgeError::Io(_)));
    }

    #[test]
    fn save_ram_read_write_and_restore() {
        let data = build_ines(2, 1, 0b0000_0010, 0, 1, None);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert!(cart.battery_backed());

        cart.write(0x6000, 0x42);
        assert_eq!(cart.read(0x6000), 0x42);
        assert!(cart.save_ram().is_dirty());

        let image = cart.save_ram().as_bytes().to_vec();
        cart.save_ram_mut().mark_clean();

        let mut fresh = Cartridge::from_ines_bytes(&data).expect("parse");
        fresh.save_ram_mut().load(&image).expect("load");
        assert_eq!(fresh.read(0x6000), 0x42);
        assert!(!fresh.save_ram().is_dirty());
    }

    #[test]
    fn header_fix_overrides_mapper_and_flags() {
        // Header claims mapper 5 (unsupported); the fix table says UxROM.
        let data = build_mapper_rom(5, 4, 0, 0);
        let crc = checksum(&data[16..]);
        let table = format!("# known bad dumps\n\n{crc:08x} 2 v battery  # fixed\n");
        let options = LoadOptions {
            header_fixes: HeaderFix::parse_table(&table).expect("table"),
            notifications: false,
        };
        let mut cart = Cartridge::from_ines_bytes_with(&data, &options).expect("parse");
        assert_eq!(cart.mapper_id(), 2);
        assert_eq!(cart.mapper_name(), "UxROM");
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert!(cart.battery_backed());
        assert_eq!(cart.read(0xC000), 6);
    }

    /// UxROM-sized image with a mapper 5 header whose CRC is forced to
    /// the Rainbow Islands entry of the built-in table.
    fn mislabelled_rainbow_islands() -> Vec<u8> {
        let mut data = build_mapper_rom(5, 8, 0, 0);
        let tail_at = data.len() - 4;
        let tail = forge_suffix(&data[16..tail_at], 0x9EA1_DC76);
        data[tail_at..].copy_from_slice(&tail);
        data
    }

    #[test]
    fn builtin_fix_applies_by_default() {
        let data = mislabelled_rainbow_islands();
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert_eq!(cart.crc32(), 0x9EA1_DC76);
        assert_eq!(cart.mapper_id(), 2);
        assert_eq!(cart.mapper_name(), "UxROM");
        assert_eq!(cart.mirroring(), Mirroring::Horizontal);
        assert_eq!(cart.read(0xC000), 14);
    }

    #[test]
    fn host_fix_wins_over_builtin() {
        let data = mislabelled_rainbow_islands();
        let options = LoadOptions {
            header_fixes: HeaderFix::parse_table("9ea1dc76 7").expect("table"),
            notifications: false,
        };
        let cart = Cartridge::from_ines_bytes_with(&data, &options).expect("parse");
        assert_eq!(cart.mapper_id(), 7);
        assert_eq!(cart.mapper_name(), "AxROM");
    }

    #[test]
    fn builtin_table_has_unique_checksums() {
        for (i, fix) in KNOWN_HEADER_FIXES.iter().enumerate() {
            assert!(
                KNOWN_HEADER_FIXES[i + 1..].iter().all(|f| f.crc32 != fix.crc32),
                "duplicate {:08X}",
                fix.crc32
            );
        }
    }

    #[test]
    fn fix_table_errors_report_line() {
        let err = HeaderFix::parse_table("1234 0\nzzzz 1\n").unwrap_err();
        assert_eq!(err.line, 2);
        let err = HeaderFix::parse_table("0x1234 300").unwrap_err();
        assert_eq!(err.line, 1);
        let err = HeaderFix::parse_table("1234 1 x").unwrap_err();
        assert!(err.reason.contains("unknown flag"));
        let fixes = HeaderFix::parse_table("0XDEADBEEF 4 4 nobattery").expect("table");
        assert_eq!(
            fixes,
            vec![HeaderFix {
                crc32: 0xDEAD_BEEF,
                mapper_id: 4,
                mirroring: Some(Mirroring::FourScreen),
                battery: Some(false),
            }]
        );
    }

    #[test]
    fn four_screen_overrides_board_mirroring() {
        let data = build_mapper_rom(4, 2, 1, 0b0000_1000);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");
        assert_eq!(cart.mirroring(), Mirroring::FourScreen);
        cart.write(0xA000, 1);
        assert_eq!(cart.mirroring(), Mirroring::FourScreen);
    }

    #[test]
    fn mirroring_change_is_notified_once() {
        let data = build_mapper_rom(7, 4, 0, 0);
        let options = LoadOptions {
            notifications: true,
            ..LoadOptions::default()
        };
        let mut cart = Cartridge::from_ines_bytes_with(&data, &options).expect("parse");
        cart.write(0x8000, 0x10);
        cart.write(0x8000, 0x11);
        let events = cart.take_events();
        let changes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, MapperEvent::MirroringChanged(_)))
            .collect();
        assert_eq!(
            changes,
            vec![&MapperEvent::MirroringChanged(Mirroring::SingleScreenUpper)]
        );
        assert!(events.contains(&MapperEvent::BankSwitched {
            addr: 0x8000,
            len: 0x8000
        }));
    }

    #[test]
    fn events_are_dropped_when_notifications_are_off() {
        let data = build_mapper_rom(7, 4, 0, 0);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");
        cart.write(0x8000, 0x10);
        assert!(cart.take_events().is_empty());
        cart.set_notifications(true);
        cart.write(0x8000, 0x00);
        assert_eq!(cart.take_events().len(), 2);
    }

    #[test]
    fn reset_restores_power_on_banks() {
        let data = build_mapper_rom(2, 4, 0, 0);
        let mut cart = Cartridge::from_ines_bytes(&data).expect("parse");
        cart.write(0x8000, 2);
        assert_eq!(cart.read(0x8000), 4);
        cart.reset();
        assert_eq!(cart.read(0x8000), 0);
    }
}
