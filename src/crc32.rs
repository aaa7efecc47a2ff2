//! CRC-32 (IEEE 802.3, reflected polynomial 0xEDB88320) used to identify
//! ROM images for header fixes.

const POLY: u32 = 0xEDB8_8320;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Running checksum over several slices (trainer, PRG, CHR).
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = TABLE[((self.state ^ b as u32) & 0xFF) as usize] ^ (self.state >> 8);
        }
    }

    pub fn finish(self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }
}

/// One-shot checksum of a single slice.
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(bytes);
    crc.finish()
}

/// Four bytes that, appended to `prefix`, make the checksum come out as
/// `target`. Used by tests to build images that hit a keyed table entry.
#[cfg(test)]
pub(crate) fn forge_suffix(prefix: &[u8], target: u32) -> [u8; 4] {
    let mut crc = Crc32::new();
    crc.update(prefix);

    // Walk the register back from the wanted final state. The top byte of
    // each table entry is unique, so it names the index consumed last.
    let mut state = target ^ 0xFFFF_FFFF;
    for _ in 0..4 {
        let index = TABLE
            .iter()
            .position(|t| t >> 24 == state >> 24)
            .expect("top bytes cover 0..=255");
        state = ((state ^ TABLE[index]) << 8) | index as u32;
    }
    (state ^ crc.state).to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_input() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn forged_suffix_hits_the_target() {
        let mut data = b"123456789".to_vec();
        let tail = forge_suffix(&data, 0x9EA1_DC76);
        data.extend_from_slice(&tail);
        assert_eq!(checksum(&data), 0x9EA1_DC76);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut crc = Crc32::new();
        crc.update(b"1234");
        crc.update(b"56789");
        assert_eq!(crc.finish(), checksum(b"123456789"));
    }
}
