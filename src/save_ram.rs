/*!
Battery-backed save RAM window ($6000-$7FFF).

The region is a fixed 8 KiB block. Every write through the mapper marks it
dirty; a host persists `as_bytes()` when `is_dirty()` and then calls
`mark_clean()`. Persistence itself (files, timing) stays with the host.
*/

use crate::error::SaveRamError;

pub const SAVE_RAM_LEN: usize = 8 * 1024;

#[derive(Clone)]
pub struct SaveRam {
    bytes: Box<[u8; SAVE_RAM_LEN]>,
    dirty: bool,
}

impl std::fmt::Debug for SaveRam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveRam")
            .field("len", &SAVE_RAM_LEN)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Default for SaveRam {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveRam {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; SAVE_RAM_LEN]),
            dirty: false,
        }
    }

    /// Read at an offset; offsets wrap within the 8 KiB block.
    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.bytes[offset % SAVE_RAM_LEN]
    }

    #[inline]
    pub fn write(&mut self, offset: usize, value: u8) {
        self.bytes[offset % SAVE_RAM_LEN] = value;
        self.dirty = true;
    }

    /// Replace the contents with a previously persisted image. Leaves the
    /// region clean.
    pub fn load(&mut self, image: &[u8]) -> Result<(), SaveRamError> {
        if image.len() != SAVE_RAM_LEN {
            return Err(SaveRamError::SizeMismatch {
                expected: SAVE_RAM_LEN,
                actual: image.len(),
            });
        }
        self.bytes.copy_from_slice(image);
        self.dirty = false;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_sets_dirty_and_wraps() {
        let mut ram = SaveRam::new();
        assert!(!ram.is_dirty());
        ram.write(SAVE_RAM_LEN + 3, 0x77);
        assert_eq!(ram.read(3), 0x77);
        assert!(ram.is_dirty());
        ram.mark_clean();
        assert!(!ram.is_dirty());
    }

    #[test]
    fn load_requires_exact_size() {
        let mut ram = SaveRam::new();
        let err = ram.load(&[0u8; 100]).unwrap_err();
        assert!(matches!(
            err,
            SaveRamError::SizeMismatch {
                expected: SAVE_RAM_LEN,
                actual: 100
            }
        ));

        let image = vec![0x5A; SAVE_RAM_LEN];
        ram.write(0, 1);
        ram.load(&image).expect("load");
        assert_eq!(ram.as_bytes(), &image[..]);
        assert!(!ram.is_dirty());
    }
}
