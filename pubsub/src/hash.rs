//! 32-bit FNV-1a hashing for topic segments and option values.

/// FNV-1a 32-bit offset basis.
pub const OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
pub const PRIME: u32 = 16_777_619;

/// Hashes `bytes` with 32-bit FNV-1a.
///
/// The result is stable across calls and process runs. Empty input yields
/// [`OFFSET_BASIS`].
#[inline]
pub fn hash(bytes: &[u8]) -> u32 {
    let mut h = Fnv32::new();
    h.write(bytes);
    h.finish()
}

/// Incremental FNV-1a hasher.
///
/// Feeding `a` then `b` gives the same digest as [`hash`] over `a ++ b`,
/// so concatenations never need a temporary buffer.
#[derive(Debug, Clone, Copy)]
pub struct Fnv32 {
    state: u32,
}

impl Default for Fnv32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Fnv32 {
    /// Creates a hasher at the offset basis.
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }

    /// Feeds more bytes into the hasher.
    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u32;
            self.state = self.state.wrapping_mul(PRIME);
        }
    }

    /// Returns the current digest.
    #[inline]
    pub const fn finish(&self) -> u32 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(hash(b""), OFFSET_BASIS);
        assert_eq!(hash(b"a"), 0xe40c_292c);
        assert_eq!(hash(b"a/"), 0x0224_8fb9);
        assert_eq!(hash(b"42"), 0x87e3_8583);
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let mut h = Fnv32::new();
        h.write(b"a/");
        h.write(b"42");
        assert_eq!(h.finish(), hash(b"a/42"));
        assert_eq!(h.finish(), 0x2881_c41f);
    }
}
