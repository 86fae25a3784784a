//! CRC-32 (ISO 3309) as stored in ZIP headers.
//!
//! The checksum itself comes from `crc32fast`, which picks a SIMD
//! implementation at runtime where the CPU supports one. This type only
//! fixes the API the container code uses.

/// CRC-32 calculator.
///
/// - Polynomial: 0x04C11DB7 (reflected 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
///
/// # Example
///
/// ```
/// use oxizip_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.hasher.reset();
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Get the current CRC value (without finalizing).
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Finalize and return the CRC value.
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}
