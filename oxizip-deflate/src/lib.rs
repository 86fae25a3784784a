//! # OxiZip Deflate
//!
//! Raw DEFLATE (RFC 1951) backend for the OxiZip container codec.
//!
//! The streams carry no zlib or gzip framing, which is what ZIP method 8
//! expects. Compression itself is done by `flate2`, using its pure Rust
//! backend unless the `zlib` feature selects the system library.
//!
//! ## Example
//!
//! ```rust
//! use oxizip_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//!
//! let decompressed = inflate(&compressed, original.len()).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression
//! - Level 4-6: Balanced
//! - Level 7-9: Best compression (slower); the container default is 8

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use oxizip_core::error::ProviderError;
use oxizip_core::traits::CompressionProvider;
use std::io::Write;
use zeroize::Zeroizing;

/// Highest DEFLATE level.
pub const MAX_LEVEL: u32 = 9;

/// Compress `data` into a raw DEFLATE stream at `level` (clamped to 0-9).
pub fn deflate(data: &[u8], level: u32) -> Result<Vec<u8>, ProviderError> {
    let capacity = data.len() / 2 + 64;
    let mut encoder = DeflateEncoder::new(
        Vec::with_capacity(capacity),
        Compression::new(level.min(MAX_LEVEL)),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Output grows in steps of at least this many bytes.
const GROW_STEP: usize = 64 * 1024;

/// Decompress a raw DEFLATE stream that must expand to exactly `expected_len` bytes.
///
/// `expected_len` is only a ceiling: the output buffer grows with what the
/// stream actually produces and stops one byte past it, so an overlong or
/// lying length is rejected without allocating the declared size. Partial
/// output is wiped before an error is returned.
pub fn inflate(data: &[u8], expected_len: usize) -> Result<Vec<u8>, ProviderError> {
    let mut decompress = Decompress::new(false);
    // One spare byte so that overlong streams are detected, not truncated
    let limit = expected_len.saturating_add(1);
    let mut output = Zeroizing::new(Vec::with_capacity(limit.min(GROW_STEP)));

    let status = loop {
        if output.len() == output.capacity() {
            let step = GROW_STEP.max(output.len()).min(limit - output.len());
            grow(&mut output, step);
        }

        let consumed = decompress.total_in() as usize;
        let produced = output.len();
        let status = decompress
            .decompress_vec(&data[consumed..], &mut *output, FlushDecompress::Finish)
            .map_err(|e| ProviderError::new(format!("corrupt deflate stream: {e}")))?;

        if status == Status::StreamEnd || output.len() >= limit {
            break status;
        }
        // Input exhausted without the end of stream
        if decompress.total_in() as usize == consumed && output.len() == produced {
            break status;
        }
    };

    if output.len() != expected_len {
        return Err(ProviderError::new(format!(
            "inflated size mismatch: expected {} bytes, got {}",
            expected_len,
            output.len()
        )));
    }

    if status != Status::StreamEnd {
        return Err(ProviderError::new("deflate stream is truncated"));
    }

    Ok(std::mem::take(&mut *output))
}

/// Move `output` into a buffer with `additional` more capacity.
///
/// The old allocation is wiped on drop instead of being released by `reserve`.
fn grow(output: &mut Zeroizing<Vec<u8>>, additional: usize) {
    let mut bigger = Zeroizing::new(Vec::with_capacity(output.len() + additional));
    bigger.extend_from_slice(&output[..]);
    std::mem::swap(output, &mut bigger);
}

/// [`CompressionProvider`] producing raw DEFLATE at a fixed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deflater {
    level: u32,
}

impl Deflater {
    /// Create a backend compressing at `level` (clamped to 0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
        }
    }

    /// The compression level in use.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::new(8)
    }
}

impl CompressionProvider for Deflater {
    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>, ProviderError> {
        deflate(data, self.level)
    }

    fn inflate(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>, ProviderError> {
        inflate(data, expected_len)
    }
}
