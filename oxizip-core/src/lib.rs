//! # OxiZip Core
//!
//! Core components for the OxiZip AES container library.
//!
//! This crate provides the building blocks shared by the other crates:
//!
//! - [`le`]: Little-endian field writer/reader for ZIP records
//! - [`crc`]: CRC-32 checksum
//! - [`dostime`]: MS-DOS date/time stamps
//! - [`traits`]: Capability traits for crypto and compression backends
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Container (oxizip-aes)                              │
//! │     AE-1 encoder/decoder, headers, CTR, key derivation  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec (oxizip-deflate)                              │
//! │     Raw DEFLATE/INFLATE backend                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     LeWriter/LeReader, CRC, DOS time, provider traits   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxizip_core::crc::Crc32;
//! use oxizip_core::le::LeWriter;
//!
//! let mut w = LeWriter::new();
//! w.put_u32(Crc32::compute(b"Hello, World!"));
//! assert_eq!(w.into_inner(), [0xD0, 0xC3, 0x4A, 0xEC]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod dostime;
pub mod error;
pub mod le;
pub mod traits;

// Re-exports for convenience
pub use crc::Crc32;
pub use dostime::DosDateTime;
pub use error::{ErrorKind, OxiZipError, ProviderError, Result};
pub use le::{LeReader, LeWriter};
pub use traits::{BlockEncryptor, CompressionProvider, CryptoProvider};
