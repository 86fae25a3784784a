//! # OxiZip AES
//!
//! Password-protected single-entry ZIP containers in the WinZip AE-1
//! format (AES-256).
//!
//! The plaintext is compressed with raw DEFLATE, encrypted with AES-256 in
//! CTR mode and authenticated with a truncated HMAC-SHA1. Keys come from
//! PBKDF2-HMAC-SHA1 over the password and a random 16-byte salt. The result
//! is a complete ZIP archive with one entry named `data` that standard
//! tools (7-Zip, WinZip) can open.
//!
//! ## Example
//!
//! ```rust
//! let container = oxizip_aes::encode(b"Hello, World!", b"secret").unwrap();
//! assert_eq!(&container[..4], b"PK\x03\x04");
//!
//! let plaintext = oxizip_aes::decode(&container, b"secret").unwrap();
//! assert_eq!(plaintext, b"Hello, World!");
//! ```
//!
//! ## Failure modes
//!
//! Decoding distinguishes a malformed container, a wrong password, tampered
//! ciphertext and a CRC mismatch; see [`ErrorKind`].
//!
//! ```rust
//! use oxizip_aes::ErrorKind;
//!
//! let container = oxizip_aes::encode(b"top secret", b"right").unwrap();
//! let err = oxizip_aes::decode(&container, b"wrong").unwrap_err();
//! assert!(matches!(err.kind(), ErrorKind::WrongPassword | ErrorKind::Tamper));
//! ```
//!
//! ## Backends
//!
//! [`Encoder`] and [`Decoder`] are generic over a
//! [`CryptoProvider`](oxizip_core::CryptoProvider) and a
//! [`CompressionProvider`](oxizip_core::CompressionProvider). The defaults
//! are [`RustCrypto`] and [`oxizip_deflate::Deflater`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod zip;

// Re-exports
pub use config::{EncodeOptions, ZipCompressionLevel};
pub use oxizip_core::error::{ErrorKind, OxiZipError, Result};
pub use zip::{Decoder, Encoder, EntryInfo, RustCrypto, read_entry_info};

/// Encrypt `plaintext` under `password` with the default settings.
pub fn encode(plaintext: impl AsRef<[u8]>, password: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    Encoder::new().encode(plaintext.as_ref(), password.as_ref())
}

/// Authenticate and decrypt a container produced by [`encode`].
pub fn decode(container: impl AsRef<[u8]>, password: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    Decoder::new().decode(container.as_ref(), password.as_ref())
}
