//! WinZip AE-1 encrypted ZIP container.
//!
//! A container holds exactly one entry named `data`, DEFLATE-compressed and
//! then encrypted with AES-256-CTR, authenticated with HMAC-SHA1.

pub mod codec;
pub mod crypto;
pub mod encryption;
pub mod header;

pub use codec::{Decoder, Encoder, EntryInfo, read_entry_info};
pub use crypto::{Aes256Block, RustCrypto};
pub use encryption::{AesCtr, EncryptionContext};
pub use header::{AesExtraField, LocalFileHeader, ParsedEntry};
