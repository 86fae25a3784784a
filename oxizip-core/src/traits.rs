//! Capability traits for the primitives the container codec builds on.
//!
//! The codec never implements PBKDF2, AES, HMAC or DEFLATE itself. It asks a
//! [`CryptoProvider`] and a [`CompressionProvider`] for them, so any backend
//! implementing the standard algorithms can be plugged in.

use crate::error::ProviderError;

/// A keyed single-block AES encryptor (ECB on one 16-byte block).
pub trait BlockEncryptor {
    /// Encrypt one block in place.
    fn encrypt_block(&self, block: &mut [u8; 16]);
}

/// Cryptographic primitives required by WinZip AES encryption.
pub trait CryptoProvider: Send + Sync {
    /// Keyed AES-256 block encryptor produced by [`CryptoProvider::block_encryptor`].
    type Block: BlockEncryptor;

    /// Fill `output` with PBKDF2-HMAC-SHA1(`password`, `salt`, `iterations`).
    fn derive_key(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        output: &mut [u8],
    ) -> Result<(), ProviderError>;

    /// Expand an AES-256 key into a block encryptor.
    fn block_encryptor(&self, key: &[u8; 32]) -> Result<Self::Block, ProviderError>;

    /// Full 20-byte HMAC-SHA1 of `data` under `key`.
    fn hmac_sha1(&self, key: &[u8], data: &[u8]) -> Result<[u8; 20], ProviderError>;

    /// Fill `output` with cryptographically secure random bytes.
    fn random_bytes(&self, output: &mut [u8]) -> Result<(), ProviderError>;
}

/// Raw DEFLATE (RFC 1951, no zlib or gzip framing).
pub trait CompressionProvider: Send + Sync {
    /// Compress `data` into a raw DEFLATE stream.
    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// Decompress a raw DEFLATE stream that must expand to exactly
    /// `expected_len` bytes. Output beyond `expected_len` is never produced.
    fn inflate(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>, ProviderError>;
}
