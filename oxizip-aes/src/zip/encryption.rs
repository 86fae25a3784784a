//! WinZip AES-256 key material, CTR keystream and authentication code.
//!
//! - Keys: PBKDF2-HMAC-SHA1(password, salt, 1000) stretched to 66 bytes and
//!   split into the AES key, the HMAC key and the 2-byte verification value.
//! - Cipher: AES-256 in CTR mode with a 64-bit little-endian counter in the
//!   low 8 bytes of the counter block. The counter is incremented before
//!   each block, so the first keystream block is `AES(01 00 .. 00)`.
//! - Authentication: the first 10 bytes of HMAC-SHA1 over the ciphertext.

use std::fmt;

use oxizip_core::error::{OxiZipError, Result};
use oxizip_core::traits::{BlockEncryptor, CryptoProvider};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::header::{PASSWORD_VERIFICATION_LEN, SALT_LEN, WINZIP_AUTH_CODE_LEN};

/// PBKDF2 iteration count fixed by the WinZip format.
pub const PBKDF2_ITERATIONS: u32 = 1000;

/// AES-256 key length.
pub const AES_KEY_LEN: usize = 32;

/// HMAC-SHA1 key length (same as the AES key for WinZip).
pub const HMAC_KEY_LEN: usize = 32;

/// Total PBKDF2 output: AES key, HMAC key, verification value.
pub const DERIVED_KEY_LEN: usize = AES_KEY_LEN + HMAC_KEY_LEN + PASSWORD_VERIFICATION_LEN;

/// AES block size.
const BLOCK_LEN: usize = 16;

/// Key material derived from a password and salt.
///
/// All three parts are wiped when the context is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionContext {
    aes_key: [u8; AES_KEY_LEN],
    hmac_key: [u8; HMAC_KEY_LEN],
    verification: [u8; PASSWORD_VERIFICATION_LEN],
}

impl EncryptionContext {
    /// Derive keys for `password` and `salt`.
    ///
    /// An empty password is rejected before the provider is called.
    pub fn derive<C: CryptoProvider>(
        provider: &C,
        password: &[u8],
        salt: &[u8; SALT_LEN],
    ) -> Result<Self> {
        if password.is_empty() {
            return Err(OxiZipError::key_derivation("password is empty"));
        }

        let mut derived = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
        provider
            .derive_key(password, salt, PBKDF2_ITERATIONS, derived.as_mut_slice())
            .map_err(|e| OxiZipError::key_derivation(e.message()))?;

        let mut ctx = Self {
            aes_key: [0u8; AES_KEY_LEN],
            hmac_key: [0u8; HMAC_KEY_LEN],
            verification: [0u8; PASSWORD_VERIFICATION_LEN],
        };
        ctx.aes_key.copy_from_slice(&derived[..AES_KEY_LEN]);
        ctx.hmac_key
            .copy_from_slice(&derived[AES_KEY_LEN..AES_KEY_LEN + HMAC_KEY_LEN]);
        ctx.verification
            .copy_from_slice(&derived[AES_KEY_LEN + HMAC_KEY_LEN..]);
        Ok(ctx)
    }

    /// The password verification value stored after the salt.
    pub fn verification(&self) -> [u8; PASSWORD_VERIFICATION_LEN] {
        self.verification
    }

    /// Compare a stored verification value with the derived one.
    pub fn verify_password(&self, stored: &[u8; PASSWORD_VERIFICATION_LEN]) -> bool {
        self.verification[..].ct_eq(&stored[..]).into()
    }

    /// A fresh CTR keystream starting at counter 1.
    pub fn cipher<C: CryptoProvider>(&self, provider: &C) -> Result<AesCtr<C::Block>> {
        provider
            .block_encryptor(&self.aes_key)
            .map(AesCtr::new)
            .map_err(|e| OxiZipError::cipher(e.message()))
    }

    /// Truncated HMAC-SHA1 of `ciphertext`.
    pub fn authentication_tag<C: CryptoProvider>(
        &self,
        provider: &C,
        ciphertext: &[u8],
    ) -> Result<[u8; WINZIP_AUTH_CODE_LEN]> {
        let full = Zeroizing::new(
            provider
                .hmac_sha1(&self.hmac_key, ciphertext)
                .map_err(|e| OxiZipError::hmac(e.message()))?,
        );
        let mut tag = [0u8; WINZIP_AUTH_CODE_LEN];
        tag.copy_from_slice(&full[..WINZIP_AUTH_CODE_LEN]);
        Ok(tag)
    }

    /// Recompute the tag over `ciphertext` and compare it in constant time.
    pub fn verify_tag<C: CryptoProvider>(
        &self,
        provider: &C,
        ciphertext: &[u8],
        stored: &[u8; WINZIP_AUTH_CODE_LEN],
    ) -> Result<bool> {
        let computed = self.authentication_tag(provider, ciphertext)?;
        Ok(computed[..].ct_eq(&stored[..]).into())
    }
}

impl fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionContext")
            .field("aes_key", &"<redacted>")
            .field("hmac_key", &"<redacted>")
            .field("verification", &"<redacted>")
            .finish()
    }
}

/// AES-CTR keystream in the WinZip counter layout.
///
/// State carries across [`AesCtr::process`] calls, so a payload may be fed
/// in arbitrary chunks. Encryption and decryption are the same operation.
pub struct AesCtr<B: BlockEncryptor> {
    cipher: B,
    counter: u64,
    keystream: [u8; BLOCK_LEN],
    keystream_pos: usize,
}

impl<B: BlockEncryptor> AesCtr<B> {
    /// Wrap a keyed block encryptor. No keystream is generated yet.
    pub fn new(cipher: B) -> Self {
        Self {
            cipher,
            counter: 0,
            keystream: [0u8; BLOCK_LEN],
            // Force keystream generation on first use
            keystream_pos: BLOCK_LEN,
        }
    }

    /// XOR the keystream into `data` in place.
    pub fn process(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.keystream_pos == BLOCK_LEN {
                self.next_block();
            }
            *byte ^= self.keystream[self.keystream_pos];
            self.keystream_pos += 1;
        }
    }

    /// Number of keystream blocks generated so far (the last counter used).
    #[cfg(test)]
    fn blocks_used(&self) -> u64 {
        self.counter
    }

    fn next_block(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        let mut block = [0u8; BLOCK_LEN];
        block[..8].copy_from_slice(&self.counter.to_le_bytes());
        self.cipher.encrypt_block(&mut block);
        self.keystream = block;
        self.keystream_pos = 0;
    }
}

impl<B: BlockEncryptor> Drop for AesCtr<B> {
    fn drop(&mut self) {
        self.keystream.zeroize();
    }
}
