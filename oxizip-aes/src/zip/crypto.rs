//! Default [`CryptoProvider`] backed by the RustCrypto crates.

use aes::Aes256;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use hmac::{Hmac, Mac};
use oxizip_core::error::ProviderError;
use oxizip_core::traits::{BlockEncryptor, CryptoProvider};
use rand::RngCore;
use rand::rngs::OsRng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// AES-256 key schedule. Round keys are wiped on drop.
pub struct Aes256Block(Aes256);

impl BlockEncryptor for Aes256Block {
    fn encrypt_block(&self, block: &mut [u8; 16]) {
        self.0.encrypt_block(GenericArray::from_mut_slice(&mut block[..]));
    }
}

/// PBKDF2, AES, HMAC-SHA1 and the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCrypto;

impl CryptoProvider for RustCrypto {
    type Block = Aes256Block;

    fn derive_key(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        output: &mut [u8],
    ) -> Result<(), ProviderError> {
        pbkdf2::pbkdf2::<HmacSha1>(password, salt, iterations, output)
            .map_err(|e| ProviderError::new(format!("PBKDF2 failed: {e}")))
    }

    fn block_encryptor(&self, key: &[u8; 32]) -> Result<Self::Block, ProviderError> {
        Aes256::new_from_slice(key)
            .map(Aes256Block)
            .map_err(|e| ProviderError::new(format!("AES key setup failed: {e}")))
    }

    fn hmac_sha1(&self, key: &[u8], data: &[u8]) -> Result<[u8; 20], ProviderError> {
        let mut mac = <HmacSha1 as Mac>::new_from_slice(key)
            .map_err(|e| ProviderError::new(format!("HMAC key setup failed: {e}")))?;
        mac.update(data);

        let mut tag = [0u8; 20];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(tag)
    }

    fn random_bytes(&self, output: &mut [u8]) -> Result<(), ProviderError> {
        OsRng
            .try_fill_bytes(output)
            .map_err(|e| ProviderError::new(format!("OS random source failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_sha1() {
        // RFC 6070 test vector
        let mut out = [0u8; 20];
        RustCrypto.derive_key(b"password", b"salt", 1, &mut out).unwrap();
        let expected = [
            0x0c, 0x60, 0xc8, 0x0f, 0x96, 0x1f, 0x0e, 0x71, 0xf3, 0xa9, 0xb5, 0x24, 0xaf, 0x60,
            0x12, 0x06, 0x2f, 0xe0, 0x37, 0xa6,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_pbkdf2_sha1_4096_iterations() {
        // RFC 6070 test vector
        let mut out = [0u8; 20];
        RustCrypto
            .derive_key(b"password", b"salt", 4096, &mut out)
            .unwrap();
        let expected = [
            0x4b, 0x00, 0x79, 0x01, 0xb7, 0x65, 0x48, 0x9a, 0xbe, 0xad, 0x49, 0xd9, 0x26, 0xf7,
            0x21, 0xd0, 0x65, 0xa4, 0x29, 0xc1,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_pbkdf2_output_longer_than_digest() {
        // 66 bytes spans four HMAC blocks; the first 20 match a 20-byte request
        let mut long = [0u8; 66];
        let mut short = [0u8; 20];
        RustCrypto.derive_key(b"pw", &[7; 16], 1000, &mut long).unwrap();
        RustCrypto.derive_key(b"pw", &[7; 16], 1000, &mut short).unwrap();
        assert_eq!(&long[..20], &short);
    }

    #[test]
    fn test_aes256_encrypt() {
        // NIST test vector (FIPS 197 Appendix C.3)
        let key: [u8; 32] = core::array::from_fn(|i| i as u8);
        let mut block: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let expected: [u8; 16] = [
            0x8e, 0xa2, 0xb7, 0xca, 0x51, 0x67, 0x45, 0xbf, 0xea, 0xfc, 0x49, 0x90, 0x4b, 0x49,
            0x60, 0x89,
        ];

        let cipher = RustCrypto.block_encryptor(&key).unwrap();
        cipher.encrypt_block(&mut block);
        assert_eq!(block, expected);
    }

    #[test]
    fn test_hmac_sha1() {
        // RFC 2202 test vector 1
        let result = RustCrypto.hmac_sha1(&[0x0b; 20], b"Hi There").unwrap();
        let expected = [
            0xb6, 0x17, 0x31, 0x86, 0x55, 0x05, 0x72, 0x64, 0xe2, 0x8b, 0xc0, 0xb6, 0xfb, 0x37,
            0x8c, 0x8e, 0xf1, 0x46, 0xbe, 0x00,
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_hmac_sha1_key_longer_than_block() {
        // RFC 2202 test vector 6
        let result = RustCrypto
            .hmac_sha1(
                &[0xaa; 80],
                b"Test Using Larger Than Block-Size Key - Hash Key First",
            )
            .unwrap();
        let expected = [
            0xaa, 0x4a, 0xe5, 0xe1, 0x52, 0x72, 0xd0, 0x0e, 0x95, 0x70, 0x56, 0x37, 0xce, 0x8a,
            0x3b, 0x55, 0xed, 0x40, 0x21, 0x12,
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_random_bytes() {
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        RustCrypto.random_bytes(&mut a).unwrap();
        RustCrypto.random_bytes(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
