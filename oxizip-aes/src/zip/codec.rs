//! AE-1 container encoder and decoder.

use std::time::SystemTime;

use oxizip_core::crc::Crc32;
use oxizip_core::dostime::DosDateTime;
use oxizip_core::error::{OxiZipError, Result};
use oxizip_core::traits::{CompressionProvider, CryptoProvider};
use oxizip_deflate::Deflater;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::crypto::RustCrypto;
use super::encryption::EncryptionContext;
use super::header::{LocalFileHeader, ParsedEntry, SALT_LEN, write_container};
use crate::config::EncodeOptions;

/// Encrypts a payload into a single-entry AE-1 container.
#[derive(Debug, Clone)]
pub struct Encoder<C = RustCrypto, Z = Deflater> {
    crypto: C,
    compression: Z,
    // The level only configures the default `Deflater`
    options: EncodeOptions,
}

impl Encoder {
    /// Encoder with the default backends and options.
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }

    /// Encoder with the default backends configured by `options`.
    pub fn with_options(options: EncodeOptions) -> Self {
        Self {
            crypto: RustCrypto,
            compression: Deflater::new(options.level.level()),
            options,
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CryptoProvider, Z: CompressionProvider> Encoder<C, Z> {
    /// Encoder over custom backends, stamping the current time.
    pub fn with_providers(crypto: C, compression: Z) -> Self {
        Self {
            crypto,
            compression,
            options: EncodeOptions::default(),
        }
    }

    /// Use a fixed modification time instead of the current one.
    ///
    /// The DOS timestamp is written in UTC.
    pub fn modified(mut self, time: SystemTime) -> Self {
        self.options = self.options.with_modified(time);
        self
    }

    /// Compress, encrypt and authenticate `plaintext` under `password`.
    pub fn encode(&self, plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(OxiZipError::params("plaintext is empty"));
        }
        if password.is_empty() {
            return Err(OxiZipError::params("password is empty"));
        }

        let crc = Crc32::compute(plaintext);
        let mut payload = Zeroizing::new(
            self.compression
                .deflate(plaintext)
                .map_err(|e| OxiZipError::compression(e.message()))?,
        );
        debug!(
            plaintext_len = plaintext.len(),
            compressed_len = payload.len(),
            "deflated payload"
        );

        let header = LocalFileHeader::for_payload(
            crc,
            payload.len(),
            plaintext.len(),
            self.options.dos_time(),
        )?;

        let mut salt = [0u8; SALT_LEN];
        self.crypto
            .random_bytes(&mut salt)
            .map_err(|e| OxiZipError::salt(e.message()))?;

        let ctx = EncryptionContext::derive(&self.crypto, password, &salt)?;
        ctx.cipher(&self.crypto)?.process(payload.as_mut_slice());
        let tag = ctx.authentication_tag(&self.crypto, &payload)?;

        let container = write_container(&header, &salt, &ctx.verification(), &payload, &tag);
        debug!(container_len = container.len(), "encoded container");
        Ok(container)
    }
}

/// Authenticates and decrypts a container produced by [`Encoder`].
#[derive(Debug, Clone)]
pub struct Decoder<C = RustCrypto, Z = Deflater> {
    crypto: C,
    compression: Z,
    #[cfg(test)]
    authenticate: bool,
}

impl Decoder {
    /// Decoder with the default backends.
    pub fn new() -> Self {
        Self::with_providers(RustCrypto, Deflater::default())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CryptoProvider, Z: CompressionProvider> Decoder<C, Z> {
    /// Decoder over custom backends.
    pub fn with_providers(crypto: C, compression: Z) -> Self {
        Self {
            crypto,
            compression,
            #[cfg(test)]
            authenticate: true,
        }
    }

    /// Skip the tag check so that the CRC stage can be exercised.
    #[cfg(test)]
    fn without_authentication(mut self) -> Self {
        self.authenticate = false;
        self
    }

    #[cfg(test)]
    fn authenticates(&self) -> bool {
        self.authenticate
    }

    #[cfg(not(test))]
    fn authenticates(&self) -> bool {
        true
    }

    /// Validate, authenticate, decrypt and inflate `data`.
    ///
    /// Checks run in order: structure, password verification value,
    /// authentication code, inflate, CRC-32. Nothing is decrypted before the
    /// authentication code matches.
    pub fn decode(&self, data: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        let result = self.decode_inner(data, password);
        match &result {
            Ok(plaintext) => debug!(plaintext_len = plaintext.len(), "decoded container"),
            Err(e) => debug!(kind = ?e.kind(), "rejected container"),
        }
        result
    }

    fn decode_inner(&self, data: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(OxiZipError::params("container is empty"));
        }
        if password.is_empty() {
            return Err(OxiZipError::params("password is empty"));
        }

        let entry = ParsedEntry::parse(data)?;
        let ctx = EncryptionContext::derive(&self.crypto, password, &entry.salt)?;

        if !ctx.verify_password(&entry.verification) {
            return Err(OxiZipError::WrongPassword);
        }
        if self.authenticates()
            && !ctx.verify_tag(&self.crypto, entry.ciphertext, &entry.auth_code)?
        {
            return Err(OxiZipError::Tamper);
        }

        let mut payload = Zeroizing::new(entry.ciphertext.to_vec());
        ctx.cipher(&self.crypto)?.process(payload.as_mut_slice());

        let mut plaintext = self
            .compression
            .inflate(&payload, entry.header.uncompressed_size as usize)
            .map_err(|e| OxiZipError::compression(e.message()))?;

        let computed = Crc32::compute(&plaintext);
        if computed != entry.header.crc32 {
            plaintext.zeroize();
            return Err(OxiZipError::integrity(entry.header.crc32, computed));
        }
        Ok(plaintext)
    }
}

/// Metadata of the encrypted entry, readable without the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Stored entry name.
    pub file_name: String,
    /// CRC-32 of the plaintext.
    pub crc32: u32,
    /// Ciphertext length plus salt, verification value and tag.
    pub compressed_size: u32,
    /// Plaintext length.
    pub uncompressed_size: u32,
    /// Last modification time.
    pub modified: DosDateTime,
    /// Whether the encrypted flag is set.
    pub encrypted: bool,
    /// AE vendor version.
    pub ae_version: u16,
    /// AES strength byte.
    pub strength: u8,
    /// Compression method applied before encryption.
    pub compression_method: u16,
}

impl From<&LocalFileHeader> for EntryInfo {
    fn from(header: &LocalFileHeader) -> Self {
        Self {
            file_name: String::from_utf8_lossy(&header.file_name).into_owned(),
            crc32: header.crc32,
            compressed_size: header.compressed_size,
            uncompressed_size: header.uncompressed_size,
            modified: header.modified,
            encrypted: header.flags & super::header::FLAG_ENCRYPTED != 0,
            ae_version: header.aes.version,
            strength: header.aes.strength,
            compression_method: header.aes.compression_method,
        }
    }
}

/// Validate the container structure and return its entry metadata.
pub fn read_entry_info(data: &[u8]) -> Result<EntryInfo> {
    if data.is_empty() {
        return Err(OxiZipError::params("container is empty"));
    }
    let entry = ParsedEntry::parse(data)?;
    Ok(EntryInfo::from(&entry.header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::header::DATA_OFFSET;
    use oxizip_core::error::{ErrorKind, ProviderError};
    use std::time::{Duration, UNIX_EPOCH};

    const TEXT: &[u8] = b"It was the best of times, it was the worst of times, it was the age \
        of wisdom, it was the age of foolishness, it was the epoch of belief, it was the \
        epoch of incredulity, it was the season of Light, it was the season of Darkness.";

    /// RustCrypto with a fixed salt.
    #[derive(Debug, Clone, Copy)]
    struct FixedSalt(u8);

    impl CryptoProvider for FixedSalt {
        type Block = <RustCrypto as CryptoProvider>::Block;

        fn derive_key(
            &self,
            password: &[u8],
            salt: &[u8],
            iterations: u32,
            output: &mut [u8],
        ) -> std::result::Result<(), ProviderError> {
            RustCrypto.derive_key(password, salt, iterations, output)
        }

        fn block_encryptor(&self, key: &[u8; 32]) -> std::result::Result<Self::Block, ProviderError> {
            RustCrypto.block_encryptor(key)
        }

        fn hmac_sha1(&self, key: &[u8], data: &[u8]) -> std::result::Result<[u8; 20], ProviderError> {
            RustCrypto.hmac_sha1(key, data)
        }

        fn random_bytes(&self, output: &mut [u8]) -> std::result::Result<(), ProviderError> {
            output.fill(self.0);
            Ok(())
        }
    }

    /// RustCrypto without a random source.
    #[derive(Debug, Clone, Copy)]
    struct NoEntropy;

    impl CryptoProvider for NoEntropy {
        type Block = <RustCrypto as CryptoProvider>::Block;

        fn derive_key(
            &self,
            password: &[u8],
            salt: &[u8],
            iterations: u32,
            output: &mut [u8],
        ) -> std::result::Result<(), ProviderError> {
            RustCrypto.derive_key(password, salt, iterations, output)
        }

        fn block_encryptor(&self, key: &[u8; 32]) -> std::result::Result<Self::Block, ProviderError> {
            RustCrypto.block_encryptor(key)
        }

        fn hmac_sha1(&self, key: &[u8], data: &[u8]) -> std::result::Result<[u8; 20], ProviderError> {
            RustCrypto.hmac_sha1(key, data)
        }

        fn random_bytes(&self, _output: &mut [u8]) -> std::result::Result<(), ProviderError> {
            Err(ProviderError::new("entropy source unavailable"))
        }
    }

    /// Compression backend that always fails.
    #[derive(Debug, Clone, Copy)]
    struct BrokenDeflate;

    impl CompressionProvider for BrokenDeflate {
        fn deflate(&self, _data: &[u8]) -> std::result::Result<Vec<u8>, ProviderError> {
            Err(ProviderError::new("out of memory"))
        }

        fn inflate(
            &self,
            _data: &[u8],
            _expected_len: usize,
        ) -> std::result::Result<Vec<u8>, ProviderError> {
            Err(ProviderError::new("out of memory"))
        }
    }

    fn fixed_time() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_roundtrip() {
        let encoded = Encoder::new().encode(TEXT, b"secret123").unwrap();
        let decoded = Decoder::new().decode(&encoded, b"secret123").unwrap();
        assert_eq!(decoded, TEXT);
    }

    #[test]
    fn test_empty_arguments() {
        let encoder = Encoder::new();
        assert_eq!(encoder.encode(b"", b"pw").unwrap_err().kind(), ErrorKind::Params);
        assert_eq!(encoder.encode(b"x", b"").unwrap_err().kind(), ErrorKind::Params);

        let encoded = encoder.encode(b"x", b"pw").unwrap();
        let decoder = Decoder::new();
        assert_eq!(decoder.decode(b"", b"pw").unwrap_err().kind(), ErrorKind::Params);
        assert_eq!(decoder.decode(&encoded, b"").unwrap_err().kind(), ErrorKind::Params);
    }

    #[test]
    fn test_deterministic_with_fixed_salt_and_time() {
        let encoder = Encoder::with_providers(FixedSalt(0x42), Deflater::default()).modified(fixed_time());
        let a = encoder.encode(TEXT, b"pw").unwrap();
        let b = encoder.encode(TEXT, b"pw").unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[45..61], &[0x42; 16]);
    }

    #[test]
    fn test_modified_stamps_both_headers() {
        let encoder = Encoder::with_providers(FixedSalt(7), Deflater::new(1)).modified(fixed_time());
        let encoded = encoder.encode(TEXT, b"pw").unwrap();
        let dos = DosDateTime::from_system_time(fixed_time());

        assert_eq!(&encoded[10..12], &dos.time.to_le_bytes());
        assert_eq!(&encoded[12..14], &dos.date.to_le_bytes());
        let central = encoded.len() - 22 - 61;
        assert_eq!(&encoded[central + 12..central + 16], &encoded[10..14]);
    }

    #[test]
    fn test_fresh_salt_per_encode() {
        let encoder = Encoder::new().modified(fixed_time());
        let a = encoder.encode(TEXT, b"pw").unwrap();
        let b = encoder.encode(TEXT, b"pw").unwrap();
        assert_ne!(&a[45..61], &b[45..61]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_salt_failure() {
        let encoder = Encoder::with_providers(NoEntropy, Deflater::default());
        let err = encoder.encode(TEXT, b"pw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Salt);
        assert!(err.to_string().contains("entropy source unavailable"));
    }

    #[test]
    fn test_compression_failure() {
        let encoder = Encoder::with_providers(RustCrypto, BrokenDeflate);
        assert_eq!(
            encoder.encode(TEXT, b"pw").unwrap_err().kind(),
            ErrorKind::Compression
        );

        let encoded = Encoder::new().encode(TEXT, b"pw").unwrap();
        let decoder = Decoder::with_providers(RustCrypto, BrokenDeflate);
        assert_eq!(
            decoder.decode(&encoded, b"pw").unwrap_err().kind(),
            ErrorKind::Compression
        );
    }

    #[test]
    fn test_wrong_password() {
        let encoded = Encoder::new().encode(TEXT, b"secret123").unwrap();
        let kind = Decoder::new().decode(&encoded, b"wrong").unwrap_err().kind();
        // A 1 in 65536 verification collision falls through to the tag check
        assert!(matches!(kind, ErrorKind::WrongPassword | ErrorKind::Tamper));
    }

    #[test]
    fn test_tamper_ciphertext() {
        let mut encoded = Encoder::new().encode(TEXT, b"pw").unwrap();
        encoded[DATA_OFFSET + 3] ^= 0x10;
        assert!(matches!(
            Decoder::new().decode(&encoded, b"pw"),
            Err(OxiZipError::Tamper)
        ));
    }

    #[test]
    fn test_crc_field_mismatch() {
        // The CRC field is outside the authenticated region
        let mut encoded = Encoder::new().encode(TEXT, b"pw").unwrap();
        encoded[14] ^= 0x01;
        let err = Decoder::new().decode(&encoded, b"pw").unwrap_err();
        match err {
            OxiZipError::Integrity { expected, computed } => {
                assert_eq!(computed, Crc32::compute(TEXT));
                assert_eq!(expected, computed ^ 0x01);
            }
            other => panic!("expected Integrity, got {other:?}"),
        }
    }

    #[test]
    fn test_corruption_detected_without_authentication() {
        let mut encoded = Encoder::new().encode(TEXT, b"pw").unwrap();
        // Flips BFINAL of the single deflate block
        encoded[DATA_OFFSET] ^= 0x01;

        let decoder = Decoder::new().without_authentication();
        let kind = decoder.decode(&encoded, b"pw").unwrap_err().kind();
        assert!(matches!(kind, ErrorKind::Integrity | ErrorKind::Compression));

        // The same corruption is caught earlier when authenticating
        assert_eq!(
            Decoder::new().decode(&encoded, b"pw").unwrap_err().kind(),
            ErrorKind::Tamper
        );
    }

    #[test]
    fn test_declared_size_mismatch() {
        // Uncompressed size is not authenticated either
        let mut encoded = Encoder::new().encode(TEXT, b"pw").unwrap();
        encoded[22] = encoded[22].wrapping_add(1);
        assert_eq!(
            Decoder::new().decode(&encoded, b"pw").unwrap_err().kind(),
            ErrorKind::Compression
        );
    }

    #[test]
    fn test_entry_info() {
        let encoded = Encoder::with_options(EncodeOptions::new().with_modified(fixed_time()))
            .encode(TEXT, b"pw")
            .unwrap();
        let info = read_entry_info(&encoded).unwrap();

        assert_eq!(info.file_name, "data");
        assert_eq!(info.crc32, Crc32::compute(TEXT));
        assert_eq!(info.uncompressed_size as usize, TEXT.len());
        assert_eq!(
            info.compressed_size as usize,
            encoded.len() - DATA_OFFSET - 10 - 61 - 22 + 28
        );
        assert_eq!(info.modified, DosDateTime::from_system_time(fixed_time()));
        assert!(info.encrypted);
        assert_eq!(info.ae_version, 1);
        assert_eq!(info.strength, 3);
        assert_eq!(info.compression_method, 8);
    }
}
