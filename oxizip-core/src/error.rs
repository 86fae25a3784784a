//! Error types for OxiZip operations.
//!
//! Every failure of an encode or decode call is reported as one
//! [`OxiZipError`]. Each variant corresponds to the stage that failed, and
//! [`OxiZipError::kind`] exposes that stage as a plain [`ErrorKind`] so that
//! callers can decide what to do (e.g. re-prompt only on a wrong password).
//!
//! Capability backends report their own failures as [`ProviderError`]; the
//! codec maps them onto the stage they occurred in.

use thiserror::Error;

/// The main error type for OxiZip operations.
#[derive(Debug, Error)]
pub enum OxiZipError {
    /// Empty input, empty password, or a payload that does not fit the format.
    #[error("Bad arguments: {message}")]
    Params {
        /// Which argument was rejected.
        message: String,
    },

    /// The random salt could not be generated.
    #[error("Can't generate a random salt: {message}")]
    Salt {
        /// Backend failure description.
        message: String,
    },

    /// PBKDF2 key stretching failed.
    #[error("Problem while generating the AES and HMAC keys: {message}")]
    KeyDerivation {
        /// Backend failure description.
        message: String,
    },

    /// DEFLATE/INFLATE failed or produced an unexpected length.
    #[error("Error while (de)compressing data: {message}")]
    Compression {
        /// Description of the compression failure.
        message: String,
    },

    /// The AES block cipher could not be set up.
    #[error("Error while en-/de-crypting data: {message}")]
    Cipher {
        /// Backend failure description.
        message: String,
    },

    /// The HMAC-SHA1 authentication code could not be computed.
    #[error("Can't compute the HMAC: {message}")]
    Hmac {
        /// Backend failure description.
        message: String,
    },

    /// Not an AE-1 AES-256 container produced by this format.
    #[error("Bad document format at offset {offset}: {message}")]
    BadFormat {
        /// Byte offset of the offending field.
        offset: usize,
        /// Description of the mismatch.
        message: String,
    },

    /// The password verification value does not match.
    #[error("Wrong password")]
    WrongPassword,

    /// The authentication code over the encrypted data does not match.
    #[error("Bad HMAC on encrypted data")]
    Tamper,

    /// The CRC-32 of the recovered plaintext does not match the stored one.
    #[error("Bad CRC on uncompressed data: expected {expected:#010x}, computed {computed:#010x}")]
    Integrity {
        /// CRC-32 stored in the container.
        expected: u32,
        /// CRC-32 computed over the inflated data.
        computed: u32,
    },
}

/// Result type alias for OxiZip operations.
pub type Result<T> = std::result::Result<T, OxiZipError>;

/// Coarse classification of an [`OxiZipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`OxiZipError::Params`].
    Params,
    /// See [`OxiZipError::Salt`].
    Salt,
    /// See [`OxiZipError::KeyDerivation`].
    KeyDerivation,
    /// See [`OxiZipError::Compression`].
    Compression,
    /// See [`OxiZipError::Cipher`].
    Cipher,
    /// See [`OxiZipError::Hmac`].
    Hmac,
    /// See [`OxiZipError::BadFormat`].
    BadFormat,
    /// See [`OxiZipError::WrongPassword`].
    WrongPassword,
    /// See [`OxiZipError::Tamper`].
    Tamper,
    /// See [`OxiZipError::Integrity`].
    Integrity,
}

impl OxiZipError {
    /// Create a bad arguments error.
    pub fn params(message: impl Into<String>) -> Self {
        Self::Params {
            message: message.into(),
        }
    }

    /// Create a salt generation error.
    pub fn salt(message: impl Into<String>) -> Self {
        Self::Salt {
            message: message.into(),
        }
    }

    /// Create a key derivation error.
    pub fn key_derivation(message: impl Into<String>) -> Self {
        Self::KeyDerivation {
            message: message.into(),
        }
    }

    /// Create a compression error.
    pub fn compression(message: impl Into<String>) -> Self {
        Self::Compression {
            message: message.into(),
        }
    }

    /// Create a cipher error.
    pub fn cipher(message: impl Into<String>) -> Self {
        Self::Cipher {
            message: message.into(),
        }
    }

    /// Create an HMAC error.
    pub fn hmac(message: impl Into<String>) -> Self {
        Self::Hmac {
            message: message.into(),
        }
    }

    /// Create a bad format error.
    pub fn bad_format(offset: usize, message: impl Into<String>) -> Self {
        Self::BadFormat {
            offset,
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn integrity(expected: u32, computed: u32) -> Self {
        Self::Integrity { expected, computed }
    }

    /// The stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Params { .. } => ErrorKind::Params,
            Self::Salt { .. } => ErrorKind::Salt,
            Self::KeyDerivation { .. } => ErrorKind::KeyDerivation,
            Self::Compression { .. } => ErrorKind::Compression,
            Self::Cipher { .. } => ErrorKind::Cipher,
            Self::Hmac { .. } => ErrorKind::Hmac,
            Self::BadFormat { .. } => ErrorKind::BadFormat,
            Self::WrongPassword => ErrorKind::WrongPassword,
            Self::Tamper => ErrorKind::Tamper,
            Self::Integrity { .. } => ErrorKind::Integrity,
        }
    }
}

/// Failure reported by a cryptographic or compression backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Create a provider error with a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The backend's description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}
