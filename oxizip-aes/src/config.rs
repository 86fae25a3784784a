//! Encoder configuration.

use std::time::SystemTime;

use oxizip_core::dostime::DosDateTime;

/// DEFLATE effort used before encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZipCompressionLevel {
    /// Fast compression (deflate level 1).
    Fast,
    /// Normal compression (deflate level 6).
    Normal,
    /// High compression (deflate level 8).
    #[default]
    High,
    /// Best compression (deflate level 9).
    Best,
}

impl ZipCompressionLevel {
    /// The DEFLATE level passed to the backend.
    pub fn level(self) -> u32 {
        match self {
            ZipCompressionLevel::Fast => 1,
            ZipCompressionLevel::Normal => 6,
            ZipCompressionLevel::High => 8,
            ZipCompressionLevel::Best => 9,
        }
    }
}

/// Options for [`crate::Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Compression level.
    pub level: ZipCompressionLevel,
    /// Modification time written to the headers; `None` means now.
    ///
    /// The DOS date/time fields are filled in UTC, not local time.
    pub modified: Option<SystemTime>,
}

impl EncodeOptions {
    /// Default options: level 8, current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: ZipCompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the modification time stamped into the container.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// The DOS timestamp to write, converted in UTC.
    pub fn dos_time(&self) -> DosDateTime {
        match self.modified {
            Some(time) => DosDateTime::from_system_time(time),
            None => DosDateTime::now(),
        }
    }
}
