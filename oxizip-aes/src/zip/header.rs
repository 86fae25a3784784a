//! ZIP record layout for a single AE-1 encrypted entry.
//!
//! ```text
//! [local file header][filename][AES extra][salt][pv][ciphertext][auth code]
//! [central directory header][filename][AES extra]
//! [end of central directory]
//! ```
//!
//! Records are produced and consumed with [`LeWriter`]/[`LeReader`] in field
//! order; the fixed offsets (salt at 45, ciphertext at 63, a 61-byte central
//! directory) fall out of the field sizes below.

use oxizip_core::dostime::DosDateTime;
use oxizip_core::error::{OxiZipError, Result};
use oxizip_core::le::{LeReader, LeWriter};

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// Version needed to extract / made by: 5.1, the first with AES.
pub const ZIP_VERSION: u16 = 0x0033;

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Compression method marker for WinZip AES entries.
pub const METHOD_AES: u16 = 99;

/// Actual compression method carried in the AES extra field (deflate).
pub const METHOD_DEFLATE: u16 = 8;

/// External attributes of the entry: the DOS archive bit.
pub const EXTERNAL_ATTR_ARCHIVE: u32 = 0x20;

/// Fixed name of the single entry.
pub const ENTRY_NAME: &[u8; 4] = b"data";

/// WinZip AES extra field header ID.
pub const WINZIP_AES_EXTRA_ID: u16 = 0x9901;

/// Size of the AES extra field data (after ID and size).
pub const AES_EXTRA_DATA_SIZE: u16 = 7;

/// Total AES extra field length.
pub const AES_EXTRA_FIELD_LEN: usize = 4 + AES_EXTRA_DATA_SIZE as usize;

/// AE-1: CRC-32 of the plaintext is kept in the headers.
pub const AE_VERSION_1: u16 = 1;

/// AE-2: CRC-32 is zeroed. Recognised only to be rejected.
pub const AE_VERSION_2: u16 = 2;

/// WinZip vendor ID.
pub const VENDOR_ID: [u8; 2] = *b"AE";

/// Strength byte for AES-256.
pub const STRENGTH_AES256: u8 = 3;

/// Salt length for AES-256.
pub const SALT_LEN: usize = 16;

/// Password verification value length.
pub const PASSWORD_VERIFICATION_LEN: usize = 2;

/// HMAC-SHA1 authentication code length (10 bytes for WinZip).
pub const WINZIP_AUTH_CODE_LEN: usize = 10;

/// Bytes added around the ciphertext: salt, verification value, auth code.
pub const ENCRYPTION_OVERHEAD: usize = SALT_LEN + PASSWORD_VERIFICATION_LEN + WINZIP_AUTH_CODE_LEN;

/// Fixed part of the local file header:
/// signature, version, flags, method, time, date, CRC, sizes x2, name len, extra len.
pub const LOCAL_HEADER_FIXED_LEN: usize = 4 + 2 + 2 + 2 + 2 + 2 + 4 + 4 + 4 + 2 + 2;

/// Fixed part of the central directory header (adds version made by,
/// comment length, disk, internal/external attributes, local header offset).
pub const CENTRAL_HEADER_FIXED_LEN: usize = LOCAL_HEADER_FIXED_LEN + 2 + 2 + 2 + 2 + 4 + 4;

/// End of central directory record length (no comment).
pub const END_OF_CENTRAL_DIR_LEN: usize = 4 + 2 + 2 + 2 + 2 + 4 + 4 + 2;

/// Offset of the salt in the container.
pub const SALT_OFFSET: usize = LOCAL_HEADER_FIXED_LEN + ENTRY_NAME.len() + AES_EXTRA_FIELD_LEN;

/// Offset of the ciphertext in the container.
pub const DATA_OFFSET: usize = SALT_OFFSET + SALT_LEN + PASSWORD_VERIFICATION_LEN;

/// Length of the single-entry central directory.
pub const CENTRAL_DIR_LEN: usize = CENTRAL_HEADER_FIXED_LEN + ENTRY_NAME.len() + AES_EXTRA_FIELD_LEN;

/// WinZip AES extra field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AesExtraField {
    /// Vendor version (AE-1 = 1, AE-2 = 2).
    pub version: u16,
    /// Vendor ID ("AE").
    pub vendor_id: [u8; 2],
    /// Encryption strength (3 = AES-256).
    pub strength: u8,
    /// Actual compression method used before encryption.
    pub compression_method: u16,
}

impl AesExtraField {
    /// The only field this format writes: AE-1, AES-256, deflate.
    pub const AE1_AES256_DEFLATE: Self = Self {
        version: AE_VERSION_1,
        vendor_id: VENDOR_ID,
        strength: STRENGTH_AES256,
        compression_method: METHOD_DEFLATE,
    };

    /// Serialize the field including its header.
    pub fn write(&self, w: &mut LeWriter) {
        w.put_u16(WINZIP_AES_EXTRA_ID);
        w.put_u16(AES_EXTRA_DATA_SIZE);
        w.put_u16(self.version);
        w.put_bytes(&self.vendor_id);
        w.put_u8(self.strength);
        w.put_u16(self.compression_method);
    }

    /// Parse the field and require AE-1, vendor "AE", AES-256 and deflate.
    pub fn read(r: &mut LeReader<'_>) -> Result<Self> {
        r.expect_u16(WINZIP_AES_EXTRA_ID, "AES extra field header id")?;
        r.expect_u16(AES_EXTRA_DATA_SIZE, "AES extra field data size")?;

        let offset = r.position();
        let version = r.u16()?;
        match version {
            AE_VERSION_1 => {}
            AE_VERSION_2 => {
                return Err(OxiZipError::bad_format(
                    offset,
                    "AE-2 entries are not supported",
                ));
            }
            other => {
                return Err(OxiZipError::bad_format(
                    offset,
                    format!("unknown AE version {other}"),
                ));
            }
        }

        let offset = r.position();
        let vendor_id = r.array::<2>()?;
        if vendor_id != VENDOR_ID {
            return Err(OxiZipError::bad_format(
                offset,
                format!("vendor id: expected \"AE\", found {vendor_id:02x?}"),
            ));
        }

        r.expect_u8(STRENGTH_AES256, "AES strength")?;
        r.expect_u16(METHOD_DEFLATE, "actual compression method")?;

        Ok(Self {
            version,
            vendor_id,
            strength: STRENGTH_AES256,
            compression_method: METHOD_DEFLATE,
        })
    }
}

/// ZIP local file header of the encrypted entry.
///
/// Version, method, name and extra field are fixed by the format; only the
/// fields below vary between containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    /// General purpose bit flag.
    pub flags: u16,
    /// Last modification time and date.
    pub modified: DosDateTime,
    /// CRC-32 of the plaintext (AE-1).
    pub crc32: u32,
    /// Ciphertext length plus [`ENCRYPTION_OVERHEAD`].
    pub compressed_size: u32,
    /// Plaintext length.
    pub uncompressed_size: u32,
    /// Entry name as stored.
    pub file_name: Vec<u8>,
    /// AES extra field.
    pub aes: AesExtraField,
}

impl LocalFileHeader {
    /// Build the header for a payload, deriving both size fields.
    ///
    /// Fails with `Params` when the container would need ZIP64.
    pub fn for_payload(
        crc32: u32,
        ciphertext_len: usize,
        plaintext_len: usize,
        modified: DosDateTime,
    ) -> Result<Self> {
        let end_of_entry = DATA_OFFSET
            .checked_add(ciphertext_len)
            .and_then(|n| n.checked_add(WINZIP_AUTH_CODE_LEN))
            .and_then(|n| n.checked_add(CENTRAL_DIR_LEN))
            .ok_or_else(|| OxiZipError::params("payload too large"))?;
        if u32::try_from(end_of_entry).is_err() {
            return Err(OxiZipError::params(
                "container exceeds 4 GiB (ZIP64 is not supported)",
            ));
        }
        let uncompressed_size = u32::try_from(plaintext_len).map_err(|_| {
            OxiZipError::params("plaintext exceeds 4 GiB (ZIP64 is not supported)")
        })?;

        Ok(Self {
            flags: FLAG_ENCRYPTED,
            modified,
            crc32,
            compressed_size: (ciphertext_len + ENCRYPTION_OVERHEAD) as u32,
            uncompressed_size,
            file_name: ENTRY_NAME.to_vec(),
            aes: AesExtraField::AE1_AES256_DEFLATE,
        })
    }

    /// Length of the ciphertext the header describes.
    pub fn ciphertext_len(&self) -> usize {
        self.compressed_size as usize - ENCRYPTION_OVERHEAD
    }

    /// Serialize the header, name and AES extra field.
    pub fn write(&self, w: &mut LeWriter) {
        w.put_u32(LOCAL_FILE_HEADER_SIG);
        w.put_u16(ZIP_VERSION);
        w.put_u16(self.flags);
        w.put_u16(METHOD_AES);
        w.put_u16(self.modified.time);
        w.put_u16(self.modified.date);
        w.put_u32(self.crc32);
        w.put_u32(self.compressed_size);
        w.put_u32(self.uncompressed_size);
        w.put_u16(self.file_name.len() as u16);
        w.put_u16(AES_EXTRA_FIELD_LEN as u16);
        w.put_bytes(&self.file_name);
        self.aes.write(w);
    }

    /// Parse and validate a local file header.
    ///
    /// The version needed and flags are read but not enforced. The name is
    /// taken at its declared length; the extra field must be exactly the
    /// AES field.
    pub fn read(r: &mut LeReader<'_>) -> Result<Self> {
        r.expect_u32(LOCAL_FILE_HEADER_SIG, "local file header signature")?;
        let _version_needed = r.u16()?;
        let flags = r.u16()?;
        r.expect_u16(METHOD_AES, "compression method")?;
        let time = r.u16()?;
        let date = r.u16()?;
        let crc32 = r.u32()?;

        let offset = r.position();
        let compressed_size = r.u32()?;
        if (compressed_size as usize) < ENCRYPTION_OVERHEAD {
            return Err(OxiZipError::bad_format(
                offset,
                format!(
                    "compressed size {compressed_size} is smaller than the {ENCRYPTION_OVERHEAD}-byte encryption overhead"
                ),
            ));
        }

        let uncompressed_size = r.u32()?;
        let name_len = r.u16()? as usize;
        r.expect_u16(AES_EXTRA_FIELD_LEN as u16, "extra field length")?;
        let file_name = r.bytes(name_len)?.to_vec();
        let aes = AesExtraField::read(r)?;

        Ok(Self {
            flags,
            modified: DosDateTime { time, date },
            crc32,
            compressed_size,
            uncompressed_size,
            file_name,
            aes,
        })
    }
}

/// Central directory header mirroring a [`LocalFileHeader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirHeader<'a> {
    local: &'a LocalFileHeader,
}

impl<'a> CentralDirHeader<'a> {
    /// Central record for the entry at offset 0.
    pub fn new(local: &'a LocalFileHeader) -> Self {
        Self { local }
    }

    /// Serialize the record, name and AES extra field.
    pub fn write(&self, w: &mut LeWriter) {
        let local = self.local;
        w.put_u32(CENTRAL_DIR_HEADER_SIG);
        // Version made by
        w.put_u16(ZIP_VERSION);
        // Version needed
        w.put_u16(ZIP_VERSION);
        w.put_u16(local.flags);
        w.put_u16(METHOD_AES);
        w.put_u16(local.modified.time);
        w.put_u16(local.modified.date);
        w.put_u32(local.crc32);
        w.put_u32(local.compressed_size);
        w.put_u32(local.uncompressed_size);
        w.put_u16(local.file_name.len() as u16);
        w.put_u16(AES_EXTRA_FIELD_LEN as u16);
        // Comment length
        w.put_u16(0);
        // Disk number start
        w.put_u16(0);
        // Internal attributes
        w.put_u16(0);
        w.put_u32(EXTERNAL_ATTR_ARCHIVE);
        // Relative offset of local header
        w.put_u32(0);
        w.put_bytes(&local.file_name);
        local.aes.write(w);
    }

    /// Size of the record when written.
    pub fn written_size(&self) -> usize {
        CENTRAL_HEADER_FIXED_LEN + self.local.file_name.len() + AES_EXTRA_FIELD_LEN
    }
}

/// End of central directory record for a one-entry archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDir {
    /// Size of the central directory.
    pub central_dir_size: u32,
    /// Offset of the central directory.
    pub central_dir_offset: u32,
}

impl EndOfCentralDir {
    /// Serialize the record.
    pub fn write(&self, w: &mut LeWriter) {
        w.put_u32(END_OF_CENTRAL_DIR_SIG);
        // Disk number
        w.put_u16(0);
        // Disk with central directory
        w.put_u16(0);
        // Entries on this disk
        w.put_u16(1);
        // Total entries
        w.put_u16(1);
        w.put_u32(self.central_dir_size);
        w.put_u32(self.central_dir_offset);
        // Comment length
        w.put_u16(0);
    }
}

/// Assemble the complete container.
pub fn write_container(
    header: &LocalFileHeader,
    salt: &[u8; SALT_LEN],
    verification: &[u8; PASSWORD_VERIFICATION_LEN],
    ciphertext: &[u8],
    auth_code: &[u8; WINZIP_AUTH_CODE_LEN],
) -> Vec<u8> {
    let central = CentralDirHeader::new(header);
    let mut w = LeWriter::with_capacity(
        DATA_OFFSET
            + ciphertext.len()
            + WINZIP_AUTH_CODE_LEN
            + central.written_size()
            + END_OF_CENTRAL_DIR_LEN,
    );

    header.write(&mut w);
    w.put_bytes(salt);
    w.put_bytes(verification);
    w.put_bytes(ciphertext);
    w.put_bytes(auth_code);

    let central_dir_offset = w.position();
    central.write(&mut w);
    let central_dir_size = w.position() - central_dir_offset;

    // Both fit: LocalFileHeader::for_payload bounds the whole container
    EndOfCentralDir {
        central_dir_size: central_dir_size as u32,
        central_dir_offset: central_dir_offset as u32,
    }
    .write(&mut w);

    w.into_inner()
}

/// The encrypted entry of a container, borrowed from the input.
#[derive(Debug, Clone)]
pub struct ParsedEntry<'a> {
    /// Validated local header.
    pub header: LocalFileHeader,
    /// Key derivation salt.
    pub salt: [u8; SALT_LEN],
    /// Stored password verification value.
    pub verification: [u8; PASSWORD_VERIFICATION_LEN],
    /// Encrypted, compressed payload.
    pub ciphertext: &'a [u8],
    /// Stored authentication code.
    pub auth_code: [u8; WINZIP_AUTH_CODE_LEN],
}

impl<'a> ParsedEntry<'a> {
    /// Validate the local header and slice out salt, ciphertext and tag.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut r = LeReader::new(data);
        let header = LocalFileHeader::read(&mut r)?;
        let salt = r.array::<SALT_LEN>()?;
        let verification = r.array::<PASSWORD_VERIFICATION_LEN>()?;
        let ciphertext = r.bytes(header.ciphertext_len())?;
        let auth_code = r.array::<WINZIP_AUTH_CODE_LEN>()?;

        Ok(Self {
            header,
            salt,
            verification,
            ciphertext,
            auth_code,
        })
    }
}
