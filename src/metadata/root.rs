//! Metadata root header and stream directory.
//!
//! The metadata root is positional and forward-only: signature, runtime versions, a
//! variable length version string padded to a 4-byte boundary, flags, and the stream
//! directory. Nothing before the stream directory can be skipped without decoding the
//! version string length first.
//!
//! # Reference
//! - ECMA-335 6th Edition, II.24.2.1

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The magic signature of the metadata root, `BSJB` in little-endian
pub const METADATA_SIGNATURE: u32 = 0x424A_5342;

/// The metadata root: version information and the stream directory.
///
/// Stream offsets inside the headers are relative to the root itself; the owning
/// [`crate::CoffFile`] keeps the root's file offset to resolve them.
pub struct MetadataRoot {
    /// Magic signature for physical metadata, [`METADATA_SIGNATURE`]
    pub signature: u32,
    /// Major runtime version, 1 for all current images
    pub major_version: u16,
    /// Minor runtime version
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Declared byte length of the version string, before padding
    pub length: u32,
    /// Version string with NUL padding stripped
    pub version: String,
    /// Reserved flags word, always 0
    pub flags: u16,
    /// Number of streams in the directory
    pub stream_number: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl MetadataRoot {
    /// Reads a `MetadataRoot` from the metadata slice of an image.
    ///
    /// # Arguments
    /// * `data` - The metadata bytes, starting at the `BSJB` signature
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] for truncated data, or [`crate::Error::Malformed`] for a
    /// wrong signature or a stream that leaves the metadata bounds.
    pub fn read(data: &[u8]) -> Result<MetadataRoot> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != METADATA_SIGNATURE {
            return Err(malformed_error!(
                "Metadata signature does not match - {:#010x}",
                signature
            ));
        }

        let length = read_le::<u32>(&data[12..])?;

        // The version string is stored NUL padded to a 4-byte boundary.
        let padded_length = length
            .checked_add(3)
            .map(|length| length & !3)
            .ok_or_else(|| {
                malformed_error!("Version string length causing integer overflow - {}", length)
            })?;

        let version_end = 16_usize
            .checked_add(padded_length as usize)
            .ok_or(OutOfBounds)?;
        if version_end + 4 > data.len() {
            return Err(OutOfBounds);
        }

        let version_bytes = &data[16..16 + length as usize];
        let terminator = version_bytes
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(version_bytes.len());
        let version = String::from_utf8(version_bytes[..terminator].to_vec())
            .map_err(|_| malformed_error!("Metadata version string is not UTF-8"))?;

        let mut cursor = version_end;
        let flags = read_le_at::<u16>(data, &mut cursor)?;
        let stream_count = read_le_at::<u16>(data, &mut cursor)?;

        let mut streams = Vec::with_capacity(stream_count as usize);
        for _ in 0..stream_count {
            if cursor > data.len() {
                return Err(OutOfBounds);
            }

            let new_stream = StreamHeader::from(&data[cursor..])?;

            match u32::checked_add(new_stream.offset, new_stream.size) {
                Some(range) => {
                    if range as usize > data.len() {
                        return Err(OutOfBounds);
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            cursor += new_stream.directory_size();
            streams.push(new_stream);
        }

        Ok(MetadataRoot {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }

    /// Find a stream header by name.
    ///
    /// ## Arguments
    /// * 'name' - The stream name, e.g. [`crate::metadata::streams::STREAM_TABLES`]
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers
            .iter()
            .find(|header| header.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::streams::{STREAM_STRINGS, STREAM_TABLES};

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let mut root_bytes = vec![
            0x42, 0x53, 0x4A, 0x42, // signature "BSJB"
            0x01, 0x00,             // major_version
            0x01, 0x00,             // minor_version
            0x00, 0x00, 0x00, 0x00, // reserved
            0x06, 0x00, 0x00, 0x00, // length = 6 for "v4.0.0", padded to 8
            b'v', b'4', b'.', b'0', b'.', b'0', 0x00, 0x00,
            0x00, 0x00,             // flags
            0x02, 0x00,             // streams = 2

            0x40, 0x00, 0x00, 0x00, // #~ offset
            0x08, 0x00, 0x00, 0x00, // #~ size
            0x23, 0x7E, 0x00, 0x00, // "#~\0" padded

            0x48, 0x00, 0x00, 0x00, // #Strings offset
            0x04, 0x00, 0x00, 0x00, // #Strings size
            b'#', b'S', b't', b'r', b'i', b'n', b'g', b's', 0x00, 0x00, 0x00, 0x00,
        ];
        root_bytes.resize(0x50, 0x00);

        let root = MetadataRoot::read(&root_bytes).unwrap();

        assert_eq!(root.signature, METADATA_SIGNATURE);
        assert_eq!(root.major_version, 1);
        assert_eq!(root.minor_version, 1);
        assert_eq!(root.length, 6);
        assert_eq!(root.version, "v4.0.0");
        assert_eq!(root.flags, 0);
        assert_eq!(root.stream_number, 2);
        assert_eq!(root.stream_headers.len(), 2);

        let tables = root.stream(STREAM_TABLES).unwrap();
        assert_eq!(tables.offset, 0x40);
        assert_eq!(tables.size, 8);

        let strings = root.stream(STREAM_STRINGS).unwrap();
        assert_eq!(strings.offset, 0x48);
        assert_eq!(strings.size, 4);

        assert!(root.stream("#Blob").is_none());
    }

    #[test]
    fn bad_signature() {
        let mut root_bytes = vec![0u8; 0x40];
        root_bytes[0] = 0xFF;

        assert!(matches!(
            MetadataRoot::read(&root_bytes),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn version_string_not_padded_to_four() {
        // Length 5 consumes 8 bytes of version field.
        #[rustfmt::skip]
        let mut root_bytes = vec![
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00, // length = 5
            b'v', b'2', b'.', b'0', 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,             // flags
            0x00, 0x00,             // streams = 0
        ];
        root_bytes.resize(0x30, 0x00);

        let root = MetadataRoot::read(&root_bytes).unwrap();
        assert_eq!(root.version, "v2.0");
        assert_eq!(root.stream_number, 0);
        assert!(root.stream_headers.is_empty());
    }

    #[test]
    fn version_length_overflow() {
        #[rustfmt::skip]
        let root_bytes = vec![
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF, // length = u32::MAX
            0x00, 0x00, 0x00, 0x00,
        ];

        assert!(MetadataRoot::read(&root_bytes).is_err());
    }

    #[test]
    fn stream_past_metadata_end() {
        #[rustfmt::skip]
        let root_bytes = vec![
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00, // length = 4
            b'v', b'2', 0x00, 0x00,
            0x00, 0x00,             // flags
            0x01, 0x00,             // streams = 1

            0x00, 0x10, 0x00, 0x00, // offset 0x1000, far past the buffer
            0x08, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];

        assert!(matches!(
            MetadataRoot::read(&root_bytes),
            Err(OutOfBounds)
        ));
    }
}
