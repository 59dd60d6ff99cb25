//! Stream headers of the metadata root directory.
//!
//! A stream header names one region of the metadata: `#~` or `#-` for the tables,
//! `#Strings`, `#US`, `#Blob` and `#GUID` for the heaps. The header length is not
//! fixed; the name is NUL terminated and padded to a 4-byte boundary.

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// Well-known name of the compressed tables stream
pub const STREAM_TABLES: &str = "#~";
/// Well-known name of the uncompressed tables stream
pub const STREAM_TABLES_UNCOMPRESSED: &str = "#-";
/// Well-known name of the string heap
pub const STREAM_STRINGS: &str = "#Strings";
/// Well-known name of the user string heap
pub const STREAM_USER_STRINGS: &str = "#US";
/// Well-known name of the blob heap
pub const STREAM_BLOB: &str = "#Blob";
/// Well-known name of the GUID heap
pub const STREAM_GUID: &str = "#GUID";

/// A stream header provides the name, position and length of one metadata stream.
///
/// `offset` is relative to the start of the metadata root, not to the file.
pub struct StreamHeader {
    /// Offset of the stream from the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, a multiple of 4
    pub size: u32,
    /// NUL-terminated stream name, at most 32 characters
    pub name: String,
}

impl StreamHeader {
    /// Create a `StreamHeader` from a sequence of bytes
    ///
    /// ## Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the name is unterminated or overlong
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let mut name = String::with_capacity(32);
        let mut terminated = false;
        for counter in 0..std::cmp::min(32, data.len() - 8) {
            let name_char = read_le::<u8>(&data[8 + counter..])?;
            if name_char == 0 {
                terminated = true;
                break;
            }

            name.push(char::from(name_char));
        }

        if !terminated {
            return Err(malformed_error!(
                "Stream header name is not NUL terminated within 32 characters"
            ));
        }

        if name.is_empty() {
            return Err(malformed_error!("Stream header name is empty"));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Number of bytes this header occupies in the stream directory, name padding
    /// included.
    #[must_use]
    pub fn directory_size(&self) -> usize {
        let name_aligned = ((self.name.len() + 1) + 3) & !3;
        8 + name_aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, STREAM_TABLES);
        assert_eq!(parsed_header.directory_size(), 12);
    }

    #[test]
    fn crafted_strings() {
        #[rustfmt::skip]
        let header_bytes = [
            0x10, 0x00, 0x00, 0x00,
            0x80, 0x00, 0x00, 0x00,
            b'#', b'S', b't', b'r', b'i', b'n', b'g', b's', 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.name, STREAM_STRINGS);
        // "#Strings\0" is 9 bytes, padded to 12.
        assert_eq!(parsed_header.directory_size(), 20);
    }

    #[test]
    fn unterminated_name() {
        let mut header_bytes = vec![0u8; 8];
        header_bytes.extend_from_slice(&[b'x'; 40]);

        assert!(StreamHeader::from(&header_bytes).is_err());
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            StreamHeader::from(&[0u8; 8]),
            Err(OutOfBounds)
        ));
    }
}
