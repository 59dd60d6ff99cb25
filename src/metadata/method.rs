//! IL method body probing.
//!
//! A method body starts with either a tiny header (one byte, low bits `0b10`, code
//! size in the upper six bits) or a fat header (12 bytes, low bits of the first byte
//! `0b11`). The probe classifies the header and reports sizes without decoding any
//! IL.
//!
//! # Reference
//! - ECMA-335 6th Edition, II.25.4

use bitflags::bitflags;

use crate::{
    file::io::read_le,
    Error::OutOfBounds,
    Result,
};

bitflags! {
    /// Flag bits of a fat method header's first word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodHeaderFlags: u16 {
        /// Tiny header format marker
        const TINY_FORMAT = 0x0002;
        /// Fat header format marker
        const FAT_FORMAT = 0x0003;
        /// Extra data sections follow the method body
        const MORE_SECTS = 0x0008;
        /// Locals are zero initialized
        const INIT_LOCALS = 0x0010;
    }
}

/// Size classification of one IL method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBodyProbe {
    /// Size of the IL code in bytes, header excluded
    pub size_code: usize,
    /// Size of the method header in bytes: 1 for tiny, 12 for fat
    pub size_header: usize,
    /// True for the fat header format
    pub is_fat: bool,
    /// Maximum operand stack depth; 8 implied for tiny bodies
    pub max_stack: usize,
    /// Token of the local variable signature, 0 for none or tiny bodies
    pub local_var_sig_token: u32,
}

impl MethodBodyProbe {
    /// Classify the method body starting at the beginning of `data`.
    ///
    /// # Arguments
    /// * `data` - Bytes of the method body, starting at its header
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the first byte carries neither the
    /// tiny nor the fat format marker, and [`OutOfBounds`] when the declared sizes
    /// exceed the available data.
    pub fn from(data: &[u8]) -> Result<MethodBodyProbe> {
        if data.is_empty() {
            return Err(OutOfBounds);
        }

        let first_byte = read_le::<u8>(data)?;
        match first_byte & 0b11 {
            0b10 => {
                let size_code = (first_byte >> 2) as usize;
                if size_code + 1 > data.len() {
                    return Err(OutOfBounds);
                }

                Ok(MethodBodyProbe {
                    size_code,
                    size_header: 1,
                    is_fat: false,
                    max_stack: 8,
                    local_var_sig_token: 0,
                })
            }
            0b11 => {
                if data.len() < 12 {
                    return Err(OutOfBounds);
                }

                let size_code = read_le::<u32>(&data[4..])? as usize;
                if size_code.checked_add(12).ok_or(OutOfBounds)? > data.len() {
                    return Err(OutOfBounds);
                }

                Ok(MethodBodyProbe {
                    size_code,
                    size_header: 12,
                    is_fat: true,
                    max_stack: read_le::<u16>(&data[2..])? as usize,
                    local_var_sig_token: read_le::<u32>(&data[8..])?,
                })
            }
            _ => Err(malformed_error!(
                "Method header is neither fat nor tiny - {:#04x}",
                first_byte
            )),
        }
    }

    /// Flags of a fat header's first word; for tiny bodies only the format bits are
    /// meaningful.
    ///
    /// # Arguments
    /// * `data` - The same bytes the probe was created from
    #[must_use]
    pub fn flags(&self, data: &[u8]) -> MethodHeaderFlags {
        if self.is_fat && data.len() >= 2 {
            MethodHeaderFlags::from_bits_truncate(
                u16::from_le_bytes([data[0], data[1]]) & 0x0FFF,
            )
        } else {
            MethodHeaderFlags::TINY_FORMAT
        }
    }

    /// Get the full size of this method, header plus code
    #[must_use]
    pub fn size(&self) -> usize {
        self.size_code + self.size_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_bodies() {
        // size_code in the upper six bits, low bits 0b10.
        for size_code in [0_usize, 1, 7, 63] {
            #[allow(clippy::cast_possible_truncation)]
            let header = ((size_code as u8) << 2) | 0b10;
            let mut data = vec![header];
            data.extend(std::iter::repeat(0x00).take(size_code));

            let probe = MethodBodyProbe::from(&data).unwrap();
            assert!(!probe.is_fat);
            assert_eq!(probe.size_code, size_code);
            assert_eq!(probe.size_header, 1);
            assert_eq!(probe.size(), size_code + 1);
        }
    }

    #[test]
    fn fat_body() {
        #[rustfmt::skip]
        let mut data = vec![
            0x13, 0x30,             // flags: fat | init_locals, header size 3 dwords
            0x08, 0x00,             // max_stack = 8
            0x10, 0x00, 0x00, 0x00, // code_size = 16
            0x01, 0x00, 0x00, 0x11, // local_var_sig_token
        ];
        data.extend_from_slice(&[0u8; 16]);

        let probe = MethodBodyProbe::from(&data).unwrap();
        assert!(probe.is_fat);
        assert_eq!(probe.size_code, 16);
        assert_eq!(probe.size_header, 12);
        assert_eq!(probe.size(), 28);
        assert_eq!(probe.max_stack, 8);
        assert_eq!(probe.local_var_sig_token, 0x1100_0001);

        let flags = probe.flags(&data);
        assert!(flags.contains(MethodHeaderFlags::FAT_FORMAT));
        assert!(flags.contains(MethodHeaderFlags::INIT_LOCALS));
        assert!(!flags.contains(MethodHeaderFlags::MORE_SECTS));
    }

    #[test]
    fn invalid_header_bits() {
        // Low bits 0b00 and 0b01 are not valid method headers.
        assert!(matches!(
            MethodBodyProbe::from(&[0x00, 0x00]),
            Err(crate::Error::Malformed { .. })
        ));
        assert!(matches!(
            MethodBodyProbe::from(&[0x01, 0x00]),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_bodies() {
        // Tiny header declaring 4 bytes of code with only 2 present.
        assert!(matches!(
            MethodBodyProbe::from(&[0b0001_0010, 0x00, 0x00]),
            Err(OutOfBounds)
        ));

        // Fat header cut short.
        assert!(matches!(
            MethodBodyProbe::from(&[0x03, 0x30, 0x08, 0x00]),
            Err(OutOfBounds)
        ));

        assert!(matches!(MethodBodyProbe::from(&[]), Err(OutOfBounds)));
    }
}
