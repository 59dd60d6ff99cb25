//! Import directory entries and import lookup tables.
//!
//! The import directory is an array of 20-byte entries terminated by an all-zero
//! sentinel. Each entry names one DLL and points at its import lookup table, an array
//! of 32-bit entries: bit 31 set means import by ordinal (low 16 bits), clear means
//! the value is the RVA of a `(hint: u16, name: cstr)` pair.

use crate::{file::parser::Parser, Result};

/// One 20-byte entry of the import directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportDirectoryEntry {
    /// RVA of the import lookup table for this DLL
    pub import_lookup_table_rva: u32,
    /// Timestamp, 0 until the image is bound
    pub time_date_stamp: u32,
    /// Index of the first forwarder reference
    pub forwarder_chain: u32,
    /// RVA of the NUL-terminated DLL name
    pub name_rva: u32,
    /// RVA of the import address table, overwritten by the loader at bind time
    pub import_address_table_rva: u32,
}

impl ImportDirectoryEntry {
    /// Size of one serialized entry in bytes
    pub const SIZE: usize = 20;

    /// Read an `ImportDirectoryEntry` at the parser's current position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer is too short
    pub fn read(parser: &mut Parser<'_>) -> Result<ImportDirectoryEntry> {
        Ok(ImportDirectoryEntry {
            import_lookup_table_rva: parser.read_le::<u32>()?,
            time_date_stamp: parser.read_le::<u32>()?,
            forwarder_chain: parser.read_le::<u32>()?,
            name_rva: parser.read_le::<u32>()?,
            import_address_table_rva: parser.read_le::<u32>()?,
        })
    }

    /// True for the all-zero sentinel terminating the directory
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        *self == ImportDirectoryEntry::default()
    }
}

/// One 32-bit entry of an import lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLookupEntry(pub u32);

impl ImportLookupEntry {
    /// True when the import is by ordinal rather than by name
    #[must_use]
    pub fn is_ordinal(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// The import ordinal; only meaningful when [`Self::is_ordinal`] is true
    #[must_use]
    pub fn ordinal(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// RVA of the hint/name pair; only meaningful when [`Self::is_ordinal`] is false
    #[must_use]
    pub fn hint_name_rva(&self) -> u32 {
        self.0
    }

    /// True for the zero entry terminating a lookup table
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        self.0 == 0
    }
}
