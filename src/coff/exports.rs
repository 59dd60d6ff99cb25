//! The export directory and its three parallel tables.
//!
//! The export address table, name pointer table and ordinal table are located through
//! their RVAs in the 40-byte export directory. Export `i` has ordinal
//! `ordinal_base + i`; its name, if any, is found by scanning the ordinal table for the
//! value `i` and reading the name pointer at the matching position.

use crate::{file::parser::Parser, Result};

/// The export directory table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportDirectory {
    /// Reserved, must be zero
    pub export_flags: u32,
    /// Creation time of the export data
    pub time_date_stamp: u32,
    /// User set major version
    pub major_version: u16,
    /// User set minor version
    pub minor_version: u16,
    /// RVA of the NUL-terminated name of the exporting DLL
    pub name_rva: u32,
    /// Starting ordinal number of the address table
    pub ordinal_base: u32,
    /// Number of entries in the export address table
    pub address_table_entries: u32,
    /// Number of entries in the name pointer and ordinal tables
    pub number_of_name_pointers: u32,
    /// RVA of the export address table
    pub export_address_table_rva: u32,
    /// RVA of the name pointer table
    pub name_pointer_rva: u32,
    /// RVA of the ordinal table
    pub ordinal_table_rva: u32,
}

impl ExportDirectory {
    /// Size of the serialized directory in bytes
    pub const SIZE: usize = 40;

    /// Read an `ExportDirectory` at the parser's current position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer is too short
    pub fn read(parser: &mut Parser<'_>) -> Result<ExportDirectory> {
        Ok(ExportDirectory {
            export_flags: parser.read_le::<u32>()?,
            time_date_stamp: parser.read_le::<u32>()?,
            major_version: parser.read_le::<u16>()?,
            minor_version: parser.read_le::<u16>()?,
            name_rva: parser.read_le::<u32>()?,
            ordinal_base: parser.read_le::<u32>()?,
            address_table_entries: parser.read_le::<u32>()?,
            number_of_name_pointers: parser.read_le::<u32>()?,
            export_address_table_rva: parser.read_le::<u32>()?,
            name_pointer_rva: parser.read_le::<u32>()?,
            ordinal_table_rva: parser.read_le::<u32>()?,
        })
    }
}
