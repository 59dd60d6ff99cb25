//! COFF symbol table records and derived queries.
//!
//! Symbols are fixed 18-byte records. A record may be followed by auxiliary records
//! counted by `number_of_aux_symbols`; they occupy symbol table slots but are not
//! symbols themselves, so iteration steps by `1 + aux` and index arithmetic must use
//! raw slot numbers.

use bitflags::bitflags;

use crate::{file::parser::Parser, Result};

/// Section number sentinel: symbol is undefined (external reference)
pub const IMAGE_SYM_UNDEFINED: i16 = 0;
/// Section number sentinel: symbol has an absolute value, not an address
pub const IMAGE_SYM_ABSOLUTE: i16 = -1;
/// Section number sentinel: symbol provides debugging information
pub const IMAGE_SYM_DEBUG: i16 = -2;

/// Storage class: external (global) symbol
pub const IMAGE_SYM_CLASS_EXTERNAL: u8 = 2;
/// Storage class: static (file local) symbol
pub const IMAGE_SYM_CLASS_STATIC: u8 = 3;
/// Storage class: source file record
pub const IMAGE_SYM_CLASS_FILE: u8 = 103;
/// Storage class: weak external symbol
pub const IMAGE_SYM_CLASS_WEAK_EXTERNAL: u8 = 105;

/// Complex type marker for functions, stored in bits 4-7 of the type word
pub const IMAGE_SYM_DTYPE_FUNCTION: u8 = 2;

/// Broad classification of a symbol, derived from its type word, storage class and the
/// characteristics of its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Undefined external; nothing is known about the referent
    Unknown,
    /// Function symbol
    Function,
    /// Symbol resident in a readable, non-writable section
    Data,
    /// Anything else
    Other,
}

bitflags! {
    /// Flag summary of a symbol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SymbolFlags: u32 {
        /// Symbol is undefined and must be resolved elsewhere
        const UNDEFINED = 0x01;
        /// Symbol is a common block (undefined with a nonzero size in `value`)
        const COMMON = 0x02;
        /// Symbol has external linkage
        const GLOBAL = 0x04;
        /// Symbol is a weak external
        const WEAK = 0x08;
        /// Symbol has an absolute value
        const ABSOLUTE = 0x10;
    }
}

/// The name field of a symbol record: 8 inline bytes, or an offset into the string
/// table when the leading 4 bytes are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolName {
    /// Name stored inline; all 8 bytes are significant when no NUL is present
    Short([u8; 8]),
    /// Offset of the name within the string table
    Offset(u32),
}

/// One 18-byte record of the COFF symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Name field, inline or string table offset
    pub name: SymbolName,
    /// Value of the symbol; meaning depends on the section number
    pub value: u32,
    /// 1-based section index, or one of the sentinels at/below [`IMAGE_SYM_UNDEFINED`]
    pub section_number: i16,
    /// Type word: base type in bits 0-3, complex type in bits 4-7
    pub typ: u16,
    /// Storage class, e.g. [`IMAGE_SYM_CLASS_EXTERNAL`]
    pub storage_class: u8,
    /// Number of auxiliary records following this one
    pub number_of_aux_symbols: u8,
}

impl Symbol {
    /// Size of one serialized symbol record in bytes
    pub const SIZE: usize = 18;

    /// Read a `Symbol` record at the parser's current position
    ///
    /// ## Arguments
    /// * 'parser' - The cursor to decode from, advanced past the record
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer is too short
    pub fn read(parser: &mut Parser<'_>) -> Result<Symbol> {
        let mut name_bytes = [0u8; 8];
        for byte in &mut name_bytes {
            *byte = parser.read_le::<u8>()?;
        }

        // First 4 bytes zero marks a string table reference.
        let name = if name_bytes[..4] == [0, 0, 0, 0] {
            SymbolName::Offset(u32::from_le_bytes([
                name_bytes[4],
                name_bytes[5],
                name_bytes[6],
                name_bytes[7],
            ]))
        } else {
            SymbolName::Short(name_bytes)
        };

        Ok(Symbol {
            name,
            value: parser.read_le::<u32>()?,
            section_number: parser.read_le::<i16>()?,
            typ: parser.read_le::<u16>()?,
            storage_class: parser.read_le::<u8>()?,
            number_of_aux_symbols: parser.read_le::<u8>()?,
        })
    }

    /// Base type from bits 0-3 of the type word
    #[must_use]
    pub fn base_type(&self) -> u8 {
        (self.typ & 0x0F) as u8
    }

    /// Complex type from bits 4-7 of the type word
    #[must_use]
    pub fn complex_type(&self) -> u8 {
        ((self.typ & 0xF0) >> 4) as u8
    }

    /// True if the section number is the undefined sentinel
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.section_number == IMAGE_SYM_UNDEFINED
    }

    /// True if the section number is a sentinel rather than a real section index
    #[must_use]
    pub fn has_section(&self) -> bool {
        self.section_number > IMAGE_SYM_UNDEFINED
    }

    /// Flag summary derived from value, section number and storage class
    #[must_use]
    pub fn flags(&self) -> SymbolFlags {
        let mut flags = SymbolFlags::empty();

        if self.section_number == IMAGE_SYM_UNDEFINED {
            if self.value == 0 {
                flags |= SymbolFlags::UNDEFINED;
            } else {
                flags |= SymbolFlags::COMMON;
            }
        }

        if self.storage_class == IMAGE_SYM_CLASS_EXTERNAL {
            flags |= SymbolFlags::GLOBAL;
        }

        if self.storage_class == IMAGE_SYM_CLASS_WEAK_EXTERNAL {
            flags |= SymbolFlags::WEAK;
        }

        if self.section_number == IMAGE_SYM_ABSOLUTE {
            flags |= SymbolFlags::ABSOLUTE;
        }

        flags
    }
}
