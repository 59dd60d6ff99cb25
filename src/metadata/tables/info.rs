//! Row counts and index width bookkeeping for the metadata tables.
//!
//! Row layouts are not fixed: heap indexes are 2 or 4 bytes depending on the
//! `HeapSizes` flags, table indexes widen once the target table exceeds 65535 rows, and
//! coded indexes widen once their tag bits plus the largest member table index no
//! longer fit 16 bits. [`TableInfo`] captures the row count vector and the heap flags
//! once; every width is then a pure function of those.

use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::{CodedIndexType, TableId},
    Error::OutOfBounds,
    Result,
};

/// `HeapSizes` bit widening `#Strings` indexes to 4 bytes
const HEAP_WIDE_STR: u8 = 0x01;
/// `HeapSizes` bit widening `#GUID` indexes to 4 bytes
const HEAP_WIDE_GUID: u8 = 0x02;
/// `HeapSizes` bit widening `#Blob` indexes to 4 bytes
const HEAP_WIDE_BLOB: u8 = 0x04;

/// Row counts and heap flags of one tables stream, from which every index width in the
/// row layouts derives.
///
/// A table index is 2 bytes until its target table outgrows `u16::MAX` rows. A coded
/// index spends `tag_bits` of its 16-bit form on the table tag, so it widens as soon
/// as any member table reaches `2^(16 - tag_bits)` rows.
#[derive(Clone)]
pub struct TableInfo {
    /// Row count per table id, zero for absent tables
    row_counts: Vec<u32>,
    /// The raw `HeapSizes` byte of the stream header
    heap_sizes: u8,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Build a new `TableInfo` struct from a `#~` stream header.
    ///
    /// ## Arguments
    /// * 'data' - The tables stream, starting at its reserved leading `u32`
    /// * 'valid' - The valid bitvector from the header, naming the present tables
    ///
    /// # Errors
    /// Returns an error if the stream is too short for the row count vector
    pub fn new(data: &[u8], valid: u64) -> Result<Self> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let heap_sizes = read_le::<u8>(&data[6..])?;

        // One count per set bit, ascending table-id order, starting after the header.
        let mut row_counts = vec![0_u32; TableId::COUNT];
        let mut cursor = 24;
        for table in TableId::iter() {
            if valid & (1 << table as usize) != 0 {
                row_counts[table as usize] = read_le_at::<u32>(data, &mut cursor)?;
            }
        }

        Ok(TableInfo {
            row_counts,
            heap_sizes,
        })
    }

    #[cfg(test)]
    /// Special constructor for unit-tests
    ///
    /// ## Arguments
    /// * 'valid_tables' - (table_id, row_count) pairs of the present tables
    /// * 'large_str'    - Widen `#Strings` heap indexes to 4 bytes
    /// * 'large_guid'   - Widen `#GUID` heap indexes to 4 bytes
    /// * 'large_blob'   - Widen `#Blob` heap indexes to 4 bytes
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_guid: bool,
        large_blob: bool,
    ) -> Self {
        let mut row_counts = vec![0_u32; TableId::COUNT];
        for (table, rows) in valid_tables {
            row_counts[*table as usize] = *rows;
        }

        let mut heap_sizes = 0;
        if large_str {
            heap_sizes |= HEAP_WIDE_STR;
        }
        if large_guid {
            heap_sizes |= HEAP_WIDE_GUID;
        }
        if large_blob {
            heap_sizes |= HEAP_WIDE_BLOB;
        }

        TableInfo {
            row_counts,
            heap_sizes,
        }
    }

    /// Number of rows of a specific table, 0 when absent
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.row_counts[table as usize]
    }

    /// Indicates the size of indexes referring into the '#Strings' heap. True means 4 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.heap_sizes & HEAP_WIDE_STR != 0
    }

    /// Indicates the size of indexes referring into the '#GUID' heap. True means 4 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.heap_sizes & HEAP_WIDE_GUID != 0
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.heap_sizes & HEAP_WIDE_BLOB != 0
    }

    /// Returns the width of '#Strings' heap indexes in bytes
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_str() {
            4
        } else {
            2
        }
    }

    /// Returns the width of '#GUID' heap indexes in bytes
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_guid() {
            4
        } else {
            2
        }
    }

    /// Returns the width of '#Blob' heap indexes in bytes
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_blob() {
            4
        } else {
            2
        }
    }

    /// True when indexes into a specific table are 4 bytes wide
    #[must_use]
    pub fn is_large(&self, table: TableId) -> bool {
        self.rows(table) > u32::from(u16::MAX)
    }

    /// Returns the number of bytes used by indexes into a specific table.
    ///
    /// # Arguments
    /// * `table` - The `TableId` for which to calculate the index size
    #[must_use]
    pub fn table_index_bytes(&self, table: TableId) -> u8 {
        if self.is_large(table) {
            4
        } else {
            2
        }
    }

    /// True when a specific coded index family is 4 bytes wide.
    ///
    /// The 2-byte form keeps `16 - tag_bits` bits for the row index, so the family
    /// widens once any member table reaches `2^(16 - tag_bits)` rows.
    #[must_use]
    pub fn is_large_coded_index(&self, coded_index: CodedIndexType) -> bool {
        let largest_member = coded_index
            .tables()
            .iter()
            .map(|table| self.rows(*table))
            .max()
            .unwrap_or(0);

        largest_member >= 1_u32 << (16 - coded_index.tag_bits())
    }

    /// Returns the byte width of a specific coded index family.
    ///
    /// # Arguments
    /// * `coded_index` - The `CodedIndexType` for which to retrieve the size
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index: CodedIndexType) -> u8 {
        if self.is_large_coded_index(coded_index) {
            4
        } else {
            2
        }
    }

    /// Byte width of one row of the given table.
    ///
    /// Covers every table id, including the ones this crate does not expose as typed
    /// rows; the table walk relies on these widths to keep later tables at their
    /// correct offsets.
    #[must_use]
    #[rustfmt::skip]
    pub fn row_size(&self, table: TableId) -> u32 {
        let s = self.str_bytes();
        let g = self.guid_bytes();
        let b = self.blob_bytes();

        let size: u8 = match table {
            TableId::Module =>
                2 + s + g + g + g,
            TableId::TypeRef =>
                self.coded_index_bytes(CodedIndexType::ResolutionScope) + s + s,
            TableId::TypeDef =>
                4 + s + s
                + self.coded_index_bytes(CodedIndexType::TypeDefOrRef)
                + self.table_index_bytes(TableId::Field)
                + self.table_index_bytes(TableId::MethodDef),
            TableId::FieldPtr =>
                self.table_index_bytes(TableId::Field),
            TableId::Field =>
                2 + s + b,
            TableId::MethodPtr =>
                self.table_index_bytes(TableId::MethodDef),
            TableId::MethodDef =>
                4 + 2 + 2 + s + b + self.table_index_bytes(TableId::Param),
            TableId::ParamPtr =>
                self.table_index_bytes(TableId::Param),
            TableId::Param =>
                2 + 2 + s,
            TableId::InterfaceImpl =>
                self.table_index_bytes(TableId::TypeDef)
                + self.coded_index_bytes(CodedIndexType::TypeDefOrRef),
            TableId::MemberRef =>
                self.coded_index_bytes(CodedIndexType::MemberRefParent) + s + b,
            TableId::Constant =>
                2 + self.coded_index_bytes(CodedIndexType::HasConstant) + b,
            TableId::CustomAttribute =>
                self.coded_index_bytes(CodedIndexType::HasCustomAttribute)
                + self.coded_index_bytes(CodedIndexType::CustomAttributeType)
                + b,
            TableId::FieldMarshal =>
                self.coded_index_bytes(CodedIndexType::HasFieldMarshal) + b,
            TableId::DeclSecurity =>
                2 + self.coded_index_bytes(CodedIndexType::HasDeclSecurity) + b,
            TableId::ClassLayout =>
                2 + 4 + self.table_index_bytes(TableId::TypeDef),
            TableId::FieldLayout =>
                4 + self.table_index_bytes(TableId::Field),
            TableId::StandAloneSig =>
                b,
            TableId::EventMap =>
                self.table_index_bytes(TableId::TypeDef)
                + self.table_index_bytes(TableId::Event),
            TableId::EventPtr =>
                self.table_index_bytes(TableId::Event),
            TableId::Event =>
                2 + s + self.coded_index_bytes(CodedIndexType::TypeDefOrRef),
            TableId::PropertyMap =>
                self.table_index_bytes(TableId::TypeDef)
                + self.table_index_bytes(TableId::Property),
            TableId::PropertyPtr =>
                self.table_index_bytes(TableId::Property),
            TableId::Property =>
                2 + s + b,
            TableId::MethodSemantics =>
                2 + self.table_index_bytes(TableId::MethodDef)
                + self.coded_index_bytes(CodedIndexType::HasSemantics),
            TableId::MethodImpl =>
                self.table_index_bytes(TableId::TypeDef)
                + self.coded_index_bytes(CodedIndexType::MethodDefOrRef)
                + self.coded_index_bytes(CodedIndexType::MethodDefOrRef),
            TableId::ModuleRef =>
                s,
            TableId::TypeSpec =>
                b,
            TableId::ImplMap =>
                2 + self.coded_index_bytes(CodedIndexType::MemberForwarded)
                + s + self.table_index_bytes(TableId::ModuleRef),
            TableId::FieldRVA =>
                4 + self.table_index_bytes(TableId::Field),
            TableId::EncLog =>
                4 + 4,
            TableId::EncMap =>
                4,
            TableId::Assembly =>
                4 + 2 + 2 + 2 + 2 + 4 + b + s + s,
            TableId::AssemblyProcessor =>
                4,
            TableId::AssemblyOS =>
                4 + 4 + 4,
            TableId::AssemblyRef =>
                2 + 2 + 2 + 2 + 4 + b + s + s + b,
            TableId::AssemblyRefProcessor =>
                4 + self.table_index_bytes(TableId::AssemblyRef),
            TableId::AssemblyRefOS =>
                4 + 4 + 4 + self.table_index_bytes(TableId::AssemblyRef),
            TableId::File =>
                4 + s + b,
            TableId::ExportedType =>
                4 + 4 + s + s + self.coded_index_bytes(CodedIndexType::Implementation),
            TableId::ManifestResource =>
                4 + 4 + s + self.coded_index_bytes(CodedIndexType::Implementation),
            TableId::NestedClass =>
                self.table_index_bytes(TableId::TypeDef)
                + self.table_index_bytes(TableId::TypeDef),
            TableId::GenericParam =>
                2 + 2 + self.coded_index_bytes(CodedIndexType::TypeOrMethodDef) + s,
            TableId::MethodSpec =>
                self.coded_index_bytes(CodedIndexType::MethodDefOrRef) + b,
            TableId::GenericParamConstraint =>
                self.table_index_bytes(TableId::GenericParam)
                + self.coded_index_bytes(CodedIndexType::TypeDefOrRef),
        };

        u32::from(size)
    }
}
