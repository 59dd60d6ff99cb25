//! The `MemberRef` table (0x0A), references to members of other types.

use crate::{
    file::io::read_le_at_dyn,
    metadata::tables::{CodedIndexType, RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `MemberRef` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRefRow {
    /// 1-based row identifier
    pub rid: u32,
    /// `MemberRefParent` coded index of the owning type or module
    pub class: u32,
    /// `#Strings` index of the member name
    pub name: u32,
    /// `#Blob` index of the member signature
    pub signature: u32,
}

impl RowRead for MemberRefRow {
    const TABLE: TableId = TableId::MemberRef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */     sizes.coded_index_bytes(CodedIndexType::MemberRefParent) +
            /* name */      sizes.str_bytes() +
            /* signature */ sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MemberRefRow {
            rid,
            class: read_le_at_dyn(
                data,
                offset,
                sizes.is_large_coded_index(CodedIndexType::MemberRefParent),
            )?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
