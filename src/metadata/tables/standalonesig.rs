//! The `StandAloneSig` table (0x11), signatures not attached to any other row.

use crate::{
    file::io::read_le_at_dyn,
    metadata::tables::{RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `StandAloneSig` table, a single `#Blob` index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandAloneSigRow {
    /// 1-based row identifier
    pub rid: u32,
    /// `#Blob` index of the signature
    pub signature: u32,
}

impl RowRead for StandAloneSigRow {
    const TABLE: TableId = TableId::StandAloneSig;

    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.blob_bytes())
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(StandAloneSigRow {
            rid,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
