//! The `AssemblyRef` table (0x23), assemblies this module depends on.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `AssemblyRef` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRefRow {
    /// 1-based row identifier
    pub rid: u32,
    /// Referenced assembly major version
    pub major_version: u16,
    /// Referenced assembly minor version
    pub minor_version: u16,
    /// Referenced assembly build number
    pub build_number: u16,
    /// Referenced assembly revision number
    pub revision_number: u16,
    /// Assembly attribute flags
    pub flags: u32,
    /// `#Blob` index of the public key or its token, 0 for none
    pub public_key_or_token: u32,
    /// `#Strings` index of the assembly name
    pub name: u32,
    /// `#Strings` index of the culture string, 0 for culture neutral
    pub culture: u32,
    /// `#Blob` index of the hash of the referenced assembly, 0 for none
    pub hash_value: u32,
}

impl RowRead for AssemblyRefRow {
    const TABLE: TableId = TableId::AssemblyRef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* major_version */         2 +
            /* minor_version */         2 +
            /* build_number */          2 +
            /* revision_number */       2 +
            /* flags */                 4 +
            /* public_key_or_token */   sizes.blob_bytes() +
            /* name */                  sizes.str_bytes() +
            /* culture */               sizes.str_bytes() +
            /* hash_value */            sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRefRow {
            rid,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key_or_token: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            culture: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::{MetadataTable, TableInfo};

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = vec![
            0x04, 0x00, // major_version = 4
            0x00, 0x00, // minor_version = 0
            0x00, 0x00, // build_number = 0
            0x00, 0x00, // revision_number = 0
            0x01, 0x00, 0x00, 0x00, // flags
            0x0A, 0x00, // public_key_or_token
            0x0B, 0x00, // name
            0x00, 0x00, // culture
            0x0C, 0x00, // hash_value
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::AssemblyRef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<AssemblyRefRow>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.major_version, 4);
        assert_eq!(row.minor_version, 0);
        assert_eq!(row.flags, 1);
        assert_eq!(row.public_key_or_token, 0x0A);
        assert_eq!(row.name, 0x0B);
        assert_eq!(row.culture, 0);
        assert_eq!(row.hash_value, 0x0C);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = vec![
            0x04, 0x00,
            0x08, 0x00,
            0x0F, 0x00,
            0x10, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x0A, 0x00, 0x00, 0x00, // public_key_or_token
            0x0B, 0x00, 0x00, 0x00, // name
            0x00, 0x00, 0x00, 0x00, // culture
            0x0C, 0x00, 0x00, 0x00, // hash_value
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::AssemblyRef, 1)],
            true,
            false,
            true,
        ));
        assert_eq!(AssemblyRefRow::row_size(&sizes), 28);

        let table = MetadataTable::<AssemblyRefRow>::new(&data, 1, sizes).unwrap();
        let row = table.get(1).unwrap();
        assert_eq!(row.build_number, 0x0F);
        assert_eq!(row.public_key_or_token, 0x0A);
        assert_eq!(row.name, 0x0B);
    }
}
