//! The `MethodDef` table (0x06), methods defined in this module.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `MethodDef` table.
///
/// `rva` points at the IL method body inside the image; pass it through
/// [`crate::CoffFile::rva_to_offset`] and [`crate::CoffFile::method_size`] to measure
/// the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefRow {
    /// 1-based row identifier
    pub rid: u32,
    /// RVA of the method body, 0 for abstract and extern methods
    pub rva: u32,
    /// Implementation attribute flags
    pub impl_flags: u16,
    /// Method attribute flags
    pub flags: u16,
    /// `#Strings` index of the method name
    pub name: u32,
    /// `#Blob` index of the method signature
    pub signature: u32,
    /// First `Param` row owned by this method
    pub param_list: u32,
}

impl RowRead for MethodDefRow {
    const TABLE: TableId = TableId::MethodDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */           4 +
            /* impl_flags */    2 +
            /* flags */         2 +
            /* name */          sizes.str_bytes() +
            /* signature */     sizes.blob_bytes() +
            /* param_list */    sizes.table_index_bytes(TableId::Param)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodDefRow {
            rid,
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
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
        let data = vec![
            0x50, 0x20, 0x00, 0x00, // rva = 0x2050
            0x01, 0x01, // impl_flags
            0x02, 0x02, // flags
            0x03, 0x03, // name
            0x04, 0x04, // signature
            0x05, 0x05, // param_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MethodDef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodDefRow>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.rva, 0x2050);
        assert_eq!(row.impl_flags, 0x0101);
        assert_eq!(row.flags, 0x0202);
        assert_eq!(row.name, 0x0303);
        assert_eq!(row.signature, 0x0404);
        assert_eq!(row.param_list, 0x0505);
    }

    #[test]
    fn crafted_multiple_rows() {
        let mut data = Vec::new();
        for index in 1..=3_u8 {
            data.extend_from_slice(&u32::from(index).to_le_bytes()); // rva
            data.extend_from_slice(&[0, 0, 0, 0]); // impl_flags + flags
            data.extend_from_slice(&[index, 0]); // name
            data.extend_from_slice(&[0, 0, 0, 0]); // signature + param_list
        }

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::MethodDef, 3)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodDefRow>::new(&data, 3, sizes).unwrap();

        let rvas: Vec<u32> = table.iter().map(|row| row.rva).collect();
        assert_eq!(rvas, vec![1, 2, 3]);
        assert_eq!(table.get(3).unwrap().name, 3);
    }
}
