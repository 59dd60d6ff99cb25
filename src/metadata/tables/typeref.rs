//! The `TypeRef` table (0x01), references to types defined elsewhere.

use crate::{
    file::io::read_le_at_dyn,
    metadata::tables::{CodedIndexType, RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `TypeRef` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRefRow {
    /// 1-based row identifier
    pub rid: u32,
    /// `ResolutionScope` coded index naming where the type is defined
    pub resolution_scope: u32,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the type namespace
    pub type_namespace: u32,
}

impl RowRead for TypeRefRow {
    const TABLE: TableId = TableId::TypeRef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* resolution_scope */  sizes.coded_index_bytes(CodedIndexType::ResolutionScope) +
            /* type_name */         sizes.str_bytes() +
            /* type_namespace */    sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeRefRow {
            rid,
            resolution_scope: read_le_at_dyn(
                data,
                offset,
                sizes.is_large_coded_index(CodedIndexType::ResolutionScope),
            )?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
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
            0x01, 0x01, // resolution_scope
            0x02, 0x02, // type_name
            0x03, 0x03, // type_namespace
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::TypeRef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<TypeRefRow>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.resolution_scope, 0x0101);
        assert_eq!(row.type_name, 0x0202);
        assert_eq!(row.type_namespace, 0x0303);
    }

    #[test]
    fn crafted_wide_coded_index() {
        // An AssemblyRef table past 0x4000 rows widens ResolutionScope to 4 bytes.
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // resolution_scope
            0x02, 0x02, // type_name
            0x03, 0x03, // type_namespace
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::TypeRef, 1), (TableId::AssemblyRef, 0x8000)],
            false,
            false,
            false,
        ));
        assert_eq!(TypeRefRow::row_size(&sizes), 8);

        let table = MetadataTable::<TypeRefRow>::new(&data, 1, sizes).unwrap();
        let row = table.get(1).unwrap();
        assert_eq!(row.resolution_scope, 0x0101_0101);
        assert_eq!(row.type_name, 0x0202);
    }
}
