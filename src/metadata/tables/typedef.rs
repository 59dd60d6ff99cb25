//! The `TypeDef` table (0x02), types defined in this module.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{CodedIndexType, RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `TypeDef` table.
///
/// `field_list` and `method_list` are the first indexes of runs that end where the
/// next row's run begins, per the usual list convention of the table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefRow {
    /// 1-based row identifier
    pub rid: u32,
    /// Type attribute flags
    pub flags: u32,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the type namespace
    pub type_namespace: u32,
    /// `TypeDefOrRef` coded index of the base type, 0 for none
    pub extends: u32,
    /// First `Field` row owned by this type
    pub field_list: u32,
    /// First `MethodDef` row owned by this type
    pub method_list: u32,
}

impl RowRead for TypeDefRow {
    const TABLE: TableId = TableId::TypeDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */             4 +
            /* type_name */         sizes.str_bytes() +
            /* type_namespace */    sizes.str_bytes() +
            /* extends */           sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef) +
            /* field_list */        sizes.table_index_bytes(TableId::Field) +
            /* method_list */       sizes.table_index_bytes(TableId::MethodDef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeDefRow {
            rid,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: read_le_at_dyn(
                data,
                offset,
                sizes.is_large_coded_index(CodedIndexType::TypeDefOrRef),
            )?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
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
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, // type_name
            0x03, 0x03, // type_namespace
            0x04, 0x04, // extends
            0x05, 0x05, // field_list
            0x06, 0x06, // method_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::TypeDef, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<TypeDefRow>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.flags, 0x0101_0101);
        assert_eq!(row.type_name, 0x0202);
        assert_eq!(row.type_namespace, 0x0303);
        assert_eq!(row.extends, 0x0404);
        assert_eq!(row.field_list, 0x0505);
        assert_eq!(row.method_list, 0x0606);
    }

    #[test]
    fn crafted_large_method_table() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, // type_name
            0x03, 0x03, // type_namespace
            0x04, 0x04, // extends
            0x05, 0x05, // field_list
            0x06, 0x06, 0x06, 0x06, // method_list (4 bytes)
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::TypeDef, 1), (TableId::MethodDef, 0x2_0000)],
            false,
            false,
            false,
        ));
        assert_eq!(TypeDefRow::row_size(&sizes), 16);

        let table = MetadataTable::<TypeDefRow>::new(&data, 1, sizes).unwrap();
        let row = table.get(1).unwrap();
        assert_eq!(row.method_list, 0x0606_0606);
    }
}
