//! The `Module` table (0x00), one row describing the current module.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{RowRead, TableId, TableInfoRef},
    Result,
};

/// One row of the `Module` table.
///
/// Heap indexes are reported raw; this crate does not materialize the `#Strings` or
/// `#GUID` heaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRow {
    /// 1-based row identifier
    pub rid: u32,
    /// Reserved generation counter, zero outside edit-and-continue scenarios
    pub generation: u16,
    /// `#Strings` index of the module name
    pub name: u32,
    /// `#GUID` index of the module version id
    pub mvid: u32,
    /// `#GUID` index for edit-and-continue, usually zero
    pub encid: u32,
    /// `#GUID` index for edit-and-continue, usually zero
    pub encbaseid: u32,
}

impl RowRead for ModuleRow {
    const TABLE: TableId = TableId::Module;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* generation */    2 +
            /* name */          sizes.str_bytes() +
            /* mvid */          sizes.guid_bytes() +
            /* encid */         sizes.guid_bytes() +
            /* encbaseid */     sizes.guid_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ModuleRow {
            rid,
            generation: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            mvid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encbaseid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
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
            0x01, 0x01, // generation
            0x02, 0x02, // name
            0x03, 0x03, // mvid
            0x04, 0x04, // encid
            0x05, 0x05, // encbaseid
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Module, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ModuleRow>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.generation, 0x0101);
        assert_eq!(row.name, 0x0202);
        assert_eq!(row.mvid, 0x0303);
        assert_eq!(row.encid, 0x0404);
        assert_eq!(row.encbaseid, 0x0505);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, // generation
            0x02, 0x02, 0x02, 0x02, // name
            0x03, 0x03, 0x03, 0x03, // mvid
            0x04, 0x04, 0x04, 0x04, // encid
            0x05, 0x05, 0x05, 0x05, // encbaseid
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Module, 1)],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<ModuleRow>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.generation, 0x0101);
        assert_eq!(row.name, 0x0202_0202);
        assert_eq!(row.mvid, 0x0303_0303);
        assert_eq!(row.encid, 0x0404_0404);
        assert_eq!(row.encbaseid, 0x0505_0505);
    }
}
