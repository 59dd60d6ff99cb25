//! The `#~` tables stream: header, presence bitmaps and the table walk.
//!
//! After its 24-byte header and the row count vector, the stream stores all present
//! tables back to back in ascending table-id order. The k-th entry of the row count
//! vector pairs with the k-th set bit of `Valid`; keeping that cursor aligned across
//! present and absent tables is the heart of the decoder, and is what
//! [`TablesStream::parse`] does once so all later access is O(1).

use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{MetadataTable, RowRead, TableId, TableInfo, TableInfoRef},
    Error::OutOfBounds,
    Result,
};

/// Position of one present table inside the tables stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLocation {
    /// The table stored at this location
    pub table: TableId,
    /// Number of rows
    pub row_count: u32,
    /// Byte width of one row under this stream's index widths
    pub row_size: u32,
    /// Offset of the first row, relative to the start of the stream
    pub offset: usize,
}

/// The decoded header of the `#~` (or `#-`) stream, with the location of every present
/// table.
///
/// The row bytes themselves stay in the image buffer; use
/// [`TablesStream::table`] for typed access or [`TablesStream::location`] for the raw
/// extent of tables without a typed reader.
pub struct TablesStream {
    /// Major version of the table schema, 2 for all current images
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Heap size flags: bit 0 widens `#Strings`, bit 1 `#GUID`, bit 2 `#Blob` indexes
    pub heap_sizes: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths shared by all row decoders
    pub info: TableInfoRef,
    /// Locations of the present tables, in ascending table-id order
    locations: Vec<TableLocation>,
}

impl TablesStream {
    /// Decode the stream header and walk the table array.
    ///
    /// ## Arguments
    /// * 'data' - The bytes of the `#~` stream, starting at its reserved leading `u32`
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the stream is truncated, or
    /// [`crate::Error::Malformed`] if `Valid` names a table this schema does not
    /// define.
    pub fn parse(data: &[u8]) -> Result<TablesStream> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;

        // Reject bits with no defined table before trusting the row count vector.
        for bit in 0..64 {
            if valid & (1 << bit) != 0 && TableId::from_bit_index(bit).is_none() {
                return Err(malformed_error!(
                    "Valid bitmap names undefined metadata table {:#04x}",
                    bit
                ));
            }
        }

        let info = Arc::new(TableInfo::new(data, valid)?);

        let mut locations = Vec::with_capacity(valid.count_ones() as usize);
        let mut offset = 24 + valid.count_ones() as usize * 4;

        for table in TableId::iter() {
            if valid & (1 << table as usize) == 0 {
                continue;
            }

            let row_count = info.rows(table);
            let row_size = info.row_size(table);
            let byte_len = (row_count as usize)
                .checked_mul(row_size as usize)
                .ok_or(OutOfBounds)?;

            let Some(end) = offset.checked_add(byte_len) else {
                return Err(OutOfBounds);
            };
            if end > data.len() {
                return Err(OutOfBounds);
            }

            locations.push(TableLocation {
                table,
                row_count,
                row_size,
                offset,
            });
            offset = end;
        }

        Ok(TablesStream {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes: read_le::<u8>(&data[6..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            locations,
        })
    }

    /// Number of present tables, `popcount(valid)`
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// True when the given table is present in the stream
    #[must_use]
    pub fn has_table(&self, table: TableId) -> bool {
        self.valid & (1 << table as usize) != 0
    }

    /// True when the stream declares the given table as sorted
    #[must_use]
    pub fn is_sorted(&self, table: TableId) -> bool {
        self.sorted & (1 << table as usize) != 0
    }

    /// Number of rows of the given table, 0 when absent
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.info.rows(table)
    }

    /// Location of the given table inside the stream, `None` when absent.
    ///
    /// This works for every table id, including the ones without a typed row reader.
    #[must_use]
    pub fn location(&self, table: TableId) -> Option<&TableLocation> {
        self.locations.iter().find(|loc| loc.table == table)
    }

    /// All present table locations in ascending table-id order
    #[must_use]
    pub fn locations(&self) -> &[TableLocation] {
        &self.locations
    }

    /// Typed view over the rows of table `T`, `None` when the table is absent.
    ///
    /// ## Arguments
    /// * 'data' - The same stream bytes that were passed to [`TablesStream::parse`]
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the stream bytes are shorter than at parse time
    pub fn table<'a, T: RowRead>(&self, data: &'a [u8]) -> Result<Option<MetadataTable<'a, T>>> {
        let Some(location) = self.location(T::TABLE) else {
            return Ok(None);
        };

        let byte_len = location.row_count as usize * location.row_size as usize;
        let Some(end) = location.offset.checked_add(byte_len) else {
            return Err(OutOfBounds);
        };
        if end > data.len() {
            return Err(OutOfBounds);
        }

        Ok(Some(MetadataTable::new(
            &data[location.offset..end],
            location.row_count,
            self.info.clone(),
        )?))
    }
}
