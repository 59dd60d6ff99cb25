//! Generic typed access to one metadata table.

use std::marker::PhantomData;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    metadata::tables::{TableId, TableInfoRef},
    Error::OutOfBounds,
    Result,
};

/// Trait implemented by typed metadata table rows.
///
/// A row type knows which table it belongs to, how wide one row is under a given
/// [`crate::metadata::tables::TableInfo`], and how to decode itself. Row identifiers
/// are 1-based, following the metadata token convention.
pub trait RowRead: Sized + Send {
    /// The table this row type decodes
    const TABLE: TableId;

    /// Byte size of a single row under the given index widths
    ///
    /// ## Arguments
    /// * `sizes` - Table size information for calculating heap and index widths
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads a single row from the table data.
    ///
    /// ## Arguments
    /// * `data` - Binary data containing the table
    /// * `offset` - Current read position (updated by this method)
    /// * `rid` - 1-based row identifier for this entry
    /// * `sizes` - Table size information for proper index width calculation
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if insufficient data remains at `offset`
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// A typed view over the rows of one metadata table.
///
/// The view borrows the raw table bytes; rows are decoded on access, nothing is copied
/// up front. Random access, sequential iteration and parallel iteration are all
/// available.
pub struct MetadataTable<'a, T: RowRead> {
    data: &'a [u8],
    row_count: u32,
    info: TableInfoRef,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: RowRead> MetadataTable<'a, T> {
    /// Create a table view over `data` holding `row_count` rows.
    ///
    /// ## Arguments
    /// * 'data' - The raw bytes of this table only
    /// * '`row_count`' - Number of rows the table holds
    /// * 'info' - Index width information shared by all tables of the stream
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if `data` is shorter than `row_count` rows
    pub fn new(data: &'a [u8], row_count: u32, info: TableInfoRef) -> Result<MetadataTable<'a, T>> {
        let needed = (row_count as usize)
            .checked_mul(T::row_size(&info) as usize)
            .ok_or(OutOfBounds)?;
        if needed > data.len() {
            return Err(OutOfBounds);
        }

        Ok(MetadataTable {
            data,
            row_count,
            info,
            _marker: PhantomData,
        })
    }

    /// Number of rows in this table
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// True when the table holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Decode the row with the given 1-based identifier.
    ///
    /// Returns `None` for rid 0 or identifiers past the row count.
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<T> {
        if rid == 0 || rid > self.row_count {
            return None;
        }

        let mut offset = ((rid - 1) as usize) * T::row_size(&self.info) as usize;
        T::row_read(self.data, &mut offset, rid, &self.info).ok()
    }

    /// Sequential iterator over all rows
    #[must_use]
    pub fn iter(&self) -> TableIterator<'a, '_, T> {
        TableIterator {
            table: self,
            rid: 1,
        }
    }

    /// Parallel iterator over all rows
    pub fn par_iter(&self) -> impl ParallelIterator<Item = T> + '_ {
        (1..=self.row_count).into_par_iter().filter_map(|rid| self.get(rid))
    }
}

impl<'a, 'b, T: RowRead> IntoIterator for &'b MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'a, 'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`]
pub struct TableIterator<'a, 'b, T: RowRead> {
    table: &'b MetadataTable<'a, T>,
    rid: u32,
}

impl<T: RowRead> Iterator for TableIterator<'_, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let row = self.table.get(self.rid)?;
        self.rid += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.row_count.saturating_sub(self.rid - 1) as usize;
        (remaining, Some(remaining))
    }
}

impl<T: RowRead> ExactSizeIterator for TableIterator<'_, '_, T> {}
