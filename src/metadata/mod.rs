//! CLR (ECMA-335) metadata decoding.
//!
//! Managed images carry their metadata behind data directory entry 14: the
//! [`cor20::Cor20Header`] names the metadata root by RVA, the [`root::MetadataRoot`]
//! holds the version string and stream directory, and the
//! [`streams::TablesStream`] decodes the `#~` stream down to per-table row arrays.
//! All of it is decoded eagerly while the image is constructed; a managed image with
//! malformed metadata fails [`crate::CoffFile`] construction rather than surfacing a
//! half-usable view.
//!
//! Decoded descriptors (stream directory, row counts, table locations) are owned by
//! the [`ClrMetadata`] value; row bytes stay in the image buffer and are only parsed
//! on access.

pub mod cor20;
pub mod method;
pub mod root;
pub mod streams;
pub mod tables;

use crate::metadata::{root::MetadataRoot, streams::TablesStream};

/// Location and decoded header of the tables stream inside the image.
pub(crate) struct TablesInfo {
    pub(crate) stream: TablesStream,
    /// File offset of the `#~` stream
    pub(crate) offset: usize,
    /// Size of the stream in bytes
    pub(crate) size: usize,
}

/// The decoded CLR metadata of a managed image.
///
/// Held by [`crate::CoffFile`] when the image carries a CLR runtime header whose
/// metadata RVA is non-zero.
pub struct ClrMetadata {
    /// The metadata root with its version string and stream directory
    pub root: MetadataRoot,
    /// File offset of the metadata root
    pub(crate) metadata_offset: usize,
    /// The tables stream, when the directory names a `#~` or `#-` stream
    pub(crate) tables_info: Option<TablesInfo>,
}

impl ClrMetadata {
    /// File offset of the metadata root inside the image
    #[must_use]
    pub fn metadata_offset(&self) -> usize {
        self.metadata_offset
    }

    /// The decoded tables stream, `None` when the image has no `#~` or `#-` stream
    #[must_use]
    pub fn tables(&self) -> Option<&TablesStream> {
        self.tables_info.as_ref().map(|info| &info.stream)
    }
}
