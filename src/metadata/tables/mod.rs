//! Typed access to the physical metadata tables.
//!
//! The `#~` stream stores its tables back to back, each as an array of fixed-width
//! rows. Widths vary per image: heap indexes grow to 4 bytes under the `HeapSizes`
//! flags, table and coded indexes grow with row counts. [`TableInfo`] resolves all
//! widths once; [`MetadataTable`] then provides typed, lazy row access for the tables
//! with a [`RowRead`] implementation:
//!
//! | id | table | row type |
//! |----|-------|----------|
//! | 0x00 | `Module` | [`ModuleRow`] |
//! | 0x01 | `TypeRef` | [`TypeRefRow`] |
//! | 0x02 | `TypeDef` | [`TypeDefRow`] |
//! | 0x06 | `MethodDef` | [`MethodDefRow`] |
//! | 0x0A | `MemberRef` | [`MemberRefRow`] |
//! | 0x11 | `StandAloneSig` | [`StandAloneSigRow`] |
//! | 0x23 | `AssemblyRef` | [`AssemblyRefRow`] |
//!
//! Every other standard table still has its row width computed (see
//! [`TableInfo::row_size`]) so the stream walk places all tables correctly; their raw
//! bytes are reachable through [`crate::metadata::streams::TablesStream`].

mod assemblyref;
mod codedindex;
mod id;
mod info;
mod memberref;
mod methoddef;
mod module;
mod standalonesig;
mod table;
mod typedef;
mod typeref;

pub use assemblyref::AssemblyRefRow;
pub use codedindex::CodedIndexType;
pub use id::TableId;
pub use info::{TableInfo, TableInfoRef};
pub use memberref::MemberRefRow;
pub use methoddef::MethodDefRow;
pub use module::ModuleRow;
pub use standalonesig::StandAloneSigRow;
pub use table::{MetadataTable, RowRead, TableIterator};
pub use typedef::TypeDefRow;
pub use typeref::TypeRefRow;
