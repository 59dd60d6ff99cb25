//! Convenient re-exports of the most commonly used types.
//!
//! ```rust,no_run
//! use coffscope::prelude::*;
//!
//! let image = CoffFile::from_file("some.dll".as_ref())?;
//! println!("{} ({:?})", image.file_format_name(), image.arch());
//! # Ok::<(), coffscope::Error>(())
//! ```

pub use crate::{
    coff::{
        headers::{CoffFileHeader, DataDirectory, OptionalHeader, Pe32Header, Pe32PlusHeader},
        relocation::Relocation,
        section::{SectionCharacteristics, SectionHeader},
        symbol::{Symbol, SymbolFlags, SymbolKind},
    },
    metadata::{
        cor20::Cor20Header,
        method::MethodBodyProbe,
        root::MetadataRoot,
        streams::TablesStream,
        tables::{
            AssemblyRefRow, MemberRefRow, MethodDefRow, MetadataTable, ModuleRow,
            StandAloneSigRow, TableId, TypeDefRow, TypeRefRow,
        },
        ClrMetadata,
    },
    object::{Architecture, ObjectFile},
    CoffFile, Error, Result,
};
