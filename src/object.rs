//! Capability trait for object-file backends.
//!
//! The trait names the format-identification surface shared by object-file parsers,
//! so backends for other container formats can coexist with [`crate::CoffFile`]
//! behind one seam instead of an inheritance hierarchy.

/// Target architecture of an object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// Intel 386 and compatibles
    I386,
    /// x86-64
    X86_64,
    /// Anything this library does not map
    Unknown,
}

/// Format identification surface of an object-file backend.
pub trait ObjectFile {
    /// Human-readable format name, e.g. `"COFF-i386"`
    fn file_format_name(&self) -> &'static str;

    /// Target architecture of the file
    fn arch(&self) -> Architecture;

    /// True for linker import libraries rather than real object files or images
    fn is_import_library(&self) -> bool;

    /// Width of an address on the target, in bytes
    fn bytes_in_address(&self) -> u8;
}
