//! CLR 2.0 (Cor20) runtime header parsing.
//!
//! The CLR header sits at the RVA named by data directory entry 14
//! (`CLR_RUNTIME_HEADER`) and points at the metadata root, resources and strong name
//! signature of a managed image.
//!
//! # Reference
//! - ECMA-335 6th Edition, II.25.3.3

use bitflags::bitflags;

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

bitflags! {
    /// Runtime flags of the CLR header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RuntimeFlags: u32 {
        /// Image contains only IL code
        const ILONLY = 0x0000_0001;
        /// Image requires a 32-bit process
        const BIT32_REQUIRED = 0x0000_0002;
        /// Image has a strong name signature
        const STRONG_NAME_SIGNED = 0x0000_0008;
        /// Entry point is an unmanaged method
        const NATIVE_ENTRYPOINT = 0x0000_0010;
        /// Debugger tracking enabled
        const TRACK_DEBUG_DATA = 0x0001_0000;
    }
}

/// The CLR runtime header of a managed image.
///
/// All RVA/size pairs are reported verbatim; only `metadata_rva` is followed further
/// by this crate.
pub struct Cor20Header {
    /// Size of the header in bytes, always 72
    pub cb: u32,
    /// The minimum major version of the runtime required to run this program
    pub major_runtime_version: u16,
    /// The minor portion of the required runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub metadata_rva: u32,
    /// Size of the metadata in bytes
    pub metadata_size: u32,
    /// Flags describing this runtime image
    pub flags: u32,
    /// Token of the entry point method, or file index for multi-module assemblies
    pub entry_point_token: u32,
    /// RVA of implementation specific resources
    pub resource_rva: u32,
    /// Size of implementation specific resources
    pub resource_size: u32,
    /// RVA of the strong name signature hash
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature hash
    pub strong_name_signature_size: u32,
    /// Always 0
    pub code_manager_table_rva: u32,
    /// Always 0
    pub code_manager_table_size: u32,
    /// RVA of an array of function pointer fixup locations
    pub vtable_fixups_rva: u32,
    /// Size of the function pointer fixup array
    pub vtable_fixups_size: u32,
    /// Always 0
    pub export_address_table_jmp_rva: u32,
    /// Always 0
    pub export_address_table_jmp_size: u32,
    /// Always 0
    pub managed_native_header_rva: u32,
    /// Always 0
    pub managed_native_header_size: u32,
}

impl Cor20Header {
    /// Size of the serialized header in bytes
    pub const SIZE: usize = 72;

    /// Create a `Cor20Header` from a sequence of bytes
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the data is too short to contain a CLR header, or
    /// [`crate::Error::Malformed`] if the declared header size is not 72.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < Cor20Header::SIZE {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb != Cor20Header::SIZE as u32 {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        Ok(Cor20Header {
            cb,
            major_runtime_version: parser.read_le::<u16>()?,
            minor_runtime_version: parser.read_le::<u16>()?,
            metadata_rva: parser.read_le::<u32>()?,
            metadata_size: parser.read_le::<u32>()?,
            flags: parser.read_le::<u32>()?,
            entry_point_token: parser.read_le::<u32>()?,
            resource_rva: parser.read_le::<u32>()?,
            resource_size: parser.read_le::<u32>()?,
            strong_name_signature_rva: parser.read_le::<u32>()?,
            strong_name_signature_size: parser.read_le::<u32>()?,
            code_manager_table_rva: parser.read_le::<u32>()?,
            code_manager_table_size: parser.read_le::<u32>()?,
            vtable_fixups_rva: parser.read_le::<u32>()?,
            vtable_fixups_size: parser.read_le::<u32>()?,
            export_address_table_jmp_rva: parser.read_le::<u32>()?,
            export_address_table_jmp_size: parser.read_le::<u32>()?,
            managed_native_header_rva: parser.read_le::<u32>()?,
            managed_native_header_size: parser.read_le::<u32>()?,
        })
    }

    /// Runtime flags decoded into their named bits
    #[must_use]
    pub fn runtime_flags(&self) -> RuntimeFlags {
        RuntimeFlags::from_bits_retain(self.flags)
    }
}
