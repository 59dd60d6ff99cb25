//! The PE/COFF image abstraction.
//!
//! [`CoffFile`] is the parsed root: it decodes the header chain (DOS stub → PE
//! signature → file header → optional header → data directories → section table →
//! symbol and string tables → import/export/CLR directories) once at construction
//! and afterwards answers every query from plain decoded state plus bounds-checked
//! slices of the immutable input buffer. Construction either yields a fully usable
//! image or an error; no partially initialized image is observable.
//!
//! # Examples
//!
//! ```rust,no_run
//! use coffscope::{CoffFile, ObjectFile};
//! use std::path::Path;
//!
//! let image = CoffFile::from_file(Path::new("some.dll"))?;
//! println!("{}", image.file_format_name());
//! for section in image.sections() {
//!     println!("{:<8} rva={:#x}", String::from_utf8_lossy(section.raw_name()), section.virtual_address);
//! }
//! for symbol in image.symbols() {
//!     println!("{}", symbol.name()?);
//! }
//! # Ok::<(), coffscope::Error>(())
//! ```

pub mod exports;
pub mod headers;
pub mod imports;
pub mod relocation;
pub mod section;
pub mod strings;
pub mod symbol;

use std::path::Path;

use crate::{
    file::{memory::Memory, parser::Parser, physical::Physical, Backend},
    metadata::{
        cor20::Cor20Header,
        method::MethodBodyProbe,
        root::MetadataRoot,
        streams::{TablesStream, STREAM_TABLES, STREAM_TABLES_UNCOMPRESSED},
        tables::{MetadataTable, RowRead},
        ClrMetadata, TablesInfo,
    },
    object::{Architecture, ObjectFile},
    Error::{Empty, OutOfBounds, Unimplemented},
    Result,
};

use exports::ExportDirectory;
use headers::{
    CoffFileHeader, DataDirectory, OptionalHeader, Pe32Header, Pe32PlusHeader,
    CLR_RUNTIME_HEADER, EXPORT_TABLE, IMAGE_FILE_MACHINE_AMD64, IMAGE_FILE_MACHINE_I386,
    IMPORT_TABLE, PE32PLUS_MAGIC, PE32_MAGIC,
};
use imports::{ImportDirectoryEntry, ImportLookupEntry};
use relocation::{relocation_type_name, Relocation};
use section::{decode_base64_name, SectionCharacteristics, SectionHeader};
use strings::StringTable;
use symbol::{Symbol, SymbolFlags, SymbolKind, SymbolName, IMAGE_SYM_CLASS_EXTERNAL,
    IMAGE_SYM_DTYPE_FUNCTION, IMAGE_SYM_UNDEFINED};

/// Position of the symbol table inside the image.
#[derive(Debug, Clone, Copy)]
struct SymbolTableInfo {
    /// File offset of the first record
    offset: usize,
    /// Number of records, auxiliary records included
    count: u32,
}

/// Position of the import directory inside the image.
#[derive(Debug, Clone, Copy)]
struct ImportTableInfo {
    /// File offset of the first entry
    offset: usize,
    /// Entry count inferred from the directory size
    count: usize,
}

/// Position and decoded header of the export directory.
struct ExportTableInfo {
    directory: ExportDirectory,
}

/// A parsed PE/COFF image, object file or import library.
///
/// See the [module documentation](self) for the construction contract. All state is
/// immutable after construction; concurrent readers need no locking.
pub struct CoffFile {
    data: Box<dyn Backend>,
    has_pe_header: bool,
    coff_header: CoffFileHeader,
    optional_header: Option<OptionalHeader>,
    data_directories: Vec<DataDirectory>,
    sections: Vec<SectionHeader>,
    symbol_table: Option<SymbolTableInfo>,
    string_table: Option<StringTable>,
    import_table: Option<ImportTableInfo>,
    export_table: Option<ExportTableInfo>,
    clr_header: Option<Cor20Header>,
    clr_metadata: Option<ClrMetadata>,
}

impl CoffFile {
    /// Loads a PE/COFF file from the given path.
    ///
    /// The file is memory-mapped for the lifetime of the image.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is empty, or violates the format's
    /// structural invariants.
    pub fn from_file(file: &Path) -> Result<CoffFile> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE/COFF file from a memory buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the file; the image takes ownership.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty or violates the format's structural
    /// invariants.
    pub fn from_mem(data: Vec<u8>) -> Result<CoffFile> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    fn load<T: Backend + 'static>(data: T) -> Result<CoffFile> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Self::parse(Box::new(data))
    }

    /// Decodes the header chain over `data` and assembles the image.
    fn parse(data: Box<dyn Backend>) -> Result<CoffFile> {
        let buffer = data.data();

        if buffer.len() < CoffFileHeader::SIZE {
            return Err(OutOfBounds);
        }

        // The PE header chain is present only in executables; plain object files start
        // with the COFF file header directly.
        let mut cursor = 0_usize;
        let mut has_pe_header = false;

        if buffer[0..2] == *b"MZ" {
            // Only the low word of e_lfanew counts; the upper two bytes are ignored.
            let mut lfanew_offset = 0x3C;
            let e_lfanew =
                usize::from(crate::file::io::read_le_at::<u16>(buffer, &mut lfanew_offset)?);

            let signature = data.data_slice(e_lfanew, 4)?;
            if signature != b"PE\0\0" {
                return Err(malformed_error!(
                    "PE signature does not match - {:02x?}",
                    signature
                ));
            }

            cursor = e_lfanew + 4;
            has_pe_header = true;
        }

        let mut parser = Parser::new(buffer);
        parser.seek(cursor)?;
        let coff_header = CoffFileHeader::read(&mut parser)?;
        cursor += CoffFileHeader::SIZE;

        let mut optional_header = None;
        let mut data_directories = Vec::new();

        if has_pe_header {
            let magic = {
                let mut peek = Parser::new(buffer);
                peek.seek(cursor)?;
                peek.read_le::<u16>()?
            };

            let header = match magic {
                PE32_MAGIC => OptionalHeader::Pe32(Pe32Header::read(&mut parser)?),
                PE32PLUS_MAGIC => OptionalHeader::Pe32Plus(Pe32PlusHeader::read(&mut parser)?),
                _ => {
                    return Err(malformed_error!(
                        "Optional header magic is neither PE32 nor PE32+ - {:#06x}",
                        magic
                    ))
                }
            };

            // The data directory array immediately follows the fixed struct.
            for _ in 0..header.number_of_rva_and_size() {
                data_directories.push(DataDirectory::read(&mut parser)?);
            }

            optional_header = Some(header);
        }

        // SizeOfOptionalHeader may exceed the fixed struct plus directories; the
        // remainder is padding before the section table.
        cursor += coff_header.size_of_optional_header as usize;

        let mut file = CoffFile {
            data,
            has_pe_header,
            coff_header,
            optional_header,
            data_directories,
            sections: Vec::new(),
            symbol_table: None,
            string_table: None,
            import_table: None,
            export_table: None,
            clr_header: None,
            clr_metadata: None,
        };

        // Import libraries carry neither sections nor symbols.
        if file.coff_header.is_import_library() {
            return Ok(file);
        }

        file.init_section_table(cursor)?;

        if file.coff_header.pointer_to_symbol_table != 0 {
            file.init_symbol_table()?;
        }

        file.init_import_table()?;
        file.init_export_table()?;
        file.init_clr()?;

        Ok(file)
    }

    fn init_section_table(&mut self, offset: usize) -> Result<()> {
        let buffer = self.data.data();
        let mut parser = Parser::new(buffer);
        if self.coff_header.number_of_sections > 0 {
            parser.seek(offset)?;
        }

        let mut sections = Vec::with_capacity(self.coff_header.number_of_sections as usize);
        for _ in 0..self.coff_header.number_of_sections {
            sections.push(SectionHeader::read(&mut parser)?);
        }

        self.sections = sections;
        Ok(())
    }

    fn init_symbol_table(&mut self) -> Result<()> {
        let offset = self.coff_header.pointer_to_symbol_table as usize;
        let count = self.coff_header.number_of_symbols;

        let table_bytes = (count as usize)
            .checked_mul(Symbol::SIZE)
            .ok_or(OutOfBounds)?;
        self.data.data_slice(offset, table_bytes)?;

        // The string table starts where the symbol table ends.
        let string_table_offset = offset + table_bytes;
        let string_table = StringTable::locate(self.data.data(), string_table_offset)?;

        self.symbol_table = Some(SymbolTableInfo { offset, count });
        self.string_table = Some(string_table);
        Ok(())
    }

    fn init_import_table(&mut self) -> Result<()> {
        let Some(directory) = self.data_directory(IMPORT_TABLE).copied() else {
            return Ok(());
        };
        if directory.is_absent() {
            return Ok(());
        }

        let offset = self.rva_to_offset(directory.virtual_address)?;
        let count = directory.size as usize / ImportDirectoryEntry::SIZE;

        self.import_table = Some(ImportTableInfo { offset, count });
        Ok(())
    }

    fn init_export_table(&mut self) -> Result<()> {
        let Some(directory) = self.data_directory(EXPORT_TABLE).copied() else {
            return Ok(());
        };
        if directory.is_absent() {
            return Ok(());
        }

        let offset = self.rva_to_offset(directory.virtual_address)?;
        let slice = self.data.data_slice(offset, ExportDirectory::SIZE)?;
        let directory = ExportDirectory::read(&mut Parser::new(slice))?;

        self.export_table = Some(ExportTableInfo { directory });
        Ok(())
    }

    fn init_clr(&mut self) -> Result<()> {
        let Some(directory) = self.data_directory(CLR_RUNTIME_HEADER).copied() else {
            return Ok(());
        };
        if directory.is_absent() {
            return Ok(());
        }

        let header_offset = self.rva_to_offset(directory.virtual_address)?;
        let header_slice = self.data.data_slice(header_offset, Cor20Header::SIZE)?;
        let clr_header = Cor20Header::read(header_slice)?;

        if clr_header.metadata_rva == 0 {
            self.clr_header = Some(clr_header);
            return Ok(());
        }

        let metadata_offset = self.rva_to_offset(clr_header.metadata_rva)?;
        let metadata = self
            .data
            .data_slice(metadata_offset, clr_header.metadata_size as usize)?;
        let root = MetadataRoot::read(metadata)?;

        // `#~` is the compressed tables stream, `#-` its uncompressed twin with the
        // same header layout.
        let tables_info = match root
            .stream(STREAM_TABLES)
            .or_else(|| root.stream(STREAM_TABLES_UNCOMPRESSED))
        {
            Some(stream_header) => {
                let stream_offset = stream_header.offset as usize;
                let stream_size = stream_header.size as usize;
                let stream_data = &metadata[stream_offset..stream_offset + stream_size];

                Some(TablesInfo {
                    stream: TablesStream::parse(stream_data)?,
                    offset: metadata_offset + stream_offset,
                    size: stream_size,
                })
            }
            None => None,
        };

        self.clr_header = Some(clr_header);
        self.clr_metadata = Some(ClrMetadata {
            root,
            metadata_offset,
            tables_info,
        });
        Ok(())
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raw data of the loaded file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a slice of the file data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The offset to start the slice from.
    /// * `len` - The length of the slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// True when the buffer opened with a `MZ` stub and `PE\0\0` signature
    #[must_use]
    pub fn has_pe_header(&self) -> bool {
        self.has_pe_header
    }

    /// The COFF file header
    #[must_use]
    pub fn coff_header(&self) -> &CoffFileHeader {
        &self.coff_header
    }

    /// The optional header, present for executables only
    #[must_use]
    pub fn optional_header(&self) -> Option<&OptionalHeader> {
        self.optional_header.as_ref()
    }

    /// The PE32 optional header, `None` for PE32+ images and object files
    #[must_use]
    pub fn pe32_header(&self) -> Option<&Pe32Header> {
        match &self.optional_header {
            Some(OptionalHeader::Pe32(header)) => Some(header),
            _ => None,
        }
    }

    /// The PE32+ optional header, `None` for PE32 images and object files
    #[must_use]
    pub fn pe32plus_header(&self) -> Option<&Pe32PlusHeader> {
        match &self.optional_header {
            Some(OptionalHeader::Pe32Plus(header)) => Some(header),
            _ => None,
        }
    }

    /// The preferred load address, 0 for object files
    #[must_use]
    pub fn image_base(&self) -> u64 {
        self.optional_header
            .as_ref()
            .map_or(0, OptionalHeader::image_base)
    }

    /// The data directory entry at `index`, `None` when the image has no directories
    /// or the index is out of range.
    ///
    /// Well-known indices are the `*_TABLE` constants in [`headers`].
    #[must_use]
    pub fn data_directory(&self, index: usize) -> Option<&DataDirectory> {
        self.data_directories.get(index)
    }

    /// All data directory entries, in table order
    #[must_use]
    pub fn data_directories(&self) -> &[DataDirectory] {
        &self.data_directories
    }

    // ------------------------------------------------------------------
    // Address mapping
    // ------------------------------------------------------------------

    /// Converts a relative virtual address (RVA) to a file offset.
    ///
    /// The section table is scanned in order; the first section whose virtual range
    /// contains the RVA wins.
    ///
    /// # Arguments
    ///
    /// * `rva` - The RVA to convert.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if no section contains the RVA or a
    /// section's virtual range overflows.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        for section in &self.sections {
            if section.contains_rva(rva)? {
                return Ok(
                    (rva - section.virtual_address) as usize
                        + section.pointer_to_raw_data as usize,
                );
            }
        }

        Err(malformed_error!(
            "RVA could not be converted to offset - {:#x}",
            rva
        ))
    }

    /// Converts a virtual address (VA) to a file offset.
    ///
    /// # Arguments
    ///
    /// * `va` - The virtual address, i.e. image base plus RVA.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if the VA lies below the image base, and
    /// [`crate::Error::Malformed`] if the resulting RVA exceeds `u32::MAX`, the image
    /// has no optional header, or no section contains the RVA.
    pub fn va_to_offset(&self, va: u64) -> Result<usize> {
        let Some(optional_header) = &self.optional_header else {
            return Err(malformed_error!(
                "VA translation requires an optional header"
            ));
        };

        let image_base = optional_header.image_base();
        if image_base > va {
            return Err(OutOfBounds);
        }

        let rva = va - image_base;
        let rva = u32::try_from(rva)
            .map_err(|_| malformed_error!("RVA too large to fit in u32: {:#x}", rva))?;
        self.rva_to_offset(rva)
    }

    // ------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------

    /// Iterator over the section table; empty for import libraries
    pub fn sections(&self) -> std::slice::Iter<'_, SectionHeader> {
        self.sections.iter()
    }

    /// The section with the given 1-based number.
    ///
    /// Sentinel numbers (undefined, absolute, debug) yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for numbers outside both the sentinel set
    /// and the section table.
    pub fn section_by_number(&self, number: i16) -> Result<Option<&SectionHeader>> {
        if number <= IMAGE_SYM_UNDEFINED {
            if number >= symbol::IMAGE_SYM_DEBUG {
                return Ok(None);
            }
            return Err(malformed_error!("Invalid section number - {}", number));
        }

        let index = (number - 1) as usize;
        match self.sections.get(index) {
            Some(section) => Ok(Some(section)),
            None => Err(malformed_error!("Invalid section number - {}", number)),
        }
    }

    /// Resolved name of a section, following `/NNN` and `//BBBBBB` string table
    /// escapes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for malformed escapes and propagates string
    /// table lookup failures.
    pub fn section_name(&self, section: &SectionHeader) -> Result<String> {
        let raw = section.raw_name();

        if raw.first() == Some(&b'/') {
            let offset = if raw.get(1) == Some(&b'/') {
                decode_base64_name(&raw[2..])?
            } else {
                let digits = std::str::from_utf8(&raw[1..]).map_err(|_| {
                    malformed_error!("Section name escape is not ASCII - {:02x?}", raw)
                })?;
                digits.parse::<u32>().map_err(|_| {
                    malformed_error!("Section name escape is not decimal - {}", digits)
                })?
            };

            return Ok(self.string_at(offset)?.to_string());
        }

        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Raw contents of a section, bounds-checked against the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the raw data range leaves the buffer.
    pub fn section_contents(&self, section: &SectionHeader) -> Result<&[u8]> {
        self.data
            .data_slice(
                section.pointer_to_raw_data as usize,
                section.size_of_raw_data as usize,
            )
            .map_err(|_| {
                malformed_error!(
                    "Section raw data [{:#x}, +{:#x}) leaves the buffer",
                    section.pointer_to_raw_data,
                    section.size_of_raw_data
                )
            })
    }

    /// True when the symbol's resolved section is the section table entry at
    /// `section_index` (0-based). Section identity is positional.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for symbols with an invalid section number.
    pub fn section_contains_symbol(&self, section_index: usize, symbol: &Symbol) -> Result<bool> {
        if !symbol.has_section() {
            // Resolve sentinels for their error behavior, then report no containment.
            self.section_by_number(symbol.section_number)?;
            return Ok(false);
        }

        Ok((symbol.section_number - 1) as usize == section_index)
    }

    // ------------------------------------------------------------------
    // Symbols and strings
    // ------------------------------------------------------------------

    /// Iterator over the symbols; auxiliary records are skipped, not yielded
    pub fn symbols(&self) -> SymbolIterator<'_> {
        SymbolIterator {
            file: self,
            index: 0,
        }
    }

    /// The symbol record at the given raw table slot.
    ///
    /// Slot indices count auxiliary records, matching the indices stored in
    /// relocations.
    ///
    /// # Arguments
    ///
    /// * `index` - The 0-based slot index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the image has no symbol table or the
    /// index is out of range.
    pub fn symbol(&self, index: u32) -> Result<Symbol> {
        let Some(table) = &self.symbol_table else {
            return Err(malformed_error!("Image has no symbol table"));
        };

        if index >= table.count {
            return Err(malformed_error!(
                "Symbol index {} out of range ({} symbols)",
                index,
                table.count
            ));
        }

        let offset = table.offset + index as usize * Symbol::SIZE;
        let slice = self.data.data_slice(offset, Symbol::SIZE)?;
        Symbol::read(&mut Parser::new(slice))
    }

    /// Resolved name of a symbol record.
    ///
    /// # Errors
    ///
    /// Propagates string table failures for long names.
    pub fn symbol_name(&self, symbol: &Symbol) -> Result<String> {
        match symbol.name {
            SymbolName::Short(bytes) => {
                let name = match bytes.iter().position(|&byte| byte == 0) {
                    Some(end) => &bytes[..end],
                    // Not NUL terminated, all 8 bytes are significant.
                    None => &bytes[..],
                };
                Ok(String::from_utf8_lossy(name).into_owned())
            }
            SymbolName::Offset(offset) => Ok(self.string_at(offset)?.to_string()),
        }
    }

    /// The string at `offset` in the string table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the image has no string table or
    /// `offset` points into the leading size field, and [`OutOfBounds`] when `offset`
    /// is at or past the table end.
    pub fn string_at(&self, offset: u32) -> Result<&str> {
        let Some(table) = &self.string_table else {
            return Err(malformed_error!("Image has no string table"));
        };

        table.string_at(self.data.data(), offset)
    }

    // ------------------------------------------------------------------
    // Relocations
    // ------------------------------------------------------------------

    /// Iterator over the relocations of a section; empty when the section has none
    pub fn relocations(&self, section: &SectionHeader) -> RelocationIterator<'_> {
        RelocationIterator {
            file: self,
            offset: section.pointer_to_relocations as usize,
            remaining: section.number_of_relocations,
        }
    }

    /// Canonical `IMAGE_REL_*` name of a relocation under this image's machine
    #[must_use]
    pub fn relocation_type_name(&self, relocation: &Relocation) -> &'static str {
        relocation_type_name(self.coff_header.machine, relocation.typ)
    }

    /// The symbol record a relocation refers to.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for out-of-range symbol indices.
    pub fn relocation_symbol(&self, relocation: &Relocation) -> Result<Symbol> {
        self.symbol(relocation.symbol_table_index)
    }

    /// Name of the symbol a relocation refers to.
    ///
    /// # Errors
    ///
    /// Propagates symbol and string table failures.
    pub fn relocation_value_string(&self, relocation: &Relocation) -> Result<String> {
        let symbol = self.relocation_symbol(relocation)?;
        self.symbol_name(&symbol)
    }

    /// Absolute address materialization of a relocation.
    ///
    /// # Errors
    ///
    /// Always returns [`Unimplemented`]; consumers combine
    /// [`Relocation::virtual_address`] with section addresses themselves.
    pub fn relocation_address(&self, _relocation: &Relocation) -> Result<u64> {
        Err(Unimplemented("relocation address materialization"))
    }

    // ------------------------------------------------------------------
    // Imports and exports
    // ------------------------------------------------------------------

    /// Iterator over the import directory.
    ///
    /// Iteration ends at the declared entry count or at the first all-zero entry,
    /// whichever comes first.
    pub fn imports(&self) -> ImportIterator<'_> {
        ImportIterator {
            file: self,
            index: 0,
        }
    }

    /// Iterator over the export address table; empty when the image exports nothing
    pub fn exports(&self) -> ExportIterator<'_> {
        let count = self
            .export_table
            .as_ref()
            .map_or(0, |table| table.directory.address_table_entries);

        ExportIterator {
            file: self,
            index: 0,
            count,
        }
    }

    /// The decoded export directory, `None` when the image exports nothing
    #[must_use]
    pub fn export_directory(&self) -> Option<&ExportDirectory> {
        self.export_table.as_ref().map(|table| &table.directory)
    }

    /// Name of the exporting DLL from the export directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the image exports nothing and
    /// propagates RVA translation failures.
    pub fn export_dll_name(&self) -> Result<String> {
        let Some(table) = &self.export_table else {
            return Err(malformed_error!("Image has no export directory"));
        };

        let offset = self.rva_to_offset(table.directory.name_rva)?;
        self.read_cstring_at(offset)
    }

    /// Reads the hint/name pair an import lookup entry points at.
    ///
    /// # Arguments
    ///
    /// * `rva` - RVA of the pair, from [`ImportLookupEntry::hint_name_rva`].
    ///
    /// # Errors
    ///
    /// Propagates RVA translation and bounds failures.
    pub fn hint_name(&self, rva: u32) -> Result<(u16, String)> {
        let offset = self.rva_to_offset(rva)?;
        let hint_bytes = self.data.data_slice(offset, 2)?;
        let hint = u16::from_le_bytes([hint_bytes[0], hint_bytes[1]]);
        let name = self.read_cstring_at(offset + 2)?;

        Ok((hint, name))
    }

    // ------------------------------------------------------------------
    // CLR metadata
    // ------------------------------------------------------------------

    /// The CLR runtime header, `None` for unmanaged images
    #[must_use]
    pub fn clr_header(&self) -> Option<&Cor20Header> {
        self.clr_header.as_ref()
    }

    /// The decoded CLR metadata, `None` for unmanaged images and managed images whose
    /// CLR header carries no metadata RVA
    #[must_use]
    pub fn clr_metadata(&self) -> Option<&ClrMetadata> {
        self.clr_metadata.as_ref()
    }

    /// True when the image carries a CLR runtime header
    #[must_use]
    pub fn is_pure_cil(&self) -> bool {
        self.clr_header.is_some()
    }

    /// Typed view over the rows of metadata table `T`.
    ///
    /// `Ok(None)` when the image is unmanaged, has no tables stream, or the table is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if the recorded stream range no longer fits the buffer.
    pub fn clr_table<T: RowRead>(&self) -> Result<Option<MetadataTable<'_, T>>> {
        let Some(clr) = &self.clr_metadata else {
            return Ok(None);
        };
        let Some(info) = &clr.tables_info else {
            return Ok(None);
        };

        let stream_data = self.data.data_slice(info.offset, info.size)?;
        info.stream.table::<T>(stream_data)
    }

    /// Total size of the IL method body at the given file offset.
    ///
    /// # Arguments
    ///
    /// * `offset` - File offset of the method body header, typically obtained by
    ///   passing a `MethodDef` RVA through [`CoffFile::rva_to_offset`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for an invalid method header and
    /// [`OutOfBounds`] for truncated bodies.
    pub fn method_size(&self, offset: usize) -> Result<usize> {
        if offset > self.data.len() {
            return Err(OutOfBounds);
        }

        let probe = MethodBodyProbe::from(&self.data.data()[offset..])?;
        Ok(probe.size())
    }

    // ------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------

    /// Raw symbol value materialization.
    ///
    /// # Errors
    ///
    /// Always returns [`Unimplemented`]; use the derived queries on
    /// [`SymbolRef`] instead.
    pub fn symbol_value(&self, _symbol: &Symbol) -> Result<u64> {
        Err(Unimplemented("raw symbol value materialization"))
    }

    /// Enumeration of libraries needed at load time.
    ///
    /// # Errors
    ///
    /// Always returns [`Unimplemented`]; walk [`CoffFile::imports`] for DLL names.
    pub fn needed_libraries(&self) -> Result<Vec<String>> {
        Err(Unimplemented("needed-library enumeration"))
    }

    /// Reads a NUL-terminated string at a file offset.
    fn read_cstring_at(&self, offset: usize) -> Result<String> {
        if offset >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data.data()[offset..]);
        parser.read_string_utf8()
    }
}

impl ObjectFile for CoffFile {
    fn file_format_name(&self) -> &'static str {
        match self.coff_header.machine {
            IMAGE_FILE_MACHINE_I386 => "COFF-i386",
            IMAGE_FILE_MACHINE_AMD64 => "COFF-x86-64",
            _ => "COFF-<unknown arch>",
        }
    }

    fn arch(&self) -> Architecture {
        match self.coff_header.machine {
            IMAGE_FILE_MACHINE_I386 => Architecture::I386,
            IMAGE_FILE_MACHINE_AMD64 => Architecture::X86_64,
            _ => Architecture::Unknown,
        }
    }

    fn is_import_library(&self) -> bool {
        self.coff_header.is_import_library()
    }

    fn bytes_in_address(&self) -> u8 {
        if self.arch() == Architecture::X86_64 {
            8
        } else {
            4
        }
    }
}

/// One symbol of the image, bundled with the context needed for derived queries.
pub struct SymbolRef<'a> {
    file: &'a CoffFile,
    index: u32,
    symbol: Symbol,
}

impl SymbolRef<'_> {
    /// The raw table slot of this symbol, auxiliary records counted
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The decoded 18-byte record
    #[must_use]
    pub fn record(&self) -> &Symbol {
        &self.symbol
    }

    /// Resolved symbol name
    ///
    /// # Errors
    /// Propagates string table failures for long names
    pub fn name(&self) -> Result<String> {
        self.file.symbol_name(&self.symbol)
    }

    /// Virtual address of the symbol: section RVA plus value, or the bare value for
    /// absolute and debug symbols. `None` for undefined symbols.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers
    pub fn address(&self) -> Result<Option<u64>> {
        let section = self.file.section_by_number(self.symbol.section_number)?;

        if self.symbol.section_number == IMAGE_SYM_UNDEFINED {
            Ok(None)
        } else if let Some(section) = section {
            Ok(Some(
                u64::from(section.virtual_address) + u64::from(self.symbol.value),
            ))
        } else {
            Ok(Some(u64::from(self.symbol.value)))
        }
    }

    /// File offset of the symbol, shaped like [`SymbolRef::address`] with the
    /// section's raw data pointer substituted.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers
    pub fn file_offset(&self) -> Result<Option<u64>> {
        let section = self.file.section_by_number(self.symbol.section_number)?;

        if self.symbol.section_number == IMAGE_SYM_UNDEFINED {
            Ok(None)
        } else if let Some(section) = section {
            Ok(Some(
                u64::from(section.pointer_to_raw_data) + u64::from(self.symbol.value),
            ))
        } else {
            Ok(Some(u64::from(self.symbol.value)))
        }
    }

    /// Broad classification of this symbol
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers
    pub fn kind(&self) -> Result<SymbolKind> {
        if self.symbol.storage_class == IMAGE_SYM_CLASS_EXTERNAL && self.symbol.is_undefined() {
            return Ok(SymbolKind::Unknown);
        }

        if self.symbol.complex_type() == IMAGE_SYM_DTYPE_FUNCTION {
            return Ok(SymbolKind::Function);
        }

        let characteristics = match self.file.section_by_number(self.symbol.section_number)? {
            Some(section) => section.characteristics,
            None => SectionCharacteristics::empty(),
        };

        if characteristics.contains(SectionCharacteristics::MEM_READ)
            && !characteristics.contains(SectionCharacteristics::MEM_WRITE)
        {
            return Ok(SymbolKind::Data);
        }

        Ok(SymbolKind::Other)
    }

    /// Flag summary of this symbol
    #[must_use]
    pub fn flags(&self) -> SymbolFlags {
        self.symbol.flags()
    }

    /// Size estimate of this symbol, `None` for undefined symbols.
    ///
    /// The estimate is the distance from the symbol's value to the end of its
    /// section's raw data. It over-reports for every symbol that is not last in its
    /// section; an exact size would need a sweep for the next symbol of the same
    /// section.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid section numbers
    pub fn size(&self) -> Result<Option<u64>> {
        let section = self.file.section_by_number(self.symbol.section_number)?;

        if self.symbol.section_number == IMAGE_SYM_UNDEFINED {
            Ok(None)
        } else if let Some(section) = section {
            Ok(Some(u64::from(
                section.size_of_raw_data.saturating_sub(self.symbol.value),
            )))
        } else {
            Ok(Some(0))
        }
    }

    /// Raw symbol value materialization.
    ///
    /// # Errors
    /// Always returns [`Unimplemented`]
    pub fn value(&self) -> Result<u64> {
        self.file.symbol_value(&self.symbol)
    }

    /// The raw auxiliary records following this symbol, `aux_count * 18` bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] when the records leave the symbol table
    pub fn aux_data(&self) -> Result<&[u8]> {
        let Some(table) = &self.file.symbol_table else {
            return Err(malformed_error!("Image has no symbol table"));
        };

        let aux_count = self.symbol.number_of_aux_symbols as usize;
        if self.index as usize + 1 + aux_count > table.count as usize {
            return Err(OutOfBounds);
        }

        let offset = table.offset + (self.index as usize + 1) * Symbol::SIZE;
        self.file.data.data_slice(offset, aux_count * Symbol::SIZE)
    }
}

/// Forward-only iterator over the symbols of an image.
///
/// The stride from one symbol to the next is `1 + number_of_aux_symbols`; auxiliary
/// records are never yielded as symbols.
pub struct SymbolIterator<'a> {
    file: &'a CoffFile,
    index: u32,
}

impl<'a> Iterator for SymbolIterator<'a> {
    type Item = SymbolRef<'a>;

    fn next(&mut self) -> Option<SymbolRef<'a>> {
        let table = self.file.symbol_table.as_ref()?;
        if self.index >= table.count {
            return None;
        }

        let symbol = self.file.symbol(self.index).ok()?;
        let item = SymbolRef {
            file: self.file,
            index: self.index,
            symbol,
        };

        self.index += 1 + u32::from(symbol.number_of_aux_symbols);
        Some(item)
    }
}

/// Forward-only iterator over the relocations of one section.
pub struct RelocationIterator<'a> {
    file: &'a CoffFile,
    offset: usize,
    remaining: u16,
}

impl Iterator for RelocationIterator<'_> {
    type Item = Relocation;

    fn next(&mut self) -> Option<Relocation> {
        if self.remaining == 0 {
            return None;
        }

        let slice = self.file.data.data_slice(self.offset, Relocation::SIZE).ok()?;
        let relocation = Relocation::read(&mut Parser::new(slice)).ok()?;

        self.offset += Relocation::SIZE;
        self.remaining -= 1;
        Some(relocation)
    }
}

/// One import directory entry, bundled with the context to resolve its names.
pub struct ImportEntryRef<'a> {
    file: &'a CoffFile,
    entry: ImportDirectoryEntry,
    index: usize,
}

impl<'a> ImportEntryRef<'a> {
    /// Position of this entry in the import directory
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The decoded directory entry
    #[must_use]
    pub fn entry(&self) -> &ImportDirectoryEntry {
        &self.entry
    }

    /// Name of the imported DLL
    ///
    /// # Errors
    /// Propagates RVA translation and bounds failures
    pub fn name(&self) -> Result<String> {
        let offset = self.file.rva_to_offset(self.entry.name_rva)?;
        self.file.read_cstring_at(offset)
    }

    /// Iterator over the import lookup table of this entry
    ///
    /// # Errors
    /// Propagates RVA translation failures
    pub fn lookup_entries(&self) -> Result<ImportLookupIterator<'a>> {
        let offset = self.file.rva_to_offset(self.entry.import_lookup_table_rva)?;

        Ok(ImportLookupIterator {
            file: self.file,
            offset,
        })
    }
}

/// Forward-only iterator over the import directory.
pub struct ImportIterator<'a> {
    file: &'a CoffFile,
    index: usize,
}

impl<'a> Iterator for ImportIterator<'a> {
    type Item = ImportEntryRef<'a>;

    fn next(&mut self) -> Option<ImportEntryRef<'a>> {
        let table = self.file.import_table.as_ref()?;
        if self.index >= table.count {
            return None;
        }

        let offset = table.offset + self.index * ImportDirectoryEntry::SIZE;
        let slice = self
            .file
            .data
            .data_slice(offset, ImportDirectoryEntry::SIZE)
            .ok()?;
        let entry = ImportDirectoryEntry::read(&mut Parser::new(slice)).ok()?;

        // The directory is sentinel terminated even when the declared size is larger.
        if entry.is_terminator() {
            return None;
        }

        let item = ImportEntryRef {
            file: self.file,
            entry,
            index: self.index,
        };
        self.index += 1;
        Some(item)
    }
}

/// Forward-only iterator over one import lookup table, ending at its zero entry.
pub struct ImportLookupIterator<'a> {
    file: &'a CoffFile,
    offset: usize,
}

impl Iterator for ImportLookupIterator<'_> {
    type Item = ImportLookupEntry;

    fn next(&mut self) -> Option<ImportLookupEntry> {
        let slice = self.file.data.data_slice(self.offset, 4).ok()?;
        let entry = ImportLookupEntry(u32::from_le_bytes([
            slice[0], slice[1], slice[2], slice[3],
        ]));

        if entry.is_terminator() {
            return None;
        }

        self.offset += 4;
        Some(entry)
    }
}

/// One export of the image, identified by its index into the address table.
pub struct ExportEntryRef<'a> {
    file: &'a CoffFile,
    index: u32,
}

impl ExportEntryRef<'_> {
    /// Index of this export in the address table
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Export ordinal, `ordinal_base + index`
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        let base = self
            .file
            .export_table
            .as_ref()
            .map_or(0, |table| table.directory.ordinal_base);
        base + self.index
    }

    /// RVA of the exported item
    ///
    /// # Errors
    /// Propagates RVA translation and bounds failures
    pub fn rva(&self) -> Result<u32> {
        let Some(table) = &self.file.export_table else {
            return Err(malformed_error!("Image has no export directory"));
        };

        let base = self
            .file
            .rva_to_offset(table.directory.export_address_table_rva)?;
        let slice = self
            .file
            .data
            .data_slice(base + self.index as usize * 4, 4)?;
        Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    /// Name of this export, empty for ordinal-only exports.
    ///
    /// The ordinal table is scanned for this export's index; the name pointer at the
    /// matching position names the export.
    ///
    /// # Errors
    /// Propagates RVA translation and bounds failures
    pub fn name(&self) -> Result<String> {
        let Some(table) = &self.file.export_table else {
            return Err(malformed_error!("Image has no export directory"));
        };

        let ordinal_base = self.file.rva_to_offset(table.directory.ordinal_table_rva)?;
        let entries = table.directory.number_of_name_pointers as usize;

        for position in 0..entries {
            let slice = self.file.data.data_slice(ordinal_base + position * 2, 2)?;
            let unbiased = u16::from_le_bytes([slice[0], slice[1]]);
            if u32::from(unbiased) != self.index {
                continue;
            }

            let pointer_base = self.file.rva_to_offset(table.directory.name_pointer_rva)?;
            let slice = self.file.data.data_slice(pointer_base + position * 4, 4)?;
            let name_rva = u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]);

            let name_offset = self.file.rva_to_offset(name_rva)?;
            return self.file.read_cstring_at(name_offset);
        }

        Ok(String::new())
    }
}

/// Forward-only iterator over the export address table.
pub struct ExportIterator<'a> {
    file: &'a CoffFile,
    index: u32,
    count: u32,
}

impl<'a> Iterator for ExportIterator<'a> {
    type Item = ExportEntryRef<'a>;

    fn next(&mut self) -> Option<ExportEntryRef<'a>> {
        if self.index >= self.count {
            return None;
        }

        let item = ExportEntryRef {
            file: self.file,
            index: self.index,
        };
        self.index += 1;
        Some(item)
    }
}
