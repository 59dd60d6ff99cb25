// Copyright 2025-2026 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # coffscope
//!
//! A read-only parser for PE/COFF images, object files and import libraries, including
//! the CLR (ECMA-335) metadata embedded in .NET assemblies. Built in pure Rust,
//! `coffscope` materializes typed, bounds-checked views over a byte buffer without
//! ever writing to it, and works on any platform regardless of host byte order.
//!
//! # Architecture
//!
//! - **File layer** ([`file`]) - Data backends (memory-mapped file, owned buffer) and
//!   the bounds-checked little-endian readers everything else is built on
//! - **Container layer** ([`coff`]) - The header chain, section table, symbol and
//!   string tables, relocations, and the import/export directories
//! - **Metadata layer** ([`metadata`]) - The CLR runtime header, metadata root,
//!   stream directory and the `#~` tables stream down to typed rows
//!
//! [`CoffFile`] ties the layers together: construction decodes the whole header chain
//! eagerly and either yields an immutable, freely shareable image or a single error.
//! Iteration surfaces (sections, symbols, relocations, imports, exports, metadata
//! rows) decode lazily out of the original buffer.
//!
//! # Usage
//!
//! ```rust,no_run
//! use coffscope::prelude::*;
//!
//! let image = CoffFile::from_file("tests/samples/app.exe".as_ref())?;
//!
//! println!("format: {}", image.file_format_name());
//! for section in image.sections() {
//!     println!("section {}", image.section_name(section)?);
//! }
//!
//! // Managed images expose their metadata tables.
//! if let Some(methods) = image.clr_table::<MethodDefRow>()? {
//!     for method in methods.iter().filter(|method| method.rva != 0) {
//!         let offset = image.rva_to_offset(method.rva)?;
//!         println!("method body: {} bytes", image.method_size(offset)?);
//!     }
//! }
//! # Ok::<(), coffscope::Error>(())
//! ```
//!
//! # Error handling
//!
//! Every decode path returns [`Result`]; see [`Error`] for the taxonomy. The parser
//! never panics on malformed input and never aborts the process: operations the
//! library deliberately does not provide return [`Error::Unimplemented`].
//!
//! # Thread safety
//!
//! A constructed [`CoffFile`] is immutable; all read operations are side-effect free
//! and safe to call from multiple threads without locking.
//!
//! # References
//!
//! - Microsoft PE/COFF Specification
//! - ECMA-335 6th Edition, Partition II

#[macro_use]
mod error;

pub mod coff;
pub mod file;
pub mod metadata;
pub mod object;
pub mod prelude;

pub use coff::CoffFile;
pub use error::Error;
pub use file::parser::Parser;
pub use object::{Architecture, ObjectFile};

/// Result alias used by every fallible operation of this crate
pub type Result<T> = std::result::Result<T, Error>;
