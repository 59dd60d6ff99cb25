use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every decode path returns either a value or one of these variants; nothing is recovered
/// internally and nothing aborts the process. The three kinds a consumer usually dispatches on:
///
/// - [`Error::OutOfBounds`] - a bounds check against the input buffer failed
/// - [`Error::Malformed`] - a structural invariant of the file format was violated
/// - [`Error::Unimplemented`] - the operation is deliberately not provided by this parser
///
/// # Examples
///
/// ```rust,no_run
/// use coffscope::{CoffFile, Error, ObjectFile};
/// use std::path::Path;
///
/// match CoffFile::from_file(Path::new("some.dll")) {
///     Ok(image) => println!("{}", image.file_format_name()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("malformed input: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while parsing the file.
    ///
    /// This error occurs when trying to read data beyond the end of the buffer.
    /// It's a safety check to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The file is damaged and could not be parsed.
    ///
    /// A structural invariant was violated: a bad PE magic, an unknown optional-header
    /// variant, an unterminated string table, a name-escape overflow, an undefined
    /// metadata table bit, an invalid IL method header. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The requested operation is deliberately not provided by this parser.
    ///
    /// Raw symbol value materialization, needed-library enumeration and relocation
    /// address materialization fall into this category. Callers can probe for the
    /// capability by matching on this variant instead of crashing.
    #[error("Operation not implemented - {0}")]
    Unimplemented(&'static str),

    /// This file type is not supported.
    ///
    /// Indicates that the input is not a PE/COFF image, object file or import
    /// library, or uses features that this library does not parse.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external library errors with additional context.
    #[error("{0}")]
    Error(String),
}
