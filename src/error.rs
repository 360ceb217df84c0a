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
/// Only a few of these are ever fatal for a whole parse. Opening a file that does not exist
/// ([`Error::FileError`]), failing to map it ([`Error::Error`]) or reading a file without the
/// `PE\0\0` signature ([`Error::InvalidFormat`]) abort the operation. Everything else is produced
/// by the lower layers, consumed internally, and turned into zeroed fields, skipped entries or a
/// missing icon.
///
/// # Error Categories
///
/// ## Fatal
/// - [`Error::InvalidFormat`] - The file is not a Portable Executable
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Error`] - Memory mapping failures and other miscellaneous errors
///
/// ## Recovered locally
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the data
/// - [`Error::Malformed`] - A structure points somewhere it should not
/// - [`Error::PngError`] - An embedded PNG icon could not be decoded
///
/// # Examples
///
/// ```rust,no_run
/// use bottlescope::{Error, PeFile};
///
/// match PeFile::from_file("drive_c/Program Files/Game/game.exe") {
///     Ok(pe) => println!("{}", pe.architecture()),
///     Err(Error::InvalidFormat(message)) => eprintln!("Not a PE file: {message}"),
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {io_err}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file does not carry a valid PE signature.
    ///
    /// Raised when the 4 bytes at the offset stored at `0x3C` are not `PE\0\0`, or when either of
    /// these two reads falls outside of the file. No partially parsed structure is returned.
    #[error("Invalid PE file - {0}")]
    InvalidFormat(String),

    /// The file is damaged and a structure inside it could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
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

    /// An out of bound access was attempted while parsing the file.
    ///
    /// Every read of the byte cursor checks the requested range against the length of the
    /// underlying data and reports this error instead of reading past the end.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories, such as a failing memory map.
    #[error("{0}")]
    Error(String),

    /// Error from the png crate while decoding a compressed icon resource.
    #[error("{0}")]
    PngError(#[from] png::DecodingError),
}
