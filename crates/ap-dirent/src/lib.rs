//! Directory enumeration over wide and narrow names.
//!
//! A directory is opened either with a wide path (code units that hold any
//! code point) or with a narrow path (bytes under the active [`Encoding`]).
//! The returned handle only ever produces entries in the representation it
//! was opened with.
//!
//! The layers are:
//!   - a [`native::Platform`] that opens and advances native directory streams,
//!   - a [`repr::Representation`] that converts native names into the caller's form,
//!   - the classifier that drops `.` and `..` and resolves the [`FileType`].
//!
//! ### Narrow names are read-time dependent
//!
//! On platforms storing wide names, the narrow bytes of an entry are produced
//! with the encoding that is active when the entry is read, not when the
//! directory was opened.  The same file can therefore be reported with
//! different bytes under different locales.

pub mod classify;
pub mod dir;
pub mod encoding;
pub mod name;
pub mod native;
pub mod repr;

pub use classify::FileType;
pub use dir::{Dir, DirEntry, NarrowDir, WideDir};
pub use encoding::Encoding;
pub use name::{NarrowName, WideChar, WideName};
pub use repr::{Narrow, Representation, Wide};

/// Errors of the directory layer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no such file or directory")]
    NotFound,
    #[error("not a directory")]
    NotADirectory,
    #[error("permission denied")]
    AccessDenied,
    /// The handle was already closed.
    #[error("invalid directory handle")]
    InvalidHandle,
    #[error("i/o error: {0}")]
    Io(#[source] std::io::Error),
}

impl Error {
    /// Map the portable error kinds, anything else stays an i/o error.
    pub fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound,
            std::io::ErrorKind::PermissionDenied => Error::AccessDenied,
            _ => Error::Io(err),
        }
    }
}
