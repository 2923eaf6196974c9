//! Linux specific directory enumeration.
//!
//! Names are bytes.  Narrow names are passed through, wide names are decoded
//! with the encoding the directory was opened under.
#![cfg(target_os = "linux")]

use ap_dirent::native::{NativeDir, NativeForm, Platform, RawEntry, RawName, TypeHint};
use ap_dirent::{Error, FileType};
use std::ffi::{CStr, CString};
use std::mem::MaybeUninit;

/// The Linux file system.
pub struct LinuxFs;

/// Map an errno value.
fn errno_to_error(e: std::io::Error) -> Error {
    match e.raw_os_error() {
        Some(libc::ENOTDIR) => Error::NotADirectory,
        Some(libc::ENOENT) => Error::NotFound,
        Some(libc::EACCES) | Some(libc::EPERM) => Error::AccessDenied,
        _ => Error::from_io(e),
    }
}

/// Convert a native path into a C string.
fn to_cstring(path: &RawName) -> Result<CString, Error> {
    let RawName::Bytes(bytes) = path else {
        return Err(Error::Io(std::io::Error::from(std::io::ErrorKind::InvalidInput)));
    };
    // a name with an embedded NUL cannot exist
    CString::new(bytes.as_slice()).map_err(|_| Error::NotFound)
}

impl Platform for LinuxFs {
    type Dir<'a> = LinuxDir;
    const FORM: NativeForm = NativeForm::Bytes;
    const SEPARATORS: &'static [char] = &['/'];

    fn open_dir(&self, path: &RawName) -> Result<LinuxDir, Error> {
        let path = to_cstring(path)?;
        let stream = unsafe { libc::opendir(path.as_ptr()) };
        if stream.is_null() {
            return Err(errno_to_error(std::io::Error::last_os_error()));
        }
        Ok(LinuxDir { stream })
    }

    fn file_type(&self, path: &RawName) -> Result<FileType, Error> {
        let path = to_cstring(path)?;
        let mut st = MaybeUninit::<libc::stat>::uninit();
        if unsafe { libc::stat(path.as_ptr(), st.as_mut_ptr()) } == -1 {
            return Err(errno_to_error(std::io::Error::last_os_error()));
        }
        let st = unsafe { st.assume_init() };
        Ok(match st.st_mode & libc::S_IFMT {
            libc::S_IFREG => FileType::RegularFile,
            libc::S_IFDIR => FileType::Directory,
            _ => FileType::Unknown,
        })
    }
}

/// A directory stream of the C library.
pub struct LinuxDir {
    stream: *mut libc::DIR,
}

// SAFETY: the stream is only used through `&mut self`.
unsafe impl Send for LinuxDir {}

impl LinuxDir {
    /// The type as reported by `d_type`.
    fn hint(d_type: u8) -> TypeHint {
        match d_type {
            libc::DT_REG => TypeHint::Known(FileType::RegularFile),
            libc::DT_DIR => TypeHint::Known(FileType::Directory),
            // links are followed by the lookup
            libc::DT_UNKNOWN | libc::DT_LNK => TypeHint::Unresolved,
            _ => TypeHint::Known(FileType::Unknown),
        }
    }
}

impl NativeDir for LinuxDir {
    fn read(&mut self) -> Result<Option<RawEntry>, Error> {
        if self.stream.is_null() {
            return Err(Error::InvalidHandle);
        }
        // readdir signals errors only through errno
        unsafe { *libc::__errno_location() = 0 };
        let entry = unsafe { libc::readdir(self.stream) };
        if entry.is_null() {
            let e = std::io::Error::last_os_error();
            return match e.raw_os_error() {
                None | Some(0) => Ok(None),
                Some(_) => Err(Error::Io(e)),
            };
        }
        let entry = unsafe { &*entry };
        let name = unsafe { CStr::from_ptr(entry.d_name.as_ptr()) };
        Ok(Some(RawEntry {
            name: RawName::Bytes(name.to_bytes().to_vec()),
            hint: Self::hint(entry.d_type),
        }))
    }

    fn close(mut self) -> Result<(), Error> {
        let stream = core::mem::replace(&mut self.stream, core::ptr::null_mut());
        if unsafe { libc::closedir(stream) } == -1 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

/// Close the stream when the object drops.
impl Drop for LinuxDir {
    fn drop(&mut self) {
        if !self.stream.is_null() && unsafe { libc::closedir(self.stream) } == -1 {
            tracing::warn!(error = %std::io::Error::last_os_error(), "closedir failed");
        }
        self.stream = core::ptr::null_mut();
    }
}
