//! Windows specific directory enumeration.
//!
//! Names are UTF-16.  Wide names are passed through, narrow names are
//! encoded with the encoding active at the time an entry is read.
#![cfg(windows)]

use ap_dirent::native::{NativeDir, NativeForm, Platform, RawEntry, RawName, TypeHint};
use ap_dirent::{name, Error, FileType};
use std::os::windows::ffi::OsStringExt;
use windows_sys::Win32::Foundation::{
    GetLastError, ERROR_ACCESS_DENIED, ERROR_BAD_NETPATH, ERROR_DIRECTORY, ERROR_FILE_NOT_FOUND, ERROR_INVALID_NAME,
    ERROR_NO_MORE_FILES, ERROR_PATH_NOT_FOUND, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    FindClose, FindFirstFileW, FindNextFileW, GetFileAttributesW, FILE_ATTRIBUTE_DIRECTORY,
    FILE_ATTRIBUTE_REPARSE_POINT, INVALID_FILE_ATTRIBUTES, WIN32_FIND_DATAW,
};

/// The Windows file system.
pub struct WindowsFs;

/// Map a Win32 error code.
fn map_error(code: u32) -> Error {
    match code {
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND | ERROR_INVALID_NAME | ERROR_BAD_NETPATH => Error::NotFound,
        ERROR_DIRECTORY => Error::NotADirectory,
        ERROR_ACCESS_DENIED => Error::AccessDenied,
        _ => Error::Io(std::io::Error::from_raw_os_error(code as i32)),
    }
}

fn last_error() -> Error {
    map_error(unsafe { GetLastError() })
}

/// A NUL terminated UTF-16 path.
fn to_wstr(path: &RawName, suffix: &str) -> Result<Vec<u16>, Error> {
    let RawName::Wide(wide) = path else {
        return Err(Error::Io(std::io::Error::from(std::io::ErrorKind::InvalidInput)));
    };
    let mut res = name::to_utf16(wide);
    if res.contains(&0) {
        return Err(Error::NotFound);
    }
    res.extend(suffix.encode_utf16());
    res.push(0);
    Ok(res)
}

fn attributes(path: &RawName) -> Result<u32, Error> {
    let path = to_wstr(path, "")?;
    let attr = unsafe { GetFileAttributesW(path.as_ptr()) };
    if attr == INVALID_FILE_ATTRIBUTES {
        return Err(last_error());
    }
    Ok(attr)
}

impl Platform for WindowsFs {
    type Dir<'a> = WindowsDir;
    const FORM: NativeForm = NativeForm::Wide;
    const SEPARATORS: &'static [char] = &['\\', '/'];

    fn open_dir(&self, path: &RawName) -> Result<WindowsDir, Error> {
        if attributes(path)? & FILE_ATTRIBUTE_DIRECTORY == 0 {
            return Err(Error::NotADirectory);
        }
        let suffix = match path {
            RawName::Wide(x) if x.last().is_some_and(|&c| c == '\\' as u32 || c == '/' as u32) => "*",
            _ => "\\*",
        };
        let pattern = to_wstr(path, suffix)?;
        let mut data: WIN32_FIND_DATAW = unsafe { core::mem::zeroed() };
        let handle = unsafe { FindFirstFileW(pattern.as_ptr(), &mut data) };
        if handle == INVALID_HANDLE_VALUE {
            // an empty root directory has not even the pseudo entries
            if unsafe { GetLastError() } == ERROR_FILE_NOT_FOUND {
                return Ok(WindowsDir {
                    handle,
                    pending: None,
                });
            }
            return Err(last_error());
        }
        Ok(WindowsDir {
            handle,
            pending: Some(data),
        })
    }

    /// A drive root like `C:\` keeps its separator.
    fn root_len(path: &RawName) -> usize {
        match path {
            RawName::Wide(x)
                if x.len() >= 3
                    && char::from_u32(x[0]).is_some_and(|c| c.is_ascii_alphabetic())
                    && x[1] == ':' as u32
                    && Self::SEPARATORS.iter().any(|&s| x[2] == s as u32) =>
            {
                3
            }
            _ => 1,
        }
    }

    /// The attributes of an entry describe a reparse point itself, the
    /// metadata lookup follows it to the target.
    fn file_type(&self, path: &RawName) -> Result<FileType, Error> {
        let mut wide = to_wstr(path, "")?;
        wide.pop();
        let path = std::path::PathBuf::from(std::ffi::OsString::from_wide(&wide));
        let meta = std::fs::metadata(&path).map_err(|e| match e.raw_os_error() {
            Some(code) => map_error(code as u32),
            None => Error::from_io(e),
        })?;
        Ok(if meta.is_dir() {
            FileType::Directory
        } else if meta.is_file() {
            FileType::RegularFile
        } else {
            FileType::Unknown
        })
    }
}

/// A search handle.
///
/// The first entry arrives together with the handle and is kept until read.
pub struct WindowsDir {
    handle: HANDLE,
    pending: Option<WIN32_FIND_DATAW>,
}

// SAFETY: the handle is only used through `&mut self`.
unsafe impl Send for WindowsDir {}

impl WindowsDir {
    fn entry(data: &WIN32_FIND_DATAW) -> RawEntry {
        let len = data.cFileName.iter().position(|&c| c == 0).unwrap_or(data.cFileName.len());
        let attr = data.dwFileAttributes;
        let hint = if attr & FILE_ATTRIBUTE_REPARSE_POINT != 0 {
            TypeHint::Unresolved
        } else if attr & FILE_ATTRIBUTE_DIRECTORY != 0 {
            TypeHint::Known(FileType::Directory)
        } else {
            TypeHint::Known(FileType::RegularFile)
        };
        RawEntry {
            name: RawName::Wide(name::from_utf16(&data.cFileName[..len])),
            hint,
        }
    }
}

impl NativeDir for WindowsDir {
    fn read(&mut self) -> Result<Option<RawEntry>, Error> {
        if let Some(data) = self.pending.take() {
            return Ok(Some(Self::entry(&data)));
        }
        if self.handle == INVALID_HANDLE_VALUE {
            return Ok(None);
        }
        let mut data: WIN32_FIND_DATAW = unsafe { core::mem::zeroed() };
        if unsafe { FindNextFileW(self.handle, &mut data) } == 0 {
            if unsafe { GetLastError() } == ERROR_NO_MORE_FILES {
                return Ok(None);
            }
            return Err(last_error());
        }
        Ok(Some(Self::entry(&data)))
    }

    fn close(mut self) -> Result<(), Error> {
        let handle = core::mem::replace(&mut self.handle, INVALID_HANDLE_VALUE);
        if handle != INVALID_HANDLE_VALUE && unsafe { FindClose(handle) } == 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

/// Close the search handle when the object drops.
impl Drop for WindowsDir {
    fn drop(&mut self) {
        if self.handle != INVALID_HANDLE_VALUE && unsafe { FindClose(self.handle) } == 0 {
            tracing::warn!(error = %std::io::Error::last_os_error(), "FindClose failed");
        }
        self.handle = INVALID_HANDLE_VALUE;
    }
}
