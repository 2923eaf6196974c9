//! Directory enumeration on the host platform.
//!
//! ```no_run
//! let mut dir = ap_dirent_native::opendir(b"/tmp")?;
//! while let Some(entry) = dir.read()? {
//!     println!("{} {:?}", entry.name, entry.typ);
//! }
//! dir.close()?;
//! # Ok::<(), ap_dirent::Error>(())
//! ```

use ap_dirent::{Error, NarrowDir, WideChar, WideDir};

#[cfg(target_os = "linux")]
pub type NativeFs = ap_dirent_linux::LinuxFs;

#[cfg(windows)]
pub type NativeFs = ap_dirent_windows::WindowsFs;

/// The host file system.
#[cfg(target_os = "linux")]
pub static NATIVE: NativeFs = ap_dirent_linux::LinuxFs;

/// The host file system.
#[cfg(windows)]
pub static NATIVE: NativeFs = ap_dirent_windows::WindowsFs;

/// Open a directory with a narrow path under the process-wide encoding.
pub fn opendir(path: &[u8]) -> Result<NarrowDir<'static, NativeFs>, Error> {
    NarrowDir::open(&NATIVE, path)
}

/// Open a directory with a wide path.
pub fn wopendir(path: &[WideChar]) -> Result<WideDir<'static, NativeFs>, Error> {
    WideDir::open(&NATIVE, path)
}
