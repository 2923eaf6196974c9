//! The interface to the native directory facility.

use crate::{Error, FileType, WideChar};
use core::fmt;

/// The form a platform hands out names in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeForm {
    /// Bytes without an attached encoding, e.g. Linux.
    Bytes,
    /// Wide code units, e.g. Windows.
    Wide,
}

/// A name or path in the native form of a platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawName {
    Bytes(Vec<u8>),
    Wide(Vec<WideChar>),
}

impl RawName {
    /// Drop trailing separators but never shorten the path below `root` units.
    ///
    /// A path consisting only of separators keeps the first one.
    pub fn trim_separators(mut self, separators: &[char], root: usize) -> Self {
        fn trim<T: Copy + Into<u32>>(v: &mut Vec<T>, separators: &[char], root: usize) {
            let is_sep = |x: &T| separators.iter().any(|&s| s as u32 == Into::<u32>::into(*x));
            while v.len() > root.max(1) && v.last().is_some_and(is_sep) {
                v.pop();
            }
        }
        match &mut self {
            RawName::Bytes(x) => trim(x, separators, root),
            RawName::Wide(x) => trim(x, separators, root),
        }
        self
    }

    /// Append a child name.  Both parts need to be of the same form.
    pub fn join(&self, separator: char, child: &RawName) -> Option<RawName> {
        fn join<T: Copy + Into<u32> + TryFrom<u32>>(dir: &[T], separator: char, child: &[T]) -> Option<Vec<T>> {
            let mut res = Vec::with_capacity(dir.len() + child.len() + 1);
            res.extend_from_slice(dir);
            if dir.last().map(|&x| Into::<u32>::into(x)) != Some(separator as u32) {
                res.push(T::try_from(separator as u32).ok()?);
            }
            res.extend_from_slice(child);
            Some(res)
        }
        match (self, child) {
            (RawName::Bytes(dir), RawName::Bytes(child)) => Some(RawName::Bytes(join(dir, separator, child)?)),
            (RawName::Wide(dir), RawName::Wide(child)) => Some(RawName::Wide(join(dir, separator, child)?)),
            _ => None,
        }
    }
}

/// Shows the name as UTF-8 for diagnostics.
impl fmt::Display for RawName {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawName::Bytes(x) => fmt.write_str(&String::from_utf8_lossy(x)),
            RawName::Wide(x) => {
                for &c in x {
                    fmt::Write::write_char(fmt, char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))?;
                }
                Ok(())
            }
        }
    }
}

/// What the platform knows about the type of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeHint {
    /// Reported directly by the directory stream.
    Known(FileType),
    /// Needs a separate lookup of the file.
    Unresolved,
}

/// An entry as the directory stream returns it.
#[derive(Clone, Debug)]
pub struct RawEntry {
    pub name: RawName,
    pub hint: TypeHint,
}

/// A native directory stream.
pub trait NativeDir {
    /// Advance by one entry.  `None` is the end of the stream.
    fn read(&mut self) -> Result<Option<RawEntry>, Error>;

    /// Release the native resources.
    fn close(self) -> Result<(), Error>;
}

/// A platform able to enumerate directories.
pub trait Platform {
    type Dir<'a>: NativeDir
    where
        Self: 'a;

    /// The form names are given in.
    const FORM: NativeForm;

    /// Path separators.  The first one is used when joining paths.
    const SEPARATORS: &'static [char];

    /// The length of the root prefix of a path that trimming must keep.
    fn root_len(_path: &RawName) -> usize {
        1
    }

    /// Open a directory stream.  The path is already in native form.
    fn open_dir(&self, path: &RawName) -> Result<Self::Dir<'_>, Error>;

    /// Look up the type of a file.  Links are followed.
    fn file_type(&self, path: &RawName) -> Result<FileType, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_trailing() {
        let p = RawName::Bytes(b"/tmp/x//".to_vec()).trim_separators(&['/'], 1);
        assert_eq!(p, RawName::Bytes(b"/tmp/x".to_vec()));
        let p = RawName::Bytes(b"///".to_vec()).trim_separators(&['/'], 1);
        assert_eq!(p, RawName::Bytes(b"/".to_vec()));
        let wide = |s: &str| s.chars().map(u32::from).collect::<Vec<_>>();
        let p = RawName::Wide(wide("c:\\t\\/")).trim_separators(&['\\', '/'], 3);
        assert_eq!(p, RawName::Wide(wide("c:\\t")));
    }

    #[test]
    fn trim_keeps_root() {
        let wide = |s: &str| s.chars().map(u32::from).collect::<Vec<_>>();
        let p = RawName::Wide(wide("C:\\")).trim_separators(&['\\', '/'], 3);
        assert_eq!(p, RawName::Wide(wide("C:\\")));
        let p = RawName::Wide(wide("C:\\/\\")).trim_separators(&['\\', '/'], 3);
        assert_eq!(p, RawName::Wide(wide("C:\\")));
        let p = RawName::Bytes(b"/".to_vec()).trim_separators(&['/'], 0);
        assert_eq!(p, RawName::Bytes(b"/".to_vec()));
    }

    #[test]
    fn join_names() {
        let dir = RawName::Bytes(b"/tmp".to_vec());
        let child = RawName::Bytes(b"a".to_vec());
        assert_eq!(dir.join('/', &child), Some(RawName::Bytes(b"/tmp/a".to_vec())));
        let root = RawName::Bytes(b"/".to_vec());
        assert_eq!(root.join('/', &child), Some(RawName::Bytes(b"/a".to_vec())));
        assert_eq!(dir.join('/', &RawName::Wide(vec![0x61])), None);
    }
}
