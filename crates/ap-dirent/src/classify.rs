//! Filtering of pseudo-entries and type resolution.

use crate::native::{Platform, RawEntry, RawName, TypeHint};

/// The type of a directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileType {
    /// A plain file.
    RegularFile,
    /// A group of directories.
    Directory,
    /// Anything else, or the type could not be determined.
    Unknown,
}

/// Is this the self-pointer or the parent directory?
pub fn is_pseudo<T: Copy + Into<u32>>(name: &[T]) -> bool {
    let dot = |x: &T| Into::<u32>::into(*x) == '.' as u32;
    match name {
        [a] => dot(a),
        [a, b] => dot(a) && dot(b),
        _ => false,
    }
}

/// Resolve the type of an entry in the directory at `dir`.
///
/// Types the stream does not report are looked up by path.  A failing
/// lookup makes the entry `Unknown` instead of failing the enumeration.
pub fn resolve<P: Platform>(platform: &P, dir: &RawName, entry: &RawEntry) -> FileType {
    match entry.hint {
        TypeHint::Known(typ) => typ,
        TypeHint::Unresolved => {
            let Some(path) = dir.join(P::SEPARATORS[0], &entry.name) else {
                return FileType::Unknown;
            };
            match platform.file_type(&path) {
                Ok(typ) => typ,
                Err(e) => {
                    tracing::debug!(%path, error = %e, "type lookup failed");
                    FileType::Unknown
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_entries() {
        assert!(is_pseudo(b"."));
        assert!(is_pseudo(b".."));
        assert!(is_pseudo(&['.' as u32, '.' as u32]));
        assert!(!is_pseudo(b"..."));
        assert!(!is_pseudo(b".a"));
        assert!(!is_pseudo::<u8>(b""));
        assert!(!is_pseudo(&[0xff0e_u32]));
    }
}
