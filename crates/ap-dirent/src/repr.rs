//! Conversion between native names and the caller's representation.

use crate::native::{NativeForm, RawName};
use crate::{Encoding, NarrowName, WideChar, WideName};
use core::fmt::Debug;
use core::ops::Deref;

/// How the caller wants paths and names.
///
/// A directory opened with one representation only produces names of that
/// representation.
pub trait Representation {
    /// A borrowed path.
    type Path: ?Sized + Debug;
    /// An owned name, also usable as a path.
    type Name: Clone + Debug + Eq + Ord + Deref<Target = Self::Path>;

    /// Convert a path given by the caller into the native form.
    ///
    /// `encoding` is the snapshot taken when the directory is opened.
    fn to_native(path: &Self::Path, form: NativeForm, encoding: Encoding) -> RawName;

    /// Convert a native name.
    ///
    /// `snapshot` is the encoding at open time, `active` the one at the
    /// moment of the read.
    fn from_native(raw: &RawName, snapshot: Encoding, active: Encoding) -> Self::Name;

    /// Is this `.` or `..`?
    fn is_pseudo(name: &Self::Path) -> bool;

    /// Append `name` to `dir`.
    fn join(dir: &Self::Path, separator: char, name: &Self::Path) -> Self::Name;

    /// Render a name for humans.
    fn to_string_lossy(name: &Self::Path, encoding: Encoding) -> String;
}

/// Wide names.  Independent of the encoding on wide-native platforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wide {}

/// Narrow names in the active encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Narrow {}

/// Report names that needed replacement characters.
fn lossy<T>(res: crate::encoding::Converted<T>, raw: &RawName, encoding: Encoding) -> Vec<T> {
    if res.replaced != 0 {
        tracing::debug!(name = %raw, ?encoding, replaced = res.replaced, "name not representable");
    }
    res.value
}

impl Representation for Wide {
    type Path = [WideChar];
    type Name = WideName;

    fn to_native(path: &[WideChar], form: NativeForm, encoding: Encoding) -> RawName {
        match form {
            NativeForm::Wide => RawName::Wide(path.to_vec()),
            NativeForm::Bytes => RawName::Bytes(encoding.encode(path).value),
        }
    }

    fn from_native(raw: &RawName, snapshot: Encoding, _active: Encoding) -> WideName {
        match raw {
            RawName::Wide(x) => WideName(x.clone()),
            RawName::Bytes(x) => WideName(lossy(snapshot.decode(x), raw, snapshot)),
        }
    }

    fn is_pseudo(name: &[WideChar]) -> bool {
        crate::classify::is_pseudo(name)
    }

    fn join(dir: &[WideChar], separator: char, name: &[WideChar]) -> WideName {
        let mut res = dir.to_vec();
        if res.last() != Some(&(separator as WideChar)) {
            res.push(separator as WideChar);
        }
        res.extend_from_slice(name);
        WideName(res)
    }

    fn to_string_lossy(name: &[WideChar], _encoding: Encoding) -> String {
        name.iter()
            .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl Representation for Narrow {
    type Path = [u8];
    type Name = NarrowName;

    fn to_native(path: &[u8], form: NativeForm, encoding: Encoding) -> RawName {
        match form {
            NativeForm::Bytes => RawName::Bytes(path.to_vec()),
            NativeForm::Wide => RawName::Wide(encoding.decode(path).value),
        }
    }

    /// Bytes are passed through, wide names follow the active encoding.
    fn from_native(raw: &RawName, _snapshot: Encoding, active: Encoding) -> NarrowName {
        match raw {
            RawName::Bytes(x) => NarrowName(x.clone()),
            RawName::Wide(x) => NarrowName(lossy(active.encode(x), raw, active)),
        }
    }

    fn is_pseudo(name: &[u8]) -> bool {
        crate::classify::is_pseudo(name)
    }

    fn join(dir: &[u8], separator: char, name: &[u8]) -> NarrowName {
        let mut res = dir.to_vec();
        let mut buf = [0u8; 4];
        let sep = separator.encode_utf8(&mut buf).as_bytes();
        if !res.ends_with(sep) {
            res.extend_from_slice(sep);
        }
        res.extend_from_slice(name);
        NarrowName(res)
    }

    fn to_string_lossy(name: &[u8], encoding: Encoding) -> String {
        Wide::to_string_lossy(&encoding.decode(name).value, encoding)
    }
}
