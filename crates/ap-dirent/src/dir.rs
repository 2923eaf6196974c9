//! Directory handles.

use crate::native::{NativeDir, Platform, RawName};
use crate::repr::{Narrow, Representation, Wide};
use crate::{classify, encoding, Encoding, Error, FileType};
use core::marker::PhantomData;

/// Directory entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry<R: Representation> {
    /// The name without any path.  Never `.` or `..`.
    pub name: R::Name,
    /// The file-type.
    pub typ: FileType,
}

/// An open directory.
///
/// Entries are produced lazily in the order the platform returns them.  A
/// handle is closed with [`Dir::close`] or when it is dropped.  It can be
/// moved to another thread but not shared.
pub struct Dir<'a, P: Platform, R: Representation> {
    platform: &'a P,
    stream: Option<P::Dir<'a>>,
    path: RawName,
    snapshot: Encoding,
    failed: bool,
    _repr: PhantomData<fn() -> R>,
}

/// A directory producing wide names.
pub type WideDir<'a, P> = Dir<'a, P, Wide>;

/// A directory producing narrow names.
pub type NarrowDir<'a, P> = Dir<'a, P, Narrow>;

impl<'a, P: Platform, R: Representation> Dir<'a, P, R> {
    /// Open a directory under the process-wide encoding.
    pub fn open(platform: &'a P, path: &R::Path) -> Result<Self, Error> {
        Self::open_with(platform, path, encoding::active())
    }

    /// Open a directory.
    ///
    /// The encoding is used for the path and is kept for decoding wide names
    /// from byte-native platforms.
    pub fn open_with(platform: &'a P, path: &R::Path, encoding: Encoding) -> Result<Self, Error> {
        let path = R::to_native(path, P::FORM, encoding);
        let root = P::root_len(&path);
        let path = path.trim_separators(P::SEPARATORS, root);
        let stream = platform.open_dir(&path)?;
        tracing::debug!(%path, ?encoding, "opened directory");
        Ok(Self {
            platform,
            stream: Some(stream),
            path,
            snapshot: encoding,
            failed: false,
            _repr: PhantomData,
        })
    }

    /// The native path the directory was opened with.
    pub fn path(&self) -> &RawName {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Return the next entry under the process-wide encoding.
    pub fn read(&mut self) -> Result<Option<DirEntry<R>>, Error> {
        self.read_with(encoding::active())
    }

    /// Return the next entry.
    ///
    /// `active` is used for narrow names on wide-native platforms.  An error
    /// ends the enumeration, the handle still needs to be closed.
    pub fn read_with(&mut self, active: Encoding) -> Result<Option<DirEntry<R>>, Error> {
        let stream = self.stream.as_mut().ok_or(Error::InvalidHandle)?;
        if self.failed {
            return Ok(None);
        }
        loop {
            let raw = match stream.read() {
                Ok(Some(raw)) => raw,
                Ok(None) => return Ok(None),
                Err(e) => {
                    self.failed = true;
                    return Err(e);
                }
            };
            let name = R::from_native(&raw.name, self.snapshot, active);
            if R::is_pseudo(&name) {
                continue;
            }
            let typ = classify::resolve(self.platform, &self.path, &raw);
            tracing::trace!(name = %raw.name, ?typ, "entry");
            return Ok(Some(DirEntry { name, typ }));
        }
    }

    /// Close the native stream.
    ///
    /// Closing twice fails with `InvalidHandle`.
    pub fn close(&mut self) -> Result<(), Error> {
        let stream = self.stream.take().ok_or(Error::InvalidHandle)?;
        tracing::debug!(path = %self.path, "closing directory");
        stream.close()
    }
}

impl<P: Platform, R: Representation> Iterator for Dir<'_, P, R> {
    type Item = Result<DirEntry<R>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

/// Close the stream when the handle drops.
impl<P: Platform, R: Representation> Drop for Dir<'_, P, R> {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                tracing::warn!(path = %self.path, error = %e, "closing directory failed");
            }
        }
    }
}
