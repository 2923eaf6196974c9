//! Using a JSON object as platform.
//!
//! - objects are directories, strings are files with the string as content
//! - `null` is an entry whose file vanished, every lookup of it fails
//! - names are wide, like on Windows
//!
//! Type hints can be switched off to exercise the lookup of entry types.

use ap_dirent::native::{NativeForm, Platform, RawName};
use ap_dirent::{Encoding, Error, FileType, Narrow, Representation, Wide, WideChar};
use serde_json::{Map, Value};

mod dir;
pub use dir::JsonDir;

/// Making JSON available as an `ap_dirent::native::Platform`.
pub struct JsonFs {
    root: Value,
    type_hints: bool,
}

/// Split a native path into its components.
fn components(path: &RawName) -> Vec<String> {
    let path = match path {
        RawName::Wide(x) => x
            .iter()
            .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        RawName::Bytes(x) => String::from_utf8_lossy(x).into_owned(),
    };
    path.split('/').filter(|x| !x.is_empty()).map(String::from).collect()
}

impl JsonFs {
    /// The root needs to be an object.
    pub fn new(root: Value) -> Result<Self, Error> {
        if !root.is_object() {
            return Err(Error::NotADirectory);
        }
        Ok(Self { root, type_hints: true })
    }

    /// Parse the JSON text.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let root = serde_json::from_slice(data).map_err(|e| Error::Io(e.into()))?;
        Self::new(root)
    }

    /// Whether the directory stream reports the type of entries.
    pub fn type_hints(mut self, enabled: bool) -> Self {
        self.type_hints = enabled;
        self
    }

    /// Find the value at a path.
    fn lookup(&self, path: &RawName) -> Result<&Value, Error> {
        let mut res = &self.root;
        for name in components(path) {
            let Value::Object(children) = res else {
                return Err(Error::NotADirectory);
            };
            res = children.get(&name).ok_or(Error::NotFound)?;
        }
        if res.is_null() {
            return Err(Error::NotFound);
        }
        Ok(res)
    }

    /// Insert a value at a path.  The parent has to exist.
    fn insert(&mut self, path: &RawName, value: Value) -> Result<(), Error> {
        let mut names = components(path);
        let name = names.pop().ok_or(Error::AccessDenied)?;
        let mut parent = &mut self.root;
        for name in names {
            let Value::Object(children) = parent else {
                return Err(Error::NotADirectory);
            };
            parent = children.get_mut(&name).filter(|x| !x.is_null()).ok_or(Error::NotFound)?;
        }
        let Value::Object(children) = parent else {
            return Err(Error::NotADirectory);
        };
        tracing::trace!(%path, "insert");
        children.insert(name, value);
        Ok(())
    }

    /// Create or overwrite a file.
    pub fn create(&mut self, path: &RawName, contents: &str) -> Result<(), Error> {
        if self.lookup(path).is_ok_and(Value::is_object) {
            return Err(Error::AccessDenied);
        }
        self.insert(path, Value::String(contents.into()))
    }

    /// Create a file with a narrow path interpreted under the given encoding.
    pub fn create_narrow(&mut self, path: &[u8], contents: &str, encoding: Encoding) -> Result<(), Error> {
        self.create(&Narrow::to_native(path, Self::FORM, encoding), contents)
    }

    /// Create a file with a wide path.
    pub fn create_wide(&mut self, path: &[WideChar], contents: &str) -> Result<(), Error> {
        self.create(&Wide::to_native(path, Self::FORM, Encoding::Utf8), contents)
    }

    /// Create an empty directory.
    pub fn mkdir(&mut self, path: &RawName) -> Result<(), Error> {
        if self.lookup(path).is_ok() {
            return Err(Error::AccessDenied);
        }
        self.insert(path, Value::Object(Map::new()))
    }

    /// Leave an entry whose file is gone.
    pub fn dangling(&mut self, path: &RawName) -> Result<(), Error> {
        self.insert(path, Value::Null)
    }

    /// The contents of a file.
    pub fn contents(&self, path: &RawName) -> Result<&str, Error> {
        match self.lookup(path)? {
            Value::String(x) => Ok(x),
            Value::Object(_) => Err(Error::Io(std::io::Error::other("is a directory"))),
            _ => Err(Error::AccessDenied),
        }
    }
}

impl Platform for JsonFs {
    type Dir<'a> = JsonDir<'a>;
    const FORM: NativeForm = NativeForm::Wide;
    const SEPARATORS: &'static [char] = &['/'];

    fn open_dir(&self, path: &RawName) -> Result<JsonDir<'_>, Error> {
        let Value::Object(children) = self.lookup(path)? else {
            return Err(Error::NotADirectory);
        };
        Ok(JsonDir::new(children, self.type_hints))
    }

    fn file_type(&self, path: &RawName) -> Result<FileType, Error> {
        Ok(match self.lookup(path)? {
            Value::Object(_) => FileType::Directory,
            _ => FileType::RegularFile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_dirent::{DirEntry, NarrowDir, NarrowName, WideDir, WideName};

    /// "åäö.txt" in UTF-8.
    const AAO: [u8; 10] = [0xc3, 0xa5, 0xc3, 0xa4, 0xc3, 0xb6, 0x2e, 0x74, 0x78, 0x74];

    fn wide(s: &str) -> Vec<WideChar> {
        s.chars().map(WideChar::from).collect()
    }

    /// A directory `/T` holding `hep.txt`.
    fn fixture() -> JsonFs {
        JsonFs::from_slice(br#"{"T": {"hep.txt": "hep\n"}}"#).unwrap()
    }

    fn narrow(fs: &JsonFs, path: &[u8], encoding: Encoding) -> Vec<DirEntry<Narrow>> {
        let mut dir = NarrowDir::open_with(fs, path, encoding).unwrap();
        let mut res = Vec::new();
        while let Some(entry) = dir.read_with(encoding).unwrap() {
            res.push(entry);
        }
        dir.close().unwrap();
        res.sort_by(|a, b| a.name.cmp(&b.name));
        res
    }

    fn wide_names(fs: &JsonFs, path: &str, encoding: Encoding) -> Vec<WideName> {
        let dir = WideDir::open_with(fs, &wide(path), encoding).unwrap();
        let mut res: Vec<_> = dir.map(|e| e.unwrap().name).collect();
        res.sort();
        res
    }

    #[test]
    fn single_file() {
        let fs = fixture();
        let entries = narrow(&fs, b"/T", Encoding::Utf8);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "hep.txt");
        assert_eq!(entries[0].typ, FileType::RegularFile);

        let path = Narrow::join(b"/T", '/', &entries[0].name);
        let raw = Narrow::to_native(&path, NativeForm::Wide, Encoding::Utf8);
        assert_eq!(fs.contents(&raw).unwrap(), "hep\n");
    }

    #[test]
    fn utf8_name() {
        let mut fs = fixture();
        let mut path = b"/T/".to_vec();
        path.extend_from_slice(&AAO);
        fs.create_narrow(&path, "hep\n", Encoding::Utf8).unwrap();

        let entries = narrow(&fs, b"/T", Encoding::Utf8);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name.as_bytes(), AAO);
        for entry in entries {
            assert_eq!(entry.typ, FileType::RegularFile);
            let path = Narrow::join(b"/T", '/', &entry.name);
            let raw = Narrow::to_native(&path, NativeForm::Wide, Encoding::Utf8);
            assert_eq!(fs.contents(&raw).unwrap(), "hep\n");
        }
    }

    #[test]
    fn creation_depends_on_encoding() {
        let mut fs = fixture();
        let mut path = b"/T/".to_vec();
        path.extend_from_slice(&AAO);
        fs.create_narrow(&path, "hep\n", Encoding::Windows1252).unwrap();
        let names = wide_names(&fs, "/T", Encoding::Utf8);
        assert_eq!(names.len(), 2);
        assert_eq!(names[1], "Ã¥Ã¤Ã¶.txt");
        assert_eq!(names[1].len(), 10);
    }

    #[test]
    fn narrow_names_follow_the_reader() {
        let mut fs = fixture();
        let mut path = b"/T/".to_vec();
        path.extend_from_slice(&AAO);
        fs.create_narrow(&path, "hep\n", Encoding::Utf8).unwrap();

        let utf8 = narrow(&fs, b"/T", Encoding::Utf8);
        let cp1252 = narrow(&fs, b"/T", Encoding::Windows1252);
        assert_eq!(utf8[1].name.as_bytes(), AAO);
        assert_eq!(cp1252[1].name.as_bytes(), b"\xe5\xe4\xf6.txt");
        assert_ne!(utf8[1].name, cp1252[1].name);

        assert_eq!(wide_names(&fs, "/T", Encoding::Utf8), wide_names(&fs, "/T", Encoding::Windows1252));
    }

    #[test]
    fn encoding_switch_while_reading() {
        let mut fs = JsonFs::new(serde_json::json!({"a\u{e5}": "", "b\u{e5}": ""})).unwrap();
        fs.mkdir(&RawName::Wide(wide("/sub"))).unwrap();
        let mut dir = NarrowDir::open_with(&fs, b"/", Encoding::Utf8).unwrap();
        let first = dir.read_with(Encoding::Utf8).unwrap().unwrap();
        let second = dir.read_with(Encoding::Latin1).unwrap().unwrap();
        assert_eq!(first.name.as_bytes(), b"a\xc3\xa5");
        assert_eq!(second.name.as_bytes(), b"b\xe5");
        assert_eq!(dir.read_with(Encoding::Utf8).unwrap().unwrap().typ, FileType::Directory);
        assert!(dir.read_with(Encoding::Utf8).unwrap().is_none());
    }

    #[test]
    fn unrepresentable_names() {
        let mut fs = fixture();
        fs.create_wide(&wide("/T/\u{6d4b}\u{8bd5}"), "hep\n").unwrap();
        for encoding in [Encoding::Latin1, Encoding::Ascii, Encoding::Windows1252] {
            let entries = narrow(&fs, b"/T", encoding);
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].name.as_bytes(), b"??");
            assert_eq!(entries[1].name, "hep.txt");
        }
        let entries = narrow(&fs, b"/T", Encoding::Utf8);
        assert_eq!(entries[1].name.as_bytes(), "\u{6d4b}\u{8bd5}".as_bytes());
    }

    #[test]
    fn ascii_names_agree() {
        let mut fs = fixture();
        fs.mkdir(&RawName::Wide(wide("/T/sub"))).unwrap();
        for encoding in [Encoding::Utf8, Encoding::Ascii, Encoding::Latin1, Encoding::Windows1252] {
            let names: Vec<_> = narrow(&fs, b"/T", encoding).into_iter().map(|e| e.name).collect();
            let widened: Vec<_> = wide_names(&fs, "/T", encoding)
                .iter()
                .map(|n| NarrowName(n.iter().map(|&c| c as u8).collect()))
                .collect();
            assert_eq!(names, widened);
        }
    }

    #[test]
    fn types_without_hints() {
        let mut fs = fixture().type_hints(false);
        fs.mkdir(&RawName::Wide(wide("/T/sub"))).unwrap();
        fs.dangling(&RawName::Wide(wide("/T/gone"))).unwrap();
        let entries = narrow(&fs, b"/T", Encoding::Utf8);
        let types: Vec<_> = entries.iter().map(|e| (e.name.to_string(), e.typ)).collect();
        assert_eq!(
            types,
            [
                ("gone".to_string(), FileType::Unknown),
                ("hep.txt".to_string(), FileType::RegularFile),
                ("sub".to_string(), FileType::Directory),
            ]
        );
    }

    #[test]
    fn dangling_with_hints() {
        let mut fs = fixture();
        fs.dangling(&RawName::Wide(wide("/T/gone"))).unwrap();
        let entries = narrow(&fs, b"/T", Encoding::Utf8);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].typ, FileType::Unknown);
    }

    #[test]
    fn open_errors() {
        let fs = fixture();
        assert!(matches!(NarrowDir::open(&fs, b"/missing"), Err(Error::NotFound)));
        assert!(matches!(NarrowDir::open(&fs, b"/T/hep.txt"), Err(Error::NotADirectory)));
        assert!(matches!(NarrowDir::open(&fs, b"/T/hep.txt/x"), Err(Error::NotADirectory)));
        assert!(NarrowDir::open(&fs, b"/T//").is_ok());
        assert!(matches!(JsonFs::from_slice(b"[]"), Err(Error::NotADirectory)));
        assert!(matches!(JsonFs::from_slice(b"{"), Err(Error::Io(_))));
    }
}
