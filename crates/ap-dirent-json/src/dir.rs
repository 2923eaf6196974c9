use ap_dirent::native::{NativeDir, RawEntry, RawName, TypeHint};
use ap_dirent::{Error, FileType, WideChar};
use serde_json::{map, Map, Value};

/// A directory stream over the keys of an object.
///
/// Like a real directory it starts with the self-pointer and the parent.
pub struct JsonDir<'a> {
    children: map::Iter<'a>,
    pseudo: usize,
    type_hints: bool,
}

impl<'a> JsonDir<'a> {
    pub(crate) fn new(value: &'a Map<String, Value>, type_hints: bool) -> Self {
        Self {
            children: value.iter(),
            pseudo: 0,
            type_hints,
        }
    }

    fn hint(&self, value: &Value) -> TypeHint {
        match value {
            _ if !self.type_hints => TypeHint::Unresolved,
            Value::Object(_) => TypeHint::Known(FileType::Directory),
            Value::Null => TypeHint::Unresolved,
            _ => TypeHint::Known(FileType::RegularFile),
        }
    }
}

impl NativeDir for JsonDir<'_> {
    fn read(&mut self) -> Result<Option<RawEntry>, Error> {
        if self.pseudo < 2 {
            self.pseudo += 1;
            return Ok(Some(RawEntry {
                name: RawName::Wide(vec!['.' as WideChar; self.pseudo]),
                hint: TypeHint::Known(FileType::Directory),
            }));
        }
        let Some((name, value)) = self.children.next() else {
            return Ok(None);
        };
        Ok(Some(RawEntry {
            name: RawName::Wide(name.chars().map(WideChar::from).collect()),
            hint: self.hint(value),
        }))
    }

    fn close(self) -> Result<(), Error> {
        Ok(())
    }
}
