//! Owned names in the two representations.

use core::fmt;
use core::ops::Deref;

/// A wide code unit.  Large enough for every code point.
pub type WideChar = u32;

/// A name made of wide code units.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WideName(pub Vec<WideChar>);

impl WideName {
    pub fn to_string_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl Deref for WideName {
    type Target = [WideChar];
    fn deref(&self) -> &[WideChar] {
        &self.0
    }
}

impl From<&str> for WideName {
    fn from(value: &str) -> Self {
        Self(value.chars().map(WideChar::from).collect())
    }
}

impl PartialEq<str> for WideName {
    fn eq(&self, other: &str) -> bool {
        self.0.iter().copied().eq(other.chars().map(WideChar::from))
    }
}

impl PartialEq<&str> for WideName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Display for WideName {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.to_string_lossy())
    }
}

/// A name made of bytes in some narrow encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NarrowName(pub Vec<u8>);

impl NarrowName {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for NarrowName {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for NarrowName {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl PartialEq<[u8]> for NarrowName {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NarrowName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// Displays the bytes as UTF-8.
impl fmt::Display for NarrowName {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Combine surrogate pairs into code points.
pub fn from_utf16(units: &[u16]) -> Vec<WideChar> {
    char::decode_utf16(units.iter().copied())
        .map(|ch| match ch {
            Ok(ch) => ch as WideChar,
            Err(e) => e.unpaired_surrogate() as WideChar,
        })
        .collect()
}

/// Split code points into UTF-16 units.
pub fn to_utf16(wide: &[WideChar]) -> Vec<u16> {
    let mut res = Vec::with_capacity(wide.len());
    for &c in wide {
        match char::from_u32(c) {
            Some(ch) => {
                let mut buf = [0u16; 2];
                res.extend_from_slice(ch.encode_utf16(&mut buf));
            }
            // surrogates and out-of-range values
            None if c <= 0xffff => res.push(c as u16),
            None => res.push(char::REPLACEMENT_CHARACTER as u16),
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_pairs() {
        let units: Vec<u16> = "a\u{1f600}\u{6d4b}".encode_utf16().collect();
        let wide = WideName(from_utf16(&units));
        assert_eq!(wide.len(), 3);
        assert_eq!(wide, "a\u{1f600}\u{6d4b}");
        assert_eq!(to_utf16(&wide), units);
    }

    #[test]
    fn unpaired_surrogate_survives() {
        let units = [0x61, 0xd800, 0x62];
        let wide = WideName(from_utf16(&units));
        assert_eq!(wide.0, vec![0x61, 0xd800, 0x62]);
        assert_eq!(to_utf16(&wide), units);
        assert_eq!(wide.to_string_lossy(), "a\u{fffd}b");
    }
}
