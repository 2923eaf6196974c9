//! Narrow encodings and the process-wide encoding context.
//!
//! Conversions never fail.  Anything that cannot be represented is replaced
//! and counted, so enumeration keeps going over odd names.

use crate::WideChar;
use core::sync::atomic::{AtomicU8, Ordering};

/// A narrow encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Encoding {
    #[default]
    Utf8 = 0,
    /// 7-bit only, as selected by the `C` locale.
    Ascii = 1,
    /// ISO-8859-1.
    Latin1 = 2,
    /// The western Windows code page.
    Windows1252 = 3,
}

/// Windows-1252 in the range 0x80..=0x9f.
///
/// Undefined bytes map to the C1 control of the same value.
const CP1252_HIGH: [u16; 32] = [
    0x20ac, 0x0081, 0x201a, 0x0192, 0x201e, 0x2026, 0x2020, 0x2021, //
    0x02c6, 0x2030, 0x0160, 0x2039, 0x0152, 0x008d, 0x017d, 0x008f, //
    0x0090, 0x2018, 0x2019, 0x201c, 0x201d, 0x2022, 0x2013, 0x2014, //
    0x02dc, 0x2122, 0x0161, 0x203a, 0x0153, 0x009d, 0x017e, 0x0178,
];

/// The result of a conversion.
#[derive(Debug, PartialEq, Eq)]
pub struct Converted<T> {
    pub value: Vec<T>,
    /// The number of replacement characters inserted.
    pub replaced: usize,
}

impl Encoding {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Ascii,
            2 => Self::Latin1,
            3 => Self::Windows1252,
            _ => Self::Utf8,
        }
    }

    /// Parse a locale name like `en_US.UTF-8`, `C` or `english_us.1252`.
    pub fn from_locale(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "c" || name == "posix" {
            return Some(Self::Ascii);
        }
        // the codeset follows the dot, a bare name is the codeset itself
        let codeset = name.rsplit_once('.').map_or(name.as_str(), |(_, x)| x);
        let codeset = codeset.split('@').next().unwrap_or_default();
        Some(match codeset {
            "utf8" | "utf-8" | "65001" => Self::Utf8,
            "1252" | "cp1252" | "windows-1252" => Self::Windows1252,
            "iso-8859-1" | "iso8859-1" | "iso88591" | "latin1" | "28591" => Self::Latin1,
            "ascii" | "us-ascii" | "20127" => Self::Ascii,
            _ => return None,
        })
    }

    /// The bytes inserted for a character that cannot be encoded.
    pub fn replacement(&self) -> &'static [u8] {
        match self {
            Self::Utf8 => "\u{fffd}".as_bytes(),
            _ => b"?",
        }
    }

    /// Decode narrow bytes into wide code units.
    pub fn decode(&self, bytes: &[u8]) -> Converted<WideChar> {
        const REPLACEMENT: WideChar = char::REPLACEMENT_CHARACTER as WideChar;
        let mut value = Vec::with_capacity(bytes.len());
        let mut replaced = 0;
        match self {
            Self::Utf8 => {
                for chunk in bytes.utf8_chunks() {
                    value.extend(chunk.valid().chars().map(WideChar::from));
                    if !chunk.invalid().is_empty() {
                        value.push(REPLACEMENT);
                        replaced += 1;
                    }
                }
            }
            Self::Ascii => {
                for &b in bytes {
                    if b.is_ascii() {
                        value.push(b as WideChar);
                    } else {
                        value.push(REPLACEMENT);
                        replaced += 1;
                    }
                }
            }
            Self::Latin1 => value.extend(bytes.iter().map(|&b| b as WideChar)),
            Self::Windows1252 => value.extend(bytes.iter().map(|&b| match b {
                0x80..=0x9f => CP1252_HIGH[(b - 0x80) as usize] as WideChar,
                _ => b as WideChar,
            })),
        }
        Converted { value, replaced }
    }

    /// Encode wide code units into narrow bytes.
    pub fn encode(&self, wide: &[WideChar]) -> Converted<u8> {
        let mut value = Vec::with_capacity(wide.len());
        let mut replaced = 0;
        for &c in wide {
            let Some(ch) = char::from_u32(c) else {
                value.extend_from_slice(self.replacement());
                replaced += 1;
                continue;
            };
            let byte = match self {
                Self::Utf8 => {
                    let mut buf = [0u8; 4];
                    value.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    continue;
                }
                Self::Ascii => u8::try_from(c).ok().filter(u8::is_ascii),
                Self::Latin1 => u8::try_from(c).ok(),
                Self::Windows1252 => match c {
                    0..=0x7f | 0xa0..=0xff => Some(c as u8),
                    _ => CP1252_HIGH
                        .iter()
                        .position(|&x| x as WideChar == c)
                        .map(|i| 0x80 + i as u8),
                },
            };
            match byte {
                Some(b) => value.push(b),
                None => {
                    value.extend_from_slice(self.replacement());
                    replaced += 1;
                }
            }
        }
        Converted { value, replaced }
    }
}

static ACTIVE: AtomicU8 = AtomicU8::new(Encoding::Utf8 as u8);

/// The encoding narrow names are currently produced with.
pub fn active() -> Encoding {
    Encoding::from_u8(ACTIVE.load(Ordering::Relaxed))
}

/// Change the process-wide encoding and return the previous one.
///
/// Handles that are already open keep their snapshot for wide names, but
/// narrow names of wide-native platforms follow the change on the next read.
pub fn set_active(encoding: Encoding) -> Encoding {
    Encoding::from_u8(ACTIVE.swap(encoding as u8, Ordering::Relaxed))
}

/// Select the encoding from `LC_ALL`, `LC_CTYPE` or `LANG`.
///
/// The first non-empty variable wins.  Unknown locales keep the current encoding.
pub fn init_from_env() -> Encoding {
    let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty());
    if let Some(encoding) = locale.as_deref().and_then(Encoding::from_locale) {
        set_active(encoding);
        tracing::debug!(?locale, ?encoding, "encoding from environment");
    }
    active()
}

/// Restores the previous process-wide encoding when dropped.
#[must_use]
pub struct Scoped {
    previous: Encoding,
}

impl Scoped {
    /// Activate an encoding until the guard is dropped.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            previous: set_active(encoding),
        }
    }
}

impl Drop for Scoped {
    fn drop(&mut self) {
        set_active(self.previous);
    }
}
