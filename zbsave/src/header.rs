//! Container header sniffing and removal.


use std::fmt;

use display_bytes::DisplayBytes;

use crate::error::ConversionError;
use crate::naming::Delivery;


/// Length of the magic at the start of every save container.
pub const HEADER_LENGTH: usize = 2;

/// File name suffix (no dot, case-sensitive) that marks a headerless legacy save.
pub const LEGACY_NAME_SUFFIX: &str = "MP";


/// The save format a file is treated as.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FormatTag {
    /// Zlib-compressed JSON, magic `ZB`.
    StandardJson,

    /// Legacy MessagePack container, magic `MP`. Only partially supported.
    LegacyMessagePack,
}
impl FormatTag {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyMessagePack)
    }

    /// Extension appended to the output file name.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::StandardJson => "json",
            Self::LegacyMessagePack => "mp",
        }
    }

    /// Label shown next to a converted file in a report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StandardJson => "JSON",
            Self::LegacyMessagePack => "MP - UNSUPPORTED",
        }
    }

    pub fn delivery(&self) -> Delivery {
        match self {
            Self::StandardJson => Delivery::Utf8Text,
            Self::LegacyMessagePack => Delivery::Binary,
        }
    }
}
impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StandardJson => write!(f, "JSON"),
            Self::LegacyMessagePack => write!(f, "MP"),
        }
    }
}


/// The leading two bytes of a save file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Header {
    /// `ZB`
    Standard,

    /// `MP`
    Legacy,

    Unrecognized(DisplayBytes<HEADER_LENGTH>),
}
impl Header {
    /// Reads the header from the start of `data`.
    ///
    /// Fails with [`ConversionError::TooSmall`] if `data` cannot even hold a header; such a file is
    /// never classified.
    pub fn read(data: &[u8]) -> Result<Self, ConversionError> {
        match data {
            [b'Z', b'B', ..] => Ok(Self::Standard),
            [b'M', b'P', ..] => Ok(Self::Legacy),
            [first, second, ..] => Ok(Self::Unrecognized(DisplayBytes::new([*first, *second]))),
            _ => Err(ConversionError::TooSmall { length: data.len() }),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    pub fn bytes(&self) -> DisplayBytes<HEADER_LENGTH> {
        match self {
            Self::Standard => DisplayBytes::new(*b"ZB"),
            Self::Legacy => DisplayBytes::new(*b"MP"),
            Self::Unrecognized(bytes) => *bytes,
        }
    }

    /// Decides the format of a file with this header.
    ///
    /// A recognized magic always wins. Without one, a name ending in `MP` marks a legacy save and
    /// everything else is assumed to be standard JSON.
    pub fn format(&self, file_name: &str) -> FormatTag {
        match self {
            Self::Standard => FormatTag::StandardJson,
            Self::Legacy => FormatTag::LegacyMessagePack,
            Self::Unrecognized(_) => {
                if file_name.ends_with(LEGACY_NAME_SUFFIX) {
                    FormatTag::LegacyMessagePack
                } else {
                    FormatTag::StandardJson
                }
            },
        }
    }

    /// Returns the payload following this header.
    ///
    /// Only a recognized magic is removed; a headerless file is passed on whole.
    pub fn strip<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        if self.is_recognized() {
            data.get(HEADER_LENGTH..).unwrap_or_default()
        } else {
            data
        }
    }
}
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}


/// Determines the format of a save file from its leading bytes and its name.
pub fn sniff_format(data: &[u8], file_name: &str) -> Result<FormatTag, ConversionError> {
    let header = Header::read(data)?;
    Ok(header.format(file_name))
}
