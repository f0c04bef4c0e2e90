//! Output naming and delivery conventions for converted saves.


use std::borrow::Cow;

use crate::header::{FormatTag, LEGACY_NAME_SUFFIX};


const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];


/// How the converted bytes are handed over.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Delivery {
    /// The bytes are written as they are.
    Binary,

    /// The bytes are decoded as UTF-8 text first. A leading byte order mark is dropped and invalid
    /// sequences are replaced with U+FFFD.
    Utf8Text,
}
impl Delivery {
    pub fn encode<'a>(&self, data: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Self::Binary => Cow::Borrowed(data),
            Self::Utf8Text => {
                let without_bom = data.strip_prefix(&UTF8_BOM[..]).unwrap_or(data);
                match String::from_utf8_lossy(without_bom) {
                    Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
                    Cow::Owned(text) => Cow::Owned(text.into_bytes()),
                }
            },
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Binary => "application/octet-stream",
            Self::Utf8Text => "application/json",
        }
    }
}


/// Derives the name of the converted file from the name of the save file.
///
/// Legacy saves lose a trailing `MP` and gain `.mp`; standard saves keep their name and gain
/// `.json`.
pub fn output_file_name(input_name: &str, format: FormatTag) -> String {
    let base_name = match format {
        FormatTag::LegacyMessagePack => input_name.strip_suffix(LEGACY_NAME_SUFFIX).unwrap_or(input_name),
        FormatTag::StandardJson => input_name,
    };
    format!("{}.{}", base_name, format.extension())
}


/// Whether a file name suggests a legacy save, before looking at its contents.
pub fn is_risky_file_name(name: &str) -> bool {
    name.ends_with(LEGACY_NAME_SUFFIX) || name.ends_with(".mp")
}


/// Renders a byte count for humans, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }

    let mut value = bytes as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    // ties round up, not to even
    let rounded = (value * 100.0).round() / 100.0;
    let mut number = format!("{:.2}", rounded);
    let trimmed_length = number.trim_end_matches('0').trim_end_matches('.').len();
    number.truncate(trimmed_length);
    format!("{} {}", number, SIZE_UNITS[unit_index])
}
