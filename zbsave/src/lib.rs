pub mod batch;
mod error;
pub mod header;
pub mod inflate;
pub mod naming;


use std::borrow::Cow;

use display_bytes::DisplayBytesSlice;
use tracing::debug;

pub use crate::batch::{convert_batch, BatchOptions, FileOutcome, RawFile};
pub use crate::error::ConversionError;
pub use crate::header::{sniff_format, FormatTag, Header};
use crate::inflate::{decompress_payload, Inflated};
use crate::naming::{output_file_name, Delivery};


/// A converted save file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ConversionResult {
    pub data: Vec<u8>,
    pub format: FormatTag,

    /// Set for legacy saves, whose output may not be usable even though conversion succeeded.
    pub is_legacy_variant: bool,

    /// Whether `data` is the inflated payload rather than the payload passed through as-is.
    pub decompressed: bool,
}
impl ConversionResult {
    pub fn output_file_name(&self, input_name: &str) -> String {
        output_file_name(input_name, self.format)
    }

    pub fn delivery(&self) -> Delivery {
        self.format.delivery()
    }

    /// The bytes to deliver, encoded as the format requires.
    pub fn encoded_data(&self) -> Cow<'_, [u8]> {
        self.delivery().encode(&self.data)
    }
}


/// Converts the contents of a save file.
///
/// `file_name` is only consulted when the file does not start with a known magic.
pub fn convert(data: &[u8], file_name: &str) -> Result<ConversionResult, ConversionError> {
    let header = Header::read(data)?;
    let format = header.format(file_name);
    let payload = header.strip(data);
    debug!(
        "{:?}: header {}, format {}, payload {}",
        file_name, header, format, DisplayBytesSlice::preview(payload, 8),
    );

    let Inflated { data, decompressed } = decompress_payload(payload, format)?;
    Ok(ConversionResult {
        data,
        format,
        is_legacy_variant: format.is_legacy(),
        decompressed,
    })
}
