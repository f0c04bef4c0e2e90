//! Decompression of save payloads.
//!
//! Payloads are zlib streams (RFC1950); a stream that starts with the gzip magic is decoded as
//! gzip (RFC1952) instead. Streams may be concatenated: as long as the byte following the end of a
//! stream is not zero, it starts another stream whose output is appended. A zero byte ends the
//! payload and everything after it is ignored.


use std::io::{self, Read};

use display_bytes::DisplayBytesSlice;
use flate2::{Decompress, FlushDecompress, Status};
use flate2::bufread::GzDecoder;
use tracing::{debug, warn};

use crate::error::ConversionError;
use crate::header::FormatTag;


const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const OUTPUT_CHUNK_SIZE: usize = 64 * 1024;
const PREVIEW_LENGTH: usize = 8;


/// The outcome of decompressing a payload.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Inflated {
    pub data: Vec<u8>,

    /// Whether `data` was actually inflated. False if a legacy payload was passed through as-is.
    pub decompressed: bool,
}


/// Inflates one or more concatenated zlib or gzip streams.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>, io::Error> {
    let mut decompressed = Vec::with_capacity(compressed.len().saturating_mul(2).max(OUTPUT_CHUNK_SIZE));
    let mut offset = 0;
    let mut stream_count = 0;
    loop {
        let stream = &compressed[offset..];
        let consumed = if stream.starts_with(&GZIP_MAGIC) {
            inflate_gzip_stream(stream, &mut decompressed)?
        } else {
            inflate_zlib_stream(stream, &mut decompressed)?
        };
        offset += consumed;
        stream_count += 1;

        match compressed.get(offset) {
            None | Some(0) => break,
            Some(_) => continue,
        }
    }

    debug!(
        "inflated {} of {} bytes in {} stream(s) into {} bytes",
        offset, compressed.len(), stream_count, decompressed.len(),
    );
    Ok(decompressed)
}

/// Inflates a single gzip stream, returning the number of bytes it occupied.
fn inflate_gzip_stream(compressed: &[u8], decompressed: &mut Vec<u8>) -> Result<usize, io::Error> {
    let mut decoder = GzDecoder::new(compressed);
    decoder.read_to_end(decompressed)?;
    let rest = decoder.into_inner();
    Ok(compressed.len() - rest.len())
}

/// Inflates a single zlib stream, returning the number of bytes it occupied.
fn inflate_zlib_stream(compressed: &[u8], decompressed: &mut Vec<u8>) -> Result<usize, io::Error> {
    let mut inflater = Decompress::new(true);
    loop {
        if decompressed.len() == decompressed.capacity() {
            decompressed.reserve(OUTPUT_CHUNK_SIZE);
        }

        let consumed_before = inflater.total_in();
        let produced_before = inflater.total_out();
        // total_in never exceeds what we handed over
        let consumed = usize::try_from(consumed_before).unwrap_or(usize::MAX).min(compressed.len());
        let status = inflater.decompress_vec(&compressed[consumed..], decompressed, FlushDecompress::None)?;
        if status == Status::StreamEnd {
            let stream_length = usize::try_from(inflater.total_in()).unwrap_or(usize::MAX).min(compressed.len());
            return Ok(stream_length);
        }

        if inflater.total_in() == consumed_before && inflater.total_out() == produced_before {
            // input exhausted before the end of the stream
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected end of file"));
        }
    }
}


/// Decompresses a payload according to its format.
///
/// A standard payload that does not inflate is an error. A legacy payload that does not inflate is
/// returned unchanged, since legacy saves are only supported on a best-effort basis.
pub fn decompress_payload(payload: &[u8], format: FormatTag) -> Result<Inflated, ConversionError> {
    match inflate(payload) {
        Ok(data) => Ok(Inflated {
            data,
            decompressed: true,
        }),
        Err(e) => match format {
            FormatTag::StandardJson => Err(e.into()),
            FormatTag::LegacyMessagePack => {
                warn!(
                    "legacy payload {} did not inflate ({}); passing it through unchanged",
                    DisplayBytesSlice::preview(payload, PREVIEW_LENGTH), e,
                );
                Ok(Inflated {
                    data: payload.to_vec(),
                    decompressed: false,
                })
            },
        },
    }
}
