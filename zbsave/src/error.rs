use std::fmt;
use std::io;

use crate::header::HEADER_LENGTH;


/// Why a save file could not be converted.
#[derive(Debug)]
pub enum ConversionError {
    TooSmall { length: usize },
    Decompression(io::Error),
}
impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { length }
                => write!(f, "file too small - invalid save file ({} bytes, need at least {})", length, HEADER_LENGTH),
            Self::Decompression(e)
                => write!(f, "failed to decompress: {}", e),
        }
    }
}
impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TooSmall { .. } => None,
            Self::Decompression(e) => Some(e),
        }
    }
}
impl From<io::Error> for ConversionError {
    fn from(value: io::Error) -> Self { Self::Decompression(value) }
}


#[cfg(test)]
mod tests {
    use super::ConversionError;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_decoder_error_is_kept() {
        let decoder_error = io::Error::new(io::ErrorKind::InvalidInput, "corrupt deflate stream");
        let err = ConversionError::from(decoder_error);
        assert!(matches!(err, ConversionError::Decompression(_)));
        assert_eq!(err.to_string(), "failed to decompress: corrupt deflate stream");
        assert_eq!(err.source().unwrap().to_string(), "corrupt deflate stream");
    }

    #[test]
    fn test_too_small_message() {
        let err = ConversionError::TooSmall { length: 1 };
        assert_eq!(err.to_string(), "file too small - invalid save file (1 bytes, need at least 2)");
        assert!(err.source().is_none());
    }
}
