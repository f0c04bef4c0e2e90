use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zbsave::{ConversionError, ConversionResult};


/// Sometimes things go wrong.
#[derive(Debug)]
pub(crate) enum Error {
    Io { path: PathBuf, error: io::Error },
    Conversion(ConversionError),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, error }
                => write!(f, "I/O error on {}: {}", path.display(), error),
            Self::Conversion(e)
                => write!(f, "{}", e),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Conversion(e) => Some(e),
        }
    }
}
impl From<ConversionError> for Error {
    fn from(value: ConversionError) -> Self { Self::Conversion(value) }
}


/// Writes a converted file into `output_dir`, returning the path written.
pub(crate) fn deliver(result: &ConversionResult, input_name: &str, output_dir: &Path) -> Result<PathBuf, Error> {
    let output_path = output_dir.join(result.output_file_name(input_name));
    let encoded = result.encoded_data();
    std::fs::write(&output_path, &encoded)
        .map_err(|error| Error::Io { path: output_path.clone(), error })?;
    debug!(
        "wrote {} bytes to {} as {}",
        encoded.len(), output_path.display(), result.delivery().media_type(),
    );
    Ok(output_path)
}


/// Reads an input file, attaching the path to any failure.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path)
        .map_err(|error| Error::Io { path: path.to_path_buf(), error })
}
