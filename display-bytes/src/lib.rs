use std::fmt;


/// Writes `bytes` as an escaped byte-string literal body (without the surrounding `b"` and `"`).
fn write_escaped(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &b in bytes {
        match b {
            0x00 => write!(f, "\\0")?,
            0x09 => write!(f, "\\t")?,
            0x0A => write!(f, "\\n")?,
            0x0D => write!(f, "\\r")?,
            0x22 => write!(f, "\\\"")?,
            // no need to escape 0x27
            0x5C => write!(f, "\\\\")?,
            0x20..=0x7E => write!(f, "{}", char::from(b))?,
            other => write!(f, "\\x{:02X}", other)?,
        }
    }
    Ok(())
}


/// A fixed-size byte array that displays as a byte-string literal, e.g. a file magic.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DisplayBytes<const SIZE: usize>([u8; SIZE]);
impl<const SIZE: usize> DisplayBytes<SIZE> {
    pub const fn new(bytes: [u8; SIZE]) -> Self {
        Self(bytes)
    }
}
impl<const SIZE: usize> fmt::Debug for DisplayBytes<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayBytes({})", self)
    }
}
impl<const SIZE: usize> fmt::Display for DisplayBytes<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"")?;
        write_escaped(f, &self.0)?;
        write!(f, "\"")
    }
}


/// A borrowed byte slice that displays as a byte-string literal.
///
/// Only the first bytes are rendered, followed by a count of the bytes left out. This keeps log
/// lines about multi-megabyte buffers readable.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DisplayBytesSlice<'a> {
    bytes: &'a [u8],
    limit: usize,
}
impl<'a> DisplayBytesSlice<'a> {
    /// Displays at most `limit` bytes of `bytes`.
    pub fn preview(bytes: &'a [u8], limit: usize) -> Self {
        Self {
            bytes,
            limit,
        }
    }
}
impl<'a> fmt::Debug for DisplayBytesSlice<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayBytesSlice({})", self)
    }
}
impl<'a> fmt::Display for DisplayBytesSlice<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.bytes[..self.limit.min(self.bytes.len())];
        write!(f, "b\"")?;
        write_escaped(f, shown)?;
        write!(f, "\"")?;
        let hidden = self.bytes.len() - shown.len();
        if hidden > 0 {
            write!(f, "... ({} more bytes)", hidden)?;
        }
        Ok(())
    }
}
