use std::{error, fmt, io};

use crate::buffer;

/// A block identity used to annotate diagnostics: the 4-byte type tag and
/// signed id from a block's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub type_tag: [u8; 4],
    pub id: i32,
}

impl BlockRef {
    pub fn new(type_tag: [u8; 4], id: i32) -> Self {
        Self { type_tag, id }
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = String::from_utf8_lossy(&self.type_tag);
        write!(f, "'{tag}' #{}", self.id)
    }
}

#[derive(Debug)]
pub enum Error {
    /// Could not open, read, or write a file.
    Io(io::Error),
    /// A block's declared length or an offset within it ran past the data
    /// actually available.
    Truncated { block: BlockRef, offset: usize },
    /// A cross-reference (font id, style id, block id, ...) did not resolve
    /// to anything in the block index or a derived map.
    MissingBlock { from: BlockRef, wanted: [u8; 4], wanted_id: i32 },
    /// An AddColor record carried a type byte this decoder does not know.
    UnknownType { block: BlockRef, type_byte: u8 },
    /// A LIST/PAGE walk ended without the expected sentinel.
    BadSentinel { block: BlockRef, offset: usize },
    /// Buffer access violated bounds; see `buffer::Error` for detail.
    Buffer(buffer::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Truncated { block, offset } => {
                write!(f, "{block} truncated at offset {offset}")
            }
            Self::MissingBlock { from, wanted, wanted_id } => {
                let tag = String::from_utf8_lossy(wanted);
                write!(f, "{from} references missing block '{tag}' #{wanted_id}")
            }
            Self::UnknownType { block, type_byte } => {
                write!(f, "{block} AddColor record has unknown type byte 0x{type_byte:02x}")
            }
            Self::BadSentinel { block, offset } => {
                write!(f, "{block} ended without its terminating sentinel at offset {offset}")
            }
            Self::Buffer(e) => write!(f, "{e}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<buffer::Error> for Error {
    fn from(e: buffer::Error) -> Self {
        Self::Buffer(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
