//! Errors raised while encoding or decoding `.bmf` data

use std::io;

/// Error type for `.bmf` encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unexpected end of stream while reading {what}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        what: &'static str,
        needed: u64,
        remaining: u64,
    },

    #[error("{0} unexpected bytes after the scene trailer")]
    TrailingBytes(usize),

    #[error("Texture path is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Texture path {0:?} does not start with the models/ prefix")]
    MissingPathPrefix(String),

    #[error("Unknown vertex attribute flags: {0:#010b}")]
    UnknownAttributeFlags(u8),

    #[error("Mesh {mesh}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh {mesh}: material index {material_index} out of range for {material_count} materials")]
    MaterialOutOfRange {
        mesh: usize,
        material_index: u64,
        material_count: usize,
    },

    #[error("Mesh {mesh}: attribute {attribute} has {len} entries, expected 0 or {vertex_count}")]
    AttributeLength {
        mesh: usize,
        attribute: &'static str,
        len: usize,
        vertex_count: usize,
    },

    #[error("Count {0} does not fit in memory on this platform")]
    CountTooLarge(u64),
}

pub type Result<T, E = FormatError> = std::result::Result<T, E>;
