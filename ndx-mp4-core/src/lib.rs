//! ndx-mp4 Core Library
//!
//! This library provides the core data structures for the ndx-mp4 NWB
//! extension: declared video shapes, packed frame arrays, the codec-tagged
//! video-bytes record with its binary serialization, and the extension's
//! schema declaration.

pub mod frames;
pub mod record;
pub mod schema;
pub mod shape;

pub use frames::FrameArray;
pub use record::{CodecId, VideoRecord};
pub use schema::{extension_namespace, NamespaceSpec};
pub use shape::VideoShape;

/// Result type for ndx-mp4-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ndx-mp4-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid video shape {dims:?}: {reason}")]
    InvalidShape { dims: Vec<u32>, reason: &'static str },

    #[error("invalid frame rate {0}: must be positive and finite")]
    InvalidFps(f64),

    #[error("record name must not be empty")]
    EmptyName,

    #[error("record name is not valid UTF-8")]
    InvalidNameEncoding,

    #[error("frame data is {actual} bytes, shape {shape} requires {expected}")]
    FrameDataLength {
        shape: VideoShape,
        expected: usize,
        actual: usize,
    },

    #[error("decoded shape {decoded} does not match declared shape {declared}")]
    ShapeMismatch {
        declared: VideoShape,
        decoded: VideoShape,
    },

    #[error("invalid magic bytes, expected 'NDX\\0'")]
    InvalidMagic,

    #[error("unsupported record version: {0}")]
    UnsupportedVersion(u16),

    #[error("unknown codec tag: {0}")]
    UnknownCodec(u8),

    #[error("schema serialization error: {0}")]
    Schema(#[from] serde_json::Error),
}
