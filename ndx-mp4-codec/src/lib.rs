//! ndx-mp4 Codec Library
//!
//! This library provides the MP4/H.264 encode/decode boundary for ndx-mp4
//! video records, and the [`Mp4H264Video`] object that ties a byte payload,
//! a declared shape, and a frame rate together.

pub mod decode;
pub mod encode;
pub mod images;
pub mod video;

pub use video::{read_video_file, Mp4H264Video, Mp4H264VideoBuilder};

use ndx_mp4_core::{CodecId, FrameArray, VideoShape};
use std::sync::Once;

/// Result type for ndx-mp4-codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ndx-mp4-codec operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] ndx_mp4_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),

    #[error("H.264 encode error: {0}")]
    Encode(String),

    #[error("H.264 decode error: {0}")]
    Decode(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("exactly one of data, data_array, data_file must be supplied, got {0}")]
    SourceCount(usize),

    #[error("file path '{0}' must end with '.mp4'")]
    NotMp4(String),

    #[error("record codec '{}' is not MP4/H.264", .0.as_str())]
    WrongCodec(CodecId),

    #[error("no frames supplied")]
    NoFrames,

    #[error("frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSize {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("frame array is grayscale, expected color")]
    GrayscaleFrames,

    #[error("frame index {index} out of range ({frames} frames)")]
    FrameIndex { index: u32, frames: u32 },
}

static FFMPEG_INIT: Once = Once::new();

/// Initialize FFmpeg (once per process)
pub(crate) fn init_ffmpeg() {
    FFMPEG_INIT.call_once(|| {
        ffmpeg_next::init().expect("Failed to initialize FFmpeg");
    });
}

/// H.264 encoder settings
///
/// The default is lossless (`crf` 0), which is what makes decode-of-encode
/// return the input array byte for byte. Lossy rate factors trade that
/// exactness for smaller payloads.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// x264 constant rate factor, 0 (lossless) to 51
    pub crf: u8,
    /// x264 speed/compression preset
    pub preset: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            crf: 0,
            preset: "medium".into(),
        }
    }
}

/// Encode/decode strategy for one codec tag
pub trait Codec {
    /// The tag this strategy serves
    fn id(&self) -> CodecId;

    /// Encodes a frame array into a byte payload at the given frame rate
    fn encode(&self, frames: &FrameArray, fps: f64) -> Result<Vec<u8>>;

    /// Decodes a byte payload into the pixel layout the declared shape
    /// selects
    ///
    /// The declared shape only picks grayscale vs BGR output; the returned
    /// array carries the shape actually observed in the stream, which the
    /// caller reconciles against the declaration.
    fn decode(&self, data: &[u8], declared: &VideoShape) -> Result<FrameArray>;
}

/// The MP4/H.264 strategy
#[derive(Debug, Clone, Default)]
pub struct H264Codec {
    pub config: EncodeConfig,
}

impl H264Codec {
    /// Creates a strategy with the given encoder settings
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }
}

impl Codec for H264Codec {
    fn id(&self) -> CodecId {
        CodecId::Mp4H264
    }

    fn encode(&self, frames: &FrameArray, fps: f64) -> Result<Vec<u8>> {
        encode::encode_mp4(frames, fps, &self.config)
    }

    fn decode(&self, data: &[u8], declared: &VideoShape) -> Result<FrameArray> {
        decode::decode_mp4(data, declared)
    }
}

/// Returns the strategy registered for a codec tag
pub fn codec_for(id: CodecId) -> Box<dyn Codec> {
    match id {
        CodecId::Mp4H264 => Box::new(H264Codec::default()),
    }
}
