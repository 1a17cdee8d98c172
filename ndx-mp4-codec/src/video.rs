//! The MP4/H.264 video object
//!
//! Ties an encoded MP4 payload to its declared shape and frame rate, and
//! carries the construction contract: exactly one source (raw bytes, a
//! frame array to encode, or an existing file) per object.

use crate::{codec_for, Codec, EncodeConfig, Error, H264Codec, Result};
use log::warn;
use ndx_mp4_core::{CodecId, Error as CoreError, FrameArray, VideoRecord, VideoShape};
use std::fs;
use std::path::{Path, PathBuf};

/// H.264 video in an MP4 container, stored as bytes
///
/// The payload is immutable once the object exists; `decode` and
/// `write_to_file` derive values from it without touching it, so a failed
/// call leaves the object intact for retry. Decoded color frames carry
/// B, G, R channel order (the codec convention); see [`crate::images`]
/// for explicit RGB crossings.
#[derive(Debug, Clone)]
pub struct Mp4H264Video {
    record: VideoRecord,
}

impl Mp4H264Video {
    /// Starts building a video with the given identifier, declared shape,
    /// and frame rate
    pub fn builder(name: impl Into<String>, shape: VideoShape, fps: f64) -> Mp4H264VideoBuilder {
        Mp4H264VideoBuilder {
            name: name.into(),
            shape,
            fps,
            data: None,
            data_array: None,
            data_file: None,
            config: EncodeConfig::default(),
        }
    }

    /// Wraps an existing record, which must carry the MP4/H.264 tag
    pub fn from_record(record: VideoRecord) -> Result<Self> {
        if record.codec() != CodecId::Mp4H264 {
            return Err(Error::WrongCodec(record.codec()));
        }
        Ok(Self { record })
    }

    /// Identifier, unique within the parent group
    pub fn name(&self) -> &str {
        self.record.name()
    }

    /// Frames per second
    pub fn fps(&self) -> f64 {
        self.record.fps()
    }

    /// Declared decoded shape
    pub fn shape(&self) -> VideoShape {
        self.record.shape()
    }

    /// The encoded MP4 payload
    pub fn data(&self) -> &[u8] {
        self.record.data()
    }

    /// The underlying record, through which the host container layer
    /// persists the data, shape, and fps fields
    pub fn record(&self) -> &VideoRecord {
        &self.record
    }

    /// Consumes the video, returning the record
    pub fn into_record(self) -> VideoRecord {
        self.record
    }

    /// Decodes the payload into a packed frame array
    ///
    /// A pure derived value: repeated calls re-decode the same payload and
    /// return identical arrays, with no caching. The decoded dimensions
    /// must match the declared shape exactly or the call fails naming both.
    pub fn decode(&self) -> Result<FrameArray> {
        let codec = codec_for(self.record.codec());
        let frames = codec.decode(self.record.data(), &self.record.shape())?;
        if frames.shape() != self.record.shape() {
            return Err(CoreError::ShapeMismatch {
                declared: self.record.shape(),
                decoded: frames.shape(),
            }
            .into());
        }
        Ok(frames)
    }

    /// Writes the payload verbatim to `path` (no re-encoding)
    ///
    /// Overwrites silently when the path already exists. Logs a warning
    /// when the destination does not end with `.mp4`, since players key
    /// off the extension.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !has_mp4_extension(path) {
            warn!(
                "file path '{}' does not end with '.mp4'; some players may reject it",
                path.display()
            );
        }
        fs::write(path, self.record.data())?;
        Ok(())
    }
}

/// Reads an encoded video file in full
///
/// The path must end with `.mp4`; a missing or unreadable file is an IO
/// error.
pub fn read_video_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if !has_mp4_extension(path) {
        return Err(Error::NotMp4(path.display().to_string()));
    }
    Ok(fs::read(path)?)
}

fn has_mp4_extension(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("mp4"))
}

/// Builder enforcing the one-source construction contract
#[derive(Debug)]
pub struct Mp4H264VideoBuilder {
    name: String,
    shape: VideoShape,
    fps: f64,
    data: Option<Vec<u8>>,
    data_array: Option<FrameArray>,
    data_file: Option<PathBuf>,
    config: EncodeConfig,
}

impl Mp4H264VideoBuilder {
    /// Adopts an already-encoded MP4 payload verbatim
    ///
    /// Encoding validity is not inspected here; a bad payload surfaces at
    /// decode time.
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    /// Encodes the given frames into the payload at build time
    pub fn data_array(mut self, frames: FrameArray) -> Self {
        self.data_array = Some(frames);
        self
    }

    /// Reads the payload from an existing `.mp4` file at build time
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    /// Overrides the encoder settings used for `data_array` sources
    pub fn encode_config(mut self, config: EncodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the video, enforcing that exactly one source was supplied
    pub fn build(self) -> Result<Mp4H264Video> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(CoreError::InvalidFps(self.fps).into());
        }

        let payload = match (self.data, self.data_array, self.data_file) {
            (Some(data), None, None) => data,
            (None, Some(frames), None) => {
                if frames.shape() != self.shape {
                    return Err(CoreError::ShapeMismatch {
                        declared: self.shape,
                        decoded: frames.shape(),
                    }
                    .into());
                }
                H264Codec::new(self.config).encode(&frames, self.fps)?
            }
            (None, None, Some(path)) => read_video_file(&path)?,
            (data, frames, file) => {
                let supplied = [data.is_some(), frames.is_some(), file.is_some()]
                    .iter()
                    .filter(|s| **s)
                    .count();
                return Err(Error::SourceCount(supplied));
            }
        };

        let record =
            VideoRecord::new(self.name, CodecId::Mp4H264, self.shape, self.fps, payload)?;
        Ok(Mp4H264Video { record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> VideoShape {
        VideoShape::color(2, 4, 4).unwrap()
    }

    fn gray_frames(frames: u32) -> FrameArray {
        let shape = VideoShape::gray(frames, 4, 4).unwrap();
        FrameArray::from_fn(shape, |f, _, _, _| f as u8)
    }

    #[test]
    fn test_zero_sources_rejected() {
        let err = Mp4H264Video::builder("v", shape(), 30.0).build().unwrap_err();
        assert!(matches!(err, Error::SourceCount(0)));
    }

    #[test]
    fn test_multiple_sources_rejected() {
        let pairs: Vec<(Mp4H264VideoBuilder, usize)> = vec![
            (
                Mp4H264Video::builder("v", shape(), 30.0)
                    .data(vec![1])
                    .data_file("a.mp4"),
                2,
            ),
            (
                Mp4H264Video::builder("v", shape(), 30.0)
                    .data(vec![1])
                    .data_array(gray_frames(2)),
                2,
            ),
            (
                Mp4H264Video::builder("v", shape(), 30.0)
                    .data_array(gray_frames(2))
                    .data_file("a.mp4"),
                2,
            ),
            (
                Mp4H264Video::builder("v", shape(), 30.0)
                    .data(vec![1])
                    .data_array(gray_frames(2))
                    .data_file("a.mp4"),
                3,
            ),
        ];

        for (builder, expected) in pairs {
            match builder.build().unwrap_err() {
                Error::SourceCount(n) => assert_eq!(n, expected),
                other => panic!("expected SourceCount, got {other}"),
            }
        }
    }

    #[test]
    fn test_data_source_adopted_verbatim() {
        let video = Mp4H264Video::builder("v", shape(), 30.0)
            .data(vec![9, 8, 7])
            .build()
            .unwrap();
        assert_eq!(video.data(), &[9, 8, 7]);
        assert_eq!(video.name(), "v");
        assert_eq!(video.fps(), 30.0);
        assert_eq!(video.shape(), shape());
    }

    #[test]
    fn test_array_shape_checked_before_encoding() {
        let err = Mp4H264Video::builder("v", shape(), 30.0)
            .data_array(gray_frames(2))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Core(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_file_source_requires_mp4_extension() {
        let err = Mp4H264Video::builder("v", shape(), 30.0)
            .data_file("/nonexistent/video.avi")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::NotMp4(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Mp4H264Video::builder("v", shape(), 30.0)
            .data_file("/nonexistent/video.mp4")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_fps_rejected() {
        for fps in [0.0, -1.0, f64::NAN] {
            let err = Mp4H264Video::builder("v", shape(), fps)
                .data(vec![1])
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::Core(CoreError::InvalidFps(_))), "fps={fps}");
        }
    }

    #[test]
    fn test_write_accepts_any_extension() {
        // Only reading is strict about '.mp4'; writing just warns.
        let video = Mp4H264Video::builder("v", shape(), 30.0)
            .data(vec![1, 2, 3])
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        video.write_to_file(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_record_roundtrip_through_bytes() {
        let video = Mp4H264Video::builder("v", shape(), 30.0)
            .data(vec![4, 5, 6])
            .build()
            .unwrap();

        let mut buffer = Vec::new();
        video.record().write(&mut buffer).unwrap();
        let reloaded = Mp4H264Video::from_record(VideoRecord::read(&buffer[..]).unwrap()).unwrap();

        assert_eq!(reloaded.data(), video.data());
        assert_eq!(reloaded.shape(), video.shape());
        assert_eq!(reloaded.fps(), video.fps());
    }
}
