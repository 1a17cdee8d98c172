//! Video-bytes records and their binary serialization

use crate::{Error, Result, VideoShape};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Magic bytes for serialized records: "NDX\0"
const MAGIC: [u8; 4] = [b'N', b'D', b'X', 0];

/// Current record format version
const VERSION: u16 = 1;

/// Codec that produced a record's byte payload
///
/// A new codec is a new variant plus an encode/decode strategy registered
/// for it, not a new record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecId {
    /// H.264 (AVC) video in an MP4 container
    Mp4H264,
}

impl CodecId {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecId::Mp4H264 => "mp4avc",
        }
    }

    /// Wire tag used in serialized records
    pub fn tag(&self) -> u8 {
        match self {
            CodecId::Mp4H264 => 1,
        }
    }

    /// Parses a wire tag
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(CodecId::Mp4H264),
            other => Err(Error::UnknownCodec(other)),
        }
    }
}

/// An encoded video together with its declared shape and frame rate
///
/// The payload is authoritative and immutable once the record exists. The
/// shape is declared by the caller, never derived from the payload; the two
/// are reconciled at decode time, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    name: String,
    codec: CodecId,
    shape: VideoShape,
    fps: f64,
    data: Vec<u8>,
}

impl VideoRecord {
    /// Creates a record, validating the name and frame rate
    pub fn new(
        name: impl Into<String>,
        codec: CodecId,
        shape: VideoShape,
        fps: f64,
        data: Vec<u8>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::InvalidFps(fps));
        }
        Ok(Self {
            name,
            codec,
            shape,
            fps,
            data,
        })
    }

    /// Identifier, unique within the parent group
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec tag of the payload
    pub fn codec(&self) -> CodecId {
        self.codec
    }

    /// Declared decoded shape
    pub fn shape(&self) -> VideoShape {
        self.shape
    }

    /// Frames per second
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// The encoded payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the record, returning the payload
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Writes the record to a writer
    ///
    /// Layout, little-endian throughout: magic, version, codec tag, name
    /// length + UTF-8 bytes, fps, dimension count, dimensions, payload
    /// length, payload.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u16::<LittleEndian>(VERSION)?;
        writer.write_u8(self.codec.tag())?;
        writer.write_u32::<LittleEndian>(self.name.len() as u32)?;
        writer.write_all(self.name.as_bytes())?;
        writer.write_f64::<LittleEndian>(self.fps)?;
        let dims = self.shape.dims();
        writer.write_u8(dims.len() as u8)?;
        for dim in dims {
            writer.write_u32::<LittleEndian>(dim)?;
        }
        writer.write_u64::<LittleEndian>(self.data.len() as u64)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Reads a record from a reader
    ///
    /// Validates magic, version, codec tag, shape, and frame rate; a record
    /// that fails any check is never constructed.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic);
        }

        let version = reader.read_u16::<LittleEndian>()?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let codec = CodecId::from_tag(reader.read_u8()?)?;

        let name_len = reader.read_u32::<LittleEndian>()? as usize;
        let mut name = vec![0u8; name_len];
        reader.read_exact(&mut name)?;
        let name = String::from_utf8(name).map_err(|_| Error::InvalidNameEncoding)?;

        let fps = reader.read_f64::<LittleEndian>()?;

        let rank = reader.read_u8()? as usize;
        let mut dims = vec![0u32; rank];
        for dim in dims.iter_mut() {
            *dim = reader.read_u32::<LittleEndian>()?;
        }
        let shape = VideoShape::from_dims(&dims)?;

        let data_len = reader.read_u64::<LittleEndian>()? as usize;
        let mut data = vec![0u8; data_len];
        reader.read_exact(&mut data)?;

        Self::new(name, codec, shape, fps, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_record() -> VideoRecord {
        let shape = VideoShape::color(240, 1080, 1920).unwrap();
        VideoRecord::new("behavior_video", CodecId::Mp4H264, shape, 24.0, vec![1, 2, 3, 4, 5])
            .unwrap()
    }

    #[test]
    fn test_record_roundtrip() {
        let record = sample_record();

        let mut buffer = Vec::new();
        record.write(&mut buffer).unwrap();

        let read_record = VideoRecord::read(Cursor::new(buffer)).unwrap();
        assert_eq!(record, read_record);
        assert_eq!(read_record.name(), "behavior_video");
        assert_eq!(read_record.codec(), CodecId::Mp4H264);
        assert_eq!(read_record.shape().dims(), vec![240, 1080, 1920, 3]);
        assert_eq!(read_record.fps(), 24.0);
        assert_eq!(read_record.data(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_invalid_magic_rejected() {
        let mut buffer = Vec::new();
        sample_record().write(&mut buffer).unwrap();
        buffer[0] = b'X';

        let err = VideoRecord::read(Cursor::new(buffer)).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut buffer = Vec::new();
        sample_record().write(&mut buffer).unwrap();
        buffer[4] = 99;

        let err = VideoRecord::read(Cursor::new(buffer)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(99)));
    }

    #[test]
    fn test_unknown_codec_tag_rejected() {
        let mut buffer = Vec::new();
        sample_record().write(&mut buffer).unwrap();
        buffer[6] = 7;

        let err = VideoRecord::read(Cursor::new(buffer)).unwrap_err();
        assert!(matches!(err, Error::UnknownCodec(7)));
    }

    #[test]
    fn test_codec_tag_roundtrip() {
        let id = CodecId::Mp4H264;
        assert_eq!(CodecId::from_tag(id.tag()).unwrap(), id);
        assert_eq!(id.as_str(), "mp4avc");
        assert!(CodecId::from_tag(0).is_err());
    }

    #[test]
    fn test_name_must_not_be_empty() {
        let shape = VideoShape::gray(1, 2, 2).unwrap();
        let err = VideoRecord::new("", CodecId::Mp4H264, shape, 30.0, vec![]).unwrap_err();
        assert!(matches!(err, Error::EmptyName));
    }

    #[test]
    fn test_fps_must_be_positive_and_finite() {
        let shape = VideoShape::gray(1, 2, 2).unwrap();
        for fps in [0.0, -24.0, f64::NAN, f64::INFINITY] {
            let err = VideoRecord::new("v", CodecId::Mp4H264, shape, fps, vec![]).unwrap_err();
            assert!(matches!(err, Error::InvalidFps(_)), "fps={fps}");
        }
    }
}
