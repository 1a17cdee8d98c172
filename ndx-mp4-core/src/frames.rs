//! Packed frame arrays
//!
//! Decoded video as one contiguous `u8` buffer: frame-major, rows top to
//! bottom, then columns. Color frames store B, G, R bytes per pixel (the
//! codec library's convention, kept as-is); callers wanting RGB convert
//! explicitly.

use crate::{Error, Result, VideoShape};

/// Decoded video frames packed into a single buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameArray {
    shape: VideoShape,
    data: Vec<u8>,
}

impl FrameArray {
    /// Creates a frame array, validating the buffer length against the shape
    pub fn new(shape: VideoShape, data: Vec<u8>) -> Result<Self> {
        if data.len() != shape.byte_len() {
            return Err(Error::FrameDataLength {
                shape,
                expected: shape.byte_len(),
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Builds a frame array by evaluating `f(frame, row, col, channel)` for
    /// every byte
    ///
    /// The channel argument is always 0 for grayscale shapes.
    pub fn from_fn(shape: VideoShape, mut f: impl FnMut(u32, u32, u32, u32) -> u8) -> Self {
        let channels = shape.channels().unwrap_or(1);
        let mut data = Vec::with_capacity(shape.byte_len());
        for frame in 0..shape.frames() {
            for row in 0..shape.height() {
                for col in 0..shape.width() {
                    for channel in 0..channels {
                        data.push(f(frame, row, col, channel));
                    }
                }
            }
        }
        Self { shape, data }
    }

    /// The declared shape of the array
    pub fn shape(&self) -> VideoShape {
        self.shape
    }

    /// The packed bytes of frame `index`, or `None` when out of range
    pub fn frame(&self, index: u32) -> Option<&[u8]> {
        if index >= self.shape.frames() {
            return None;
        }
        let len = self.shape.frame_byte_len();
        let start = index as usize * len;
        Some(&self.data[start..start + len])
    }

    /// The full packed buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the array, returning the packed buffer
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_must_match_shape() {
        let shape = VideoShape::gray(2, 4, 4).unwrap();
        assert!(FrameArray::new(shape, vec![0; 32]).is_ok());

        let err = FrameArray::new(shape, vec![0; 31]).unwrap_err();
        assert!(matches!(
            err,
            Error::FrameDataLength {
                expected: 32,
                actual: 31,
                ..
            }
        ));
    }

    #[test]
    fn test_frame_slicing() {
        let shape = VideoShape::gray(3, 2, 2).unwrap();
        let frames = FrameArray::from_fn(shape, |f, _, _, _| f as u8);

        assert_eq!(frames.frame(0), Some(&[0u8, 0, 0, 0][..]));
        assert_eq!(frames.frame(2), Some(&[2u8, 2, 2, 2][..]));
        assert_eq!(frames.frame(3), None);
    }

    #[test]
    fn test_from_fn_layout() {
        let shape = VideoShape::color(1, 1, 2).unwrap();
        let frames = FrameArray::from_fn(shape, |_, _, col, channel| (col * 10 + channel) as u8);

        // pixel 0: channels 0..3, then pixel 1
        assert_eq!(frames.data(), &[0, 1, 2, 10, 11, 12]);
    }
}
