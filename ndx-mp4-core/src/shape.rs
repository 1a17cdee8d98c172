//! Declared video shapes
//!
//! A shape is the caller-declared layout of decoded video. Encoded payloads
//! do not self-describe it in a form this extension inspects, so the shape
//! travels alongside the bytes and is checked against what actually decodes.

use crate::{Error, Result};
use std::fmt;

/// Channel count for color video (B, G, R)
pub const COLOR_CHANNELS: u32 = 3;

/// Declared dimensions of decoded video
///
/// Either `(frames, height, width)` for grayscale or
/// `(frames, height, width, 3)` for color. All dimensions are positive and
/// the channel dimension, when present, is fixed at 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoShape {
    frames: u32,
    height: u32,
    width: u32,
    color: bool,
}

impl VideoShape {
    /// Creates a grayscale shape `(frames, height, width)`
    pub fn gray(frames: u32, height: u32, width: u32) -> Result<Self> {
        Self::checked(frames, height, width, false)
    }

    /// Creates a color shape `(frames, height, width, 3)`
    pub fn color(frames: u32, height: u32, width: u32) -> Result<Self> {
        Self::checked(frames, height, width, true)
    }

    /// Parses a shape from its dimension list
    ///
    /// Accepts 3 dimensions (grayscale) or 4 (color, where the last must
    /// equal [`COLOR_CHANNELS`]).
    pub fn from_dims(dims: &[u32]) -> Result<Self> {
        match *dims {
            [frames, height, width] => Self::checked(frames, height, width, false),
            [frames, height, width, channels] => {
                if channels != COLOR_CHANNELS {
                    return Err(Error::InvalidShape {
                        dims: dims.to_vec(),
                        reason: "channel dimension must be 3",
                    });
                }
                Self::checked(frames, height, width, true)
            }
            _ => Err(Error::InvalidShape {
                dims: dims.to_vec(),
                reason: "shape must have 3 or 4 dimensions",
            }),
        }
    }

    fn checked(frames: u32, height: u32, width: u32, color: bool) -> Result<Self> {
        if frames == 0 || height == 0 || width == 0 {
            let mut dims = vec![frames, height, width];
            if color {
                dims.push(COLOR_CHANNELS);
            }
            return Err(Error::InvalidShape {
                dims,
                reason: "dimensions must be positive",
            });
        }
        Ok(Self {
            frames,
            height,
            width,
            color,
        })
    }

    /// Number of frames
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether the shape carries a channel dimension
    pub fn is_color(&self) -> bool {
        self.color
    }

    /// Channel count, `Some(3)` for color and `None` for grayscale
    pub fn channels(&self) -> Option<u32> {
        self.color.then_some(COLOR_CHANNELS)
    }

    /// Number of dimensions (3 or 4)
    pub fn rank(&self) -> usize {
        if self.color {
            4
        } else {
            3
        }
    }

    /// Dimension list as persisted in the `shape` dataset
    pub fn dims(&self) -> Vec<u32> {
        let mut dims = vec![self.frames, self.height, self.width];
        if self.color {
            dims.push(COLOR_CHANNELS);
        }
        dims
    }

    /// Bytes in one decoded frame
    pub fn frame_byte_len(&self) -> usize {
        self.height as usize * self.width as usize * self.channels().unwrap_or(1) as usize
    }

    /// Bytes in the full decoded array
    pub fn byte_len(&self) -> usize {
        self.frames as usize * self.frame_byte_len()
    }
}

impl fmt::Display for VideoShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.color {
            write!(
                f,
                "({}, {}, {}, {})",
                self.frames, self.height, self.width, COLOR_CHANNELS
            )
        } else {
            write!(f, "({}, {}, {})", self.frames, self.height, self.width)
        }
    }
}
