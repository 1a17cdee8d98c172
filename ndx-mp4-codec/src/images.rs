//! Explicit BGR ↔ RGB crossings at the `image` crate seam
//!
//! Payload arrays keep the codec's B, G, R channel order; these helpers
//! are the one place the order gets swapped.

use crate::{Error, Result};
use image::RgbImage;
use ndx_mp4_core::{FrameArray, VideoShape};

/// Packs RGB images into a color frame array, swapping channels to B, G, R
///
/// All images must share the same dimensions.
pub fn frames_from_images(images: &[RgbImage]) -> Result<FrameArray> {
    let first = images.first().ok_or(Error::NoFrames)?;
    let (width, height) = first.dimensions();
    let shape = VideoShape::color(images.len() as u32, height, width)?;

    let mut data = Vec::with_capacity(shape.byte_len());
    for (index, image) in images.iter().enumerate() {
        if image.dimensions() != (width, height) {
            return Err(Error::FrameSize {
                index,
                width: image.width(),
                height: image.height(),
                expected_width: width,
                expected_height: height,
            });
        }
        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            data.extend_from_slice(&[b, g, r]);
        }
    }

    Ok(FrameArray::new(shape, data)?)
}

/// Extracts one frame as an RGB image, swapping channels from B, G, R
///
/// Grayscale arrays are rejected.
pub fn frame_to_image(frames: &FrameArray, index: u32) -> Result<RgbImage> {
    let shape = frames.shape();
    if !shape.is_color() {
        return Err(Error::GrayscaleFrames);
    }
    let data = frames.frame(index).ok_or(Error::FrameIndex {
        index,
        frames: shape.frames(),
    })?;

    let mut image = RgbImage::new(shape.width(), shape.height());
    for (pixel, bgr) in image.pixels_mut().zip(data.chunks_exact(3)) {
        pixel.0 = [bgr[2], bgr[1], bgr[0]];
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_image(width: u32, height: u32, seed: u8) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([seed, (x % 256) as u8, (y % 256) as u8])
        })
    }

    #[test]
    fn test_image_roundtrip() {
        let images = vec![test_image(8, 6, 1), test_image(8, 6, 2)];
        let frames = frames_from_images(&images).unwrap();

        assert_eq!(frames.shape().dims(), vec![2, 6, 8, 3]);
        assert_eq!(frame_to_image(&frames, 0).unwrap(), images[0]);
        assert_eq!(frame_to_image(&frames, 1).unwrap(), images[1]);
    }

    #[test]
    fn test_channel_order_is_bgr() {
        let image = RgbImage::from_pixel(1, 1, Rgb([10, 20, 30]));
        let frames = frames_from_images(&[image]).unwrap();
        assert_eq!(frames.data(), &[30, 20, 10]);
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let images = vec![test_image(8, 6, 1), test_image(4, 6, 2)];
        let err = frames_from_images(&images).unwrap_err();
        assert!(matches!(err, Error::FrameSize { index: 1, .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(frames_from_images(&[]).unwrap_err(), Error::NoFrames));
    }

    #[test]
    fn test_grayscale_rejected() {
        let shape = VideoShape::gray(1, 2, 2).unwrap();
        let frames = FrameArray::from_fn(shape, |_, _, _, _| 0);
        assert!(matches!(
            frame_to_image(&frames, 0).unwrap_err(),
            Error::GrayscaleFrames
        ));
    }

    #[test]
    fn test_frame_index_out_of_range() {
        let frames = frames_from_images(&[test_image(2, 2, 0)]).unwrap();
        assert!(matches!(
            frame_to_image(&frames, 1).unwrap_err(),
            Error::FrameIndex { index: 1, frames: 1 }
        ));
    }
}
