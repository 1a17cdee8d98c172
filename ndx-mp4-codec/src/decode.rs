//! File-backed MP4/H.264 decoding into packed frame arrays

use crate::{Error, Result};
use ffmpeg_next as ffmpeg;
use log::debug;
use ndx_mp4_core::{FrameArray, VideoShape};
use std::fs;

/// Decode an MP4/H.264 payload into the pixel layout the declared shape
/// selects: GRAY8 for rank-3 shapes, BGR24 for rank-4.
///
/// The payload goes to a scoped temporary file first (the demuxer wants a
/// file-backed source) and the directory is removed on every exit path.
/// The returned array carries the shape actually observed in the stream.
pub fn decode_mp4(data: &[u8], declared: &VideoShape) -> Result<FrameArray> {
    crate::init_ffmpeg();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input.mp4");
    fs::write(&path, data)?;

    let mut input = ffmpeg::format::input(&path)?;

    // Find the video stream
    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or(Error::NoVideoStream)?;
    let stream_index = stream.index();

    // Create decoder
    let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
    let mut decoder = context.decoder().video()?;

    let target_format = if declared.is_color() {
        ffmpeg::format::Pixel::BGR24
    } else {
        ffmpeg::format::Pixel::GRAY8
    };
    let bytes_per_pixel: usize = if declared.is_color() { 3 } else { 1 };

    let width = decoder.width();
    let height = decoder.height();
    let row_bytes = width as usize * bytes_per_pixel;

    let mut scaler = ffmpeg::software::scaling::Context::get(
        decoder.format(),
        width,
        height,
        target_format,
        width,
        height,
        ffmpeg::software::scaling::Flags::BILINEAR,
    )?;

    let mut packed: Vec<u8> = Vec::new();
    let mut frames_read: u32 = 0;

    let mut receive_frames = |decoder: &mut ffmpeg::decoder::Video,
                              scaler: &mut ffmpeg::software::scaling::Context,
                              packed: &mut Vec<u8>,
                              frames_read: &mut u32|
     -> Result<()> {
        let mut decoded = ffmpeg::frame::Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let mut converted = ffmpeg::frame::Video::empty();
            scaler.run(&decoded, &mut converted)?;

            let stride = converted.stride(0);
            let src = converted.data(0);
            for row in 0..height as usize {
                let off = row * stride;
                packed.extend_from_slice(&src[off..off + row_bytes]);
            }
            *frames_read += 1;
        }
        Ok(())
    };

    // Read packets and decode
    for (stream, packet) in input.packets() {
        if stream.index() == stream_index {
            decoder.send_packet(&packet)?;
            receive_frames(&mut decoder, &mut scaler, &mut packed, &mut frames_read)?;
        }
    }

    // Flush decoder
    decoder.send_eof()?;
    receive_frames(&mut decoder, &mut scaler, &mut packed, &mut frames_read)?;

    if frames_read == 0 {
        return Err(Error::Decode("stream contained no decodable frames".into()));
    }

    let observed = if declared.is_color() {
        VideoShape::color(frames_read, height, width)?
    } else {
        VideoShape::gray(frames_read, height, width)?
    };

    debug!("decoded {frames_read} frames of {width}x{height}");
    Ok(FrameArray::new(observed, packed)?)
}
