//! MP4/H.264 encoding of packed frame arrays
//!
//! Frames are pushed through libx264 into an MP4 container at a temporary
//! path, and the finished file's bytes become the payload. The flow:
//!   1. packed BGR/GRAY rows → ffmpeg `frame::Video`
//!   2. lossless color stays BGR24 (libx264rgb keeps the samples as-is);
//!      lossy color goes through swscale to YUV420P for libx264;
//!      grayscale feeds GRAY8 to libx264 directly
//!   3. encoded packets are muxed into MP4 and the file is read back

use crate::{EncodeConfig, Error, Result};
use ffmpeg_next as ffmpeg;
use log::debug;
use ndx_mp4_core::FrameArray;
use std::fs;

// Tried in order when probing; both are needed to cover the color and
// grayscale paths.
const ENCODER_NAMES: &[&str] = &["libx264", "libx264rgb"];

/// Encode a frame array into MP4/H.264 bytes at the given frame rate.
///
/// Returns `Err` if the required x264 encoder is missing, if the encoder
/// rejects the frame geometry, or on muxing failure.
pub fn encode_mp4(frames: &FrameArray, fps: f64, config: &EncodeConfig) -> Result<Vec<u8>> {
    crate::init_ffmpeg();

    let shape = frames.shape();
    let width = shape.width();
    let height = shape.height();
    let is_color = shape.is_color();
    let lossless = config.crf == 0;

    // libx264rgb consumes BGR24 without a colorspace conversion; subsampled
    // YUV would make a byte-exact color round-trip impossible.
    let (encoder_name, src_format, enc_format) = match (is_color, lossless) {
        (true, true) => (
            "libx264rgb",
            ffmpeg::format::Pixel::BGR24,
            ffmpeg::format::Pixel::BGR24,
        ),
        (true, false) => (
            "libx264",
            ffmpeg::format::Pixel::BGR24,
            ffmpeg::format::Pixel::YUV420P,
        ),
        (false, _) => (
            "libx264",
            ffmpeg::format::Pixel::GRAY8,
            ffmpeg::format::Pixel::GRAY8,
        ),
    };

    let codec = ffmpeg::encoder::find_by_name(encoder_name)
        .ok_or_else(|| Error::Encode(format!("encoder {encoder_name} not found")))?;

    // YUV420P requires even dimensions
    if enc_format == ffmpeg::format::Pixel::YUV420P && (width % 2 != 0 || height % 2 != 0) {
        return Err(Error::Encode(format!(
            "{width}x{height} frames need even dimensions for YUV420P output"
        )));
    }

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("output.mp4");

    let mut output = ffmpeg::format::output(&path)?;
    let global_header = output
        .format()
        .flags()
        .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

    let time_base = ffmpeg::Rational::from(fps).invert();

    let stream_index = {
        let mut stream = output.add_stream(codec)?;
        stream.set_time_base(time_base);
        stream.index()
    };

    let context = ffmpeg::codec::context::Context::new_with_codec(codec);
    let mut video = context.encoder().video()?;
    video.set_width(width);
    video.set_height(height);
    video.set_format(enc_format);
    video.set_time_base(time_base);
    video.set_max_b_frames(0);
    if global_header {
        video.set_flags(ffmpeg::codec::Flags::GLOBAL_HEADER);
    }

    let mut opts = ffmpeg::Dictionary::new();
    opts.set("crf", &config.crf.to_string());
    opts.set("preset", &config.preset);

    let mut encoder = video.open_as_with(codec, opts).map_err(|e| {
        Error::Encode(format!(
            "{encoder_name} open failed for {width}x{height} (crf={}): {e}",
            config.crf
        ))
    })?;

    {
        let mut stream = output
            .stream_mut(stream_index)
            .expect("stream added above");
        stream.set_parameters(&encoder);
    }
    output.write_header()?;

    let bytes_per_pixel: usize = if is_color { 3 } else { 1 };
    let row_bytes = width as usize * bytes_per_pixel;

    let mut scaler = if src_format != enc_format {
        Some(ffmpeg::software::scaling::Context::get(
            src_format,
            width,
            height,
            enc_format,
            width,
            height,
            ffmpeg::software::scaling::Flags::BILINEAR,
        )?)
    } else {
        None
    };

    for index in 0..shape.frames() {
        let data = frames.frame(index).expect("frame index within shape");

        let mut src = ffmpeg::util::frame::Video::new(src_format, width, height);
        {
            let stride = src.stride(0);
            let dst = src.data_mut(0);
            for row in 0..height as usize {
                let src_off = row * row_bytes;
                let dst_off = row * stride;
                dst[dst_off..dst_off + row_bytes]
                    .copy_from_slice(&data[src_off..src_off + row_bytes]);
            }
        }

        let mut frame = match scaler {
            Some(ref mut scaler) => {
                let mut converted = ffmpeg::util::frame::Video::empty();
                scaler.run(&src, &mut converted)?;
                converted
            }
            None => src,
        };
        frame.set_pts(Some(index as i64));

        encoder.send_frame(&frame)?;
        flush_packets(&mut encoder, &mut output, stream_index, time_base)?;
    }

    encoder.send_eof()?;
    flush_packets(&mut encoder, &mut output, stream_index, time_base)?;
    output.write_trailer()?;

    let data = fs::read(&path)?;
    if data.is_empty() {
        return Err(Error::Encode("encoder produced no output".into()));
    }

    debug!(
        "encoded {} frames of {}x{} to {} bytes with {encoder_name}",
        shape.frames(),
        width,
        height,
        data.len()
    );
    Ok(data)
}

fn flush_packets(
    encoder: &mut ffmpeg::encoder::Video,
    output: &mut ffmpeg::format::context::Output,
    stream_index: usize,
    time_base: ffmpeg::Rational,
) -> Result<()> {
    let mut packet = ffmpeg::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        let stream_time_base = output
            .stream(stream_index)
            .map(|s| s.time_base())
            .unwrap_or(time_base);
        packet.rescale_ts(time_base, stream_time_base);
        packet.write_interleaved(output)?;
    }
    Ok(())
}

/// Probe whether the x264 encoders are available at runtime.
pub fn is_available() -> bool {
    ffmpeg::init().is_ok()
        && ENCODER_NAMES
            .iter()
            .all(|name| ffmpeg::encoder::find_by_name(name).is_some())
}
