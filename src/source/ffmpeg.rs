//! FFmpeg-backed capture source (feature `video-ffmpeg`).
//!
//! Decodes a local file, stream URL, or capture device into tightly-packed
//! RGB frames. This is a batch decoder: end of stream surfaces as
//! `Ok(None)` from `read`, after draining any frames still buffered in the
//! decoder.

use anyhow::{anyhow, Context, Result};
use ffmpeg_next as ffmpeg;
use image::RgbImage;

use super::FrameSource;
use crate::error::PipelineError;
use crate::frame::Frame;

pub(crate) struct FfmpegSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    fps: f64,
    frame_count: u64,
    sent_eof: bool,
}

impl FfmpegSource {
    pub(crate) fn open(path: &str) -> Result<Self, PipelineError> {
        Self::open_inner(path).map_err(|e| PipelineError::SourceUnavailable(format!("{:#}", e)))
    }

    fn open_inner(path: &str) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;
        let input = ffmpeg::format::input(&path)
            .with_context(|| format!("failed to open '{}' with ffmpeg", path))?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow!("'{}' has no video track", path))?;
        let stream_index = stream.index();
        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            f64::from(rate.numerator()) / f64::from(rate.denominator())
        } else {
            0.0
        };

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .context("load video decoder parameters")?;
        let decoder = context
            .decoder()
            .video()
            .context("open ffmpeg video decoder")?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .context("create ffmpeg scaler")?;

        Ok(Self {
            input,
            stream_index,
            decoder,
            scaler,
            fps,
            frame_count: 0,
            sent_eof: false,
        })
    }

    /// Pull one decoded frame out of the decoder, if any is buffered.
    fn receive_frame(&mut self) -> Result<Option<Frame>> {
        let mut decoded = ffmpeg::frame::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb = ffmpeg::frame::Video::empty();
        self.scaler
            .run(&decoded, &mut rgb)
            .context("scale frame to RGB")?;
        let (pixels, width, height) = frame_to_pixels(&rgb)?;
        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("ffmpeg frame buffer has the wrong length"))?;
        let frame = Frame::new(image, self.frame_count);
        self.frame_count += 1;
        Ok(Some(frame))
    }
}

impl std::fmt::Debug for FfmpegSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSource")
            .field("stream_index", &self.stream_index)
            .field("fps", &self.fps)
            .field("frame_count", &self.frame_count)
            .field("sent_eof", &self.sent_eof)
            .finish_non_exhaustive()
    }
}

impl FrameSource for FfmpegSource {
    fn width(&self) -> u32 {
        self.decoder.width()
    }

    fn height(&self) -> u32 {
        self.decoder.height()
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.receive_frame()? {
                return Ok(Some(frame));
            }
            if self.sent_eof {
                return Ok(None);
            }

            let mut fed_packet = false;
            // Packet iteration resumes where the previous call left off; the
            // demuxer position lives in `self.input`.
            for (stream, packet) in self.input.packets() {
                if stream.index() != self.stream_index {
                    continue;
                }
                self.decoder
                    .send_packet(&packet)
                    .context("send packet to ffmpeg decoder")?;
                fed_packet = true;
                break;
            }
            if !fed_packet {
                self.decoder
                    .send_eof()
                    .context("flush ffmpeg decoder at end of stream")?;
                self.sent_eof = true;
            }
        }
    }
}

fn frame_to_pixels(frame: &ffmpeg::frame::Video) -> Result<(Vec<u8>, u32, u32)> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = (width as usize) * 3;
    let stride = frame.stride(0);
    let data = frame.data(0);

    if stride == row_bytes {
        return Ok((data.to_vec(), width, height));
    }

    // Scaler output can carry row padding; copy row by row to tightly pack.
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        let end = start + row_bytes;
        pixels.extend_from_slice(
            data.get(start..end)
                .context("ffmpeg frame row is out of bounds")?,
        );
    }

    Ok((pixels, width, height))
}
