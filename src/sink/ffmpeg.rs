//! FFmpeg-backed encoding sink (feature `video-ffmpeg`).
//!
//! Re-encodes RGB frames into a video container at the source frame rate
//! and resolution. The requested FourCC picks the encoder and is written
//! into the container as the codec tag.

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::format::pixel::Pixel;

use super::FrameSink;
use crate::fourcc::FourCc;
use crate::frame::Frame;

pub(crate) struct FfmpegSink {
    octx: ffmpeg::format::context::Output,
    encoder: ffmpeg::codec::encoder::video::Encoder,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
    enc_time_base: ffmpeg::Rational,
    width: u32,
    height: u32,
    pts: i64,
    finalized: bool,
}

impl FfmpegSink {
    pub(crate) fn create(
        path: &Path,
        fourcc: FourCc,
        fps: f64,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output directory {}", parent.display()))?;
            }
        }

        let mut octx = ffmpeg::format::output(&path)
            .with_context(|| format!("failed to open output '{}'", path.display()))?;
        let codec_name = encoder_for_tag(fourcc)?;
        let codec = ffmpeg::encoder::find_by_name(codec_name)
            .ok_or_else(|| anyhow!("ffmpeg has no encoder named '{}'", codec_name))?;

        let mut ost = octx.add_stream(codec).context("add output stream")?;
        let stream_index = ost.index();

        let mut builder = ffmpeg::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .context("create video encoder context")?;
        let rate = frame_rate(fps);
        builder.set_width(width);
        builder.set_height(height);
        builder.set_format(Pixel::YUV420P);
        builder.set_time_base(rate.invert());
        builder.set_frame_rate(Some(rate));
        if octx
            .format()
            .flags()
            .contains(ffmpeg::format::Flags::GLOBAL_HEADER)
        {
            builder.set_flags(ffmpeg::codec::Flags::GLOBAL_HEADER);
        }
        // The container tag is byte-order reversed relative to the packed
        // big-endian FourCC value (AVI stores 'D','I','V','X' in file order).
        unsafe {
            (*builder.as_mut_ptr()).codec_tag = fourcc.as_u32().swap_bytes();
        }

        let encoder = builder
            .open_as(codec)
            .with_context(|| format!("open encoder '{}'", codec_name))?;
        ost.set_parameters(&encoder);

        octx.write_header().context("write container header")?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            Pixel::RGB24,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .context("create encoder scaler")?;

        log::info!(
            "encoding {} with '{}' (fourcc {})",
            path.display(),
            codec_name,
            fourcc
        );

        Ok(Self {
            octx,
            encoder,
            scaler,
            stream_index,
            enc_time_base: rate.invert(),
            width,
            height,
            pts: 0,
            finalized: false,
        })
    }

    fn drain_packets(&mut self) -> Result<()> {
        let out_time_base = self
            .octx
            .stream(self.stream_index)
            .map(|s| s.time_base())
            .unwrap_or(self.enc_time_base);
        let mut packet = ffmpeg::Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.enc_time_base, out_time_base);
            packet
                .write_interleaved(&mut self.octx)
                .context("write encoded packet")?;
        }
        Ok(())
    }

    fn rgb_frame(&self, frame: &Frame) -> Result<ffmpeg::frame::Video> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(anyhow!(
                "frame {} is {}x{}, sink expects {}x{}",
                frame.index,
                frame.width(),
                frame.height(),
                self.width,
                self.height
            ));
        }
        let mut rgb = ffmpeg::frame::Video::new(Pixel::RGB24, self.width, self.height);
        let row_bytes = (self.width as usize) * 3;
        let stride = rgb.stride(0);
        let raw = frame.image.as_raw();
        let data = rgb.data_mut(0);
        for row in 0..self.height as usize {
            let src = &raw[row * row_bytes..(row + 1) * row_bytes];
            data[row * stride..row * stride + row_bytes].copy_from_slice(src);
        }
        Ok(rgb)
    }
}

impl FrameSink for FfmpegSink {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        if self.finalized {
            return Err(anyhow!("write after release"));
        }
        let rgb = self.rgb_frame(frame)?;
        let mut yuv = ffmpeg::frame::Video::new(Pixel::YUV420P, self.width, self.height);
        self.scaler
            .run(&rgb, &mut yuv)
            .context("convert frame to YUV420P")?;
        yuv.set_pts(Some(self.pts));
        self.pts += 1;
        self.encoder
            .send_frame(&yuv)
            .context("send frame to encoder")?;
        self.drain_packets()
    }

    fn release(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;
        self.encoder.send_eof().context("flush encoder")?;
        self.drain_packets()?;
        self.octx
            .write_trailer()
            .context("write container trailer")?;
        Ok(())
    }
}

/// Map a codec tag to the ffmpeg encoder that produces it.
///
/// The tag itself is still written to the container unchanged; this mapping
/// only selects which encoder does the work.
fn encoder_for_tag(fourcc: FourCc) -> Result<&'static str> {
    match fourcc.to_string().as_str() {
        "DIVX" | "XVID" | "FMP4" | "MP4V" => Ok("mpeg4"),
        "MJPG" => Ok("mjpeg"),
        "H264" | "X264" | "AVC1" | "avc1" => Ok("libx264"),
        other => Err(anyhow!(
            "no encoder mapping for fourcc '{}' (supported: DIVX, XVID, FMP4, MP4V, MJPG, H264, X264, AVC1)",
            other
        )),
    }
}

fn frame_rate(fps: f64) -> ffmpeg::Rational {
    if fps > 0.0 {
        ffmpeg::Rational::new((fps * 1000.0).round() as i32, 1000)
    } else {
        // Degenerate sources (some streams report 0 fps); fall back to 25.
        ffmpeg::Rational::new(25, 1)
    }
}
