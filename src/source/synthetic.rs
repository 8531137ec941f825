//! Synthetic frame source for `stub://` descriptors.
//!
//! Generates a fixed number of frames with a bright square drifting over a
//! dark background, which gives the motion and edge demos something to find
//! without shipping sample media. Tests construct it directly with a
//! [`SyntheticConfig`]; the demos reach it through `stub://` URLs, e.g.
//! `stub://traffic?frames=120&width=320&height=240`.

use anyhow::Result;
use image::{Rgb, RgbImage};

use super::FrameSource;
use crate::error::PipelineError;
use crate::frame::Frame;

const DEFAULT_FRAMES: u64 = 120;
const DEFAULT_WIDTH: u32 = 320;
const DEFAULT_HEIGHT: u32 = 240;
const DEFAULT_FPS: f64 = 10.0;

/// Shape of the generated sequence.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Total frames before the source reports exhaustion.
    pub frames: u64,
    /// Square edge length in pixels; zero produces a static sequence.
    pub square_side: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            frames: DEFAULT_FRAMES,
            square_side: 40,
        }
    }
}

/// In-process frame generator.
#[derive(Debug)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    produced: u64,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            produced: 0,
        }
    }

    /// Parse a `stub://name?key=value&...` descriptor. Unknown keys are
    /// rejected so typos fail loudly rather than silently using defaults.
    pub fn from_url(url: &str) -> Result<Self, PipelineError> {
        let rest = url.strip_prefix("stub://").ok_or_else(|| {
            PipelineError::InvalidArgument(format!("not a stub:// descriptor: {}", url))
        })?;
        let mut config = SyntheticConfig::default();
        if let Some((_, query)) = rest.split_once('?') {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    PipelineError::InvalidArgument(format!(
                        "stub parameter {:?} is not key=value",
                        pair
                    ))
                })?;
                let parse_u32 = |v: &str| {
                    v.parse::<u32>().map_err(|_| {
                        PipelineError::InvalidArgument(format!(
                            "stub parameter {}={:?} is not a non-negative integer",
                            key, v
                        ))
                    })
                };
                match key {
                    "frames" => config.frames = u64::from(parse_u32(value)?),
                    "width" => config.width = parse_u32(value)?,
                    "height" => config.height = parse_u32(value)?,
                    "fps" => config.fps = f64::from(parse_u32(value)?),
                    "square" => config.square_side = parse_u32(value)?,
                    other => {
                        return Err(PipelineError::InvalidArgument(format!(
                            "unknown stub parameter {:?}",
                            other
                        )))
                    }
                }
            }
        }
        Ok(Self::new(config))
    }

    fn render(&self, index: u64) -> RgbImage {
        let (w, h) = (self.config.width, self.config.height);
        let mut image = RgbImage::from_pixel(w, h, Rgb([16, 16, 16]));
        let side = self.config.square_side.min(w).min(h);
        if side == 0 {
            return image;
        }
        // The square drifts 2px right per frame and wraps.
        let span = w.saturating_sub(side).max(1) as u64;
        let x0 = ((index * 2) % span) as u32;
        let y0 = (h - side) / 2;
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                image.put_pixel(x, y, Rgb([220, 220, 200]));
            }
        }
        image
    }
}

impl FrameSource for SyntheticSource {
    fn width(&self) -> u32 {
        self.config.width
    }

    fn height(&self) -> u32 {
        self.config.height
    }

    fn fps(&self) -> f64 {
        self.config.fps
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        if self.produced >= self.config.frames {
            return Ok(None);
        }
        let index = self.produced;
        self.produced += 1;
        Ok(Some(Frame::new(self.render(index), index)))
    }
}
