//! Canny edge-detection transform.
//!
//! grayscale -> Gaussian blur -> Canny -> mask the original color frame by
//! the edge map, so the output keeps the source colors along edges and is
//! black everywhere else.

use anyhow::Result;
use image::Rgb;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use serde::Deserialize;

use super::{FrameTransform, TransformOutput};
use crate::frame::Frame;

/// Edge detector knobs. Defaults match the demo programs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Blur strength before edge extraction; 0.8 approximates the classic
    /// 3x3 Gaussian kernel.
    pub blur_sigma: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 100.0,
            high_threshold: 200.0,
            blur_sigma: 0.8,
        }
    }
}

/// Recolors edges with the original frame content. Has no match notion:
/// `matched` is always false.
#[derive(Clone, Debug, Default)]
pub struct EdgeDetect {
    params: EdgeParams,
}

impl EdgeDetect {
    pub fn new(params: EdgeParams) -> Self {
        Self { params }
    }
}

impl FrameTransform for EdgeDetect {
    fn name(&self) -> &'static str {
        "canny"
    }

    fn apply(&mut self, frame: &Frame) -> Result<TransformOutput> {
        let gray = frame.to_gray();
        let blurred = gaussian_blur_f32(&gray, self.params.blur_sigma);
        let edges = canny(
            &blurred,
            self.params.low_threshold,
            self.params.high_threshold,
        );

        let mut out = frame.clone();
        for (x, y, pixel) in out.image.enumerate_pixels_mut() {
            if edges.get_pixel(x, y)[0] == 0 {
                *pixel = Rgb([0, 0, 0]);
            }
        }

        Ok(TransformOutput {
            frame: out,
            matched: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn uniform_frame(luma: u8) -> Frame {
        Frame::new(RgbImage::from_pixel(64, 64, Rgb([luma, luma, luma])), 0)
    }

    fn step_frame() -> Frame {
        let mut image = RgbImage::from_pixel(64, 64, Rgb([10, 10, 10]));
        for y in 0..64 {
            for x in 32..64 {
                image.put_pixel(x, y, Rgb([240, 240, 240]));
            }
        }
        Frame::new(image, 0)
    }

    #[test]
    fn uniform_frame_has_no_edges() {
        let out = EdgeDetect::default().apply(&uniform_frame(128)).unwrap();
        assert!(!out.matched);
        assert!(out.frame.image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn step_edge_survives_in_source_colors() {
        let out = EdgeDetect::default().apply(&step_frame()).unwrap();
        let lit: Vec<_> = out
            .frame
            .image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != Rgb([0, 0, 0]))
            .collect();
        assert!(!lit.is_empty(), "expected edge pixels along the step");
        // Edge pixels keep the original frame's colors.
        for (_, _, p) in &lit {
            assert!(**p == Rgb([10, 10, 10]) || **p == Rgb([240, 240, 240]));
        }
        // All edge pixels hug the step at x = 32.
        for (x, _, _) in &lit {
            assert!((*x as i32 - 32).unsigned_abs() <= 3, "stray edge at x={}", x);
        }
    }
}
