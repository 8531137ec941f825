//! Pedestrian detection transform.
//!
//! The classifier itself is an injected capability: the transform hands the
//! frame and the sliding-window parameters to a [`PersonDetector`] and
//! draws whatever rectangles come back. A deterministic stub detector is
//! always available; a tract-onnx model backend is behind the
//! `detector-tract` feature.

use anyhow::Result;
use image::Rgb;
use serde::Deserialize;

use super::{FrameTransform, TransformOutput};
use crate::frame::{Detection, Frame, Rect};

/// Sliding-window detector parameters, passed to the backend untouched.
/// Defaults match the stock pedestrian detector setup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PersonParams {
    /// Window stride in pixels, both axes.
    pub win_stride: u32,
    /// Padding around each window in pixels, both axes.
    pub padding: u32,
    /// Multi-scale pyramid step.
    pub scale_step: f64,
    /// Overlap threshold for grouping raw windows into final detections.
    pub group_threshold: f64,
    /// Detections below this confidence are dropped before drawing.
    pub min_weight: f64,
}

impl Default for PersonParams {
    fn default() -> Self {
        Self {
            win_stride: 8,
            padding: 32,
            scale_step: 1.05,
            group_threshold: 2.0,
            min_weight: 0.0,
        }
    }
}

/// Pedestrian classifier capability.
///
/// Implementations must treat the frame as read-only and must not retain it
/// between calls.
pub trait PersonDetector {
    fn name(&self) -> &'static str;

    fn detect(&mut self, frame: &Frame, params: &PersonParams) -> Result<Vec<Detection>>;
}

/// Draws each detection and counts frames with at least one person.
pub struct PersonDetect {
    params: PersonParams,
    detector: Box<dyn PersonDetector>,
    rect_color: Rgb<u8>,
}

impl PersonDetect {
    pub fn new(params: PersonParams, detector: Box<dyn PersonDetector>) -> Self {
        Self {
            params,
            detector,
            rect_color: Rgb([0, 255, 0]),
        }
    }

    pub fn with_stub(params: PersonParams) -> Self {
        Self::new(params, Box::new(StubPersonDetector::default()))
    }
}

impl FrameTransform for PersonDetect {
    fn name(&self) -> &'static str {
        "people"
    }

    fn apply(&mut self, frame: &Frame) -> Result<TransformOutput> {
        let mut detections = self.detector.detect(frame, &self.params)?;
        detections.retain(|d| d.weight >= self.params.min_weight);

        let mut out = frame.clone();
        for detection in &detections {
            out.draw_rect(detection.rect, self.rect_color);
            log::debug!(
                "frame {}: person at ({}, {}) {}x{} weight {:.2}",
                frame.index,
                detection.rect.x,
                detection.rect.y,
                detection.rect.width,
                detection.rect.height,
                detection.weight
            );
        }

        Ok(TransformOutput {
            frame: out,
            matched: !detections.is_empty(),
        })
    }
}

/// Deterministic heuristic detector for tests and codec-only demo runs.
///
/// Flags a frame when the central vertical band is markedly brighter than
/// the frame as a whole, and reports that band as the detection. Crude, but
/// it is deterministic and exercises the full draw/count path.
pub struct StubPersonDetector {
    /// Minimum luma lead of the center band over the frame mean.
    margin: f64,
}

impl StubPersonDetector {
    pub fn new(margin: f64) -> Self {
        Self { margin }
    }
}

impl Default for StubPersonDetector {
    fn default() -> Self {
        Self::new(24.0)
    }
}

impl PersonDetector for StubPersonDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, frame: &Frame, _params: &PersonParams) -> Result<Vec<Detection>> {
        let gray = frame.to_gray();
        let (width, height) = gray.dimensions();
        if width < 3 || height == 0 {
            return Ok(Vec::new());
        }

        let band_x0 = width / 3;
        let band_x1 = 2 * width / 3;
        let mut total = 0u64;
        let mut band = 0u64;
        let mut band_pixels = 0u64;
        for (x, _, pixel) in gray.enumerate_pixels() {
            total += u64::from(pixel[0]);
            if (band_x0..band_x1).contains(&x) {
                band += u64::from(pixel[0]);
                band_pixels += 1;
            }
        }
        let frame_mean = total as f64 / f64::from(width * height);
        let band_mean = band as f64 / band_pixels as f64;
        let lead = band_mean - frame_mean;
        if lead < self.margin {
            return Ok(Vec::new());
        }

        Ok(vec![Detection {
            rect: Rect::new(band_x0 as i32, 0, band_x1 - band_x0, height),
            weight: (lead / 255.0).min(1.0),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn uniform_frame(luma: u8) -> Frame {
        Frame::new(RgbImage::from_pixel(60, 40, Rgb([luma, luma, luma])), 0)
    }

    fn bright_center_frame() -> Frame {
        let mut image = RgbImage::from_pixel(60, 40, Rgb([20, 20, 20]));
        for y in 0..40 {
            for x in 20..40 {
                image.put_pixel(x, y, Rgb([230, 230, 230]));
            }
        }
        Frame::new(image, 0)
    }

    #[test]
    fn stub_ignores_flat_frames() {
        let mut detector = StubPersonDetector::default();
        let found = detector
            .detect(&uniform_frame(128), &PersonParams::default())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn stub_reports_a_bright_center_band() {
        let mut detector = StubPersonDetector::default();
        let found = detector
            .detect(&bright_center_frame(), &PersonParams::default())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rect, Rect::new(20, 0, 20, 40));
        assert!(found[0].weight > 0.0);
    }

    #[test]
    fn transform_matches_and_draws_when_people_are_found() {
        let mut transform = PersonDetect::with_stub(PersonParams::default());
        let out = transform.apply(&bright_center_frame()).unwrap();
        assert!(out.matched);
        assert!(out.frame.image.pixels().any(|p| *p == Rgb([0, 255, 0])));

        let out = transform.apply(&uniform_frame(128)).unwrap();
        assert!(!out.matched);
    }

    #[test]
    fn min_weight_filters_marginal_detections() {
        let params = PersonParams {
            min_weight: 0.9,
            ..PersonParams::default()
        };
        let mut transform = PersonDetect::with_stub(params);
        // The bright band leads by ~140 levels => weight ~0.55, filtered out.
        let out = transform.apply(&bright_center_frame()).unwrap();
        assert!(!out.matched);
    }

    struct ScriptedDetector(Vec<Detection>);

    impl PersonDetector for ScriptedDetector {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn detect(&mut self, _frame: &Frame, _params: &PersonParams) -> Result<Vec<Detection>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn every_detection_rectangle_is_drawn() {
        let detections = vec![
            Detection {
                rect: Rect::new(2, 2, 10, 10),
                weight: 1.2,
            },
            Detection {
                rect: Rect::new(30, 5, 12, 20),
                weight: 0.4,
            },
        ];
        let mut transform =
            PersonDetect::new(PersonParams::default(), Box::new(ScriptedDetector(detections)));
        let out = transform.apply(&uniform_frame(50)).unwrap();
        assert!(out.matched);
        assert_eq!(*out.frame.image.get_pixel(2, 2), Rgb([0, 255, 0]));
        assert_eq!(*out.frame.image.get_pixel(30, 5), Rgb([0, 255, 0]));
    }
}

#[cfg(feature = "detector-tract")]
pub use tract::TractPersonDetector;

#[cfg(feature = "detector-tract")]
mod tract {
    //! ONNX-model detector backend.

    use std::path::Path;

    use anyhow::{anyhow, Context, Result};
    use tract_onnx::prelude::*;

    use super::{PersonDetector, PersonParams};
    use crate::frame::{Detection, Frame, Rect};

    /// Runs a local ONNX person classifier over the whole frame and reports
    /// a single frame-spanning detection when the score clears the
    /// threshold. Window-level localization is up to the model; this
    /// backend only adapts its scores to the pipeline.
    pub struct TractPersonDetector {
        model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
        width: u32,
        height: u32,
        threshold: f32,
    }

    impl TractPersonDetector {
        pub fn new<P: AsRef<Path>>(model_path: P, width: u32, height: u32) -> Result<Self> {
            let model_path = model_path.as_ref();
            let model = tract_onnx::onnx()
                .model_for_path(model_path)
                .with_context(|| {
                    format!("failed to load ONNX model from {}", model_path.display())
                })?
                .with_input_fact(
                    0,
                    InferenceFact::dt_shape(
                        f32::datum_type(),
                        tvec!(1, 3, height as usize, width as usize),
                    ),
                )
                .context("failed to set input fact")?
                .into_optimized()
                .context("failed to optimize ONNX model")?
                .into_runnable()
                .context("failed to build runnable ONNX model")?;

            Ok(Self {
                model,
                width,
                height,
                threshold: 0.5,
            })
        }

        pub fn with_threshold(mut self, threshold: f32) -> Self {
            self.threshold = threshold;
            self
        }

        fn build_input(&self, frame: &Frame) -> Result<Tensor> {
            if frame.width() != self.width || frame.height() != self.height {
                return Err(anyhow!(
                    "frame size {}x{} does not match model input {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ));
            }
            let raw = frame.image.as_raw();
            let width = self.width as usize;
            let input = tract_ndarray::Array4::from_shape_fn(
                (1, 3, self.height as usize, width),
                |(_, channel, y, x)| {
                    let idx = (y * width + x) * 3 + channel;
                    raw[idx] as f32 / 255.0
                },
            );
            Ok(input.into_tensor())
        }
    }

    impl PersonDetector for TractPersonDetector {
        fn name(&self) -> &'static str {
            "tract"
        }

        fn detect(&mut self, frame: &Frame, _params: &PersonParams) -> Result<Vec<Detection>> {
            let input = self.build_input(frame)?;
            let outputs = self
                .model
                .run(tvec!(input))
                .context("ONNX inference failed")?;
            let output = outputs
                .first()
                .ok_or_else(|| anyhow!("model produced no outputs"))?;
            let scores = output
                .to_array_view::<f32>()
                .context("model output tensor was not f32")?;
            let max_score = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            if !max_score.is_finite() || max_score < self.threshold {
                return Ok(Vec::new());
            }
            Ok(vec![Detection {
                rect: Rect::new(0, 0, frame.width(), frame.height()),
                weight: f64::from(max_score),
            }])
        }
    }
}
