//! Running-average motion detection.
//!
//! Keeps an exponentially-weighted running average of the blurred luma
//! plane as the background reference. Pixels whose absolute difference from
//! the reference clears the binary threshold count as changed; the changed
//! fraction drives the match decision and, past a much higher bar, a
//! wholesale reference reset (the "camera is adjusting" heuristic: a pan or
//! exposure change should re-seed the background instead of bleeding into
//! it for hundreds of frames).
//!
//! All state lives on the detector value. The reference buffer and the
//! morphology scratch images are owned here, so two detectors never alias.

use anyhow::Result;
use image::{GrayImage, Rgb};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::filter::box_filter;
use imageproc::morphology::{dilate, erode};
use serde::Deserialize;

use super::{FrameTransform, TransformOutput};
use crate::frame::{Frame, Rect};

/// Motion detector knobs. The two percentage thresholds are deliberately
/// configuration, not constants: the stock values (0.75 / 25.0) come from
/// the original demos with no stated derivation.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Running-average update weight per frame.
    pub avg_weight: f32,
    /// Per-pixel absolute-difference threshold (out of 255).
    pub diff_threshold: u8,
    /// Changed-pixel percentage above which the frame counts as motion.
    pub match_percent: f32,
    /// Changed-pixel percentage above which the reference is re-seeded
    /// wholesale instead of blended.
    pub reset_percent: f32,
    /// Morphology radii applied to the changed-pixel mask before contour
    /// extraction (equivalent to that many 3x3 iterations).
    pub dilate_radius: u8,
    pub erode_radius: u8,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            avg_weight: 0.03,
            diff_threshold: 25,
            match_percent: 0.75,
            reset_percent: 25.0,
            dilate_radius: 15,
            erode_radius: 10,
        }
    }
}

/// Frame-over-background motion detector.
pub struct MotionDetect {
    params: MotionParams,
    /// Running-average reference, blurred luma as f32. `None` until the
    /// first frame; re-seeded on resolution change or a reset trigger.
    reference: Option<Vec<f32>>,
    reference_dims: (u32, u32),
    last_percent: f32,
    rect_color: Rgb<u8>,
}

impl MotionDetect {
    pub fn new(params: MotionParams) -> Self {
        Self {
            params,
            reference: None,
            reference_dims: (0, 0),
            last_percent: 0.0,
            rect_color: Rgb([0, 255, 0]),
        }
    }

    /// Changed-pixel percentage of the most recent frame.
    pub fn changed_percent(&self) -> f32 {
        self.last_percent
    }

    /// Bounding rectangles of the connected changed regions.
    fn movement_rects(&self, mask: &GrayImage) -> Vec<Rect> {
        let grown = dilate(mask, Norm::LInf, self.params.dilate_radius);
        let cleaned = erode(&grown, Norm::LInf, self.params.erode_radius);
        find_contours::<i32>(&cleaned)
            .into_iter()
            .filter_map(|contour| {
                Rect::bounding(
                    contour
                        .points
                        .iter()
                        .map(|p| (p.x.max(0) as u32, p.y.max(0) as u32)),
                )
            })
            .collect()
    }
}

impl FrameTransform for MotionDetect {
    fn name(&self) -> &'static str {
        "motion"
    }

    fn apply(&mut self, frame: &Frame) -> Result<TransformOutput> {
        let gray = frame.to_gray();
        // 8x8-style box smoothing; kills sensor noise before differencing.
        let work = box_filter(&gray, 4, 4);
        let dims = (work.width(), work.height());

        if self.reference.is_none() || self.reference_dims != dims {
            self.reference = Some(work.as_raw().iter().map(|&p| f32::from(p)).collect());
            self.reference_dims = dims;
        }
        let reference = self.reference.as_mut().unwrap();

        // Blend the new frame into the reference, then difference against it.
        let weight = self.params.avg_weight;
        let mut mask_data = vec![0u8; work.as_raw().len()];
        let mut changed = 0u64;
        for (i, (&pixel, avg)) in work.as_raw().iter().zip(reference.iter_mut()).enumerate() {
            *avg += weight * (f32::from(pixel) - *avg);
            let diff = (f32::from(pixel) - *avg).abs();
            if diff > f32::from(self.params.diff_threshold) {
                changed += 1;
                mask_data[i] = 255;
            }
        }

        let total = u64::from(dims.0) * u64::from(dims.1);
        let percent = if total == 0 {
            0.0
        } else {
            100.0 * changed as f32 / total as f32
        };
        self.last_percent = percent;

        if percent > self.params.reset_percent {
            // Camera is adjusting; replace the reference wholesale.
            for (avg, &pixel) in reference.iter_mut().zip(work.as_raw()) {
                *avg = f32::from(pixel);
            }
            log::debug!(
                "frame {}: {:.2}% changed, reference reset",
                frame.index,
                percent
            );
        }

        let mask = GrayImage::from_raw(dims.0, dims.1, mask_data)
            .ok_or_else(|| anyhow::anyhow!("mask buffer length mismatch"))?;

        let matched = percent > self.params.match_percent;
        let mut out = frame.clone();
        if matched {
            for rect in self.movement_rects(&mask) {
                out.draw_rect(rect, self.rect_color);
            }
        }

        Ok(TransformOutput {
            frame: out,
            matched,
        })
    }
}
