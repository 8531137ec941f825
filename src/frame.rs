//! Frame and geometry types shared across the pipeline.
//!
//! A `Frame` is an owned RGB pixel buffer plus its position in the capture
//! order. Sources produce one per read, transforms derive fresh output
//! frames from it, and nothing retains a frame across loop iterations
//! except the motion detector's single running-average reference.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;

/// One decoded video frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// RGB pixel data, tightly packed.
    pub image: RgbImage,
    /// Zero-based position in capture order.
    pub index: u64,
}

impl Frame {
    pub fn new(image: RgbImage, index: u64) -> Self {
        Self { image, index }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Luma-plane view of this frame, used by the detectors.
    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }

    /// Draw a hollow rectangle onto the frame, clamped to the frame bounds.
    pub fn draw_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        let Some(clamped) = rect.clamp_to(self.width(), self.height()) else {
            return;
        };
        draw_hollow_rect_mut(
            &mut self.image,
            imageproc::rect::Rect::at(clamped.x, clamped.y)
                .of_size(clamped.width, clamped.height),
            color,
        );
        // A second, inset outline thickens the border to 2px, matching the
        // stroke width the demos use.
        if clamped.width > 4 && clamped.height > 4 {
            draw_hollow_rect_mut(
                &mut self.image,
                imageproc::rect::Rect::at(clamped.x + 1, clamped.y + 1)
                    .of_size(clamped.width - 2, clamped.height - 2),
                color,
            );
        }
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle covering all of `points`. Returns `None` for an
    /// empty set.
    pub fn bounding(points: impl IntoIterator<Item = (u32, u32)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self {
            x: min_x as i32,
            y: min_y as i32,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Intersect with a `width` x `height` image; `None` when fully outside.
    pub fn clamp_to(self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.width as i32).min(width as i32);
        let y1 = (self.y + self.height as i32).min(height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// A located detection with its classifier confidence. Produced fresh each
/// frame; there is no identity or tracking across frames.
#[derive(Clone, Debug)]
pub struct Detection {
    pub rect: Rect,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_rect_covers_points() {
        let rect = Rect::bounding([(4, 10), (2, 12), (9, 11)]).unwrap();
        assert_eq!(rect, Rect::new(2, 10, 8, 3));
    }

    #[test]
    fn bounding_rect_of_empty_set_is_none() {
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn clamp_drops_rects_outside_the_frame() {
        let rect = Rect::new(100, 100, 10, 10);
        assert!(rect.clamp_to(50, 50).is_none());
    }

    #[test]
    fn clamp_trims_overhanging_rects() {
        let rect = Rect::new(-5, 2, 20, 20);
        assert_eq!(rect.clamp_to(10, 10).unwrap(), Rect::new(0, 2, 10, 8));
    }

    #[test]
    fn draw_rect_marks_the_border() {
        let mut frame = Frame::new(RgbImage::new(32, 32), 0);
        frame.draw_rect(Rect::new(4, 4, 10, 10), Rgb([0, 255, 0]));
        assert_eq!(*frame.image.get_pixel(4, 4), Rgb([0, 255, 0]));
        assert_eq!(*frame.image.get_pixel(13, 13), Rgb([0, 255, 0]));
        // Interior stays untouched.
        assert_eq!(*frame.image.get_pixel(9, 9), Rgb([0, 0, 0]));
    }
}
