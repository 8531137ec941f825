use anyhow::Result;

use super::{FrameTransform, TransformOutput};
use crate::frame::Frame;

/// Pass-through transform: the plain re-encode demo.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl FrameTransform for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn apply(&mut self, frame: &Frame) -> Result<TransformOutput> {
        Ok(TransformOutput {
            frame: frame.clone(),
            matched: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn identity_returns_the_frame_unchanged() {
        let mut image = RgbImage::new(4, 4);
        image.put_pixel(1, 2, image::Rgb([10, 20, 30]));
        let frame = Frame::new(image, 7);

        let out = Identity.apply(&frame).unwrap();
        assert!(!out.matched);
        assert_eq!(out.frame.index, 7);
        assert_eq!(out.frame.image.as_raw(), frame.image.as_raw());
    }
}
