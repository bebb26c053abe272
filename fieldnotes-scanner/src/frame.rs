use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::settings::ScannerSettings;

/// Copies the live frame into a fixed-size RGBA decode buffer.
///
/// The source is stretched to the buffer regardless of its resolution or
/// aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    width: u32,
    height: u32,
}

impl FrameSampler {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_settings(settings: &ScannerSettings) -> Self {
        Self::new(settings.frame_width, settings.frame_height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn sample(&self, frame: &DynamicImage) -> RgbaImage {
        if frame.width() == self.width && frame.height() == self.height {
            return frame.to_rgba8();
        }
        frame
            .resize_exact(self.width, self.height, FilterType::Triangle)
            .to_rgba8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_source_resolution_lands_in_the_decode_buffer() {
        let sampler = FrameSampler::from_settings(&ScannerSettings::default());
        for (w, h) in [(1920, 1080), (320, 240), (480, 640)] {
            let buffer = sampler.sample(&DynamicImage::new_rgb8(w, h));
            assert_eq!(buffer.dimensions(), (640, 480));
            assert_eq!(buffer.as_raw().len(), 640 * 480 * 4);
        }
    }
}
