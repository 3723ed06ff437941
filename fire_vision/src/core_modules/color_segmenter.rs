// THEORY:
// The `ColorSegmenter` is the first stage of the per-frame pipeline. It answers a
// purely local question for every pixel: "does this color look like flame?"
//
// Key principles:
// 1.  **Union of bands**: flame color runs from yellow through orange into red,
//     and red straddles the wrap point of the hue circle. A pixel is a candidate
//     when it falls inside ANY configured `ColorBand`.
// 2.  **Stateless**: the output depends only on the frame and the band list.
//     The frame is borrowed, never modified.

use crate::core_modules::candidate_mask::CandidateMask;
use crate::core_modules::frame::frame::Frame;
use crate::core_modules::pixel::pixel::Hsv;
use serde::{Deserialize, Serialize};

/// A named, inclusive HSV box treated as "fire-like".
///
/// Bounds are `[hue, saturation, value]` in the 8-bit convention
/// (hue 0-180, saturation and value 0-255).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBand {
    pub name: String,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBand {
    pub fn new(name: impl Into<String>, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
        }
    }

    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        let sample = [hsv.hue, hsv.saturation, hsv.value];
        sample
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(value, (lower, upper))| lower <= value && value <= upper)
    }

    /// The three bands flame colors are usually found in.
    pub fn fire_defaults() -> Vec<ColorBand> {
        vec![
            ColorBand::new("orange-red", [0, 100, 200], [15, 255, 255]),
            ColorBand::new("yellow-orange", [15, 100, 200], [35, 255, 255]),
            ColorBand::new("deep-red", [170, 100, 200], [180, 255, 255]),
        ]
    }
}

/// Marks every pixel whose HSV value lies in at least one band.
pub fn segment(frame: &Frame, bands: &[ColorBand]) -> CandidateMask {
    let width = frame.width();
    let bits = frame
        .pixels()
        .map(|pixel| {
            let hsv = pixel.to_hsv();
            bands.iter().any(|band| band.contains(hsv))
        })
        .collect();

    CandidateMask::from_bits(width, frame.height(), bits)
        .unwrap_or_else(|| CandidateMask::new(width, frame.height()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        Frame::from_image(image).unwrap()
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let band = ColorBand::new("test", [10, 100, 200], [20, 255, 255]);
        assert!(band.contains(Hsv::new(10, 100, 200)));
        assert!(band.contains(Hsv::new(20, 255, 255)));
        assert!(!band.contains(Hsv::new(21, 255, 255)));
        assert!(!band.contains(Hsv::new(15, 99, 255)));
    }

    #[test]
    fn each_default_band_catches_its_color() {
        let bands = ColorBand::fire_defaults();
        for rgb in [[255, 60, 0], [255, 200, 0], [255, 0, 20]] {
            let mask = segment(&solid_frame(3, 2, rgb), &bands);
            assert_eq!(mask.count(), 6, "color {rgb:?} was not segmented");
        }
    }

    #[test]
    fn non_fire_colors_are_rejected() {
        let bands = ColorBand::fire_defaults();
        for rgb in [[0, 0, 255], [0, 200, 0], [128, 128, 128], [120, 30, 0]] {
            let mask = segment(&solid_frame(3, 2, rgb), &bands);
            assert!(mask.is_empty(), "color {rgb:?} leaked into the mask");
        }
    }

    #[test]
    fn empty_band_list_matches_nothing() {
        let mask = segment(&solid_frame(2, 2, [255, 60, 0]), &[]);
        assert!(mask.is_empty());
    }
}
