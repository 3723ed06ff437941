// THEORY:
// The `ConfidenceScorer` collapses the region list of one frame into the two
// numbers the rest of the system cares about: "is there fire in this frame" and
// "how much of it".
//
// Confidence is the total region area measured against a reference area, a fixed
// fraction of the frame. With the default fraction of one tenth, a single region
// at the minimum area scores low but non-zero, and flames covering a tenth of the
// view saturate at 1.0. The mapping is monotonic in every region's area.

use crate::core_modules::region::Region;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REFERENCE_AREA_FRACTION: f64 = 0.1;

/// The per-frame verdict handed to the alarm state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Normalized fire prominence in [0, 1].
    pub confidence: f64,
    pub fire_detected: bool,
    /// Surviving regions, largest first.
    pub regions: Vec<Region>,
    /// Sum of the region areas, in pixels.
    pub fire_area: u64,
}

impl FrameResult {
    /// The result of a frame with nothing fire-colored in it.
    pub fn empty() -> Self {
        Self {
            confidence: 0.0,
            fire_detected: false,
            regions: Vec::new(),
            fire_area: 0,
        }
    }

    /// The largest region, if any.
    pub fn primary_region(&self) -> Option<&Region> {
        self.regions.first()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}

/// Coarse confidence buckets for display consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence < 0.3 {
            ConfidenceLevel::Low
        } else if confidence < 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        }
    }
}

/// Stateless area-to-confidence mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScorer {
    reference_area_fraction: f64,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_AREA_FRACTION)
    }
}

impl ConfidenceScorer {
    pub fn new(reference_area_fraction: f64) -> Self {
        Self {
            reference_area_fraction,
        }
    }

    pub fn score(&self, regions: Vec<Region>, frame_area: u64) -> FrameResult {
        let fire_area: u64 = regions.iter().map(|region| region.area as u64).sum();
        let reference_area = frame_area as f64 * self.reference_area_fraction;

        let confidence = if reference_area > 0.0 {
            (fire_area as f64 / reference_area).clamp(0.0, 1.0)
        } else {
            0.0
        };

        FrameResult {
            confidence,
            fire_detected: !regions.is_empty(),
            regions,
            fire_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::region::BoundingBox;

    fn region(area: u32) -> Region {
        Region {
            bounding_box: BoundingBox {
                x: 0,
                y: 0,
                width: area,
                height: 1,
            },
            area,
            centroid: (area as f64 / 2.0, 0.0),
        }
    }

    #[test]
    fn no_regions_means_no_fire() {
        let result = ConfidenceScorer::default().score(Vec::new(), 640 * 480);
        assert_eq!(result, FrameResult::empty());
    }

    #[test]
    fn minimum_sized_region_scores_low_but_non_zero() {
        let result = ConfidenceScorer::default().score(vec![region(500)], 640 * 480);
        assert!(result.fire_detected);
        assert!(result.confidence > 0.0 && result.confidence < 0.05);
        assert_eq!(result.confidence_level(), ConfidenceLevel::Low);
    }

    #[test]
    fn large_regions_saturate() {
        let regions = vec![region(20_000), region(20_000)];
        let result = ConfidenceScorer::default().score(regions, 100_000);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.fire_area, 40_000);
        assert_eq!(result.confidence_level(), ConfidenceLevel::High);
    }

    #[test]
    fn confidence_never_decreases_as_a_region_grows() {
        let scorer = ConfidenceScorer::default();
        let mut previous = 0.0;
        for area in (0..=12_000).step_by(250) {
            let result = scorer.score(vec![region(area.max(1)), region(300)], 100_000);
            assert!(result.confidence >= previous);
            previous = result.confidence;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn zero_frame_area_scores_zero() {
        let result = ConfidenceScorer::default().score(vec![region(10)], 0);
        assert!(result.fire_detected);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn primary_region_is_the_first() {
        let result = ConfidenceScorer::default().score(vec![region(900), region(600)], 10_000);
        assert_eq!(result.primary_region().map(|r| r.area), Some(900));
    }

    #[test]
    fn levels_follow_the_display_tiers() {
        assert_eq!(ConfidenceLevel::from_confidence(0.29), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0.3), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.6), ConfidenceLevel::High);
    }
}
