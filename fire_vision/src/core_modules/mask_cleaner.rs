// THEORY:
// The `MaskCleaner` turns the speckled output of the color segmenter into solid
// blobs. It runs two classic morphological filters with a square neighborhood:
//
// 1.  **Open** (erode, then dilate) removes isolated pixels and thin spurs that
//     are smaller than the neighborhood.
// 2.  **Close** (dilate, then erode) fills pinholes and bridges the narrow gaps
//     between fragments of the same flame.
//
// Opening always runs first so that noise is gone before closing gets a chance
// to grow it into something that looks like a real region.
//
// Neighbors outside the frame are ignored by both erosion and dilation. With that
// boundary rule the two operators are adjoint on the frame, so `clean` is
// idempotent: cleaning an already-clean mask returns it unchanged.

use crate::core_modules::candidate_mask::CandidateMask;

/// Radius of the default 3x3 neighborhood.
pub const DEFAULT_KERNEL_RADIUS: u32 = 1;

/// Open-then-close filter over a `(2r+1) x (2r+1)` square neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskCleaner {
    radius: u32,
}

impl Default for MaskCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_KERNEL_RADIUS)
    }
}

impl MaskCleaner {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    pub fn clean(&self, mask: &CandidateMask) -> CandidateMask {
        let opened = self.open(mask);
        self.close(&opened)
    }

    pub fn open(&self, mask: &CandidateMask) -> CandidateMask {
        self.dilate(&self.erode(mask))
    }

    pub fn close(&self, mask: &CandidateMask) -> CandidateMask {
        self.erode(&self.dilate(mask))
    }

    /// A pixel survives only if every in-frame neighbor is set.
    pub fn erode(&self, mask: &CandidateMask) -> CandidateMask {
        self.filter(mask, Morphology::Erode)
    }

    /// A pixel is set if any in-frame neighbor is set.
    pub fn dilate(&self, mask: &CandidateMask) -> CandidateMask {
        self.filter(mask, Morphology::Dilate)
    }

    // The square neighborhood is separable: a horizontal pass followed by a
    // vertical pass covers the same window as the full 2D scan.
    fn filter(&self, mask: &CandidateMask, op: Morphology) -> CandidateMask {
        if self.radius == 0 {
            return mask.clone();
        }
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let radius = self.radius as usize;
        let source = mask.bits();

        let mut horizontal = vec![false; source.len()];
        for y in 0..height {
            let row = &source[y * width..(y + 1) * width];
            for x in 0..width {
                let start = x.saturating_sub(radius);
                let end = (x + radius).min(width - 1);
                horizontal[y * width + x] = op.reduce(row[start..=end].iter().copied());
            }
        }

        let mut vertical = vec![false; source.len()];
        for y in 0..height {
            let start = y.saturating_sub(radius);
            let end = (y + radius).min(height - 1);
            for x in 0..width {
                vertical[y * width + x] =
                    op.reduce((start..=end).map(|row| horizontal[row * width + x]));
            }
        }

        CandidateMask::from_bits(mask.width(), mask.height(), vertical)
            .unwrap_or_else(|| mask.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum Morphology {
    Erode,
    Dilate,
}

impl Morphology {
    #[inline]
    fn reduce(self, mut window: impl Iterator<Item = bool>) -> bool {
        match self {
            Morphology::Erode => window.all(|bit| bit),
            Morphology::Dilate => window.any(|bit| bit),
        }
    }
}
