// A per-pixel boolean grid with the same dimensions as the frame it was derived
// from. Stored flat in raster order, like the frame buffers.

/// Binary fire-candidate mask, `true` where a pixel matched a color band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl CandidateMask {
    /// An all-false mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Wraps raster-ordered bits. Returns `None` if the length does not match.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        if bits.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let index = self.index(x, y);
        self.bits[index] = value;
    }

    /// Marks every pixel of the `width x height` rectangle at `(x, y)`, clipped to the mask.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        for row in y..(y + height).min(self.height) {
            for column in x..(x + width).min(self.width) {
                self.set(column, row, true);
            }
        }
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|bit| *bit)
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}
