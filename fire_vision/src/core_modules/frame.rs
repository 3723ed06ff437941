// THEORY:
// The `Frame` module represents one captured video image. It is a "dumb" data
// container: it owns the RGB samples, validates their geometry once at
// construction, and hands out read-only `Pixel` views. The analysis stages only
// ever borrow a frame; anything they need to mutate lives in their own working
// buffers (`CandidateMask`).
//
// Capture collaborators deliver frames in different layouts (RGB from image
// files, BGR from camera libraries), so the constructors normalize to RGB here
// and the rest of the engine never has to care.

pub mod frame {
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::FrameError;
    use image::RgbImage;

    const CHANNELS: usize = 3;

    /// An immutable RGB image with non-zero dimensions.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Frame {
        image: RgbImage,
    }

    impl Frame {
        /// Builds a frame from a tightly packed RGB buffer.
        pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
            let actual = data.len();
            Self::check_geometry(width, height, actual)?;
            let image = RgbImage::from_raw(width, height, data).ok_or(FrameError::BufferLength {
                expected: Self::expected_len(width, height),
                actual,
            })?;
            Ok(Self { image })
        }

        /// Builds a frame from a tightly packed BGR buffer, swapping to RGB.
        pub fn from_bgr(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self, FrameError> {
            Self::check_geometry(width, height, data.len())?;
            for sample in data.chunks_exact_mut(CHANNELS) {
                sample.swap(0, 2);
            }
            Self::from_rgb(width, height, data)
        }

        /// Wraps an existing image buffer.
        pub fn from_image(image: RgbImage) -> Result<Self, FrameError> {
            let (width, height) = image.dimensions();
            if width == 0 || height == 0 {
                return Err(FrameError::ZeroSized { width, height });
            }
            Ok(Self { image })
        }

        fn expected_len(width: u32, height: u32) -> usize {
            width as usize * height as usize * CHANNELS
        }

        fn check_geometry(width: u32, height: u32, actual: usize) -> Result<(), FrameError> {
            if width == 0 || height == 0 {
                return Err(FrameError::ZeroSized { width, height });
            }
            let expected = Self::expected_len(width, height);
            if actual != expected {
                return Err(FrameError::BufferLength { expected, actual });
            }
            Ok(())
        }

        pub fn width(&self) -> u32 {
            self.image.width()
        }

        pub fn height(&self) -> u32 {
            self.image.height()
        }

        /// Total number of pixels.
        pub fn area(&self) -> u64 {
            self.width() as u64 * self.height() as u64
        }

        /// The pixel at `(x, y)`. Panics when out of bounds, like `image` does.
        pub fn pixel(&self, x: u32, y: u32) -> Pixel {
            Pixel::from(*self.image.get_pixel(x, y))
        }

        /// Every pixel in raster order (row by row, left to right).
        pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
            self.image.pixels().map(|rgb| Pixel::from(*rgb))
        }

        /// A horizontally flipped copy, for mirror-view webcams.
        pub fn mirrored(&self) -> Frame {
            Frame {
                image: image::imageops::flip_horizontal(&self.image),
            }
        }

        /// Checks the frame against the dimensions the pipeline was configured for.
        pub fn ensure_dimensions(&self, width: u32, height: u32) -> Result<(), FrameError> {
            if self.width() != width || self.height() != height {
                return Err(FrameError::DimensionMismatch {
                    expected_width: width,
                    expected_height: height,
                    actual_width: self.width(),
                    actual_height: self.height(),
                });
            }
            Ok(())
        }
    }
}
