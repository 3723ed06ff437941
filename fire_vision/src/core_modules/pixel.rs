// THEORY (single-pixel color heuristics):
// The `Pixel` module is the smallest unit of the vision engine: one RGB sample
// plus the metrics that can be computed from that sample alone. Nothing in here
// looks at neighbors or at previous frames.
//
// The color segmenter works in HSV, because flame colors are easier to bound by
// hue, saturation and brightness than by raw channel values. The conversion
// follows the common 8-bit convention used by camera tooling:
//   • hue        in half-degrees, [0, 180)
//   • saturation in [0, 255], chroma relative to the brightest channel
//   • value      in [0, 255], the brightest channel itself
// Red sits at both ends of the hue circle, which is why fire is described by a
// union of bands rather than a single range.

pub mod pixel {
    pub type Channel = u8;
    pub type NormalizedChannel = f32;
    /// Hue angle in degrees, [0, 360).
    pub type Hue = f32;
    pub type Chroma = f32;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    /// An HSV triple in the 8-bit convention (hue 0-179, saturation and value 0-255).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Hsv {
        pub hue: u8,
        pub saturation: u8,
        pub value: u8,
    }

    impl Hsv {
        pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
            Self {
                hue,
                saturation,
                value,
            }
        }
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        #[inline]
        fn normalized(&self) -> (NormalizedChannel, NormalizedChannel, NormalizedChannel) {
            (
                self.red as NormalizedChannel / 255.0,
                self.green as NormalizedChannel / 255.0,
                self.blue as NormalizedChannel / 255.0,
            )
        }

        /// Chroma (C): max(R,G,B) - min(R,G,B) on normalized channels.
        pub fn chroma(&self) -> Chroma {
            let (red, green, blue) = self.normalized();
            red.max(green.max(blue)) - red.min(green.min(blue))
        }

        /// Hue angle in degrees [0, 360). Gray pixels report 0.
        pub fn hue(&self) -> Hue {
            let (red, green, blue) = self.normalized();
            let maximum_channel = red.max(green.max(blue));
            let chroma = self.chroma();

            if chroma <= 1e-6 {
                return 0.0;
            }

            let inverse_chroma = 1.0 / chroma;

            let (base_difference, sector_offset) = if maximum_channel == red {
                (green - blue, 0.0)
            } else if maximum_channel == green {
                (blue - red, 2.0)
            } else {
                (red - green, 4.0)
            };

            let mut hue_degrees = (base_difference * inverse_chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// Converts to the 8-bit HSV triple the color bands are expressed in.
        pub fn to_hsv(&self) -> Hsv {
            let value = self.red.max(self.green.max(self.blue));
            let minimum = self.red.min(self.green.min(self.blue));

            let saturation = if value == 0 {
                0
            } else {
                ((value - minimum) as f32 * 255.0 / value as f32).round() as u8
            };

            let mut hue = (self.hue() / 2.0).round() as u16;
            if hue >= 180 {
                hue -= 180;
            }

            Hsv {
                hue: hue as u8,
                saturation,
                value,
            }
        }
    }

    impl From<image::Rgb<u8>> for Pixel {
        fn from(rgb: image::Rgb<u8>) -> Self {
            let [red, green, blue] = rgb.0;
            Pixel::new(red, green, blue)
        }
    }
}
