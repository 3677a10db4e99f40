// THEORY:
// The `Pixel` module is the most fundamental unit of the highlight detector. It is
// a "dumb" data container for a single RGBA pixel plus the two single-pixel
// heuristics every later stage needs: luma (how bright is it?) and a normalized
// color (what should the rendered particle look like?).
//
// Luma is the one brightness definition in the crate. The edge map builder and the
// bright-point extractor both route through `Pixel::luminance`, so the two stages
// can never disagree about what "bright" means.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type NormalizedChannel = f32;
    pub type Luminance = f64;

    pub const CHANNELS: usize = 4;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255). Carried but never analysed.
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64
                + 0.587_f64 * self.green as f64
                + 0.114_f64 * self.blue as f64
        }

        /// Red, green and blue divided by 255. Alpha is dropped.
        pub fn normalized_rgb(&self) -> [NormalizedChannel; 3] {
            [
                self.red as NormalizedChannel / 255.0,
                self.green as NormalizedChannel / 255.0,
                self.blue as NormalizedChannel / 255.0,
            ]
        }
    }

    impl From<&[Byte]> for Pixel {
        /// Reads the first four bytes as R, G, B, A. Callers hand in exact
        /// `CHANNELS`-sized windows produced by `chunks_exact`.
        fn from(bytes: &[Byte]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }
}
