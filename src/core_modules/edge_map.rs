// THEORY:
// The `EdgeMap` answers "how sharply does brightness change here?" for every pixel.
// It is a Sobel gradient magnitude over luma: a 3x3 horizontal and vertical
// derivative, combined as sqrt(gx^2 + gy^2).
//
// Boundary policy: the outermost ring of pixels has no full 3x3 neighbourhood and
// is pinned to zero. A highlight touching the frame border therefore never counts
// as an edge, which also means frames narrower or shorter than 3 pixels produce
// an all-zero map.
//
// Two entry points share one convolution routine:
// - `EdgeMap::build` recomputes luma for every neighbour straight from the frame.
// - `EdgeMap::from_luma` reads a precomputed `LumaPlane`.
// Because the sampled values and the accumulation order are identical, the two are
// bit-for-bit equivalent; the pipeline uses the second to avoid 9x luma work.

use crate::core_modules::frame::{Frame, LumaPlane};

pub type Magnitude = f64;

const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Gradient magnitude per pixel, same geometry as the source frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    magnitudes: Vec<Magnitude>,
}

impl EdgeMap {
    /// Builds the map by sampling luma directly from the frame.
    pub fn build(frame: &Frame<'_>) -> Self {
        Self::convolve(frame.width(), frame.height(), |x, y| {
            frame.pixel(x, y).luminance()
        })
    }

    /// Builds the map from a luma plane computed once for the pass.
    pub fn from_luma(luma: &LumaPlane) -> Self {
        Self::convolve(luma.width(), luma.height(), |x, y| luma.get(x, y))
    }

    fn convolve(width: u32, height: u32, sample: impl Fn(u32, u32) -> f64) -> Self {
        let mut magnitudes = vec![0.0; width as usize * height as usize];

        if width >= 3 && height >= 3 {
            for y in 1..height - 1 {
                for x in 1..width - 1 {
                    let mut sum_x = 0.0;
                    let mut sum_y = 0.0;
                    for ky in 0..3 {
                        for kx in 0..3 {
                            let luma = sample(x + kx as u32 - 1, y + ky as u32 - 1);
                            sum_x += luma * SOBEL_X[ky][kx];
                            sum_y += luma * SOBEL_Y[ky][kx];
                        }
                    }
                    magnitudes[y as usize * width as usize + x as usize] =
                        (sum_x * sum_x + sum_y * sum_y).sqrt();
                }
            }
        }

        Self {
            width,
            height,
            magnitudes,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Magnitude {
        self.magnitudes[y as usize * self.width as usize + x as usize]
    }

    pub fn magnitudes(&self) -> &[Magnitude] {
        &self.magnitudes
    }

    /// Renders the map as 8-bit grayscale, clamping magnitudes to 0..=255.
    pub fn to_luma_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.get(x, y).clamp(0.0, 255.0) as u8])
        })
    }
}
