// THEORY:
// A `Frame` is a borrowed, read-only view over one RGBA8 snapshot. It never owns
// pixel memory: the capture source owns the buffer and lends it to the pipeline
// for exactly one pass. Geometry is checked once at construction so every later
// stage can index without re-validating.
//
// `LumaPlane` is the shared precompute. Both the edge map and the extractor need
// luma for every pixel, so it is computed once per pass and read twice.

use crate::core_modules::pixel::pixel::{CHANNELS, Luminance, Pixel};
use crate::error::{GlintError, Result};

#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Wraps a row-major RGBA8 buffer.
    ///
    /// Zero-sized frames are rejected up front because projection divides by
    /// both dimensions.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GlintError::InvalidFrameGeometry { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(GlintError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_image(image: &'a image::RgbaImage) -> Result<Self> {
        Self::new(image.width(), image.height(), image.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let index = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::from(&self.data[index..index + CHANNELS])
    }

    /// Iterates pixels in scan order together with their coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Pixel)> + 'a {
        let width = self.width;
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, bytes)| (i as u32 % width, i as u32 / width, Pixel::from(bytes)))
    }
}

/// Per-pixel luma for one frame, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaPlane {
    width: u32,
    height: u32,
    values: Vec<Luminance>,
}

impl LumaPlane {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let values = frame
            .as_bytes()
            .chunks_exact(CHANNELS)
            .map(|bytes| Pixel::from(bytes).luminance())
            .collect();
        Self {
            width: frame.width(),
            height: frame.height(),
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Luminance {
        self.values[y as usize * self.width as usize + x as usize]
    }

    pub fn values(&self) -> &[Luminance] {
        &self.values
    }
}
