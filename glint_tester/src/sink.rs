use std::path::PathBuf;

use glint_vision::{GlintError, ParticleBuffer, ProjectedPoint, RenderSink, Result};
use image::{Rgba, RgbaImage};
use tracing::info;

/// A software point-sprite renderer.
///
/// Every pass clears a canvas, splats the active particles as filled squares in
/// their own color, and writes the canvas to `output_dir` as a numbered PNG. Without
/// an output directory it only logs the cloud.
pub struct SplatSink {
    output_dir: Option<PathBuf>,
    canvas: RgbaImage,
    radius: u32,
    pass: u64,
}

impl SplatSink {
    pub fn new(output_dir: Option<PathBuf>, width: u32, height: u32, radius: u32) -> Self {
        Self {
            output_dir,
            canvas: RgbaImage::new(width, height),
            radius,
            pass: 0,
        }
    }

    /// Inverse of the pipeline's projection, onto this sink's canvas.
    fn to_canvas(&self, position: [f32; 3]) -> (i64, i64) {
        let (width, height) = self.canvas.dimensions();
        let x = (position[0] + 1.0) / 2.0 * width as f32;
        let y = (1.0 - position[1]) / 2.0 * height as f32;
        (x as i64, y as i64)
    }

    fn splat(&mut self, center: (i64, i64), color: [f32; 3]) {
        let (width, height) = self.canvas.dimensions();
        let rgba = Rgba([
            (color[0] * 255.0).round() as u8,
            (color[1] * 255.0).round() as u8,
            (color[2] * 255.0).round() as u8,
            255,
        ]);
        let r = self.radius as i64;
        for y in center.1 - r..=center.1 + r {
            for x in center.0 - r..=center.0 + r {
                if (0..width as i64).contains(&x) && (0..height as i64).contains(&y) {
                    self.canvas.put_pixel(x as u32, y as u32, rgba);
                }
            }
        }
    }
}

impl RenderSink for SplatSink {
    fn prepare(&mut self, capacity: usize) -> Result<()> {
        let (width, height) = self.canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(GlintError::RenderTargetUnavailable {
                reason: format!("canvas {width}x{height} has no area"),
            });
        }
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir).map_err(|err| GlintError::RenderTargetUnavailable {
                reason: format!("{}: {err}", dir.display()),
            })?;
        }
        info!(capacity, width, height, "splat canvas ready");
        Ok(())
    }

    fn present(&mut self, points: &[ProjectedPoint], particles: &ParticleBuffer) -> Result<()> {
        self.pass += 1;
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 255]);
        }
        for (&position, &color) in particles
            .active_positions()
            .iter()
            .zip(particles.active_colors())
        {
            let center = self.to_canvas(position);
            self.splat(center, color);
        }

        for point in points {
            info!(
                pass = self.pass,
                x = point.position[0],
                y = point.position[1],
                brightness = point.brightness,
                "highlight"
            );
        }

        if let Some(dir) = &self.output_dir {
            let path = dir.join(format!("pass_{:05}.png", self.pass));
            self.canvas
                .save(&path)
                .map_err(|err| GlintError::RenderTargetUnavailable {
                    reason: format!("{}: {err}", path.display()),
                })?;
        }
        Ok(())
    }
}
