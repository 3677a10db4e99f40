// THEORY:
// The extractor is the "bright AND sharp" filter. A pixel is a highlight candidate
// only when its luma clears the brightness threshold and the edge map says it sits
// on a strong gradient. Large evenly-lit regions (a white wall, the sky) fail the
// edge test everywhere except their outline; dim edges fail the brightness test.
//
// Output order is scan order (row-major). Nothing downstream relies on it except
// the ranker's tie-break, which keeps it for equal brightness.

use crate::core_modules::edge_map::EdgeMap;
use crate::core_modules::frame::{Frame, LumaPlane};
use crate::core_modules::pixel::pixel::Luminance;
use crate::pipeline::PipelineConfig;

/// A pixel that passed both thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightPoint {
    pub x: u32,
    pub y: u32,
    /// Luma on the 0..255 scale.
    pub brightness: Luminance,
    /// RGB normalized to 0..1.
    pub color: [f32; 3],
}

/// Keeps pixels brighter than `brightness_threshold` whose edge magnitude exceeds
/// `edge_threshold`, reading luma from the shared plane.
pub fn extract_from_luma(
    frame: &Frame<'_>,
    luma: &LumaPlane,
    edges: &EdgeMap,
    config: &PipelineConfig,
) -> Vec<BrightPoint> {
    debug_assert_eq!((frame.width(), frame.height()), (luma.width(), luma.height()));
    debug_assert_eq!((frame.width(), frame.height()), (edges.width(), edges.height()));

    let width = frame.width() as usize;
    luma.values()
        .iter()
        .zip(edges.magnitudes())
        .enumerate()
        .filter(|&(_, (&brightness, &magnitude))| qualifies(brightness, magnitude, config))
        .map(|(i, (&brightness, _))| {
            let (x, y) = ((i % width) as u32, (i / width) as u32);
            BrightPoint {
                x,
                y,
                brightness,
                color: frame.pixel(x, y).normalized_rgb(),
            }
        })
        .collect()
}

/// Reference form of [`extract_from_luma`] that recomputes luma per pixel.
#[cfg(test)]
pub(crate) fn extract_bright_points(
    frame: &Frame<'_>,
    edges: &EdgeMap,
    config: &PipelineConfig,
) -> Vec<BrightPoint> {
    debug_assert_eq!((frame.width(), frame.height()), (edges.width(), edges.height()));

    frame
        .pixels()
        .filter_map(|(x, y, pixel)| {
            let brightness = pixel.luminance();
            qualifies(brightness, edges.get(x, y), config).then(|| BrightPoint {
                x,
                y,
                brightness,
                color: pixel.normalized_rgb(),
            })
        })
        .collect()
}

#[inline]
fn qualifies(brightness: Luminance, magnitude: f64, config: &PipelineConfig) -> bool {
    brightness > config.brightness_threshold && magnitude > config.edge_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with<F: Fn(u32, u32) -> [u8; 4]>(width: u32, height: u32, paint: F) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&paint(x, y));
            }
        }
        data
    }

    fn white_square(x: u32, y: u32) -> [u8; 4] {
        if (45..55).contains(&x) && (45..55).contains(&y) {
            [255, 255, 255, 255]
        } else {
            [0, 0, 0, 255]
        }
    }

    #[test]
    fn dim_frame_yields_nothing() {
        // Strong edges, but nothing is bright enough.
        let data = frame_with(20, 20, |x, _| {
            if x < 10 {
                [0, 0, 0, 255]
            } else {
                [150, 150, 150, 255]
            }
        });
        let frame = Frame::new(20, 20, &data).unwrap();
        let edges = EdgeMap::build(&frame);
        let points = extract_bright_points(&frame, &edges, &PipelineConfig::default());
        assert!(points.is_empty());
    }

    #[test]
    fn flat_bright_frame_yields_nothing() {
        let data = frame_with(10, 10, |_, _| [255, 255, 255, 255]);
        let frame = Frame::new(10, 10, &data).unwrap();
        let edges = EdgeMap::build(&frame);
        let points = extract_bright_points(&frame, &edges, &PipelineConfig::default());
        assert!(points.is_empty());
    }

    #[test]
    fn square_yields_points_on_its_outline_only() {
        let data = frame_with(100, 100, white_square);
        let frame = Frame::new(100, 100, &data).unwrap();
        let edges = EdgeMap::build(&frame);
        let points = extract_bright_points(&frame, &edges, &PipelineConfig::default());

        // The 10x10 square has a 36-pixel inner outline.
        assert_eq!(points.len(), 36);
        for point in &points {
            let on_outline = point.x == 45 || point.x == 54 || point.y == 45 || point.y == 54;
            assert!(on_outline, "({}, {}) is not on the outline", point.x, point.y);
            assert_eq!(point.color, [1.0, 1.0, 1.0]);
            assert!(point.brightness > 200.0);
        }
    }

    #[test]
    fn output_is_in_scan_order() {
        let data = frame_with(100, 100, white_square);
        let frame = Frame::new(100, 100, &data).unwrap();
        let edges = EdgeMap::build(&frame);
        let points = extract_bright_points(&frame, &edges, &PipelineConfig::default());
        assert!(points.windows(2).all(|w| (w[0].y, w[0].x) < (w[1].y, w[1].x)));
    }

    #[test]
    fn thresholds_are_strict() {
        let data = frame_with(100, 100, white_square);
        let frame = Frame::new(100, 100, &data).unwrap();
        let edges = EdgeMap::build(&frame);
        let white_luma = frame.pixel(50, 50).luminance();
        let config = PipelineConfig {
            brightness_threshold: white_luma,
            ..PipelineConfig::default()
        };
        assert!(extract_bright_points(&frame, &edges, &config).is_empty());
    }

    #[test]
    fn luma_plane_path_agrees() {
        let data = frame_with(64, 48, |x, y| {
            let v = ((x * 31 + y * 17) % 256) as u8;
            [v, v.wrapping_mul(3), 255 - v, 255]
        });
        let frame = Frame::new(64, 48, &data).unwrap();
        let luma = LumaPlane::from_frame(&frame);
        let edges = EdgeMap::from_luma(&luma);
        let config = PipelineConfig {
            brightness_threshold: 120.0,
            ..PipelineConfig::default()
        };
        let direct = extract_bright_points(&frame, &edges, &config);
        let shared = extract_from_luma(&frame, &luma, &edges, &config);
        assert!(!direct.is_empty());
        assert_eq!(direct, shared);
    }
}
