// Maps pixel coordinates into the renderer's normalized space: x grows to the right
// and y grows upward, both spanning [-1, 1) across the frame. Depth is left at zero;
// the particle buffer applies the configured projection distance when it stores the
// point.

use crate::core_modules::extractor::BrightPoint;

/// A highlight placed in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub brightness: f64,
}

/// Callers must guard against zero-sized frames; `Frame::new` already does.
pub fn project(x: u32, y: u32, width: u32, height: u32) -> [f32; 3] {
    let normalized_x = x as f64 / width as f64 * 2.0 - 1.0;
    let normalized_y = -(y as f64 / height as f64) * 2.0 + 1.0;
    [normalized_x as f32, normalized_y as f32, 0.0]
}

pub fn project_point(point: &BrightPoint, width: u32, height: u32) -> ProjectedPoint {
    ProjectedPoint {
        position: project(point.x, point.y, width, height),
        color: point.color,
        brightness: point.brightness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_and_corners() {
        assert_eq!(project(2, 2, 4, 4), [0.0, 0.0, 0.0]);
        assert_eq!(project(0, 0, 4, 4), [-1.0, 1.0, 0.0]);
        assert_eq!(project(3, 3, 4, 4), [0.5, -0.5, 0.0]);
    }

    #[test]
    fn every_pixel_lands_inside_the_unit_square() {
        for (width, height) in [(1, 1), (3, 7), (640, 480), (1921, 1079)] {
            for y in (0..height).step_by(((height / 13).max(1)) as usize) {
                for x in (0..width).step_by(((width / 17).max(1)) as usize) {
                    let [px, py, pz] = project(x, y, width, height);
                    assert!((-1.0..=1.0).contains(&px), "x {px} for ({x},{y}) in {width}x{height}");
                    assert!((-1.0..=1.0).contains(&py), "y {py} for ({x},{y}) in {width}x{height}");
                    assert_eq!(pz, 0.0);
                }
            }
            let [px, py, _] = project(width - 1, height - 1, width, height);
            assert!(px < 1.0 && py > -1.0);
        }
    }

    #[test]
    fn carries_color_and_brightness() {
        let point = BrightPoint {
            x: 1,
            y: 3,
            brightness: 231.5,
            color: [0.9, 0.8, 0.7],
        };
        let projected = project_point(&point, 4, 4);
        assert_eq!(projected.position, [-0.5, -0.5, 0.0]);
        assert_eq!(projected.color, [0.9, 0.8, 0.7]);
        assert_eq!(projected.brightness, 231.5);
    }
}
