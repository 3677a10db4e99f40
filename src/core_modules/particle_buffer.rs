// THEORY:
// The particle buffer is the one piece of memory shared with the renderer. It is
// sized once, from `max_bright_points`, and never reallocated: the renderer can
// hold on to its layout (vertex count, attribute strides) for the life of the
// program.
//
// Each pass overwrites the first `n` slots with that pass's ranked points and sets
// `active_len` to `n`. Slots past `active_len` keep whatever an earlier pass wrote.
// Renderers that want a clean cloud draw only `active_len` points; renderers that
// always draw the full capacity see stale highlights fade out as they are replaced.

use crate::core_modules::projector::ProjectedPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    active_len: usize,
    depth_offset: f32,
}

impl ParticleBuffer {
    pub fn new(capacity: usize, projection_distance: f32) -> Self {
        Self {
            positions: vec![[0.0; 3]; capacity],
            colors: vec![[0.0; 3]; capacity],
            active_len: 0,
            depth_offset: projection_distance,
        }
    }

    /// Stores up to `capacity` points and returns how many were written.
    pub fn write(&mut self, points: &[ProjectedPoint]) -> usize {
        let count = points.len().min(self.capacity());
        for (slot, point) in points.iter().take(count).enumerate() {
            let [x, y, z] = point.position;
            self.positions[slot] = [x, y, z - self.depth_offset];
            self.colors[slot] = point.color;
        }
        self.active_len = count;
        count
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    pub fn active_len(&self) -> usize {
        self.active_len
    }

    /// Every slot, including stale ones.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn active_positions(&self) -> &[[f32; 3]] {
        &self.positions[..self.active_len]
    }

    pub fn active_colors(&self) -> &[[f32; 3]] {
        &self.colors[..self.active_len]
    }
}
