// THEORY:
// The `pipeline` module is the stateless top half of the engine. Given one frame it
// runs every analysis stage in order and returns the highlights as scene-space
// points. It owns no frame memory and keeps nothing between calls, so feeding it
// the same frame twice yields the same points in the same order.
//
// Scheduling, capture readiness and the renderer live one level up, in `driver`.

use crate::core_modules::edge_map::EdgeMap;
use crate::core_modules::extractor::extract_from_luma;
use crate::core_modules::frame::{Frame, LumaPlane};
use crate::core_modules::projector::{ProjectedPoint, project_point};
use crate::core_modules::ranker::rank_and_limit;
use crate::error::{GlintError, Result};

/// What the run loop does when a pass overruns the refresh interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameDropPolicy {
    /// Run every pass; a slow pass pushes the next one back.
    #[default]
    Delay,
    /// Drop the refresh slots that were missed and resume on the next one.
    Skip,
}

/// Tunable thresholds and limits for a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Minimum luma (exclusive, 0..=255) for a pixel to count as bright.
    pub brightness_threshold: f64,
    /// Minimum Sobel magnitude (exclusive) for a pixel to count as an edge.
    pub edge_threshold: f64,
    /// Subtracted from every point's depth when it is written to the particle buffer.
    pub projection_distance: f32,
    /// Capacity of the particle buffer and the ranker's cut-off.
    pub max_bright_points: usize,
    pub frame_drop_policy: FrameDropPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 200.0,
            edge_threshold: 0.2,
            projection_distance: 0.1,
            max_bright_points: 5,
            frame_drop_policy: FrameDropPolicy::Delay,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=255.0).contains(&self.brightness_threshold) {
            return Err(GlintError::InvalidConfig(format!(
                "brightness_threshold must be within 0..=255, got {}",
                self.brightness_threshold
            )));
        }
        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(GlintError::InvalidConfig(format!(
                "edge_threshold must be a non-negative number, got {}",
                self.edge_threshold
            )));
        }
        if !self.projection_distance.is_finite() {
            return Err(GlintError::InvalidConfig(format!(
                "projection_distance must be finite, got {}",
                self.projection_distance
            )));
        }
        if self.max_bright_points == 0 {
            return Err(GlintError::InvalidConfig(
                "max_bright_points must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs the per-frame analysis stack.
#[derive(Debug, Clone)]
pub struct HighlightPipeline {
    config: PipelineConfig,
}

impl HighlightPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// One full pass: edge map, extraction, ranking and projection.
    pub fn process_frame(&self, frame: &Frame<'_>) -> Vec<ProjectedPoint> {
        // Stage 1: Shared luma plane
        let luma = LumaPlane::from_frame(frame);

        // Stage 2: Edge detection
        let edges = EdgeMap::from_luma(&luma);

        // Stage 3: Bright-point extraction
        let candidates = extract_from_luma(frame, &luma, &edges, &self.config);
        let candidate_count = candidates.len();

        // Stage 4: Ranking
        let ranked = rank_and_limit(candidates, self.config.max_bright_points);

        // Stage 5: Projection
        let points: Vec<ProjectedPoint> = ranked
            .iter()
            .map(|point| project_point(point, frame.width(), frame.height()))
            .collect();

        tracing::trace!(
            width = frame.width(),
            height = frame.height(),
            candidates = candidate_count,
            kept = points.len(),
            "pass analysed"
        );
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.brightness_threshold, 200.0);
        assert_eq!(config.edge_threshold, 0.2);
        assert_eq!(config.projection_distance, 0.1);
        assert_eq!(config.max_bright_points, 5);
        assert_eq!(config.frame_drop_policy, FrameDropPolicy::Delay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let bad = [
            PipelineConfig {
                brightness_threshold: 300.0,
                ..Default::default()
            },
            PipelineConfig {
                brightness_threshold: f64::NAN,
                ..Default::default()
            },
            PipelineConfig {
                edge_threshold: -0.5,
                ..Default::default()
            },
            PipelineConfig {
                edge_threshold: f64::INFINITY,
                ..Default::default()
            },
            PipelineConfig {
                projection_distance: f32::NAN,
                ..Default::default()
            },
            PipelineConfig {
                max_bright_points: 0,
                ..Default::default()
            },
        ];
        for config in bad {
            let result = HighlightPipeline::new(config.clone());
            assert!(
                matches!(result, Err(GlintError::InvalidConfig(_))),
                "{config:?} was accepted"
            );
        }
    }

    #[test]
    fn limits_output_to_capacity_sorted_by_brightness() {
        // Two-pixel-wide vertical stripes of decreasing brightness on black.
        let (width, height) = (40u32, 9u32);
        let mut data = vec![0u8; (width * height * 4) as usize];
        for y in 0..height {
            for x in 0..width {
                let i = ((y * width + x) * 4) as usize;
                let level = if x % 4 >= 2 { 255 - (x / 4) as u8 * 3 } else { 0 };
                data[i..i + 4].copy_from_slice(&[level, level, level, 255]);
            }
        }
        let frame = Frame::new(width, height, &data).unwrap();
        let pipeline = HighlightPipeline::new(PipelineConfig {
            max_bright_points: 3,
            ..Default::default()
        })
        .unwrap();

        let points = pipeline.process_frame(&frame);
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|w| w[0].brightness >= w[1].brightness));
        assert!(points[0].brightness > 250.0);
    }

    #[test]
    fn same_frame_same_points() {
        let (width, height) = (32u32, 24u32);
        let data: Vec<u8> = (0..width * height * 4)
            .map(|i| if (i / 4) % 7 == 0 { 255 } else { (i % 97) as u8 })
            .collect();
        let frame = Frame::new(width, height, &data).unwrap();
        let pipeline = HighlightPipeline::new(PipelineConfig::default()).unwrap();
        let first = pipeline.process_frame(&frame);
        let second = pipeline.process_frame(&frame);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
