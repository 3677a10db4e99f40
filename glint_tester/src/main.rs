mod sink;
mod source;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glint_vision::core_modules::edge_map::EdgeMap;
use glint_vision::{Frame, FrameDropPolicy, PipelineConfig, PipelineDriver};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sink::SplatSink;
use crate::source::{ImageSequenceSource, list_frames};

/// Replays a directory of frames through the highlight pipeline and renders the
/// resulting point cloud.
#[derive(Debug, Parser)]
struct Args {
    /// Directory of input frames (png, jpg, bmp), replayed in file-name order.
    input: PathBuf,
    /// Directory to write one rendered PNG per pass into.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Also write each input frame's edge map as grayscale PNGs into DIR.
    #[arg(long, value_name = "DIR")]
    dump_edges: Option<PathBuf>,
    /// Minimum luma (0-255) for a highlight.
    #[arg(long, default_value_t = 200.0)]
    brightness_threshold: f64,
    /// Minimum Sobel gradient magnitude for a highlight.
    #[arg(long, default_value_t = 0.2)]
    edge_threshold: f64,
    /// Depth offset applied to every particle.
    #[arg(long, default_value_t = 0.1)]
    projection_distance: f32,
    /// Particle buffer capacity.
    #[arg(long, default_value_t = 5)]
    max_bright_points: usize,
    /// Refresh rate of the render loop.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
    /// Drop refresh slots a slow pass overran instead of delaying the next pass.
    #[arg(long)]
    skip_if_busy: bool,
    /// Start over at the first frame instead of stopping after the last.
    #[arg(long = "loop")]
    looping: bool,
    /// Output canvas size.
    #[arg(long, default_value_t = 640)]
    canvas_width: u32,
    #[arg(long, default_value_t = 480)]
    canvas_height: u32,
    /// Half-width of each rendered particle in canvas pixels.
    #[arg(long, default_value_t = 3)]
    splat_radius: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    let args = Args::parse();

    if let Some(dir) = &args.dump_edges {
        dump_edge_maps(&args.input, dir)?;
    }

    let config = pipeline_config(&args);
    anyhow::ensure!(args.fps > 0.0 && args.fps.is_finite(), "--fps must be positive");
    let refresh_interval = Duration::from_secs_f64(1.0 / args.fps);

    let sink = SplatSink::new(
        args.output.clone(),
        args.canvas_width,
        args.canvas_height,
        args.splat_radius,
    );
    let mut driver = PipelineDriver::new(config, sink).context("invalid pipeline settings")?;
    driver.initialize().context("render target unavailable")?;

    let stop = driver.stop_handle();
    let source = ImageSequenceSource::open(&args.input, args.looping, stop.clone());
    driver.attach_capture(source);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    driver.run(refresh_interval).await?;
    info!(passes = driver.passes(), "replay finished");
    Ok(())
}

fn pipeline_config(args: &Args) -> PipelineConfig {
    PipelineConfig {
        brightness_threshold: args.brightness_threshold,
        edge_threshold: args.edge_threshold,
        projection_distance: args.projection_distance,
        max_bright_points: args.max_bright_points,
        frame_drop_policy: if args.skip_if_busy {
            FrameDropPolicy::Skip
        } else {
            FrameDropPolicy::Delay
        },
    }
}

fn dump_edge_maps(input: &Path, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output).with_context(|| format!("creating {}", output.display()))?;
    for path in list_frames(input)? {
        let image = image::open(&path)
            .with_context(|| format!("decoding {}", path.display()))?
            .into_rgba8();
        let frame = Frame::from_image(&image)?;
        let file_name = path.file_stem().map(|stem| stem.to_os_string()).unwrap_or_default();
        let target = output.join(file_name).with_extension("edges.png");
        EdgeMap::build(&frame)
            .to_luma_image()
            .save(&target)
            .with_context(|| format!("writing {}", target.display()))?;
    }
    info!(dir = %output.display(), "edge maps written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_library() {
        let args = Args::parse_from(["glint_tester", "frames"]);
        assert_eq!(pipeline_config(&args), PipelineConfig::default());
    }

    #[test]
    fn skip_if_busy_selects_the_skip_policy() {
        let args = Args::parse_from([
            "glint_tester",
            "frames",
            "--skip-if-busy",
            "--max-bright-points",
            "8",
        ]);
        let config = pipeline_config(&args);
        assert_eq!(config.frame_drop_policy, FrameDropPolicy::Skip);
        assert_eq!(config.max_bright_points, 8);
    }
}
