use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::executor::block_on;
use log::{info, warn};
use serde::Serialize;
use tw_geometry::{place_on_curve, sample_frame, ArcLength, Frame, Placement, Tube};
use tw_scene::{CachedSource, GltfSource};
use tw_session::{CameraPose, Clock, SceneSession, SessionConfig};

pub fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => Ok(SessionConfig::default()),
    }
}

fn build_tube(config: &SessionConfig) -> Result<Tube> {
    let path = ArcLength::new(config.curve.build()).context("Failed to measure curve")?;
    let tube = Tube::new(path, config.segments, config.tube_radius, config.unit_scale)
        .context("Failed to build tube")?;
    Ok(tube)
}

#[derive(Debug, Serialize)]
struct Sample {
    t: f64,
    frame: Frame,
    placement: Placement,
}

pub fn frames(
    config: &SessionConfig,
    samples: usize,
    offset: Option<f64>,
    out: &mut impl Write,
) -> Result<()> {
    if samples == 0 {
        bail!("--samples must be at least 1");
    }
    let tube = build_tube(config)?;
    let offset = offset.unwrap_or(config.camera_offset);

    let list: Vec<Sample> = (0..samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            let frame = sample_frame(&tube, t);
            Sample {
                t,
                frame,
                placement: place_on_curve(&frame, offset),
            }
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &list)?;
    writeln!(out)?;
    Ok(())
}

pub struct TourOptions {
    pub frames: usize,
    pub fps: f64,
    pub next_every: Option<f64>,
    pub assets: Option<PathBuf>,
    pub realtime: bool,
}

pub fn tour(config: SessionConfig, options: &TourOptions, out: &mut impl Write) -> Result<()> {
    if !(options.fps > 0.0) {
        bail!("--fps must be positive");
    }
    let frame_time = Duration::try_from_secs_f64(1.0 / options.fps)
        .with_context(|| format!("--fps {} gives an unusable frame time", options.fps))?;
    let next_every = match options.next_every {
        Some(secs) if !(secs.is_finite() && secs > 0.0) => {
            bail!("--next-every must be a positive number of seconds, got {}", secs)
        }
        Some(secs) => Some(
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("--next-every {} is out of range", secs))?,
        ),
        None => None,
    };
    let mut session = SceneSession::new(config).context("Failed to build session")?;

    match &options.assets {
        Some(dir) => {
            let source = CachedSource::new(GltfSource::new(dir));
            let report = block_on(session.load_models(&source));
            info!(
                "{} models placed, {} failed ({} files read)",
                report.loaded,
                report.failed.len(),
                source.cached()
            );
        }
        None => info!("No asset directory given; touring without models"),
    }

    let mut next_request = next_every;
    let clock = Clock::new();

    for i in 0..options.frames {
        let now = if options.realtime {
            clock.elapsed()
        } else {
            frame_time * i as u32
        };

        if let (Some(at), Some(every)) = (next_request, next_every) {
            if now >= at {
                session.request_next(now);
                next_request = Some(at + every);
            }
        }

        let pose: CameraPose = session.frame(now);
        serde_json::to_writer(&mut *out, &pose)?;
        writeln!(out)?;

        if options.realtime {
            thread::sleep(frame_time);
        }
    }

    let report = session.dispose();
    info!(
        "tour finished after {} frames, released {} nodes",
        options.frames, report.nodes_released
    );
    Ok(())
}

pub fn mesh(config: &SessionConfig, out_path: &Path) -> Result<()> {
    let tube = build_tube(config)?;
    let mesh = tube.to_mesh(config.radial_segments);
    if mesh.triangle_count() == 0 {
        warn!("Tube mesh is empty");
    }
    std::fs::write(out_path, mesh.to_obj("tube"))
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    info!(
        "Wrote {} ({} vertices, {} triangles)",
        out_path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}
