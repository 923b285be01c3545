//! Walk-through demo
//!
//! Builds camera paths around a small synthetic scene, inspects keyframe
//! files, previews them in real time and records them to PNG sequences:
//!
//! ```text
//! walkthrough create orbit.kf --keyframes 8 --radius 6
//! walkthrough info orbit.kf
//! walkthrough preview orbit.kf
//! walkthrough record orbit.kf --output frames/orbit.png
//! ```

use anyhow::{bail, Context, Result};
use camrail_algorithms::build_trajectory;
use camrail_core::{BoundingBox, Drawable, Point3f, Vector3f};
use camrail_io::read_keyframe_file;
use camrail_visualization::{
    suggested_output_path, Camera, ImageSequenceEncoder, LiveCamera, PlaybackDriver, PreviewClock,
    RecordSettings, RenderSurface, StopReason, WalkStatus, WalkThrough, WalkThroughConfig,
};
use clap::{Parser, Subcommand};
use image::{Rgba, RgbaImage};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "walkthrough")]
#[command(about = "Keyframe camera path walk-through demo", long_about = None)]
struct Cli {
    /// Walk-through settings (TOML); defaults are used when the file is missing
    #[arg(long, default_value = "walkthrough.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an orbit path around the demo scene
    Create {
        /// Output keyframe file
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 8)]
        keyframes: usize,
        #[arg(long, default_value_t = 6.0)]
        radius: f32,
        /// Record keyframes as a walking character instead of a free camera
        #[arg(long)]
        walking: bool,
    },
    /// Print a summary of a keyframe file
    Info { file: PathBuf },
    /// Play a keyframe file in real time
    Preview {
        file: PathBuf,
        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// Render a keyframe file to a PNG sequence
    Record {
        file: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 320)]
        width: u32,
        #[arg(long, default_value_t = 240)]
        height: u32,
    },
}

/// Demo scene: a ground grid with a box standing on it
fn demo_scene() -> Vec<Point3f> {
    let mut points = Vec::new();
    for i in -10..=10 {
        for j in -10..=10 {
            points.push(Point3f::new(i as f32 * 0.5, j as f32 * 0.5, 0.0));
        }
    }
    for i in 0..=10 {
        let t = i as f32 * 0.2 - 1.0;
        for (x, y) in [(t, -1.0), (t, 1.0), (-1.0, t), (1.0, t)] {
            points.push(Point3f::new(x, y, 0.0));
            points.push(Point3f::new(x, y, 2.0));
        }
        for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            points.push(Point3f::new(x, y, t + 1.0));
        }
    }
    points
}

/// Software surface splatting the scene points through the live camera
struct PointSurface {
    lens: Camera,
    scene: Vec<Point3f>,
    width: u32,
    height: u32,
    redraws: usize,
}

impl PointSurface {
    fn new(scene: Vec<Point3f>, width: u32, height: u32) -> Self {
        let mut lens = Camera::default();
        lens.aspect_ratio = width as f32 / height.max(1) as f32;
        Self {
            lens,
            scene,
            width,
            height,
            redraws: 0,
        }
    }
}

impl RenderSurface for PointSurface {
    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn render_frame(&mut self, camera: &dyn LiveCamera) -> camrail_core::Result<RgbaImage> {
        self.lens.set_pose(camera.pose());
        let mut frame = RgbaImage::from_pixel(self.width, self.height, Rgba([24, 24, 32, 255]));
        for point in &self.scene {
            let Some(ndc) = self.lens.project(point) else {
                continue;
            };
            let x = ((ndc.x + 1.0) * 0.5 * (self.width - 1) as f32).round() as u32;
            let y = ((1.0 - ndc.y) * 0.5 * (self.height - 1) as f32).round() as u32;
            let shade = (80.0 + point.z * 80.0).min(255.0) as u8;
            frame.put_pixel(x, y, Rgba([shade, 220, 255 - shade, 255]));
        }
        Ok(frame)
    }
}

fn create(config: &WalkThroughConfig, output: PathBuf, keyframes: usize, radius: f32, walking: bool) -> Result<()> {
    if keyframes == 0 {
        bail!("an orbit needs at least one keyframe");
    }
    let scene = demo_scene();
    let mut walk = WalkThrough::from_config(config)?;
    walk.set_status(if walking { WalkStatus::WalkingMode } else { WalkStatus::FreeMode });

    let changes = Arc::new(Mutex::new(0usize));
    let counter = changes.clone();
    walk.subscribe_path_modified(move |_| {
        if let Ok(mut count) = counter.lock() {
            *count += 1;
        }
    });

    let mut camera = Camera::default();
    camera.set_scene_bounding_box(&scene.bounding_box());
    let center = scene.center();

    for i in 0..keyframes {
        let angle = i as f32 / keyframes as f32 * std::f32::consts::TAU;
        let eye = center + Vector3f::new(angle.cos() * radius, angle.sin() * radius, radius * 0.4);
        if let Some(pose) = camrail_core::Pose::look_at(eye, center, Vector3f::z()) {
            camera.set_pose(pose);
        }
        if walking {
            let ground = Point3f::new(eye.x * 0.5, eye.y * 0.5, 0.0);
            walk.walk_to(ground, &mut camera)?;
        } else {
            walk.record_keyframe(&camera)?;
        }
    }

    walk.set_path_visible(true, &mut camera, &[&scene as &dyn Drawable]);
    debug!("scene radius with path: {:.2}", camera.scene_radius());
    walk.export_path(&output)?;
    println!(
        "{} keyframes written to {} ({} path notifications)",
        walk.path().len(),
        output.display(),
        changes.lock().map(|c| *c).unwrap_or_default()
    );
    Ok(())
}

fn print_info(file: PathBuf) -> Result<()> {
    let contents = read_keyframe_file(&file).with_context(|| format!("reading {}", file.display()))?;
    let params = camrail_algorithms::InterpolationParams::new(contents.frame_rate, contents.interpolation_speed)?;
    let trajectory = build_trajectory(&contents.keyframes, &params)?;

    let mut bounds = BoundingBox::empty();
    for keyframe in &contents.keyframes {
        bounds.add_point(&keyframe.position());
    }

    println!("file:                {}", file.display());
    println!("keyframes:           {}", contents.keyframes.len());
    println!("frame rate:          {}", contents.frame_rate);
    println!("interpolation speed: {}", contents.interpolation_speed);
    println!("samples:             {}", trajectory.len());
    println!("duration:            {:.2}s", trajectory.duration().as_secs_f32());
    if bounds.is_valid() {
        println!("path extent:         {:.2}", bounds.diagonal().norm());
    }
    Ok(())
}

async fn preview(config: &WalkThroughConfig, file: PathBuf, max_frames: Option<usize>) -> Result<()> {
    let scene = demo_scene();
    let mut camera = Camera::default();
    camera.set_scene_bounding_box(&scene.bounding_box());
    let mut walk = WalkThrough::from_config(config)?;
    walk.import_path(&file, &mut camera)?;
    debug!("scene radius with path: {:.2}", camera.scene_radius());

    let mut surface = PointSurface::new(scene, 64, 48);
    let mut driver = PlaybackDriver::new(config.glide_duration_secs);

    let finished = Arc::new(Mutex::new(None));
    let sink = finished.clone();
    driver.subscribe(move |event| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(*event);
        }
    });

    driver.start_preview(&mut walk)?;
    let mut clock = PreviewClock::start(walk.interpolator().params().playback_interval());
    let mut frames = 0;
    while clock.next_tick().await {
        if !driver.tick(&mut walk, &mut camera, &mut surface) {
            break;
        }
        frames += 1;
        debug!("frame {} at {:?}", frames, camera.pose().position);
        if max_frames.is_some_and(|max| frames >= max) {
            driver.stop_preview(&mut walk);
        }
        if !driver.is_previewing() {
            break;
        }
    }
    clock.stop();

    let stopped = finished.lock().ok().and_then(|slot| *slot);
    if let Some(event) = stopped {
        let outcome = match event.reason {
            StopReason::Finished => "finished",
            StopReason::Cancelled => "cancelled",
        };
        println!(
            "preview {}: {} frames in {:.2}s",
            outcome,
            event.frames_shown,
            event.elapsed.as_secs_f32()
        );
    }
    Ok(())
}

fn record(config: &WalkThroughConfig, file: PathBuf, output: Option<PathBuf>, width: u32, height: u32) -> Result<()> {
    if width < 2 || height < 2 {
        bail!("frame size must be at least 2x2");
    }
    let scene = demo_scene();
    let mut camera = Camera::default();
    camera.set_scene_bounding_box(&scene.bounding_box());
    let mut walk = WalkThrough::from_config(config)?;
    walk.import_path(&file, &mut camera)?;

    let output = output.unwrap_or_else(|| suggested_output_path(file.to_str(), "png"));
    let settings = RecordSettings {
        output: output.clone(),
        frame_rate: walk.interpolator().frame_rate(),
        bit_rate: config.bit_rate,
        show_progress: config.show_progress,
    };

    let mut surface = PointSurface::new(scene, width, height);
    let mut encoder = ImageSequenceEncoder::new();
    let mut driver = PlaybackDriver::new(config.glide_duration_secs);

    let summary = driver.record(&mut walk, &mut camera, &mut surface, &mut encoder, &settings)?;
    info!("{} redraw requests during recording", surface.redraws);
    println!(
        "{} frames recorded next to {} in {:.2}s",
        summary.frames,
        output.display(),
        summary.elapsed.as_secs_f32()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = WalkThroughConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Create {
            output,
            keyframes,
            radius,
            walking,
        } => {
            let output = output.unwrap_or_else(|| suggested_output_path(None, camrail_io::KEYFRAME_FILE_EXTENSION));
            create(&config, output, keyframes, radius, walking)
        }
        Command::Info { file } => print_info(file),
        Command::Preview { file, max_frames } => preview(&config, file, max_frames).await,
        Command::Record {
            file,
            output,
            width,
            height,
        } => record(&config, file, output, width, height),
    }
}
