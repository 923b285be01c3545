//! Preview and record playback of a walk-through
//!
//! Preview plays the trajectory in real time, one sample per tick, and can be
//! cancelled at any tick. Record sweeps the whole trajectory synchronously and
//! encodes exactly one frame per sample.

use crate::camera::LiveCamera;
use crate::encoder::{FrameEncoder, RecordSettings};
use crate::surface::RenderSurface;
use crate::timer::{Countdown, TickAccumulator};
use crate::walk_through::{CameraMove, WalkThrough};
use camrail_algorithms::{slerp, Trajectory};
use camrail_core::{Error, Pose, Result, Signal, SubscriptionId};
use instant::Instant;
use log::{debug, info, warn};
use std::time::Duration;

/// Most preview ticks applied by a single update
const MAX_TICKS_PER_UPDATE: usize = 8;

/// Why a preview ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every sample was shown
    Finished,
    /// Stopped before the end
    Cancelled,
}

/// Payload of the "preview stopped" notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStopped {
    pub reason: StopReason,
    /// Samples shown during this run
    pub frames_shown: usize,
    pub elapsed: Duration,
}

/// Outcome of a completed recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordSummary {
    pub frames: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Glide {
    from: Pose,
    to: Pose,
    countdown: Countdown,
}

impl Glide {
    fn pose(&self) -> Pose {
        let t = self.countdown.progress();
        let eased = t * t * (3.0 - 2.0 * t);
        Pose::new(
            self.from.position + (self.to.position - self.from.position) * eased,
            slerp(&self.from.orientation, &self.to.orientation, eased),
        )
    }
}

#[derive(Debug)]
struct PreviewRun {
    clock: TickAccumulator,
    frames_shown: usize,
    started: Instant,
}

/// Drives the live camera along the walk-through trajectory
#[derive(Debug)]
pub struct PlaybackDriver {
    preview: Option<PreviewRun>,
    recording: bool,
    glide: Option<Glide>,
    glide_duration_secs: f32,
    preview_stopped: Signal<PreviewStopped>,
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl PlaybackDriver {
    /// Create a driver gliding to keyframes over `glide_duration_secs`; zero or less snaps
    pub fn new(glide_duration_secs: f32) -> Self {
        Self {
            preview: None,
            recording: false,
            glide: None,
            glide_duration_secs,
            preview_stopped: Signal::new(),
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_gliding(&self) -> bool {
        self.glide.is_some()
    }

    /// Whether interactive camera control is blocked. Gliding does not lock.
    pub fn interaction_locked(&self) -> bool {
        self.is_previewing() || self.recording
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PreviewStopped) + Send + 'static,
    {
        self.preview_stopped.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.preview_stopped.unsubscribe(id)
    }

    /// Start (or resume) previewing. Returns immediately; samples are applied by
    /// [`PlaybackDriver::tick`] or [`PlaybackDriver::update`].
    pub fn start_preview(&mut self, walk: &mut WalkThrough) -> Result<()> {
        if walk.path().is_empty() {
            warn!(
                "nothing to preview (camera path is empty). \
                 You may import a camera path from a file or create it by adding keyframes"
            );
            return Err(Error::EmptyPath("preview"));
        }
        if self.recording {
            return Err(Error::InvalidState("cannot preview while recording".to_string()));
        }
        if self.is_previewing() {
            return Err(Error::InvalidState("preview already running".to_string()));
        }

        walk.start_interpolation()?;
        let interval = walk.interpolator().params().playback_interval();
        self.glide = None;
        self.preview = Some(PreviewRun {
            clock: TickAccumulator::new(interval.as_secs_f64(), MAX_TICKS_PER_UPDATE),
            frames_shown: 0,
            started: Instant::now(),
        });
        info!("preview started...");
        Ok(())
    }

    /// Cancel the running preview. The position is kept for resuming.
    /// Returns `false` when no preview was running.
    pub fn stop_preview(&mut self, walk: &mut WalkThrough) -> bool {
        if !self.is_previewing() {
            return false;
        }
        walk.interpolator_mut().stop_interpolation();
        self.finish_preview(StopReason::Cancelled);
        true
    }

    /// Apply the next sample to the camera and queue a redraw.
    /// Returns `false` when no preview is running.
    pub fn tick(&mut self, walk: &mut WalkThrough, camera: &mut dyn LiveCamera, surface: &mut dyn RenderSurface) -> bool {
        let Some(run) = self.preview.as_mut() else {
            return false;
        };
        if let Some(sample) = walk.interpolator_mut().next_sample() {
            camera.set_pose(sample.pose);
            surface.request_redraw();
            run.frames_shown += 1;
        }
        if !walk.interpolator().is_interpolation_started() {
            self.finish_preview(StopReason::Finished);
        }
        true
    }

    /// Advance by `dt` of wall time: runs the ticks that fell due and the glide.
    /// Returns the number of preview samples applied.
    pub fn update(
        &mut self,
        dt: Duration,
        walk: &mut WalkThrough,
        camera: &mut dyn LiveCamera,
        surface: &mut dyn RenderSurface,
    ) -> usize {
        self.update_glide(dt, camera, surface);

        let due = match self.preview.as_mut() {
            Some(run) => run.clock.tick(dt.as_secs_f64()),
            None => return 0,
        };
        let mut applied = 0;
        for _ in 0..due {
            if !self.is_previewing() {
                break;
            }
            self.tick(walk, camera, surface);
            applied += 1;
        }
        applied
    }

    /// Perform a keyframe navigation move: snap, or glide when animated.
    /// Returns `false` while playback holds the camera.
    pub fn apply_move(&mut self, mv: &CameraMove, camera: &mut dyn LiveCamera, surface: &mut dyn RenderSurface) -> bool {
        if self.interaction_locked() {
            warn!("camera is busy with playback, keyframe {} not shown", mv.index);
            return false;
        }
        if mv.animate && self.glide_duration_secs > 0.0 {
            self.glide = Some(Glide {
                from: camera.pose(),
                to: mv.pose,
                countdown: Countdown::new(self.glide_duration_secs),
            });
        } else {
            self.glide = None;
            camera.set_pose(mv.pose);
        }
        surface.request_redraw();
        true
    }

    /// Play the whole trajectory into `encoder`, one frame per sample.
    ///
    /// A running preview is stopped first. The path is hidden while recording
    /// and its visibility restored afterwards, whether or not recording succeeds.
    pub fn record(
        &mut self,
        walk: &mut WalkThrough,
        camera: &mut dyn LiveCamera,
        surface: &mut dyn RenderSurface,
        encoder: &mut dyn FrameEncoder,
        settings: &RecordSettings,
    ) -> Result<RecordSummary> {
        if walk.path().is_empty() {
            warn!(
                "nothing to record (camera path is empty). \
                 You may import a camera path from a file or create it by adding keyframes"
            );
            return Err(Error::EmptyPath("record"));
        }
        if self.recording {
            return Err(Error::InvalidState("already recording".to_string()));
        }
        self.stop_preview(walk);
        self.glide = None;

        let trajectory = walk.trajectory()?;
        let visible = walk.path_visible();
        if visible {
            walk.set_path_visible_flag(false);
        }

        info!("recording started...");
        let started = Instant::now();
        self.recording = true;
        let result = Self::record_frames(&trajectory, camera, surface, encoder, settings);
        self.recording = false;

        if visible {
            walk.set_path_visible_flag(true);
        }

        let frames = result?;
        let elapsed = started.elapsed();
        info!("recording finished. {} frames in {:.2}s", frames, elapsed.as_secs_f32());
        Ok(RecordSummary { frames, elapsed })
    }

    fn record_frames(
        trajectory: &Trajectory,
        camera: &mut dyn LiveCamera,
        surface: &mut dyn RenderSurface,
        encoder: &mut dyn FrameEncoder,
        settings: &RecordSettings,
    ) -> Result<usize> {
        encoder.open(settings)?;

        let total = trajectory.len();
        let mut last_percent = 0;
        for (index, sample) in trajectory.iter().enumerate() {
            camera.set_pose(sample.pose);
            let encoded = surface
                .render_frame(&*camera)
                .and_then(|frame| encoder.push_frame(index, &frame));
            if let Err(e) = encoded {
                if let Err(close_err) = encoder.close() {
                    warn!("failed closing encoder: {}", close_err);
                }
                return Err(e);
            }

            if settings.show_progress {
                let percent = (index + 1) * 100 / total;
                if percent / 10 > last_percent / 10 {
                    info!("recording: {}% ({}/{})", percent, index + 1, total);
                }
                last_percent = percent;
            }
        }

        encoder.close()?;
        Ok(total)
    }

    fn update_glide(&mut self, dt: Duration, camera: &mut dyn LiveCamera, surface: &mut dyn RenderSurface) {
        let Some(glide) = self.glide.as_mut() else {
            return;
        };
        let done = glide.countdown.tick(dt.as_secs_f32());
        camera.set_pose(glide.pose());
        surface.request_redraw();
        if done {
            debug!("glide finished");
            self.glide = None;
        }
    }

    fn finish_preview(&mut self, reason: StopReason) {
        let Some(run) = self.preview.take() else {
            return;
        };
        let event = PreviewStopped {
            reason,
            frames_shown: run.frames_shown,
            elapsed: run.started.elapsed(),
        };
        match reason {
            StopReason::Finished => info!("preview finished. {:.2}s", event.elapsed.as_secs_f32()),
            StopReason::Cancelled => info!("preview cancelled after {} frames", event.frames_shown),
        }
        self.preview_stopped.emit(&event);
    }
}
