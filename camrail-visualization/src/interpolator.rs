//! Keyframe interpolator
//!
//! Owns the timing parameters, caches the trajectory of the current path and
//! runs interpolation sessions over it. A cancelled session is parked and
//! resumed on the next start as long as neither the path nor the timing
//! changed in between.

use camrail_algorithms::{build_trajectory, InterpolationParams, Trajectory, TrajectorySample};
use camrail_core::{CameraPath, Error, Result, Signal, SubscriptionId};
use camrail_io::{KeyframeReader, KeyframeWriter};
use log::{debug, error, info, warn};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Payload of the "interpolation stopped" notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpolationStopped {
    /// Samples consumed by the session
    pub played: usize,
    /// Samples in the session's trajectory
    pub total: usize,
    /// `true` when every sample was consumed, `false` on an explicit stop
    pub finished: bool,
}

/// A pass over one trajectory with its own cursor
#[derive(Debug, Clone)]
pub struct InterpolationSession {
    trajectory: Arc<Trajectory>,
    cursor: usize,
    revision: u64,
    params: InterpolationParams,
}

impl InterpolationSession {
    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    /// Index of the next sample
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.trajectory.len().saturating_sub(self.cursor)
    }

    fn matches(&self, revision: u64, params: &InterpolationParams) -> bool {
        self.revision == revision && self.params == *params
    }
}

#[derive(Debug)]
struct CachedTrajectory {
    revision: u64,
    params: InterpolationParams,
    trajectory: Arc<Trajectory>,
}

/// Produces and plays back the trajectory of a camera path
#[derive(Debug, Default)]
pub struct KeyframeInterpolator {
    params: InterpolationParams,
    cache: Option<CachedTrajectory>,
    session: Option<InterpolationSession>,
    parked: Option<InterpolationSession>,
    interpolation_stopped: Signal<InterpolationStopped>,
}

impl KeyframeInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interpolator with validated timing parameters
    pub fn with_params(params: InterpolationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    pub fn params(&self) -> InterpolationParams {
        self.params
    }

    pub fn frame_rate(&self) -> u32 {
        self.params.frame_rate
    }

    pub fn interpolation_speed(&self) -> f32 {
        self.params.interpolation_speed
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) -> Result<()> {
        self.set_params(InterpolationParams {
            frame_rate,
            ..self.params
        })
    }

    pub fn set_interpolation_speed(&mut self, interpolation_speed: f32) -> Result<()> {
        self.set_params(InterpolationParams {
            interpolation_speed,
            ..self.params
        })
    }

    /// Replace both timing parameters; rejected values leave the old ones
    pub fn set_params(&mut self, params: InterpolationParams) -> Result<()> {
        if let Err(e) = params.validate() {
            warn!("{}", e);
            return Err(e);
        }
        if params != self.params {
            debug!(
                "timing changed: {} fps, speed {}",
                params.frame_rate, params.interpolation_speed
            );
            self.params = params;
        }
        Ok(())
    }

    /// The trajectory of `path` under the current timing, rebuilt only when
    /// the path revision or the timing differs from the cached one.
    pub fn interpolate(&mut self, path: &CameraPath) -> Result<Arc<Trajectory>> {
        if let Some(cache) = &self.cache {
            if cache.revision == path.revision() && cache.params == self.params {
                return Ok(cache.trajectory.clone());
            }
        }

        let trajectory = Arc::new(build_trajectory(path.keyframes(), &self.params)?);
        debug!(
            "trajectory rebuilt for path revision {} ({} samples)",
            path.revision(),
            trajectory.len()
        );
        self.cache = Some(CachedTrajectory {
            revision: path.revision(),
            params: self.params,
            trajectory: trajectory.clone(),
        });
        Ok(trajectory)
    }

    /// Start a session over the trajectory of `path`.
    ///
    /// Resumes the parked session when it still matches the path and timing,
    /// otherwise starts from the first sample.
    pub fn start_interpolation(&mut self, path: &CameraPath) -> Result<()> {
        if path.is_empty() {
            warn!("nothing to interpolate (empty path)");
            return Err(Error::EmptyPath("interpolate"));
        }
        if self.session.is_some() {
            return Err(Error::InvalidState("interpolation already started".to_string()));
        }

        let params = self.params;
        let revision = path.revision();
        let session = match self.parked.take() {
            Some(parked) if parked.matches(revision, &params) && parked.remaining() > 0 => {
                info!("interpolation resumed at sample {}", parked.cursor);
                parked
            }
            _ => {
                let trajectory = self.interpolate(path)?;
                info!(
                    "interpolation started: {} samples, {:.2}s",
                    trajectory.len(),
                    trajectory.duration().as_secs_f32()
                );
                InterpolationSession {
                    trajectory,
                    cursor: 0,
                    revision,
                    params,
                }
            }
        };
        self.session = Some(session);
        Ok(())
    }

    /// Cancel the running session and park it for resuming.
    /// Returns `false` when no session was running.
    pub fn stop_interpolation(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        self.interpolation_stopped.emit(&InterpolationStopped {
            played: session.cursor,
            total: session.trajectory.len(),
            finished: false,
        });
        debug!("interpolation stopped at sample {}", session.cursor);
        self.parked = Some(session);
        true
    }

    /// Consume the next sample of the running session.
    ///
    /// Handing out the last sample finishes the session, which then restarts
    /// from the beginning on the next start.
    pub fn next_sample(&mut self) -> Option<TrajectorySample> {
        let session = self.session.as_mut()?;
        let sample = *session.trajectory.get(session.cursor)?;
        session.cursor += 1;

        if session.remaining() == 0 {
            let total = session.trajectory.len();
            self.session = None;
            self.parked = None;
            self.interpolation_stopped.emit(&InterpolationStopped {
                played: total,
                total,
                finished: true,
            });
            info!("interpolation finished ({} samples)", total);
        }
        Some(sample)
    }

    pub fn is_interpolation_started(&self) -> bool {
        self.session.is_some()
    }

    /// The running session, if any
    pub fn session(&self) -> Option<&InterpolationSession> {
        self.session.as_ref()
    }

    /// Drop the parked session so the next start begins at the first sample
    pub fn rewind(&mut self) {
        self.parked = None;
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&InterpolationStopped) + Send + 'static,
    {
        self.interpolation_stopped.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.interpolation_stopped.unsubscribe(id)
    }

    /// Write `path` with the current timing
    pub fn try_save_keyframes<W: Write>(&self, path: &CameraPath, writer: W) -> Result<()> {
        KeyframeWriter::write(
            writer,
            self.params.frame_rate,
            self.params.interpolation_speed,
            path.keyframes(),
        )
    }

    /// Replace `path` and the timing with the contents of a keyframe file.
    /// On failure neither is touched.
    pub fn try_read_keyframes<R: BufRead>(&mut self, path: &mut CameraPath, reader: R) -> Result<()> {
        let file = KeyframeReader::read(reader)?;
        let params = InterpolationParams::new(file.frame_rate, file.interpolation_speed)?;

        self.stop_interpolation();
        self.parked = None;
        self.params = params;
        path.replace_all(file.keyframes);
        info!(
            "{} keyframes read ({} fps, speed {})",
            path.len(),
            params.frame_rate,
            params.interpolation_speed
        );
        Ok(())
    }

    pub fn save_keyframes<W: Write>(&self, path: &CameraPath, writer: W) -> bool {
        match self.try_save_keyframes(path, writer) {
            Ok(()) => true,
            Err(e) => {
                error!("failed saving keyframes: {}", e);
                false
            }
        }
    }

    pub fn read_keyframes<R: BufRead>(&mut self, path: &mut CameraPath, reader: R) -> bool {
        match self.try_read_keyframes(path, reader) {
            Ok(()) => true,
            Err(e) => {
                error!("failed reading keyframes: {}", e);
                false
            }
        }
    }
}
