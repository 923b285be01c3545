//! Trajectory construction from keyframes
//!
//! Keyframe `i` sits at path-time `i`. The trajectory is sampled at
//! `frame_rate` samples per unit of path-time; each sample carries the
//! wall-clock offset at which a real-time player shows it, which is the
//! path-time divided by the interpolation speed.

use crate::spline::{align_hemispheres, catmull_rom_tangents, hermite, squad, squad_control_points};
use camrail_core::{Error, Keyframe, Pose, Result, Rotation3f};
use log::debug;
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Default number of samples per unit of path-time
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Default interpolation speed multiplier
pub const DEFAULT_INTERPOLATION_SPEED: f32 = 1.0;

/// Highest accepted frame rate
pub const MAX_FRAME_RATE: u32 = 240;

/// Accepted interpolation speeds
pub const INTERPOLATION_SPEED_RANGE: RangeInclusive<f32> = 1.0e-3..=1.0e3;

/// Timing parameters controlling trajectory sampling and playback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationParams {
    /// Samples per unit of path-time (and frames per second when recording)
    pub frame_rate: u32,
    /// Playback speed multiplier
    pub interpolation_speed: f32,
}

impl InterpolationParams {
    /// Create validated parameters
    pub fn new(frame_rate: u32, interpolation_speed: f32) -> Result<Self> {
        let params = Self {
            frame_rate,
            interpolation_speed,
        };
        params.validate()?;
        Ok(params)
    }

    /// Reject frame rates outside `1..=MAX_FRAME_RATE` and speeds outside
    /// [`INTERPOLATION_SPEED_RANGE`]
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(Error::InvalidParameter(format!(
                "frame rate must be in 1..={}, got {}",
                MAX_FRAME_RATE, self.frame_rate
            )));
        }
        if !INTERPOLATION_SPEED_RANGE.contains(&self.interpolation_speed) {
            return Err(Error::InvalidParameter(format!(
                "interpolation speed must be in {:?}, got {}",
                INTERPOLATION_SPEED_RANGE, self.interpolation_speed
            )));
        }
        Ok(())
    }

    /// Wall-clock interval between two consecutive samples during playback:
    /// `1 / (frame_rate * interpolation_speed)` seconds.
    pub fn playback_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / (self.frame_rate as f64 * self.interpolation_speed as f64))
    }
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            interpolation_speed: DEFAULT_INTERPOLATION_SPEED,
        }
    }
}

/// One sampled camera pose of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub pose: Pose,
    /// Position along the path, in keyframe units
    pub path_time: f32,
    /// Offset from the start of playback, in seconds
    pub time: f32,
}

/// An ordered sequence of sampled poses covering a camera path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&TrajectorySample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectorySample> {
        self.samples.iter()
    }

    /// Wall-clock duration of real-time playback
    pub fn duration(&self) -> Duration {
        self.samples
            .last()
            .map(|s| Duration::from_secs_f32(s.time))
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectorySample;
    type IntoIter = std::slice::Iter<'a, TrajectorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Evaluates the smooth curve through a fixed set of keyframes
struct KeyframeCurve {
    positions: Vec<camrail_core::Point3f>,
    tangents: Vec<camrail_core::Vector3f>,
    rotations: Vec<Rotation3f>,
    controls: Vec<Rotation3f>,
}

impl KeyframeCurve {
    fn new(keyframes: &[Keyframe]) -> Self {
        let positions: Vec<_> = keyframes.iter().map(|k| k.position()).collect();
        let tangents = catmull_rom_tangents(&positions);

        let orientations: Vec<_> = keyframes.iter().map(|k| k.orientation()).collect();
        let aligned = align_hemispheres(&orientations);
        let controls = squad_control_points(&aligned);
        let rotations = aligned.into_iter().map(UnitQuaternion::new_unchecked).collect();

        Self {
            positions,
            tangents,
            rotations,
            controls,
        }
    }

    fn last_time(&self) -> f32 {
        self.positions.len().saturating_sub(1) as f32
    }

    /// Pose at path-time `t`, clamped to the curve's range
    fn evaluate(&self, t: f32) -> Pose {
        let last = self.positions.len() - 1;
        let t = t.clamp(0.0, self.last_time());
        let segment = (t.floor() as usize).min(last.saturating_sub(1));
        if last == 0 {
            return Pose::new(self.positions[0], self.rotations[0]);
        }
        let local = t - segment as f32;
        let (i, j) = (segment, segment + 1);

        let position = hermite(
            &self.positions[i],
            &self.tangents[i],
            &self.positions[j],
            &self.tangents[j],
            local,
        );
        let orientation = squad(
            &self.rotations[i],
            &self.controls[i],
            &self.controls[j],
            &self.rotations[j],
            local,
        );
        Pose::new(position, orientation)
    }
}

/// Build the sampled trajectory for a sequence of keyframes.
///
/// Zero keyframes give an empty trajectory, one keyframe a single sample equal
/// to it. Otherwise sample `k` sits at path-time `k / frame_rate`, with a final
/// sample exactly on the last keyframe.
pub fn build_trajectory(keyframes: &[Keyframe], params: &InterpolationParams) -> Result<Trajectory> {
    params.validate()?;

    if keyframes.is_empty() {
        return Ok(Trajectory::default());
    }

    let curve = KeyframeCurve::new(keyframes);
    let last_time = curve.last_time();
    let fps = params.frame_rate as f32;
    let speed = params.interpolation_speed;

    let step_count = (last_time * fps).round() as usize;
    let mut samples = Vec::with_capacity(step_count + 1);
    for k in 0..=step_count {
        let path_time = if k == step_count { last_time } else { k as f32 / fps };
        samples.push(TrajectorySample {
            pose: curve.evaluate(path_time),
            path_time,
            time: path_time / speed,
        });
    }

    debug!(
        "trajectory built: {} keyframes, {} samples, {:.2}s",
        keyframes.len(),
        samples.len(),
        last_time / speed
    );
    Ok(Trajectory { samples })
}
