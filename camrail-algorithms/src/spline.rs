//! Spline primitives for positions and orientations
//!
//! Positions use cubic Hermite segments with Catmull-Rom tangents; rotations
//! use spherical quadrangle interpolation (squad) between unit quaternions.

use camrail_core::{Point3f, Rotation3f, Vector3f};
use nalgebra::{Quaternion, UnitQuaternion};

/// Cubic Hermite interpolation between `p0` and `p1` with tangents `m0`, `m1`
/// for a segment of unit length, `t` in `[0, 1]`.
pub fn hermite(p0: &Point3f, m0: &Vector3f, p1: &Point3f, m1: &Vector3f, t: f32) -> Point3f {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    Point3f::from(p0.coords * h00 + m0 * h10 + p1.coords * h01 + m1 * h11)
}

/// Catmull-Rom tangents for uniformly spaced control points.
///
/// Neighbor indices are clamped at both ends, so the end tangents are one-sided
/// differences. With exactly two points both tangents equal the chord and the
/// Hermite segment is the straight line between them.
pub fn catmull_rom_tangents(points: &[Point3f]) -> Vec<Vector3f> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let prev = i.saturating_sub(1);
            let next = (i + 1).min(n - 1);
            let span = (next - prev) as f32;
            if span > 0.0 {
                (points[next] - points[prev]) / span
            } else {
                Vector3f::zeros()
            }
        })
        .collect()
}

/// Slerp that never panics: falls back to normalized lerp when the two
/// rotations are too close for a well-defined great arc.
pub fn slerp(q0: &Rotation3f, q1: &Rotation3f, t: f32) -> Rotation3f {
    q0.try_slerp(q1, t, 1.0e-6).unwrap_or_else(|| q0.nlerp(q1, t))
}

/// Flip quaternions so consecutive ones lie in the same hemisphere.
///
/// `q` and `-q` encode the same rotation; aligning signs makes every segment
/// follow the shortest arc.
pub fn align_hemispheres(rotations: &[Rotation3f]) -> Vec<Quaternion<f32>> {
    let mut aligned: Vec<Quaternion<f32>> = Vec::with_capacity(rotations.len());
    for q in rotations {
        let mut q = *q.quaternion();
        if let Some(prev) = aligned.last() {
            if prev.dot(&q) < 0.0 {
                q = -q;
            }
        }
        aligned.push(q);
    }
    aligned
}

/// Inner control points for squad.
///
/// `s_i = q_i * exp(-(log(q_i^-1 q_{i+1}) + log(q_i^-1 q_{i-1})) / 4)` for interior
/// points; the end control points are the end rotations themselves, so a path of
/// two rotations degenerates to plain slerp.
pub fn squad_control_points(rotations: &[Quaternion<f32>]) -> Vec<Rotation3f> {
    let n = rotations.len();
    (0..n)
        .map(|i| {
            let qi = UnitQuaternion::new_unchecked(rotations[i]);
            if i == 0 || i + 1 == n {
                return qi;
            }
            let inv = qi.inverse();
            let prev = UnitQuaternion::new_unchecked(rotations[i - 1]);
            let next = UnitQuaternion::new_unchecked(rotations[i + 1]);

            let log_next = (inv * next).ln();
            let log_prev = (inv * prev).ln();
            let tangent = (log_next + log_prev) * -0.25;

            qi * UnitQuaternion::from_quaternion(tangent.exp())
        })
        .collect()
}

/// Spherical quadrangle interpolation on one segment, `t` in `[0, 1]`
pub fn squad(q0: &Rotation3f, s0: &Rotation3f, s1: &Rotation3f, q1: &Rotation3f, t: f32) -> Rotation3f {
    let outer = slerp(q0, q1, t);
    let inner = slerp(s0, s1, t);
    slerp(&outer, &inner, 2.0 * t * (1.0 - t))
}
