// SPDX-License-Identifier: MIT OR Apache-2.0
//! Poses of the tracked VR devices and their interpolation.

use serde::{Deserialize, Serialize};

/// Position and orientation of one tracked device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Pose {
    /// Identity pose at the origin
    pub const IDENTITY: Self = Self {
        position: [0.0; 3],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Interpolate toward `other`, lerping position and slerping rotation
    pub fn interpolate(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: Interpolation::lerp_vec3(self.position, other.position, t),
            rotation: Interpolation::slerp(self.rotation, other.rotation, t),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Poses of every tracked device at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RigPose {
    /// Headset
    pub hmd: Pose,
    /// Right controller
    pub right_hand: Pose,
    /// Left controller (palette)
    pub left_hand: Pose,
    /// Mirror plane
    pub mirror: Pose,
}

impl RigPose {
    /// Interpolate every device toward `other`
    pub fn interpolate(&self, other: &RigPose, t: f32) -> RigPose {
        RigPose {
            hmd: self.hmd.interpolate(&other.hmd, t),
            right_hand: self.right_hand.interpolate(&other.right_hand, t),
            left_hand: self.left_hand.interpolate(&other.left_hand, t),
            mirror: self.mirror.interpolate(&other.mirror, t),
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Interpolate Vec3
    pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
        ]
    }

    /// Interpolate Vec4
    pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
            Self::lerp(a[3], b[3], t),
        ]
    }

    /// Spherical linear interpolation for quaternions
    pub fn slerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let mut dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];

        // Take the short way round
        let mut b = b;
        if dot < 0.0 {
            b = [-b[0], -b[1], -b[2], -b[3]];
            dot = -dot;
        }

        if dot > 0.9995 {
            let result = Self::lerp_vec4(a, b, t);
            let len = (result[0] * result[0]
                + result[1] * result[1]
                + result[2] * result[2]
                + result[3] * result[3])
                .sqrt();
            if len == 0.0 {
                return result;
            }
            return [result[0] / len, result[1] / len, result[2] / len, result[3] / len];
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        [
            a[0] * s0 + b[0] * s1,
            a[1] * s0 + b[1] * s1,
            a[2] * s0 + b[2] * s1,
            a[3] * s0 + b[3] * s1,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let b = [0.0, half, 0.0, half];

        assert!(approx(Interpolation::slerp(a, b, 0.0), a));
        assert!(approx(Interpolation::slerp(a, b, 1.0), b));
    }

    #[test]
    fn test_slerp_midpoint_is_unit_length() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [1.0, 0.0, 0.0, 0.0];
        let mid = Interpolation::slerp(a, b, 0.5);
        let len = mid.iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((len - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_pose_interpolation() {
        let a = Pose {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        };
        let b = Pose {
            position: [10.0, -4.0, 2.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        };
        let mid = a.interpolate(&b, 0.25);
        assert_eq!(mid.position, [2.5, -1.0, 0.5]);
        assert!(approx(mid.rotation, [0.0, 0.0, 0.0, 1.0]));
    }
}
