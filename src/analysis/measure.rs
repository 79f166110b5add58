use serde::{Deserialize, Serialize};

use crate::pose::{joint_angle, LandmarkIndex, Pose};

/// Per-frame quantities the phase tracker and rules work from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// hip-knee-ankle
    pub knee_angle: f32,
    /// shoulder-hip-knee
    pub hip_angle: f32,
    pub shoulder_width: f32,
    /// knee.x - foot_index.x (signed)
    pub knee_foot_diff: f32,
}

impl Measurements {
    pub fn from_pose(pose: &Pose) -> Self {
        let shoulder_l = pose.get(LandmarkIndex::LeftShoulder);
        let shoulder_r = pose.get(LandmarkIndex::RightShoulder);
        let hip = pose.get(LandmarkIndex::LeftHip);
        let knee = pose.get(LandmarkIndex::LeftKnee);
        let ankle = pose.get(LandmarkIndex::LeftAnkle);
        let foot = pose.get(LandmarkIndex::LeftFootIndex);

        Self {
            knee_angle: joint_angle(hip, knee, ankle),
            hip_angle: joint_angle(shoulder_l, hip, knee),
            shoulder_width: (shoulder_l.x - shoulder_r.x).abs(),
            knee_foot_diff: knee.x - foot.x,
        }
    }
}

/// Last computed values, exposed for overlays and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub knee_angle: f32,
    pub hip_angle: f32,
    pub knee_foot_diff: f32,
    /// Allowed |knee_foot_diff| for this frame
    pub knee_threshold: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_from_pose() {
        let mut pose = Pose::default();
        pose.set(LandmarkIndex::LeftShoulder, Landmark::new(0.5, 0.2, 0.0, 1.0));
        pose.set(LandmarkIndex::RightShoulder, Landmark::new(0.62, 0.2, 0.0, 1.0));
        pose.set(LandmarkIndex::LeftHip, Landmark::new(0.5, 0.4, 0.0, 1.0));
        pose.set(LandmarkIndex::LeftKnee, Landmark::new(0.7, 0.4, 0.0, 1.0));
        pose.set(LandmarkIndex::LeftAnkle, Landmark::new(0.7, 0.6, 0.0, 1.0));
        pose.set(LandmarkIndex::LeftFootIndex, Landmark::new(0.75, 0.65, 0.0, 1.0));

        let m = Measurements::from_pose(&pose);
        assert!(approx_eq(m.knee_angle, 90.0, 1e-3));
        assert!(approx_eq(m.hip_angle, 90.0, 1e-3));
        assert!(approx_eq(m.shoulder_width, 0.12, 1e-6));
        assert!(approx_eq(m.knee_foot_diff, -0.05, 1e-6));
    }
}
