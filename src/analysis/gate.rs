use crate::pose::{LandmarkIndex, Pose};

/// Landmarks the squat analysis reads. A frame is only usable if all of them are visible.
pub const CONSULTED_LANDMARKS: [LandmarkIndex; 6] = [
    LandmarkIndex::LeftShoulder,
    LandmarkIndex::RightShoulder,
    LandmarkIndex::LeftHip,
    LandmarkIndex::LeftKnee,
    LandmarkIndex::LeftAnkle,
    LandmarkIndex::LeftFootIndex,
];

/// 可視性チェック: 参照する6点すべてが閾値以上なら true
pub fn is_admitted(pose: &Pose, min_visibility: f32) -> bool {
    CONSULTED_LANDMARKS
        .iter()
        .all(|&index| pose.get(index).is_visible(min_visibility))
}
