pub mod angle;
pub mod landmark;

pub use angle::joint_angle;
pub use landmark::{Landmark, LandmarkIndex, Pose, PoseError};
