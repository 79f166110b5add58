//! Squat repetition analysis: visibility gate, UP/DOWN phase tracking,
//! technique rules and per-session statistics.

pub mod analyzer;
pub mod gate;
pub mod measure;
pub mod phase;
pub mod rules;
pub mod stats;

pub use analyzer::{FrameResult, PoseAnalyzer};
pub use gate::{is_admitted, CONSULTED_LANDMARKS};
pub use measure::{Diagnostics, Measurements};
pub use phase::{CompletedRep, Phase, RepTracker};
pub use rules::{FeedbackTag, RepFeedback, RuleEvaluator};
pub use stats::{SessionReport, SessionStats};
