//! Technique rules evaluated while a repetition is in progress and when it completes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::measure::Measurements;
use crate::config::RuleThresholds;

/// Classification attached to a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackTag {
    GoodRep,
    BendForward,
    KneeOverToe,
    LowerYourHips,
    SquatTooDeep,
    BendBackwards,
}

impl FeedbackTag {
    pub fn is_error(self) -> bool {
        self != FeedbackTag::GoodRep
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackTag::GoodRep => "GOOD_REP",
            FeedbackTag::BendForward => "BEND_FORWARD",
            FeedbackTag::KneeOverToe => "KNEE_OVER_TOE",
            FeedbackTag::LowerYourHips => "LOWER_YOUR_HIPS",
            FeedbackTag::SquatTooDeep => "SQUAT_TOO_DEEP",
            FeedbackTag::BendBackwards => "BEND_BACKWARDS",
        }
    }
}

impl fmt::Display for FeedbackTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinct tags of one repetition, in the order they were first raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepFeedback {
    tags: Vec<FeedbackTag>,
}

impl RepFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the tag was already recorded.
    pub fn insert(&mut self, tag: FeedbackTag) -> bool {
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: FeedbackTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn has_errors(&self) -> bool {
        self.tags.iter().any(|t| t.is_error())
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[FeedbackTag] {
        &self.tags
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

pub struct RuleEvaluator {
    thresholds: RuleThresholds,
}

impl RuleEvaluator {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Checks run on every DOWN frame against that frame's measurements.
    pub fn check_down_phase(&self, m: &Measurements, feedback: &mut RepFeedback) {
        if m.hip_angle < self.thresholds.body_bend_forward_threshold {
            feedback.insert(FeedbackTag::BendForward);
        }
        if m.knee_foot_diff.abs() > self.knee_threshold(m.shoulder_width) {
            feedback.insert(FeedbackTag::KneeOverToe);
        }
    }

    /// Checks run once when a repetition completes, against the phase extrema.
    pub fn check_up_phase(
        &self,
        min_knee_angle: f32,
        max_hip_angle_at_top: f32,
        feedback: &mut RepFeedback,
    ) {
        if min_knee_angle > self.thresholds.squat_depth_good_max {
            feedback.insert(FeedbackTag::LowerYourHips);
        }
        if min_knee_angle < self.thresholds.squat_depth_good_min {
            feedback.insert(FeedbackTag::SquatTooDeep);
        }
        if max_hip_angle_at_top > self.thresholds.body_bend_backwards_threshold {
            feedback.insert(FeedbackTag::BendBackwards);
        }
        if !feedback.has_errors() {
            feedback.insert(FeedbackTag::GoodRep);
        }
    }

    /// Allowed horizontal knee/toe offset for the given shoulder width.
    pub fn knee_threshold(&self, shoulder_width: f32) -> f32 {
        shoulder_width * self.thresholds.knee_over_toe_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements(hip_angle: f32, knee_foot_diff: f32) -> Measurements {
        Measurements {
            knee_angle: 90.0,
            hip_angle,
            shoulder_width: 0.1,
            knee_foot_diff,
        }
    }

    #[test]
    fn test_tag_wire_names() {
        assert_eq!(serde_json::to_string(&FeedbackTag::GoodRep).unwrap(), "\"GOOD_REP\"");
        assert_eq!(serde_json::to_string(&FeedbackTag::KneeOverToe).unwrap(), "\"KNEE_OVER_TOE\"");
        let tag: FeedbackTag = serde_json::from_str("\"LOWER_YOUR_HIPS\"").unwrap();
        assert_eq!(tag, FeedbackTag::LowerYourHips);
        assert_eq!(FeedbackTag::SquatTooDeep.to_string(), "SQUAT_TOO_DEEP");
    }

    #[test]
    fn test_rep_feedback_is_distinct() {
        let mut fb = RepFeedback::new();
        assert!(fb.insert(FeedbackTag::BendForward));
        assert!(!fb.insert(FeedbackTag::BendForward));
        assert!(fb.insert(FeedbackTag::KneeOverToe));
        assert_eq!(fb.tags(), &[FeedbackTag::BendForward, FeedbackTag::KneeOverToe]);
    }

    #[test]
    fn test_down_phase_neutral() {
        let rules = RuleEvaluator::new(RuleThresholds::default());
        let mut fb = RepFeedback::new();
        rules.check_down_phase(&measurements(90.0, 0.0), &mut fb);
        assert!(fb.is_empty());
    }

    #[test]
    fn test_down_phase_bend_forward() {
        let rules = RuleEvaluator::new(RuleThresholds::default());
        let mut fb = RepFeedback::new();
        rules.check_down_phase(&measurements(30.0, 0.0), &mut fb);
        rules.check_down_phase(&measurements(25.0, 0.0), &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::BendForward]);
    }

    #[test]
    fn test_down_phase_knee_over_toe_either_side() {
        let rules = RuleEvaluator::new(RuleThresholds::default());
        // 0.1 * 0.45 = 0.045
        let mut fb = RepFeedback::new();
        rules.check_down_phase(&measurements(90.0, 0.04), &mut fb);
        assert!(fb.is_empty());
        rules.check_down_phase(&measurements(90.0, -0.05), &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::KneeOverToe]);
    }

    #[test]
    fn test_up_phase_good() {
        let rules = RuleEvaluator::new(RuleThresholds::default());
        let mut fb = RepFeedback::new();
        rules.check_up_phase(90.0, 170.0, &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::GoodRep]);
    }

    #[test]
    fn test_up_phase_depth_errors() {
        let rules = RuleEvaluator::new(RuleThresholds::default());

        let mut shallow = RepFeedback::new();
        rules.check_up_phase(130.0, 170.0, &mut shallow);
        assert_eq!(shallow.tags(), &[FeedbackTag::LowerYourHips]);

        let mut deep = RepFeedback::new();
        rules.check_up_phase(60.0, 170.0, &mut deep);
        assert_eq!(deep.tags(), &[FeedbackTag::SquatTooDeep]);
    }

    #[test]
    fn test_up_phase_bounds_are_strict() {
        let rules = RuleEvaluator::new(RuleThresholds::default());
        let mut fb = RepFeedback::new();
        rules.check_up_phase(110.0, 175.0, &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::GoodRep]);

        let mut fb = RepFeedback::new();
        rules.check_up_phase(75.0, 0.0, &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::GoodRep]);
    }

    #[test]
    fn test_up_phase_keeps_down_errors_and_skips_good() {
        let rules = RuleEvaluator::new(RuleThresholds::default());
        let mut fb = RepFeedback::new();
        fb.insert(FeedbackTag::BendForward);
        rules.check_up_phase(90.0, 178.0, &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::BendForward, FeedbackTag::BendBackwards]);
        assert!(!fb.contains(FeedbackTag::GoodRep));
    }

    #[test]
    fn test_custom_thresholds() {
        let rules = RuleEvaluator::new(RuleThresholds {
            squat_depth_good_max: 140.0,
            ..RuleThresholds::default()
        });
        let mut fb = RepFeedback::new();
        rules.check_up_phase(130.0, 170.0, &mut fb);
        assert_eq!(fb.tags(), &[FeedbackTag::GoodRep]);
        assert!((rules.knee_threshold(0.2) - 0.09).abs() < 1e-6);
    }
}
