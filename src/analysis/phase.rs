use serde::{Deserialize, Serialize};
use tracing::info;

use super::measure::Measurements;
use super::rules::{FeedbackTag, RepFeedback, RuleEvaluator};
use crate::config::RuleThresholds;

/// スクワットの半周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    /// 立位 (初期状態)
    #[default]
    Up,
    /// しゃがみ中
    Down,
}

/// 1回分のレップ完了結果
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRep {
    /// 1始まりの通し番号
    pub number: u32,
    pub feedback: Vec<FeedbackTag>,
    pub min_knee_angle: f32,
    pub max_hip_angle_at_top: f32,
}

/// UP/DOWN 状態機械
///
/// 閾値ちょうどの膝角度では遷移しない (両方向とも厳密不等号)。
pub struct RepTracker {
    rules: RuleEvaluator,
    phase: Phase,
    rep_counter: u32,
    /// DOWN フェーズ中の最小膝角度
    min_knee_angle: f32,
    /// UP フェーズ中の最大股関節角度
    max_hip_angle_at_top: f32,
    feedback: RepFeedback,
}

impl RepTracker {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self {
            rules: RuleEvaluator::new(thresholds),
            phase: Phase::Up,
            rep_counter: 0,
            min_knee_angle: 180.0,
            max_hip_angle_at_top: 0.0,
            feedback: RepFeedback::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_counter
    }

    pub fn min_knee_angle(&self) -> f32 {
        self.min_knee_angle
    }

    pub fn max_hip_angle_at_top(&self) -> f32 {
        self.max_hip_angle_at_top
    }

    /// Feedback of the repetition in progress (or the last completed one while UP).
    pub fn current_feedback(&self) -> &RepFeedback {
        &self.feedback
    }

    pub fn rules(&self) -> &RuleEvaluator {
        &self.rules
    }

    /// 1フレーム分の計測値で状態を更新する。レップが完了したら結果を返す
    pub fn update(&mut self, m: &Measurements) -> Option<CompletedRep> {
        let transition_angle = self.rules.thresholds().rep_transition_angle;

        if self.phase == Phase::Up {
            self.max_hip_angle_at_top = self.max_hip_angle_at_top.max(m.hip_angle);
            if m.knee_angle < transition_angle {
                self.phase = Phase::Down;
                self.min_knee_angle = m.knee_angle;
                self.feedback.clear();
                // 遷移したフレームもそのまま DOWN として評価する
            } else {
                return None;
            }
        }

        if m.knee_angle > transition_angle {
            return Some(self.complete_rep());
        }

        self.min_knee_angle = self.min_knee_angle.min(m.knee_angle);
        self.rules.check_down_phase(m, &mut self.feedback);
        None
    }

    fn complete_rep(&mut self) -> CompletedRep {
        self.phase = Phase::Up;
        self.rep_counter += 1;
        self.rules
            .check_up_phase(self.min_knee_angle, self.max_hip_angle_at_top, &mut self.feedback);

        let rep = CompletedRep {
            number: self.rep_counter,
            feedback: self.feedback.tags().to_vec(),
            min_knee_angle: self.min_knee_angle,
            max_hip_angle_at_top: self.max_hip_angle_at_top,
        };
        info!(
            "rep {} completed: {:?} (min knee {:.1}, max hip at top {:.1})",
            rep.number, rep.feedback, rep.min_knee_angle, rep.max_hip_angle_at_top
        );

        self.max_hip_angle_at_top = 0.0;
        rep
    }
}
