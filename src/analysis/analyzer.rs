use tracing::debug;

use super::gate::is_admitted;
use super::measure::{Diagnostics, Measurements};
use super::phase::{Phase, RepTracker};
use super::rules::{FeedbackTag, RepFeedback};
use super::stats::{SessionReport, SessionStats};
use crate::config::RuleThresholds;
use crate::pose::Pose;

/// 1フレームの解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    /// ポーズが可視性チェックを通過したか
    pub has_landmarks: bool,
    pub phase: Phase,
    pub rep_count: u32,
    /// このフレームでレップが完了した場合のみ非空
    pub feedback: Vec<FeedbackTag>,
    pub diagnostics: Option<Diagnostics>,
}

/// セッション単位のスクワット解析器
///
/// フレームは順番に1つずつ処理する。可視性の低いフレームや未検出フレームは
/// 状態を一切変えない。
pub struct PoseAnalyzer {
    thresholds: RuleThresholds,
    tracker: RepTracker,
    stats: SessionStats,
    diagnostics: Option<Diagnostics>,
}

impl PoseAnalyzer {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self {
            thresholds,
            tracker: RepTracker::new(thresholds),
            stats: SessionStats::new(),
            diagnostics: None,
        }
    }

    /// `None` はポーズ未検出フレーム
    pub fn process(&mut self, pose: Option<&Pose>) -> FrameResult {
        let pose = match pose {
            Some(p) if is_admitted(p, self.thresholds.min_visibility_threshold) => p,
            _ => {
                self.diagnostics = None;
                return self.result(false, Vec::new());
            }
        };

        let m = Measurements::from_pose(pose);
        let diagnostics = Diagnostics {
            knee_angle: m.knee_angle,
            hip_angle: m.hip_angle,
            knee_foot_diff: m.knee_foot_diff,
            knee_threshold: self.tracker.rules().knee_threshold(m.shoulder_width),
        };
        debug!(
            "knee {:.1} hip {:.1} knee-foot {:.3} (limit {:.3})",
            diagnostics.knee_angle,
            diagnostics.hip_angle,
            diagnostics.knee_foot_diff,
            diagnostics.knee_threshold
        );
        self.diagnostics = Some(diagnostics);

        let feedback = match self.tracker.update(&m) {
            Some(rep) => {
                self.stats.record(&rep.feedback);
                rep.feedback
            }
            None => Vec::new(),
        };
        self.result(true, feedback)
    }

    fn result(&self, has_landmarks: bool, feedback: Vec<FeedbackTag>) -> FrameResult {
        FrameResult {
            has_landmarks,
            phase: self.tracker.phase(),
            rep_count: self.tracker.rep_count(),
            feedback,
            diagnostics: self.diagnostics,
        }
    }

    pub fn report(&self) -> SessionReport {
        self.stats.report(self.tracker.rep_count())
    }

    /// 同じ閾値で新しいセッションを始める
    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }

    pub fn phase(&self) -> Phase {
        self.tracker.phase()
    }

    pub fn rep_count(&self) -> u32 {
        self.tracker.rep_count()
    }

    pub fn current_feedback(&self) -> &RepFeedback {
        self.tracker.current_feedback()
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }
}
