use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rules::FeedbackTag;

/// セッション全体の集計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    good_reps: u32,
    errors: BTreeMap<FeedbackTag, u32>,
}

/// セッション終了時のレポート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub total_reps: u32,
    pub good_reps: u32,
    /// 一度も出なかったタグは含まない
    pub errors: BTreeMap<FeedbackTag, u32>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 完了した1レップのフィードバックを集計に加える
    pub fn record(&mut self, feedback: &[FeedbackTag]) {
        for &tag in feedback {
            if tag.is_error() {
                *self.errors.entry(tag).or_insert(0) += 1;
            } else {
                self.good_reps += 1;
            }
        }
    }

    pub fn good_reps(&self) -> u32 {
        self.good_reps
    }

    pub fn error_count(&self, tag: FeedbackTag) -> u32 {
        self.errors.get(&tag).copied().unwrap_or(0)
    }

    pub fn report(&self, total_reps: u32) -> SessionReport {
        SessionReport {
            total_reps,
            good_reps: self.good_reps,
            errors: self.errors.clone(),
        }
    }
}
