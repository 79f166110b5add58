//! Offline replay of a recorded pose stream.
//!
//! Input is JSON lines, one `POSE_DATA` payload per line:
//! `{"landmarks": [{"x":..,"y":..,"z":..,"visibility":..}, ...]}` or
//! `{"landmarks": null}` for frames without a detected body.
//! Lines that cannot be read as a pose are logged and skipped.

use std::io::BufRead;

use anyhow::{Context, Result};
use tracing::warn;

use crate::analysis::{FeedbackTag, PoseAnalyzer, SessionReport};
use crate::config::RuleThresholds;
use crate::pose::Pose;
use crate::protocol::PosePayload;

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    /// Frames handed to the analyzer
    pub frames: usize,
    /// Non-empty lines that were not valid pose payloads
    pub skipped: usize,
    pub report: SessionReport,
}

/// A completed repetition and the 1-based input line that completed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayedRep {
    pub line: usize,
    pub number: u32,
    pub feedback: Vec<FeedbackTag>,
}

fn parse_line(raw: &[u8]) -> Result<Option<Option<Pose>>> {
    let line = std::str::from_utf8(raw).context("line is not valid UTF-8")?;
    if line.trim().is_empty() {
        return Ok(None);
    }
    let payload: PosePayload = serde_json::from_str(line)?;
    Ok(Some(payload.into_pose()?))
}

/// Feed every line of `reader` through a fresh analyzer.
///
/// `on_rep` is called for every repetition completed along the way. Only an
/// I/O failure of the reader itself aborts the replay.
pub fn replay<R, F>(reader: R, rules: RuleThresholds, mut on_rep: F) -> Result<ReplaySummary>
where
    R: BufRead,
    F: FnMut(ReplayedRep),
{
    let mut analyzer = PoseAnalyzer::new(rules);
    let mut frames = 0usize;
    let mut skipped = 0usize;

    for (i, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.context("failed to read input")?;
        let line_no = i + 1;

        let pose = match parse_line(&raw) {
            Ok(Some(pose)) => pose,
            Ok(None) => continue,
            Err(e) => {
                warn!("line {}: {:#}", line_no, e);
                skipped += 1;
                continue;
            }
        };

        frames += 1;
        let result = analyzer.process(pose.as_ref());
        if !result.feedback.is_empty() {
            on_rep(ReplayedRep {
                line: line_no,
                number: result.rep_count,
                feedback: result.feedback,
            });
        }
    }

    Ok(ReplaySummary {
        frames,
        skipped,
        report: analyzer.report(),
    })
}
