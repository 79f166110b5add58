use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default config file looked up by the binaries.
pub const DEFAULT_CONFIG_PATH: &str = "squat_coach.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rules: RuleThresholds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 待ち受けアドレス
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// 1メッセージの最大バイト数
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
}

fn default_listen_addr() -> String { "127.0.0.1:8765".to_string() }
fn default_max_frame_length() -> usize { 1024 * 1024 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_frame_length: default_max_frame_length(),
        }
    }
}

/// スクワット判定の閾値 (角度は度)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RuleThresholds {
    /// UP/DOWN を分ける膝角度
    #[serde(default = "default_rep_transition_angle")]
    pub rep_transition_angle: f32,
    /// 最下点の膝角度の下限 (これより深いと SQUAT_TOO_DEEP)
    #[serde(default = "default_squat_depth_good_min")]
    pub squat_depth_good_min: f32,
    /// 最下点の膝角度の上限 (これより浅いと LOWER_YOUR_HIPS)
    #[serde(default = "default_squat_depth_good_max")]
    pub squat_depth_good_max: f32,
    /// 下降中の股関節角度の下限 (これ未満で BEND_FORWARD)
    #[serde(default = "default_body_bend_forward_threshold")]
    pub body_bend_forward_threshold: f32,
    /// 立位での股関節角度の上限 (これ超過で BEND_BACKWARDS)
    #[serde(default = "default_body_bend_backwards_threshold")]
    pub body_bend_backwards_threshold: f32,
    /// 膝とつま先の水平距離の上限 (肩幅に対する比率)
    #[serde(default = "default_knee_over_toe_threshold")]
    pub knee_over_toe_threshold: f32,
    /// ランドマークを信用する最小可視性
    #[serde(default = "default_min_visibility_threshold")]
    pub min_visibility_threshold: f32,
}

fn default_rep_transition_angle() -> f32 { 170.0 }
fn default_squat_depth_good_min() -> f32 { 75.0 }
fn default_squat_depth_good_max() -> f32 { 110.0 }
fn default_body_bend_forward_threshold() -> f32 { 50.0 }
fn default_body_bend_backwards_threshold() -> f32 { 175.0 }
fn default_knee_over_toe_threshold() -> f32 { 0.45 }
fn default_min_visibility_threshold() -> f32 { 0.5 }

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            rep_transition_angle: default_rep_transition_angle(),
            squat_depth_good_min: default_squat_depth_good_min(),
            squat_depth_good_max: default_squat_depth_good_max(),
            body_bend_forward_threshold: default_body_bend_forward_threshold(),
            body_bend_backwards_threshold: default_body_bend_backwards_threshold(),
            knee_over_toe_threshold: default_knee_over_toe_threshold(),
            min_visibility_threshold: default_min_visibility_threshold(),
        }
    }
}

impl RuleThresholds {
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("rep_transition_angle", self.rep_transition_angle),
            ("squat_depth_good_min", self.squat_depth_good_min),
            ("squat_depth_good_max", self.squat_depth_good_max),
            ("body_bend_forward_threshold", self.body_bend_forward_threshold),
            ("body_bend_backwards_threshold", self.body_bend_backwards_threshold),
        ];
        for (name, value) in angles {
            if !(value > 0.0 && value <= 180.0) {
                bail!("{} must be in (0, 180], got {}", name, value);
            }
        }
        if self.squat_depth_good_min >= self.squat_depth_good_max {
            bail!(
                "squat_depth_good_min ({}) must be below squat_depth_good_max ({})",
                self.squat_depth_good_min,
                self.squat_depth_good_max
            );
        }
        if !(self.knee_over_toe_threshold > 0.0) {
            bail!("knee_over_toe_threshold must be positive, got {}", self.knee_over_toe_threshold);
        }
        if !(0.0..=1.0).contains(&self.min_visibility_threshold) {
            bail!(
                "min_visibility_threshold must be in [0, 1], got {}",
                self.min_visibility_threshold
            );
        }
        Ok(())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// ファイルが無ければデフォルト値を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("{} not found, using default config", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.max_frame_length == 0 {
            bail!("server.max_frame_length must be positive");
        }
        self.rules.validate()
    }
}
