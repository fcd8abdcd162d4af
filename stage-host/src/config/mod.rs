//! # Config 模块
//!
//! 运行时配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use stage_runtime::{StoryError, TransitionTiming};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 资源根目录
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    /// 背景音乐路径（相对于 assets_root）
    #[serde(default = "default_music_path")]
    pub music_path: String,

    /// 过渡时长
    #[serde(default)]
    pub timing: TimingConfig,

    /// 云层配置
    #[serde(default)]
    pub clouds: CloudConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 相机配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// 过渡时长配置（秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// 对话停留时长
    #[serde(default = "default_dialog_hold_secs")]
    pub dialog_hold_secs: f64,

    /// 爆发动画时长
    #[serde(default = "default_burst_secs")]
    pub burst_secs: f64,

    /// 回到标题前的黑屏时长
    #[serde(default = "default_wrap_fade_secs")]
    pub wrap_fade_secs: f64,

    /// 开场黑屏时长
    #[serde(default = "default_opening_fade_secs")]
    pub opening_fade_secs: f64,
}

/// 云层配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// 随机种子（相同种子得到相同的云层布局）
    #[serde(default = "default_cloud_seed")]
    pub seed: u64,
}

/// 音频配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// 音量 (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// 是否静音
    #[serde(default)]
    pub muted: bool,
}

/// 相机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 环绕半径
    #[serde(default = "default_camera_radius")]
    pub radius: f32,

    /// 相机高度
    #[serde(default = "default_camera_height")]
    pub height: f32,

    /// 滚轮灵敏度（弧度 / 滚动单位）
    #[serde(default = "default_scroll_sensitivity")]
    pub scroll_sensitivity: f32,
}

// 默认值函数
fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_music_path() -> String {
    "music/music.mp3".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dialog_hold_secs() -> f64 {
    3.0
}

fn default_burst_secs() -> f64 {
    8.0
}

fn default_wrap_fade_secs() -> f64 {
    4.0
}

fn default_opening_fade_secs() -> f64 {
    2.0
}

fn default_cloud_seed() -> u64 {
    0x5EED
}

fn default_volume() -> f32 {
    1.0
}

fn default_camera_radius() -> f32 {
    3.0
}

fn default_camera_height() -> f32 {
    1.5
}

fn default_scroll_sensitivity() -> f32 {
    0.0015
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            music_path: default_music_path(),
            timing: TimingConfig::default(),
            clouds: CloudConfig::default(),
            audio: AudioConfig::default(),
            camera: CameraConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dialog_hold_secs: default_dialog_hold_secs(),
            burst_secs: default_burst_secs(),
            wrap_fade_secs: default_wrap_fade_secs(),
            opening_fade_secs: default_opening_fade_secs(),
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            seed: default_cloud_seed(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            muted: false,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius: default_camera_radius(),
            height: default_camera_height(),
            scroll_sensitivity: default_scroll_sensitivity(),
        }
    }
}

impl TimingConfig {
    /// 转换为运行时时长（同时校验）
    pub fn to_timing(&self) -> Result<TransitionTiming, ConfigError> {
        Ok(TransitionTiming::new(
            self.dialog_hold_secs,
            self.burst_secs,
            self.wrap_fade_secs,
            self.opening_fade_secs,
        )?)
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(ConfigError::NotFound(_)) => {
                warn!(path = %path.display(), "配置文件不存在，使用默认配置");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "配置文件无法使用，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载配置文件（失败时返回错误）
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    ///
    /// 只检查取值范围，不要求资源目录存在（缺失的资源在运行时降级处理）。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.to_timing()?;

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::ValidationFailed(
                "音量必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        if !self.camera.radius.is_finite() || self.camera.radius <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "相机半径必须是正数".to_string(),
            ));
        }

        if !self.camera.height.is_finite() || !self.camera.scroll_sensitivity.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "相机高度和滚轮灵敏度必须是有限数".to_string(),
            ));
        }

        if self.music_path.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "必须配置 music_path".to_string(),
            ));
        }

        Ok(())
    }

    /// 获取资源完整路径
    pub fn asset_path(&self, relative: &str) -> PathBuf {
        self.assets_root.join(relative)
    }

    /// 获取背景音乐完整路径
    pub fn music_full_path(&self) -> PathBuf {
        self.asset_path(&self.music_path)
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件不存在
    #[error("配置文件不存在: {0:?}")]
    NotFound(PathBuf),
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
    /// 时长无效
    #[error(transparent)]
    Timing(#[from] StoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timing.dialog_hold_secs, 3.0);
        assert_eq!(config.timing.burst_secs, 8.0);
        assert_eq!(config.camera.scroll_sensitivity, 0.0015);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "timing": { "burst_secs": 2.5 }, "log_level": "debug" }"#)
                .unwrap();
        assert_eq!(config.timing.burst_secs, 2.5);
        assert_eq!(config.timing.dialog_hold_secs, 3.0);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.assets_root, PathBuf::from("assets"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.clouds.seed = 99;
        config.audio.muted = true;
        config.save(&path).unwrap();

        let loaded = AppConfig::try_load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            AppConfig::try_load(&missing),
            Err(ConfigError::NotFound(_))
        ));
        assert_eq!(AppConfig::load(&missing), AppConfig::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::try_load(&broken),
            Err(ConfigError::ParseFailed(_))
        ));
        assert_eq!(AppConfig::load(&broken), AppConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.audio.volume = 2.0;
        assert!(config.validate().is_err());
        config.audio.volume = 0.5;
        assert!(config.validate().is_ok());

        config.timing.burst_secs = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Timing(_))));
        config.timing.burst_secs = 8.0;

        config.camera.radius = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_asset_paths() {
        let config = AppConfig {
            assets_root: PathBuf::from("/data"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.asset_path("skytexture/Anger.png"),
            PathBuf::from("/data/skytexture/Anger.png")
        );
        assert_eq!(config.music_full_path(), PathBuf::from("/data/music/music.mp3"));
    }
}
