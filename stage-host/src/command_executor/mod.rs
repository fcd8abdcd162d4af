//! # Command Executor 模块
//!
//! Command 执行器，负责将编排器发出的 `StageCommand` 转换为实际操作。
//!
//! ## 设计说明
//!
//! - 执行器不持有画面，只通过协作者 trait 修改展示层、加载资源、播放音乐
//! - 资源或音频失败只降级，不会反馈给编排器：
//!   背景加载失败时保留旧背景，音乐被拒绝时继续静音运行

use std::path::PathBuf;

use stage_runtime::StageCommand;
use tracing::{debug, info, warn};

use crate::audio::AudioPlayer;
use crate::resources::TextureLoader;
use crate::surface::PresentationSurface;

/// 执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteResult {
    /// 执行成功
    Ok,
    /// 执行失败但已降级处理（附带原因）
    Degraded(String),
}

impl ExecuteResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// 执行统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    pub executed: u64,
    pub degraded: u64,
}

/// Command 执行器
#[derive(Debug)]
pub struct CommandExecutor {
    /// 背景音乐完整路径
    music_path: PathBuf,
    stats: ExecutorStats,
}

impl CommandExecutor {
    /// 创建新的 Command 执行器
    pub fn new(music_path: impl Into<PathBuf>) -> Self {
        Self {
            music_path: music_path.into(),
            stats: ExecutorStats::default(),
        }
    }

    /// 执行单个 Command
    pub fn execute(
        &mut self,
        command: &StageCommand,
        surface: &mut impl PresentationSurface,
        textures: &mut impl TextureLoader,
        audio: &mut impl AudioPlayer,
    ) -> ExecuteResult {
        let result = match command {
            StageCommand::ShowBackground { stage, path } => match textures.load(path) {
                Ok(texture) => {
                    surface.show_background(*stage, &texture);
                    info!(stage, path = %path, "背景已切换");
                    ExecuteResult::Ok
                }
                Err(e) => {
                    warn!(stage, error = %e, "背景加载失败，保留旧背景");
                    ExecuteResult::Degraded(e.to_string())
                }
            },
            StageCommand::SetStageLabel { text } => {
                surface.set_stage_label(text);
                ExecuteResult::Ok
            }
            StageCommand::ShowDialog { text } => {
                surface.show_dialog(text);
                debug!(text = %text, "显示对话");
                ExecuteResult::Ok
            }
            StageCommand::HideDialog => {
                surface.hide_dialog();
                ExecuteResult::Ok
            }
            StageCommand::SetFadeOverlay { opacity } => {
                surface.set_fade_overlay(*opacity);
                debug!(opacity, "遮罩");
                ExecuteResult::Ok
            }
            StageCommand::ShowTitle => {
                surface.show_title();
                ExecuteResult::Ok
            }
            StageCommand::HideTitle => {
                surface.hide_title();
                ExecuteResult::Ok
            }
            StageCommand::PlayMusic => self.execute_play_music(audio),
        };

        self.stats.executed += 1;
        if !result.is_ok() {
            self.stats.degraded += 1;
        }
        result
    }

    /// 批量执行 Commands
    ///
    /// 单条失败不会中断后续指令，返回降级的条数。
    pub fn execute_batch(
        &mut self,
        commands: &[StageCommand],
        surface: &mut impl PresentationSurface,
        textures: &mut impl TextureLoader,
        audio: &mut impl AudioPlayer,
    ) -> usize {
        let mut degraded = 0;
        for command in commands {
            if !self.execute(command, surface, textures, audio).is_ok() {
                degraded += 1;
            }
        }
        degraded
    }

    fn execute_play_music(&mut self, audio: &mut impl AudioPlayer) -> ExecuteResult {
        if audio.is_playing() {
            debug!("背景音乐已在播放");
            return ExecuteResult::Ok;
        }
        match audio.play_music(&self.music_path) {
            Ok(()) => ExecuteResult::Ok,
            Err(e) => {
                warn!(error = %e, "背景音乐播放失败");
                ExecuteResult::Degraded(e.to_string())
            }
        }
    }

    pub fn stats(&self) -> &ExecutorStats {
        &self.stats
    }
}
