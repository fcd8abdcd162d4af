//! # Session 模块
//!
//! 把编排器、执行器、相机和各协作者组装在一起。
//!
//! ```text
//! HostEvent ──route──► StoryInput ──submit──► Vec<StageCommand> ──execute──► Surface / Textures / Audio
//!                 └──► 滚轮 ──► OrbitCamera
//! frame(now) ──update──► Vec<StageCommand> ──execute──► ...
//! ```

use stage_runtime::{CloudField, InputOutcome, Orchestrator, StageCatalog, StageCommand};
use tracing::debug;

use crate::audio::AudioPlayer;
use crate::camera::OrbitCamera;
use crate::command_executor::{CommandExecutor, ExecutorStats};
use crate::config::{AppConfig, ConfigError};
use crate::input::{HostEvent, Routed, route};
use crate::resources::TextureLoader;
use crate::surface::PresentationSurface;

/// 一次运行会话
pub struct Session<S, T, A> {
    orchestrator: Orchestrator,
    executor: CommandExecutor,
    camera: OrbitCamera,
    surface: S,
    textures: T,
    audio: A,
    frames: u64,
}

impl<S, T, A> Session<S, T, A>
where
    S: PresentationSurface,
    T: TextureLoader,
    A: AudioPlayer,
{
    /// 使用内置阶段目录创建会话
    pub fn new(config: &AppConfig, surface: S, textures: T, audio: A) -> Result<Self, ConfigError> {
        Self::with_catalog(config, StageCatalog::builtin(), surface, textures, audio)
    }

    /// 使用自定义阶段目录创建会话
    pub fn with_catalog(
        config: &AppConfig,
        catalog: StageCatalog,
        surface: S,
        textures: T,
        audio: A,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let timing = config.timing.to_timing()?;
        let orchestrator = Orchestrator::new(catalog, config.clouds.seed, timing);

        Ok(Self {
            orchestrator,
            executor: CommandExecutor::new(config.music_full_path()),
            camera: OrbitCamera::new(&config.camera),
            surface,
            textures,
            audio,
            frames: 0,
        })
    }

    /// 处理一个窗口事件
    ///
    /// 返回编排器对叙事输入的处理结果；滚轮等非叙事事件返回 `None`。
    pub fn handle_event(&mut self, event: HostEvent, now: f64) -> Option<InputOutcome> {
        match route(event) {
            Routed::Story(input) => {
                let (outcome, commands) = self.orchestrator.submit(input, now);
                if !outcome.is_accepted() {
                    debug!(?input, "输入被丢弃");
                }
                self.apply(&commands);
                Some(outcome)
            }
            Routed::Orbit(delta_y) => {
                self.camera.scroll(delta_y);
                None
            }
            Routed::Unhandled => None,
        }
    }

    /// 推进一帧，返回本帧执行的指令
    pub fn frame(&mut self, now: f64) -> Vec<StageCommand> {
        self.frames += 1;
        let commands = self.orchestrator.update(now);
        self.apply(&commands);
        commands
    }

    fn apply(&mut self, commands: &[StageCommand]) {
        if commands.is_empty() {
            return;
        }
        self.executor
            .execute_batch(commands, &mut self.surface, &mut self.textures, &mut self.audio);
    }

    // ========== 查询方法 ==========

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// 当前云层（用于渲染）
    pub fn clouds(&self) -> &CloudField {
        self.orchestrator.field()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn textures(&self) -> &T {
        &self.textures
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn executor_stats(&self) -> &ExecutorStats {
        self.executor.stats()
    }

    /// 已推进的帧数
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
