//! # Stage Runtime
//!
//! 五阶段天空叙事的核心运行时库。
//!
//! ## 架构概述
//!
//! `stage-runtime` 是纯逻辑核心，不依赖任何 IO、渲染或音频库。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                           Runtime
//!   │                               │
//!   │──── StoryInput / now ───────►│
//!   │                               │ tick()
//!   │◄─── Vec<StageCommand> ────────│
//!   │                               │
//!   │──── field() ────────────────►│ 每帧读取粒子用于渲染
//! ```
//!
//! 过渡期间（对话停留、爆发、提交）到达的推进输入会被直接丢弃。
//!
//! ## 核心类型
//!
//! - [`Orchestrator`]：过渡状态机
//! - [`StageCommand`]：Runtime 向 Host 发出的指令
//! - [`StoryInput`]：Host 向 Runtime 传递的输入
//! - [`StageCatalog`]：只读阶段目录
//! - [`CloudField`]：云层粒子场
//!
//! ## 模块结构
//!
//! - [`color`]：色调与插值
//! - [`tween`]：时钟与 tween 列表
//! - [`stage`]：阶段目录
//! - [`particle`]：云层粒子场
//! - [`command`]：StageCommand 定义
//! - [`input`]：StoryInput 定义
//! - [`state`]：StoryState、TransitionState 定义
//! - [`error`]：错误类型定义
//! - [`runtime`]：编排器

pub mod color;
pub mod command;
pub mod error;
pub mod input;
pub mod particle;
pub mod runtime;
pub mod stage;
pub mod state;
pub mod tween;

// 重导出核心类型
pub use color::{Color, interpolate};
pub use command::StageCommand;
pub use error::{StoryError, StoryResult};
pub use input::{InputOutcome, StoryInput};
pub use particle::{BURST_COUNT, CloudField, Particle, ParticleKind, STEADY_COUNT};
pub use runtime::Orchestrator;
pub use stage::{Stage, StageCatalog};
pub use state::{BurstPlan, Presentation, StoryState, TransitionState, TransitionTiming};
pub use tween::{Clock, ManualClock, SystemClock, Tween, TweenEvent, TweenId, TweenScheduler};
