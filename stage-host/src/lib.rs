//! # Stage Host
//!
//! 五阶段天空叙事的宿主层。
//!
//! 宿主层持有所有外部协作者（展示层、纹理加载、音频），
//! 把编排器发出的 `StageCommand` 落实为具体操作，并把窗口事件转换为编排器输入。
//!
//! ## 模块结构
//!
//! - [`config`]：配置加载与验证
//! - [`logging`]：日志初始化
//! - [`resources`]：背景纹理加载
//! - [`audio`]：背景音乐
//! - [`surface`]：展示层抽象与无头实现
//! - [`command_executor`]：StageCommand 执行
//! - [`camera`]：环绕相机
//! - [`input`]：事件映射
//! - [`session`]：组装
//! - [`simulation`]：无头模拟

pub mod audio;
pub mod camera;
pub mod command_executor;
pub mod config;
pub mod input;
pub mod logging;
pub mod resources;
pub mod session;
pub mod simulation;
pub mod surface;

pub use audio::{AudioError, AudioPlayer, SilentAudio};
pub use camera::OrbitCamera;
pub use command_executor::{CommandExecutor, ExecuteResult};
pub use config::{AppConfig, ConfigError};
pub use input::{HostEvent, Key};
pub use resources::{FsTextureLoader, ResourceError, Texture, TextureLoader};
pub use session::Session;
pub use surface::{HeadlessSurface, INSTRUCTIONS, PresentationSurface, SurfaceState};
