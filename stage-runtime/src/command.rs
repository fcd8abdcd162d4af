//! # Command 模块
//!
//! 定义编排器向 Host 发出的所有展示指令。
//! Command 是 Runtime 与 Host 之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"显示什么"，不描述"怎么加载/怎么画"
//! - **显式参数**：每条指令携带执行所需的全部数据（阶段索引、路径、文本），
//!   Host 不需要回头读取编排器状态
//! - **引擎无关**：不包含任何渲染或音频库的类型

use serde::{Deserialize, Serialize};

/// 展示指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageCommand {
    /// 切换背景
    ///
    /// 加载失败时 Host 保留旧背景。
    ShowBackground { stage: usize, path: String },

    /// 设置阶段标签文本
    SetStageLabel { text: String },

    /// 显示对话框
    ShowDialog { text: String },

    /// 隐藏对话框
    HideDialog,

    /// 设置全屏遮罩不透明度（0.0 - 1.0）
    SetFadeOverlay { opacity: f32 },

    /// 显示标题画面
    ShowTitle,

    /// 隐藏标题画面
    HideTitle,

    /// 开始播放背景音乐
    PlayMusic,
}

impl StageCommand {
    /// 创建遮罩指令，不透明度被限制到 `[0, 1]`
    pub fn fade_overlay(opacity: f32) -> Self {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        Self::SetFadeOverlay { opacity }
    }
}
