//! # State 模块
//!
//! 定义编排器的运行时状态。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**，由编排器独占持有
//! - 不允许隐式全局状态（当前阶段、过渡标志、色调基线都在 `StoryState` 里）

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{StoryError, StoryResult};

/// 过渡状态
///
/// ```text
/// Idle ──Advance──► DialogHold ──hold 结束──► Bursting ──进度到 1──► Committing ──► Idle
/// ```
///
/// 只有 `Idle` 接受推进输入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionState {
    #[default]
    Idle,
    DialogHold,
    Bursting,
    Committing,
}

impl TransitionState {
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

/// 当前画面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Presentation {
    /// 标题画面（等待开始按钮）
    #[default]
    Title,
    /// 开场黑屏淡入中
    Opening,
    /// 故事进行中
    Story,
}

/// 一次爆发的显式参数
///
/// 调度时写入，完成时直接使用，不再读取当前状态。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstPlan {
    /// 提交后的阶段索引（等于阶段数时表示回到标题）
    pub next_index: usize,
    /// 起始色调
    pub from: Color,
    /// 目标色调
    pub to: Color,
}

/// 编排器状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryState {
    /// 当前阶段索引（0..N）
    pub stage_index: usize,
    /// 最近提交的常驻色调，下一次过渡的插值起点
    pub tint: Color,
    /// 过渡状态
    pub transition: TransitionState,
    /// 当前画面
    pub presentation: Presentation,
    /// 对话框是否可见
    pub dialog_visible: bool,
    /// 已完成的过渡次数（包括回到标题的那次）
    pub completed_cycles: u64,
}

impl StoryState {
    /// 初始状态：标题画面，第 0 阶段
    pub fn new(initial_tint: Color) -> Self {
        Self {
            stage_index: 0,
            tint: initial_tint,
            transition: TransitionState::Idle,
            presentation: Presentation::Title,
            dialog_visible: false,
            completed_cycles: 0,
        }
    }

    /// 是否可以接受推进输入
    pub fn accepts_advance(&self) -> bool {
        self.transition.is_idle() && self.presentation == Presentation::Story
    }

    /// 是否可以接受开始输入
    pub fn accepts_start(&self) -> bool {
        self.transition.is_idle() && self.presentation == Presentation::Title
    }
}

/// 过渡各阶段时长（秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionTiming {
    /// 对话停留时长
    pub dialog_hold: f64,
    /// 爆发动画时长
    pub burst: f64,
    /// 回到标题前的黑屏时长
    pub wrap_fade: f64,
    /// 开场黑屏时长
    pub opening_fade: f64,
}

impl TransitionTiming {
    /// 创建并校验时长
    pub fn new(dialog_hold: f64, burst: f64, wrap_fade: f64, opening_fade: f64) -> StoryResult<Self> {
        let timing = Self {
            dialog_hold,
            burst,
            wrap_fade,
            opening_fade,
        };
        timing.validate()?;
        Ok(timing)
    }

    /// 所有时长必须是非负有限数
    pub fn validate(&self) -> StoryResult<()> {
        let fields = [
            ("dialog_hold", self.dialog_hold),
            ("burst", self.burst),
            ("wrap_fade", self.wrap_fade),
            ("opening_fade", self.opening_fade),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(StoryError::InvalidTiming { name, value });
            }
        }
        Ok(())
    }
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            dialog_hold: 3.0,
            burst: 8.0,
            wrap_fade: 4.0,
            opening_fade: 2.0,
        }
    }
}
