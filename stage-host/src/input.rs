//! # Input 模块
//!
//! 把窗口事件转换为编排器输入或相机操作。
//!
//! - 空格键 -> `StoryInput::Advance`
//! - 开始按钮 -> `StoryInput::Start`
//! - 滚轮 -> 相机环绕（与阶段无关，任何时候都生效）
//!
//! 这里不做防抖：过渡期间的重复触发由编排器丢弃。

use stage_runtime::StoryInput;

/// 键盘按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Other(char),
}

/// Host 事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    KeyDown(Key),
    /// 点击开始按钮
    StartClicked,
    /// 滚轮（纵向增量）
    Wheel { delta_y: f32 },
}

/// 事件去向
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routed {
    Story(StoryInput),
    Orbit(f32),
    Unhandled,
}

/// 事件映射
pub fn route(event: HostEvent) -> Routed {
    match event {
        HostEvent::KeyDown(Key::Space) => Routed::Story(StoryInput::Advance),
        HostEvent::KeyDown(Key::Other(_)) => Routed::Unhandled,
        HostEvent::StartClicked => Routed::Story(StoryInput::Start),
        HostEvent::Wheel { delta_y } if delta_y.is_finite() => Routed::Orbit(delta_y),
        HostEvent::Wheel { .. } => Routed::Unhandled,
    }
}
