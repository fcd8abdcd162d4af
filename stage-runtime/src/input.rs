//! # Input 模块
//!
//! 定义 Host 向编排器传递的输入事件。
//!
//! - 编排器不直接处理键盘/鼠标，只处理语义化输入
//! - 滚轮等连续输入与阶段无关，由 Host 自己消费，不出现在这里

use serde::{Deserialize, Serialize};

/// Host 向编排器传递的输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryInput {
    /// 开始按钮（仅在标题画面有效）
    Start,
    /// 推进到下一阶段（空格键）
    Advance,
}

/// 输入处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// 输入被接受
    Accepted,
    /// 输入被丢弃（过渡进行中或当前画面不接受此输入）
    Ignored,
}

impl InputOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}
