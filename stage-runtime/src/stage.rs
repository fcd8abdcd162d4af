//! # Stage 模块
//!
//! 阶段目录：编译期固定的有序阶段列表。

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{StoryError, StoryResult};

/// 单个阶段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// 在目录中的序号（0..N）
    pub index: usize,
    /// 阶段名称（用于标签显示）
    pub name: String,
    /// 背景资源路径（相对于 assets_root）
    pub background: String,
    /// 云层色调
    pub tint: Color,
    /// 对话文本
    pub dialog: String,
}

impl Stage {
    /// 创建阶段（`index` 由目录在构造时重新编号）
    pub fn new(
        name: impl Into<String>,
        background: impl Into<String>,
        tint: u32,
        dialog: impl Into<String>,
    ) -> Self {
        Self {
            index: 0,
            name: name.into(),
            background: background.into(),
            tint: Color::from_hex(tint),
            dialog: dialog.into(),
        }
    }

    /// 阶段标签文本
    pub fn label(&self) -> String {
        format!("Stage: {}", self.name)
    }
}

/// 阶段目录
///
/// 启动时构建一次，之后只读。
#[derive(Debug, Clone, PartialEq)]
pub struct StageCatalog {
    stages: Vec<Stage>,
}

impl StageCatalog {
    /// 从阶段列表构建目录
    ///
    /// 空列表返回 [`StoryError::EmptyCatalog`]。
    pub fn new(stages: Vec<Stage>) -> StoryResult<Self> {
        if stages.is_empty() {
            return Err(StoryError::EmptyCatalog);
        }
        Ok(Self {
            stages: numbered(stages),
        })
    }

    /// 内置的五个阶段
    pub fn builtin() -> Self {
        let stages = vec![
            Stage::new(
                "Denial",
                "skytexture/Denial.png",
                0xA4B9FF,
                "Woe to a being you miss but can’t quite understand why.",
            ),
            Stage::new(
                "Anger",
                "skytexture/Anger.png",
                0xFF4E4E,
                "Why to miss someone you’ve never met, only their bones laid where life took place.",
            ),
            Stage::new(
                "Bargaining",
                "skytexture/Bargaining.png",
                0xFFE985,
                "Maybe they did care. Maybe their pain brought you here.",
            ),
            Stage::new(
                "Depression",
                "skytexture/Depression.png",
                0x6E7DA3,
                "Oh endless blue. Receive me with open arms, for it’s the only comfort I’d get.",
            ),
            Stage::new(
                "Acceptance",
                "skytexture/Acceptance.png",
                0xA1FFC2,
                "Peaceful sky, I see you, soul who cared for me even when I doubted you.",
            ),
        ];

        Self {
            stages: numbered(stages),
        }
    }

    /// 获取阶段
    ///
    /// # Panics
    ///
    /// `index >= count()` 属于调用方的编程错误。
    pub fn get(&self, index: usize) -> &Stage {
        match self.stages.get(index) {
            Some(stage) => stage,
            None => panic!(
                "阶段索引越界: {} (目录共 {} 个阶段)",
                index,
                self.stages.len()
            ),
        }
    }

    /// 获取阶段（越界返回 `None`）
    pub fn try_get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// 阶段数量
    pub fn count(&self) -> usize {
        self.stages.len()
    }

    /// 按顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }
}

fn numbered(stages: Vec<Stage>) -> Vec<Stage> {
    stages
        .into_iter()
        .enumerate()
        .map(|(index, stage)| Stage { index, ..stage })
        .collect()
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
