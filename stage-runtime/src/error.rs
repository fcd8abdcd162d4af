//! # Error 模块
//!
//! 定义 stage-runtime 中使用的错误类型。
//!
//! 运行期的异常情况（资源加载失败、重复触发等）不会进入状态机，
//! 这里只覆盖构造阶段可以拒绝的输入。

use thiserror::Error;

/// 运行时构造错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoryError {
    /// 阶段目录为空
    #[error("阶段目录不能为空，至少需要一个阶段")]
    EmptyCatalog,

    /// 无效的时长参数
    #[error("时长参数 '{name}' 无效: {value}（必须是非负有限数）")]
    InvalidTiming { name: &'static str, value: f64 },
}

/// Result 类型别名
pub type StoryResult<T> = Result<T, StoryError>;
