//! # Logging 模块
//!
//! 安装 tracing-subscriber 的 fmt 输出。

use std::str::FromStr;

use tracing::Level;

/// 解析日志级别，无法识别时回退到 `INFO`
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// 初始化全局日志
///
/// 重复调用（例如多个测试）时静默忽略，返回是否由本次调用完成安装。
pub fn init(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .try_init()
        .is_ok()
}
