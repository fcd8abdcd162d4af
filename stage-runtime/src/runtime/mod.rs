//! # Runtime 模块
//!
//! 阶段过渡编排器，负责输入处理、计时和状态推进。
//!
//! ## 模块结构
//!
//! - [`engine`]：过渡状态机

pub mod engine;

pub use engine::Orchestrator;
