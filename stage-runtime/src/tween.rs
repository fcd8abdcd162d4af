//! # Tween 模块
//!
//! 基于墙钟时间的进度计算。
//!
//! ## 设计说明
//!
//! - `Tween` 只记录开始时间和时长，进度每帧由当前时间重新计算，
//!   不依赖逐帧累加的 `dt`
//! - `TweenScheduler` 维护活跃 tween 列表，每帧统一处理一次，
//!   完成后自动移除
//! - 每个 tween 携带一个 `tag`，调度时即写入所需的全部参数，
//!   完成回调不再读取外部状态

use std::cell::Cell;
use std::time::Instant;

/// 时间源（秒）
pub trait Clock {
    /// 当前时间
    fn now(&self) -> f64;
}

/// 系统单调时钟，以创建时刻为零点
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// 手动推进的时钟（测试与无头模拟使用）
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// 前进 `dt` 秒，负值被忽略
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.now.set(self.now.get() + dt);
        }
    }

    /// 直接设置当前时间（不允许倒退）
    pub fn set(&self, now: f64) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Tween ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(pub u64);

/// 有时间边界的进度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// 开始时间（秒）
    pub start: f64,
    /// 时长（秒）
    pub duration: f64,
}

impl Tween {
    /// 创建 tween，负时长按 0 处理
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            duration: duration.max(0.0),
        }
    }

    /// `clamp((now - start) / duration, 0, 1)`
    ///
    /// 时长为 0 时直接返回 1。
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let raw = (now - self.start) / self.duration;
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, 1.0) as f32
    }
}

/// Tween 事件
#[derive(Debug, Clone, PartialEq)]
pub enum TweenEvent<T> {
    /// 本帧进度（已限制在 0 - 1，且单调不减）
    Progress { id: TweenId, tag: T, progress: f32 },
    /// 已完成；同一帧内总是先发出 `progress == 1.0` 的 `Progress`
    Completed { id: TweenId, tag: T },
}

#[derive(Debug, Clone)]
struct ActiveTween<T> {
    id: TweenId,
    tween: Tween,
    tag: T,
    last_progress: f32,
}

/// 活跃 tween 列表
#[derive(Debug, Clone)]
pub struct TweenScheduler<T> {
    active: Vec<ActiveTween<T>>,
    next_id: u64,
}

impl<T> Default for TweenScheduler<T> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> TweenScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 调度新的 tween
    pub fn schedule(&mut self, tag: T, start: f64, duration: f64) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.active.push(ActiveTween {
            id,
            tween: Tween::new(start, duration),
            tag,
            last_progress: 0.0,
        });
        id
    }

    /// 按当前时间处理所有 tween（每帧调用一次）
    ///
    /// 按调度顺序产生事件；完成的 tween 在返回前被移除。
    pub fn update(&mut self, now: f64) -> Vec<TweenEvent<T>> {
        let mut events = Vec::with_capacity(self.active.len());

        for entry in &mut self.active {
            let progress = entry.tween.progress(now).max(entry.last_progress);
            entry.last_progress = progress;
            events.push(TweenEvent::Progress {
                id: entry.id,
                tag: entry.tag.clone(),
                progress,
            });
            if progress >= 1.0 {
                events.push(TweenEvent::Completed {
                    id: entry.id,
                    tag: entry.tag.clone(),
                });
            }
        }

        self.active.retain(|entry| entry.last_progress < 1.0);
        events
    }

    /// 是否还有活跃 tween
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// 活跃 tween 数量
    pub fn len(&self) -> usize {
        self.active.len()
    }
}
