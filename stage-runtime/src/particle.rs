//! # Particle 模块
//!
//! 云层粒子场。
//!
//! ## 组成
//!
//! - **常驻云**：固定 18 个，围绕原点成环分布，持续向下飘落并循环
//! - **爆发云**：过渡期间临时生成 50 个，从高处下落遮住背景切换，
//!   颜色从上一阶段色调渐变到下一阶段色调，过渡结束后全部移除
//!
//! 粒子场只被编排器调用，自身不感知过渡状态。

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::color::{Color, interpolate};

/// 常驻云数量
pub const STEADY_COUNT: usize = 18;
/// 每次爆发的云数量
pub const BURST_COUNT: usize = 50;

const RING_RADIUS_MIN: f32 = 3.0;
const RING_RADIUS_SPAN: f32 = 3.0;
const STEADY_HEIGHT_MIN: f32 = -4.0;
const STEADY_HEIGHT_SPAN: f32 = 8.0;
const STEADY_SCALE: Vec2 = Vec2::new(4.0, 3.0);

/// 常驻云下落速度（单位/秒）
const DRIFT_SPEED: f32 = 0.5;
/// 低于此高度时回到顶部
const DRIFT_FLOOR: f32 = -5.0;
const RESPAWN_HEIGHT_MIN: f32 = 4.0;
const RESPAWN_HEIGHT_SPAN: f32 = 3.0;

const BURST_X_SPAN: f32 = 10.0;
const BURST_Z_SPAN: f32 = 5.0;
const BURST_BAND_MIN: f32 = 10.0;
const BURST_BAND_SPAN: f32 = 4.0;
/// 爆发云在进度为 1 时到达的高度
pub const BURST_FLOOR: f32 = -2.0;

/// 粒子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// 常驻，进程生命周期内一直存在
    Steady,
    /// 临时，随爆发创建和销毁
    Transient,
}

/// 云粒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub scale: Vec2,
    pub color: Color,
    pub kind: ParticleKind,
}

/// 一次爆发的临时云
#[derive(Debug, Clone)]
struct Burst {
    particles: Vec<Particle>,
    /// 每个粒子的起始高度（与 `particles` 一一对应）
    start_heights: Vec<f32>,
    initial_color: Color,
}

/// 云层粒子场
#[derive(Debug, Clone)]
pub struct CloudField {
    steady: Vec<Particle>,
    steady_tint: Color,
    burst: Option<Burst>,
    rng: fastrand::Rng,
}

impl CloudField {
    /// 用固定种子创建粒子场，常驻云立即生成
    pub fn new(seed: u64, tint: Color) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed), tint)
    }

    /// 使用给定随机源创建粒子场
    pub fn with_rng(rng: fastrand::Rng, tint: Color) -> Self {
        let mut field = Self {
            steady: Vec::with_capacity(STEADY_COUNT),
            steady_tint: tint,
            burst: None,
            rng,
        };
        field.spawn_steady();
        field
    }

    /// 重新生成全部常驻云
    pub fn spawn_steady(&mut self) {
        self.steady.clear();
        for _ in 0..STEADY_COUNT {
            let position = self.random_ring_position();
            self.steady.push(Particle {
                position,
                scale: STEADY_SCALE,
                color: self.steady_tint,
                kind: ParticleKind::Steady,
            });
        }
    }

    /// 常驻云下落一帧
    ///
    /// 低于地板的粒子回到顶部随机高度，数量不变。
    pub fn advance_steady(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        for i in 0..self.steady.len() {
            let mut y = self.steady[i].position.y - dt * DRIFT_SPEED;
            if y < DRIFT_FLOOR {
                y = RESPAWN_HEIGHT_MIN + self.rng.f32() * RESPAWN_HEIGHT_SPAN;
            }
            self.steady[i].position.y = y;
        }
    }

    /// 生成爆发云（替换尚未提交的旧爆发）
    pub fn spawn_burst(&mut self, initial_color: Color) {
        let mut particles = Vec::with_capacity(BURST_COUNT);
        let mut start_heights = Vec::with_capacity(BURST_COUNT);

        for _ in 0..BURST_COUNT {
            let x = (self.rng.f32() - 0.5) * BURST_X_SPAN;
            let z = (self.rng.f32() - 0.5) * BURST_Z_SPAN;
            let y = BURST_BAND_MIN + self.rng.f32() * BURST_BAND_SPAN;
            let scale = Vec2::new(4.0 + self.rng.f32() * 4.0, 3.0 + self.rng.f32() * 2.0);
            start_heights.push(y);
            particles.push(Particle {
                position: Vec3::new(x, y, z),
                scale,
                color: initial_color,
                kind: ParticleKind::Transient,
            });
        }

        self.burst = Some(Burst {
            particles,
            start_heights,
            initial_color,
        });
    }

    /// 推进爆发云
    ///
    /// `progress` 被限制在 `[0, 1]` 后同时用于高度和颜色。
    pub fn advance_burst(&mut self, progress: f32, target_color: Color) {
        let Some(burst) = self.burst.as_mut() else {
            return;
        };
        let p = clamp_progress(progress);
        let color = interpolate(burst.initial_color, target_color, p);

        for (particle, &start) in burst.particles.iter_mut().zip(&burst.start_heights) {
            particle.position.y = start * (1.0 - p) + BURST_FLOOR * p;
            particle.color = color;
        }
    }

    /// 结束爆发：移除全部临时云，常驻云换成最终色调
    pub fn commit_burst(&mut self, final_color: Color) {
        self.burst = None;
        self.tint_steady(final_color);
    }

    /// 重新随机化常驻云位置（阶段切换后调用）
    pub fn reset_steady_positions(&mut self) {
        for i in 0..self.steady.len() {
            self.steady[i].position = self.random_ring_position();
            self.steady[i].scale = STEADY_SCALE;
        }
    }

    /// 设置常驻云色调
    pub fn tint_steady(&mut self, color: Color) {
        self.steady_tint = color;
        for particle in &mut self.steady {
            particle.color = color;
        }
    }

    /// 当前常驻云色调
    pub fn steady_tint(&self) -> Color {
        self.steady_tint
    }

    /// 常驻云
    pub fn steady(&self) -> &[Particle] {
        &self.steady
    }

    /// 爆发云（无爆发时为空）
    pub fn transient(&self) -> &[Particle] {
        self.burst
            .as_ref()
            .map(|b| b.particles.as_slice())
            .unwrap_or(&[])
    }

    /// 全部粒子（常驻在前）
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.steady.iter().chain(self.transient())
    }

    pub fn steady_count(&self) -> usize {
        self.steady.len()
    }

    pub fn transient_count(&self) -> usize {
        self.transient().len()
    }

    fn random_ring_position(&mut self) -> Vec3 {
        let angle = self.rng.f32() * TAU;
        let radius = RING_RADIUS_MIN + self.rng.f32() * RING_RADIUS_SPAN;
        let height = STEADY_HEIGHT_MIN + self.rng.f32() * STEADY_HEIGHT_SPAN;
        Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
    }
}

fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}
