//! # Camera 模块
//!
//! 围绕原点旋转的环绕相机，只受滚轮控制。

use std::f32::consts::TAU;

use glam::Vec3;

use crate::config::CameraConfig;

/// 环绕相机
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// 当前角度（弧度，0..2π）
    angle: f32,
    radius: f32,
    height: f32,
    sensitivity: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            angle: 0.0,
            radius: config.radius,
            height: config.height,
            sensitivity: config.scroll_sensitivity,
        }
    }

    /// 滚动：角度增加 `delta_y * sensitivity`，结果归一化到 `[0, 2π)`
    pub fn scroll(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        self.angle = (self.angle + delta_y * self.sensitivity).rem_euclid(TAU);
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// 相机位置
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.angle.cos(),
            self.height,
            self.radius * self.angle.sin(),
        )
    }

    /// 注视点（原点）
    pub fn target(&self) -> Vec3 {
        Vec3::ZERO
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
