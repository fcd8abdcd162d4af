//! # Color 模块
//!
//! RGB 颜色与线性插值。
//!
//! 通道使用 `f32`，取值范围 0.0 - 1.0，与打包的 `0xRRGGBB` 可以互相转换。

use serde::{Deserialize, Serialize};

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// 白色（未着色的云）
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// 黑色
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    /// 创建新的颜色
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// 从 `0xRRGGBB` 创建颜色
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// 转换为 `0xRRGGBB`（四舍五入，超出范围的通道被截断）
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// 线性插值，等价于 [`interpolate`]
    pub fn lerp(self, to: Color, progress: f32) -> Color {
        interpolate(self, to, progress)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

/// 两个颜色之间的逐通道线性混合
///
/// `progress` 先被限制到 `[0, 1]`。按 `from * (1 - p) + to * p` 计算，
/// 因此 `p == 0` 时精确返回 `from`，`p == 1` 时精确返回 `to`。
pub fn interpolate(from: Color, to: Color, progress: f32) -> Color {
    let p = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let q = 1.0 - p;
    Color {
        r: from.r * q + to.r * p,
        g: from.g * q + to.g * p,
        b: from.b * q + to.b * p,
    }
}
