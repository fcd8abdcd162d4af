//! # Surface 模块
//!
//! 展示层抽象：背景、阶段标签、对话框、黑屏遮罩、标题画面。
//!
//! 执行器只通过 [`PresentationSurface`] 修改画面；
//! [`HeadlessSurface`] 把画面保存为纯数据，供无头模式和测试检查。

use crate::resources::Texture;

/// 固定的操作提示
pub const INSTRUCTIONS: &str = "Scroll to spin around the dragon, press space to change scene";

/// 展示层
pub trait PresentationSurface {
    /// 替换背景（只在纹理加载成功后调用）
    fn show_background(&mut self, stage: usize, texture: &Texture);
    fn set_stage_label(&mut self, text: &str);
    fn show_dialog(&mut self, text: &str);
    fn hide_dialog(&mut self);
    /// 设置遮罩不透明度（0.0 - 1.0）
    fn set_fade_overlay(&mut self, opacity: f32);
    fn show_title(&mut self);
    fn hide_title(&mut self);
}

/// 画面状态
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    /// 当前背景（None 表示尚未成功加载过）
    pub background: Option<Texture>,
    /// 当前背景所属阶段
    pub background_stage: Option<usize>,
    pub stage_label: String,
    /// 对话框文本（None 表示隐藏）
    pub dialog: Option<String>,
    pub fade_opacity: f32,
    pub title_visible: bool,
    pub instructions: &'static str,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            background: None,
            background_stage: None,
            stage_label: String::new(),
            dialog: None,
            fade_opacity: 0.0,
            title_visible: true,
            instructions: INSTRUCTIONS,
        }
    }
}

/// 无头展示层
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    state: SurfaceState,
    /// 背景被替换的次数
    background_swaps: u32,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn background_swaps(&self) -> u32 {
        self.background_swaps
    }
}

impl PresentationSurface for HeadlessSurface {
    fn show_background(&mut self, stage: usize, texture: &Texture) {
        self.state.background = Some(texture.clone());
        self.state.background_stage = Some(stage);
        self.background_swaps += 1;
    }

    fn set_stage_label(&mut self, text: &str) {
        self.state.stage_label = text.to_string();
    }

    fn show_dialog(&mut self, text: &str) {
        self.state.dialog = Some(text.to_string());
    }

    fn hide_dialog(&mut self) {
        self.state.dialog = None;
    }

    fn set_fade_overlay(&mut self, opacity: f32) {
        self.state.fade_opacity = opacity.clamp(0.0, 1.0);
    }

    fn show_title(&mut self) {
        self.state.title_visible = true;
    }

    fn hide_title(&mut self) {
        self.state.title_visible = false;
    }
}
