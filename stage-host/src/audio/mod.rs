//! # Audio 模块
//!
//! 背景音乐播放。
//!
//! - [`SilentAudio`]：无头模式使用，只记录播放请求
//! - `RodioAudio`：rodio 实现（需要 `audio` feature 和系统音频设备）
//!
//! 播放失败只返回错误，由调用方记录日志，叙事流程不受影响。

use std::path::{Path, PathBuf};

use thiserror::Error;

/// 音频错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// 无法打开音频输出
    #[error("无法初始化音频输出: {0}")]
    DeviceUnavailable(String),

    /// 音频文件不存在
    #[error("无法打开音频文件: {0:?}")]
    NotFound(PathBuf),

    /// 解码失败
    #[error("无法解码音频文件: {path:?} - {message}")]
    Decode { path: PathBuf, message: String },

    /// 播放被拒绝
    #[error("播放被拒绝: {0}")]
    Rejected(String),
}

/// 音乐播放器
pub trait AudioPlayer {
    /// 开始循环播放背景音乐
    fn play_music(&mut self, path: &Path) -> Result<(), AudioError>;

    /// 是否正在播放
    fn is_playing(&self) -> bool;
}

/// 静音播放器
///
/// 记录每次播放请求，不输出声音。
#[derive(Debug, Default)]
pub struct SilentAudio {
    requests: Vec<PathBuf>,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// 收到过的播放请求
    pub fn requests(&self) -> &[PathBuf] {
        &self.requests
    }
}

impl AudioPlayer for SilentAudio {
    fn play_music(&mut self, path: &Path) -> Result<(), AudioError> {
        self.requests.push(path.to_path_buf());
        Ok(())
    }

    fn is_playing(&self) -> bool {
        !self.requests.is_empty()
    }
}

impl<P: AudioPlayer + ?Sized> AudioPlayer for Box<P> {
    fn play_music(&mut self, path: &Path) -> Result<(), AudioError> {
        (**self).play_music(path)
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }
}

#[cfg(feature = "audio")]
pub use self::rodio_backend::RodioAudio;

#[cfg(feature = "audio")]
mod rodio_backend {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
    use tracing::info;

    use super::{AudioError, AudioPlayer};

    /// rodio 播放器
    pub struct RodioAudio {
        /// 音频输出流（必须保持存活）
        stream: OutputStream,
        sink: Option<Sink>,
        volume: f32,
        muted: bool,
    }

    impl RodioAudio {
        /// 打开默认输出设备
        pub fn new(volume: f32, muted: bool) -> Result<Self, AudioError> {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
            stream.log_on_drop(false);

            Ok(Self {
                stream,
                sink: None,
                volume: volume.clamp(0.0, 1.0),
                muted,
            })
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.volume }
        }
    }

    impl AudioPlayer for RodioAudio {
        fn play_music(&mut self, path: &Path) -> Result<(), AudioError> {
            let file = File::open(path).map_err(|_| AudioError::NotFound(path.to_path_buf()))?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            if let Some(old) = self.sink.take() {
                old.stop();
            }

            let sink = Sink::connect_new(self.stream.mixer());
            sink.set_volume(self.effective_volume());
            sink.append(source.repeat_infinite());
            self.sink = Some(sink);

            info!(path = %path.display(), "开始播放背景音乐");
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.sink
                .as_ref()
                .is_some_and(|sink| !sink.empty() && !sink.is_paused())
        }
    }
}
