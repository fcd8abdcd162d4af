//! # Resources 模块
//!
//! 背景纹理加载与缓存。
//!
//! 无头 Host 不上传显存，只用 image crate 读取文件头确认格式和尺寸。
//! 加载失败由调用方决定如何降级（保留旧背景）。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// 资源管理错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// 资源未找到
    #[error("资源未找到: {path}")]
    NotFound {
        /// 资源路径
        path: String,
    },

    /// 无效的资源格式
    #[error("无效的资源格式: {path} - {message}")]
    InvalidFormat {
        /// 资源路径
        path: String,
        /// 错误消息
        message: String,
    },

    /// 资源加载失败
    #[error("加载 {kind} 资源失败: {path} - {message}")]
    LoadFailed {
        /// 资源路径
        path: String,
        /// 资源类型（texture, music 等）
        kind: String,
        /// 错误消息
        message: String,
    },
}

/// 已加载的纹理
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// 逻辑路径（相对于资源根目录）
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// 纹理加载器
pub trait TextureLoader {
    /// 加载纹理（`path` 相对于资源根目录）
    fn load(&mut self, path: &str) -> Result<Texture, ResourceError>;
}

/// 文件系统纹理加载器
///
/// 成功加载的纹理会被缓存；失败不缓存，下次请求时重新读取。
#[derive(Debug)]
pub struct FsTextureLoader {
    base_path: PathBuf,
    cache: HashMap<String, Texture>,
    /// 统计：命中次数
    hits: u64,
    /// 统计：未命中次数
    misses: u64,
}

impl FsTextureLoader {
    /// 创建新的加载器
    ///
    /// # 参数
    ///
    /// - `base_path`: 资源文件的基础路径（如 "assets"）
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// 解析资源路径
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path_obj = Path::new(path);
        if path_obj.is_absolute() {
            path_obj.to_path_buf()
        } else {
            self.base_path.join(path_obj)
        }
    }

    /// 是否已缓存
    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.contains_key(path)
    }

    /// (命中, 未命中)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    fn read_texture(&self, path: &str) -> Result<Texture, ResourceError> {
        let full_path = self.resolve_path(path);
        if !full_path.is_file() {
            return Err(ResourceError::NotFound {
                path: full_path.display().to_string(),
            });
        }

        let (width, height) = image::image_dimensions(&full_path).map_err(|e| match e {
            image::ImageError::IoError(io) => ResourceError::LoadFailed {
                path: full_path.display().to_string(),
                kind: "texture".to_string(),
                message: io.to_string(),
            },
            other => ResourceError::InvalidFormat {
                path: full_path.display().to_string(),
                message: other.to_string(),
            },
        })?;

        Ok(Texture {
            path: path.to_string(),
            width,
            height,
        })
    }
}

impl TextureLoader for FsTextureLoader {
    fn load(&mut self, path: &str) -> Result<Texture, ResourceError> {
        if let Some(texture) = self.cache.get(path) {
            self.hits += 1;
            return Ok(texture.clone());
        }

        self.misses += 1;
        let texture = self.read_texture(path)?;
        debug!(path, width = texture.width, height = texture.height, "纹理已加载");
        self.cache.insert(path.to_string(), texture.clone());
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let full = dir.join(name);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        image::RgbImage::new(width, height).save(&full).unwrap();
    }

    #[test]
    fn test_load_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "skytexture/Denial.png", 8, 4);

        let mut loader = FsTextureLoader::new(dir.path());
        let texture = loader.load("skytexture/Denial.png").unwrap();
        assert_eq!(texture.width, 8);
        assert_eq!(texture.height, 4);
        assert!(loader.is_cached("skytexture/Denial.png"));

        let again = loader.load("skytexture/Denial.png").unwrap();
        assert_eq!(again, texture);
        assert_eq!(loader.stats(), (1, 1));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = FsTextureLoader::new(dir.path());
        let err = loader.load("skytexture/Anger.png").unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
        assert!(!loader.is_cached("skytexture/Anger.png"));
    }

    #[test]
    fn test_invalid_image_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

        let mut loader = FsTextureLoader::new(dir.path());
        assert!(loader.load("broken.png").is_err());
        assert!(!loader.is_cached("broken.png"));

        // 修复后可以重新加载
        write_png(dir.path(), "broken.png", 2, 2);
        assert!(loader.load("broken.png").is_ok());
    }

    #[test]
    fn test_resolve_path() {
        let loader = FsTextureLoader::new("assets");
        assert_eq!(
            loader.resolve_path("skytexture/Anger.png"),
            PathBuf::from("assets/skytexture/Anger.png")
        );
    }
}
