use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    /// 为空时从 index_file 加载专辑/文件索引
    database_url: String,
    /// 专辑/文件索引文件路径
    index_file: String,
    /// 用户文件树根目录
    music_root: String,
    /// 日志文件路径
    log_file: String,
    /// 缓存配置
    cache: RawCacheConfig,
    /// 内嵌封面提取配置
    extractor: RawExtractorConfig,
}

/// 缓存配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawCacheConfig {
    /// 缓存数据目录
    data_dir: String,
}

impl Default for RawCacheConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data/cache".to_string(),
        }
    }
}

/// 内嵌封面提取配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawExtractorConfig {
    /// ID3 中没有封面时是否使用 ffmpeg
    ffmpeg_enabled: bool,
    /// FFmpeg 可执行文件路径
    ffmpeg_path: String,
}

impl Default for RawExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_enabled: true,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            database_url: "".to_string(),
            index_file: "".to_string(),
            music_root: "./music".to_string(),
            log_file: "app.log".to_string(),
            cache: RawCacheConfig::default(),
            extractor: RawExtractorConfig::default(),
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// 缓存数据目录
    pub data_dir: String,
}

impl CacheConfig {
    /// 获取封面缓存数据库路径
    pub fn cover_cache_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("cover_cache")
    }
}

/// 内嵌封面提取配置
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub ffmpeg_enabled: bool,
    /// FFmpeg 可执行文件路径
    pub ffmpeg_path: String,
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    database_url: String,
    index_file: String,
    music_root: String,
    log_file: String,
    cache: CacheConfig,
    extractor: ExtractorConfig,
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        AppConfigImpl {
            database_url: data.database_url,
            index_file: data.index_file,
            music_root: data.music_root,
            log_file: data.log_file,
            cache: CacheConfig {
                data_dir: data.cache.data_dir,
            },
            extractor: ExtractorConfig {
                ffmpeg_enabled: data.extractor.ffmpeg_enabled,
                ffmpeg_path: data.extractor.ffmpeg_path,
            },
        }
    }

    pub fn load() -> Result<AppConfigImpl, Box<dyn Error>> {
        dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let raw: RawConfig = config.try_deserialize()?; // serde 自动填充默认值
        Ok(AppConfigImpl::new(raw))
    }

    /// 数据库未配置时返回 None
    pub fn database_url(&self) -> Option<&str> {
        if self.database_url.is_empty() {
            None
        } else {
            Some(&self.database_url)
        }
    }

    /// 索引文件未配置时返回 None
    pub fn index_file(&self) -> Option<PathBuf> {
        if self.index_file.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.index_file))
        }
    }

    pub fn music_root(&self) -> &str {
        &self.music_root
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    pub fn cache(&self) -> CacheConfig {
        self.cache.clone()
    }

    pub fn extractor(&self) -> ExtractorConfig {
        self.extractor.clone()
    }
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        AppConfigImpl::new(RawConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AppConfigImpl {
        let raw: RawConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        AppConfigImpl::new(raw)
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfigImpl::default();

        assert!(cfg.database_url().is_none());
        assert!(cfg.index_file().is_none());
        assert_eq!(cfg.music_root(), "./music");
        assert_eq!(
            cfg.cache().cover_cache_path(),
            PathBuf::from("./data/cache").join("cover_cache")
        );
        assert!(cfg.extractor().ffmpeg_enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = from_toml(
            r#"
            database_url = "postgres://localhost/music"
            index_file = "library.toml"

            [extractor]
            ffmpeg_enabled = false
            "#,
        );

        assert_eq!(cfg.database_url(), Some("postgres://localhost/music"));
        assert_eq!(cfg.index_file(), Some(PathBuf::from("library.toml")));
        assert!(!cfg.extractor().ffmpeg_enabled);
        assert_eq!(cfg.cache().data_dir, "./data/cache");
        assert_eq!(cfg.extractor().ffmpeg_path, "ffmpeg");
    }
}
