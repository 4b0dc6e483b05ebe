pub mod repository;

pub mod file_type_detector;

pub mod storage;
pub use storage::LocalFileResolver;

pub mod config;
pub use config::{AppConfigImpl, CacheConfig, ExtractorConfig};

pub mod cover_art;
pub use cover_art::{EmbeddedArtExtractorImpl, SledKeyValueCache};
