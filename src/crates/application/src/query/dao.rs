use crate::query::QueryError;
use async_trait::async_trait;
use domain::value::{AlbumId, FileId};

/// 专辑的封面配置
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumCoverRecord {
    pub album_id: AlbumId,
    /// 封面来源文件 id，0 表示未配置
    pub cover_file_id: FileId,
}

/// 专辑查询（按用户隔离）
#[async_trait]
pub trait AlbumLookup: Send + Sync {
    async fn find(
        &self,
        album_id: &AlbumId,
        user_id: &str,
    ) -> Result<Option<AlbumCoverRecord>, QueryError>;
}

/// 文件 id 到文件树内相对路径的映射
#[async_trait]
pub trait FilePathDao: Send + Sync {
    async fn get_relative_path(&self, file_id: &FileId) -> Result<Option<String>, QueryError>;
}
