use crate::query::cover_cache::{InsertOutcome, KeyValueCache};
use crate::query::dao::AlbumLookup;
use crate::query::QueryError;
use async_trait::async_trait;
use bytes::Bytes;
use domain::cover_art::{
    cover_cache_key, CoverImage, CoverPayload, EmbeddedPicture, EncodedCover,
    COLLECTION_CACHE_KEY,
};
use domain::value::{AlbumId, FileId, FileType, MediaPath};
use std::path::Path;
use std::sync::Arc;

/// 文件树中解析出的文件节点
#[async_trait]
pub trait FileNode: Send + Sync {
    /// 声明的 MIME 类型
    fn mime_type(&self) -> &str;

    /// 读取原始内容
    async fn content(&self) -> Result<Bytes, QueryError>;

    /// 本地文件系统路径（非本地存储返回 None）
    fn local_path(&self) -> Option<&Path> {
        None
    }
}

/// 在用户文件树中按 id 查找文件
#[async_trait]
pub trait FileResolver: Send + Sync {
    /// 文件已不存在时返回空列表
    async fn resolve(
        &self,
        file_id: &FileId,
        tree_root: &MediaPath,
    ) -> Result<Vec<Box<dyn FileNode>>, QueryError>;
}

/// 音频容器内嵌封面提取器
#[async_trait]
pub trait EmbeddedArtExtractor: Send + Sync {
    /// 没有内嵌封面时返回 Ok(None)
    async fn extract(&self, node: &dyn FileNode) -> Result<Option<EmbeddedPicture>, QueryError>;
}

// ============================================================================
// GetCoverArt 主服务
// ============================================================================

/// 专辑封面的 cache-aside 读取服务
///
/// 先查缓存，未命中时从封面来源文件读取（图片文件直接读取，音频文件提取内嵌封面），
/// 读取成功后写回缓存。读取失败不缓存，下次请求会重新尝试。
pub struct GetCoverArt {
    album_lookup: Arc<dyn AlbumLookup>,
    file_resolver: Arc<dyn FileResolver>,
    extractor: Arc<dyn EmbeddedArtExtractor>,
    cache: Arc<dyn KeyValueCache>,
}

impl GetCoverArt {
    pub fn new(
        album_lookup: Arc<dyn AlbumLookup>,
        file_resolver: Arc<dyn FileResolver>,
        extractor: Arc<dyn EmbeddedArtExtractor>,
        cache: Arc<dyn KeyValueCache>,
    ) -> Self {
        Self {
            album_lookup,
            file_resolver,
            extractor,
            cache,
        }
    }

    /// 获取专辑封面，找不到返回 None
    pub async fn get_cover(
        &self,
        album_id: &AlbumId,
        user_id: &str,
        tree_root: &MediaPath,
    ) -> Option<CoverImage> {
        if let Some(cached) = self.get_cover_from_cache(album_id, user_id).await {
            return Some(cached);
        }

        let cover = self.read_cover(album_id, user_id, tree_root).await?;
        self.add_cover_to_cache(album_id, user_id, cover.clone()).await;
        Some(cover)
    }

    /// 读取已缓存的封面（内容已解码）
    pub async fn get_cover_from_cache(&self, album_id: &AlbumId, user_id: &str) -> Option<CoverImage> {
        let encoded = self.load_cached(album_id, user_id).await?;
        match encoded.decode() {
            Ok(cover) => {
                log::debug!("Cache hit for cover of album {} (user {})", album_id, user_id);
                Some(cover)
            }
            Err(e) => {
                log::warn!(
                    "Ignoring undecodable cached cover of album {} (user {}): {}",
                    album_id,
                    user_id,
                    e
                );
                None
            }
        }
    }

    /// 读取已缓存的封面，内容保持 base64 文本
    pub async fn get_encoded_cover_from_cache(
        &self,
        album_id: &AlbumId,
        user_id: &str,
    ) -> Option<EncodedCover> {
        self.load_cached(album_id, user_id).await
    }

    /// 缓存封面数据，MIME 或内容为空时什么也不做
    pub async fn add_cover_to_cache(
        &self,
        album_id: &AlbumId,
        user_id: &str,
        cover: impl Into<CoverPayload>,
    ) {
        let Some(cover) = cover.into().into_cover_image() else {
            return;
        };

        let key = cover_cache_key(album_id);
        match self.cache.insert_new(user_id, &key, cover.to_cache_value()).await {
            Ok(InsertOutcome::Created) => {
                log::debug!("Cached cover of album {} (user {})", album_id, user_id);
                // collection 缓存可能引用了旧的封面状态
                if let Err(e) = self.cache.remove(user_id, COLLECTION_CACHE_KEY).await {
                    log::warn!("Failed to invalidate collection cache of user {}: {}", user_id, e);
                }
            }
            Ok(InsertOutcome::AlreadyExists) => {
                log::warn!(
                    "Tried to cache cover of album {} which is already cached. Ignoring.",
                    album_id
                );
            }
            Err(e) => {
                log::warn!("Failed to cache cover of album {}: {}", album_id, e);
            }
        }
    }

    /// 删除缓存的封面，不影响 collection 缓存
    pub async fn remove_cover_from_cache(&self, album_id: &AlbumId, user_id: &str) {
        let key = cover_cache_key(album_id);
        if let Err(e) = self.cache.remove(user_id, &key).await {
            log::warn!("Failed to remove cached cover of album {}: {}", album_id, e);
        }
    }

    async fn load_cached(&self, album_id: &AlbumId, user_id: &str) -> Option<EncodedCover> {
        let key = cover_cache_key(album_id);
        let value = match self.cache.get(user_id, &key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read cover cache {} (user {}): {}", key, user_id, e);
                None
            }
        };

        let Some(value) = value else {
            log::debug!("Cache miss for cover of album {} (user {})", album_id, user_id);
            return None;
        };

        match EncodedCover::from_cache_value(&value) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                log::warn!("Ignoring malformed cache entry {} (user {}): {}", key, user_id, e);
                None
            }
        }
    }

    async fn read_cover(
        &self,
        album_id: &AlbumId,
        user_id: &str,
        tree_root: &MediaPath,
    ) -> Option<CoverImage> {
        let album = match self.album_lookup.find(album_id, user_id).await {
            Ok(Some(album)) => album,
            Ok(None) => {
                log::warn!("Album {} not found for user {}", album_id, user_id);
                return None;
            }
            Err(e) => {
                log::warn!("Failed to look up album {}: {}", album_id, e);
                return None;
            }
        };

        let cover_file_id = album.cover_file_id;
        if !cover_file_id.is_configured() {
            return None;
        }

        let cover = self.read_cover_file(&cover_file_id, tree_root).await;
        if cover.is_none() {
            log::error!(
                "Requested cover not found for album {}, coverId={}",
                album_id,
                cover_file_id
            );
        }
        cover
    }

    async fn read_cover_file(&self, file_id: &FileId, tree_root: &MediaPath) -> Option<CoverImage> {
        let nodes = match self.file_resolver.resolve(file_id, tree_root).await {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("Failed to resolve cover file {}: {}", file_id, e);
                return None;
            }
        };

        // 多个匹配时取第一个
        let node = nodes.into_iter().next()?;

        match FileType::from_mime(node.mime_type()) {
            FileType::Audio => match self.extractor.extract(node.as_ref()).await {
                Ok(picture) => picture.and_then(|p| CoverPayload::from(p).into_cover_image()),
                Err(e) => {
                    log::warn!("Failed to extract embedded cover from file {}: {}", file_id, e);
                    None
                }
            },
            _ => match node.content().await {
                Ok(content) => CoverImage::new(node.mime_type(), content),
                Err(e) => {
                    log::warn!("Failed to read cover file {}: {}", file_id, e);
                    None
                }
            },
        }
    }
}
