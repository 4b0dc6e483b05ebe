use super::{InMemoryAlbumDao, InMemoryFilePathDao};
use config::{Config, ConfigError, File};
use domain::value::{AlbumId, FileId};
use serde::Deserialize;
use std::path::Path;

/// 专辑/文件索引文件，在没有数据库时为内存索引提供数据
///
/// ```toml
/// [[albums]]
/// user_id = "alice"
/// id = 1
/// cover_file_id = 10
///
/// [[files]]
/// id = 10
/// path = "Artist/Album/cover.jpg"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LibraryIndex {
    albums: Vec<AlbumEntry>,
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct AlbumEntry {
    user_id: String,
    id: i64,
    /// 缺省视为未配置封面
    cover_file_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: i64,
    /// 相对于文件树根目录
    path: String,
}

impl LibraryIndex {
    /// 按扩展名识别格式（toml/json/yaml）
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }

    /// 写入内存索引，返回 (专辑数, 文件数)
    pub fn seed(self, albums: &InMemoryAlbumDao, files: &InMemoryFilePathDao) -> (usize, usize) {
        let counts = (self.albums.len(), self.files.len());
        for album in self.albums {
            albums.save(
                &album.user_id,
                AlbumId::from(album.id),
                FileId::from(album.cover_file_id.unwrap_or(0)),
            );
        }
        for file in self.files {
            files.save(FileId::from(file.id), file.path);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::in_memory::InMemoryKeyValueCache;
    use crate::{EmbeddedArtExtractorImpl, LocalFileResolver};
    use application::query::cover_cache::KeyValueCache;
    use application::query::dao::{AlbumLookup, FilePathDao};
    use application::query::get_cover_art::GetCoverArt;
    use domain::value::MediaPath;
    use std::sync::Arc;
    use tempfile::TempDir;

    const INDEX: &str = r#"
[[albums]]
user_id = "alice"
id = 1
cover_file_id = 10

[[albums]]
user_id = "alice"
id = 2

[[files]]
id = 10
path = "Artist/Album/cover.png"
"#;

    fn write_index(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("library.toml");
        std::fs::write(&path, INDEX).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_and_seed() {
        let temp_dir = TempDir::new().unwrap();
        let index = LibraryIndex::load(&write_index(&temp_dir)).unwrap();

        let albums = InMemoryAlbumDao::new();
        let files = InMemoryFilePathDao::new();
        assert_eq!(index.seed(&albums, &files), (2, 1));

        let album = albums.find(&AlbumId::from(1), "alice").await.unwrap().unwrap();
        assert_eq!(album.cover_file_id, FileId::from(10));
        let without_cover = albums.find(&AlbumId::from(2), "alice").await.unwrap().unwrap();
        assert!(!without_cover.cover_file_id.is_configured());
        assert_eq!(
            files.get_relative_path(&FileId::from(10)).await.unwrap().as_deref(),
            Some("Artist/Album/cover.png")
        );
    }

    #[test]
    fn test_missing_index_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(LibraryIndex::load(&temp_dir.path().join("absent.toml")).is_err());
    }

    #[tokio::test]
    async fn test_seeded_index_serves_covers() {
        let temp_dir = TempDir::new().unwrap();
        let music_root = temp_dir.path().join("music");
        std::fs::create_dir_all(music_root.join("Artist/Album")).unwrap();
        std::fs::write(music_root.join("Artist/Album/cover.png"), b"\x89PNG-data").unwrap();

        let albums = InMemoryAlbumDao::new();
        let files = InMemoryFilePathDao::new();
        LibraryIndex::load(&write_index(&temp_dir))
            .unwrap()
            .seed(&albums, &files);

        let cache = InMemoryKeyValueCache::new();
        let service = GetCoverArt::new(
            Arc::new(albums),
            Arc::new(LocalFileResolver::new(Arc::new(files))),
            Arc::new(EmbeddedArtExtractorImpl::new()),
            Arc::new(cache.clone()),
        );
        let root = MediaPath::local(music_root.to_string_lossy());

        let cover = service.get_cover(&AlbumId::from(1), "alice", &root).await.unwrap();
        assert_eq!(cover.mime_type(), "image/png");
        assert_eq!(&cover.content()[..], b"\x89PNG-data");
        assert!(cache.get("alice", "cover_1").await.unwrap().is_some());

        assert!(service.get_cover(&AlbumId::from(2), "alice", &root).await.is_none());
        assert!(service.get_cover(&AlbumId::from(1), "bob", &root).await.is_none());
        assert_eq!(cache.len(), 1);
    }
}
