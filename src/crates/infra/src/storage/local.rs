use crate::file_type_detector::MimeTypeDetector;
use application::query::dao::FilePathDao;
use application::query::get_cover_art::{FileNode, FileResolver};
use application::query::QueryError;
use async_trait::async_trait;
use bytes::Bytes;
use domain::value::{FileId, MediaPath};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// 本地文件系统中的文件节点，内容按需读取
#[derive(Debug, Clone)]
pub struct LocalFileNode {
    path: PathBuf,
    mime_type: String,
}

impl LocalFileNode {
    pub fn new(path: PathBuf) -> Self {
        let mime_type = MimeTypeDetector::detect_from_path(&path);
        Self { path, mime_type }
    }
}

#[async_trait]
impl FileNode for LocalFileNode {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn content(&self) -> Result<Bytes, QueryError> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            QueryError::ExecutionError(format!(
                "Failed to read file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Bytes::from(data))
    }

    fn local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// 在本地文件树中按文件 id 查找文件
pub struct LocalFileResolver {
    file_paths: Arc<dyn FilePathDao>,
}

impl LocalFileResolver {
    pub fn new(file_paths: Arc<dyn FilePathDao>) -> Self {
        Self { file_paths }
    }
}

/// 拒绝绝对路径和 `..`，保证结果落在文件树内
fn join_within_root(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(root.join(relative))
}

#[async_trait]
impl FileResolver for LocalFileResolver {
    async fn resolve(
        &self,
        file_id: &FileId,
        tree_root: &MediaPath,
    ) -> Result<Vec<Box<dyn FileNode>>, QueryError> {
        if !tree_root.is_local() {
            return Err(QueryError::InvalidInput(format!(
                "Unsupported protocol: {}",
                tree_root.protocol
            )));
        }

        let Some(relative) = self.file_paths.get_relative_path(file_id).await? else {
            return Ok(Vec::new());
        };

        let Some(path) = join_within_root(Path::new(&tree_root.path), &relative) else {
            log::warn!("File {} points outside of the tree: {}", file_id, relative);
            return Ok(Vec::new());
        };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                let node: Box<dyn FileNode> = Box::new(LocalFileNode::new(path));
                Ok(vec![node])
            }
            _ => {
                log::debug!("File {} no longer exists at {}", file_id, path.display());
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::in_memory::InMemoryFilePathDao;
    use std::fs;
    use tempfile::TempDir;

    fn resolver_with(entries: &[(i64, &str)]) -> LocalFileResolver {
        let dao = InMemoryFilePathDao::new();
        for (id, path) in entries {
            dao.save(FileId::from(*id), *path);
        }
        LocalFileResolver::new(Arc::new(dao))
    }

    #[tokio::test]
    async fn test_resolve_image_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("album")).unwrap();
        fs::write(temp_dir.path().join("album/cover.png"), b"\x89PNG").unwrap();

        let resolver = resolver_with(&[(99, "album/cover.png")]);
        let root = MediaPath::local(temp_dir.path().to_string_lossy());

        let nodes = resolver.resolve(&FileId::from(99), &root).await.unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].mime_type(), "image/png");
        assert_eq!(&nodes[0].content().await.unwrap()[..], b"\x89PNG");
        assert_eq!(
            nodes[0].local_path(),
            Some(temp_dir.path().join("album/cover.png").as_path())
        );
    }

    #[tokio::test]
    async fn test_resolve_audio_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("01.mp3"), b"ID3").unwrap();

        let resolver = resolver_with(&[(55, "/01.mp3")]);
        let root = MediaPath::local(temp_dir.path().to_string_lossy());

        let nodes = resolver.resolve(&FileId::from(55), &root).await.unwrap();
        assert_eq!(nodes[0].mime_type(), "audio/mpeg");
    }

    #[tokio::test]
    async fn test_unknown_id_resolves_to_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_with(&[]);
        let root = MediaPath::local(temp_dir.path().to_string_lossy());

        assert!(resolver.resolve(&FileId::from(3), &root).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_file_resolves_to_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver_with(&[(3, "gone.jpg")]);
        let root = MediaPath::local(temp_dir.path().to_string_lossy());

        assert!(resolver.resolve(&FileId::from(3), &root).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_outside_tree_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("alice")).unwrap();
        fs::write(temp_dir.path().join("secret.png"), b"\x89PNG").unwrap();

        let resolver = resolver_with(&[(8, "../secret.png")]);
        let root = MediaPath::local(temp_dir.path().join("alice").to_string_lossy());

        assert!(resolver.resolve(&FileId::from(8), &root).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_root_is_rejected() {
        let resolver = resolver_with(&[(1, "cover.jpg")]);
        let root = MediaPath::new("smb".to_string(), "/share".to_string());

        assert!(resolver.resolve(&FileId::from(1), &root).await.is_err());
    }
}
