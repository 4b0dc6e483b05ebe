use application::query::dao::{AlbumCoverRecord, AlbumLookup};
use application::query::QueryError;
use async_trait::async_trait;
use dashmap::DashMap;
use domain::value::{AlbumId, FileId};
use std::sync::Arc;

/// 进程内专辑封面配置，按 (user_id, album_id) 存储
#[derive(Clone, Default)]
pub struct InMemoryAlbumDao {
    store: Arc<DashMap<(String, AlbumId), FileId>>,
}

impl InMemoryAlbumDao {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn save(&self, user_id: &str, album_id: AlbumId, cover_file_id: FileId) {
        self.store.insert((user_id.to_string(), album_id), cover_file_id);
    }
}

#[async_trait]
impl AlbumLookup for InMemoryAlbumDao {
    async fn find(
        &self,
        album_id: &AlbumId,
        user_id: &str,
    ) -> Result<Option<AlbumCoverRecord>, QueryError> {
        Ok(self
            .store
            .get(&(user_id.to_string(), album_id.clone()))
            .map(|cover| AlbumCoverRecord {
                album_id: album_id.clone(),
                cover_file_id: cover.value().clone(),
            }))
    }
}
