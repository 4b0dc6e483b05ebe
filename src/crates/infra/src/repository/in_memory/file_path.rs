use application::query::dao::FilePathDao;
use application::query::QueryError;
use async_trait::async_trait;
use dashmap::DashMap;
use domain::value::FileId;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InMemoryFilePathDao {
    store: Arc<DashMap<FileId, String>>,
}

impl InMemoryFilePathDao {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn save(&self, file_id: FileId, relative_path: impl Into<String>) {
        self.store.insert(file_id, relative_path.into());
    }
}

#[async_trait]
impl FilePathDao for InMemoryFilePathDao {
    async fn get_relative_path(&self, file_id: &FileId) -> Result<Option<String>, QueryError> {
        Ok(self.store.get(file_id).map(|v| v.value().clone()))
    }
}
