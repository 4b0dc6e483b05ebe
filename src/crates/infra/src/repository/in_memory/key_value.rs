use application::query::cover_cache::{InsertOutcome, KeyValueCache};
use application::query::QueryError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// 进程内键值缓存，不持久化
#[derive(Clone, Default)]
pub struct InMemoryKeyValueCache {
    store: Arc<DashMap<(String, String), String>>,
}

impl InMemoryKeyValueCache {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl KeyValueCache for InMemoryKeyValueCache {
    async fn get(&self, scope: &str, key: &str) -> Result<Option<String>, QueryError> {
        Ok(self
            .store
            .get(&(scope.to_string(), key.to_string()))
            .map(|v| v.value().clone()))
    }

    async fn insert_new(
        &self,
        scope: &str,
        key: &str,
        value: String,
    ) -> Result<InsertOutcome, QueryError> {
        match self.store.entry((scope.to_string(), key.to_string())) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyExists),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(InsertOutcome::Created)
            }
        }
    }

    async fn remove(&self, scope: &str, key: &str) -> Result<(), QueryError> {
        self.store.remove(&(scope.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_new_only_once() {
        let cache = InMemoryKeyValueCache::new();

        let first = cache.insert_new("alice", "cover_1", "a".to_string()).await.unwrap();
        let second = cache.insert_new("alice", "cover_1", "b".to_string()).await.unwrap();

        assert_eq!(first, InsertOutcome::Created);
        assert_eq!(second, InsertOutcome::AlreadyExists);
        assert_eq!(cache.get("alice", "cover_1").await.unwrap().as_deref(), Some("a"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_create_one_entry() {
        let cache = InMemoryKeyValueCache::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .insert_new("bob", "cover_7", format!("value-{}", i))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() == InsertOutcome::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_key() {
        let cache = InMemoryKeyValueCache::new();

        cache.remove("carol", "cover_1").await.unwrap();
        assert!(cache.is_empty());
    }
}
