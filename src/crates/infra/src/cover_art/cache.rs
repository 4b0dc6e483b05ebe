use application::query::cover_cache::{InsertOutcome, KeyValueCache};
use application::query::QueryError;
use async_trait::async_trait;
use sled::Db;
use std::path::PathBuf;

/// 基于 sled 的持久化键值缓存
/// sled 内部已有内存缓存，无需额外的内存层
pub struct SledKeyValueCache {
    /// sled 数据库实例
    db: Db,
}

impl SledKeyValueCache {
    /// 创建新的持久化缓存实例
    ///
    /// # Arguments
    /// * `db_path` - sled 数据库路径
    pub fn new(db_path: PathBuf) -> Result<Self, sled::Error> {
        // 确保目录存在
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = sled::open(db_path)?;

        Ok(Self { db })
    }

    /// 删除某个用户的全部缓存条目，返回删除数量
    pub fn clear_scope(&self, scope: &str) -> Result<usize, sled::Error> {
        let prefix = scope_prefix(scope);
        let mut removed = 0;
        for item in self.db.scan_prefix(&prefix) {
            let (key, _) = item?;
            if self.db.remove(key)?.is_some() {
                removed += 1;
            }
        }
        log::debug!("Cleared {} cache entries of scope {}", removed, scope);
        Ok(removed)
    }

    /// 将缓冲区写入磁盘
    pub fn flush(&self) -> Result<usize, sled::Error> {
        self.db.flush()
    }
}

/// 存储键格式：`<scope 字节长度 u32 BE><scope><key>`
/// 长度前缀保证不同 scope 的键空间互不重叠
fn scope_prefix(scope: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(scope.len() + 4);
    prefix.extend_from_slice(&(scope.len() as u32).to_be_bytes());
    prefix.extend_from_slice(scope.as_bytes());
    prefix
}

fn entry_key(scope: &str, key: &str) -> Vec<u8> {
    let mut entry = scope_prefix(scope);
    entry.extend_from_slice(key.as_bytes());
    entry
}

fn cache_error(e: sled::Error) -> QueryError {
    QueryError::CacheError(e.to_string())
}

#[async_trait]
impl KeyValueCache for SledKeyValueCache {
    async fn get(&self, scope: &str, key: &str) -> Result<Option<String>, QueryError> {
        let value = self.db.get(entry_key(scope, key)).map_err(cache_error)?;
        match value {
            Some(value) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| QueryError::CacheError(format!("Invalid utf-8 in {}: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn insert_new(
        &self,
        scope: &str,
        key: &str,
        value: String,
    ) -> Result<InsertOutcome, QueryError> {
        // compare_and_swap 保证同一个 key 只会被创建一次
        let swapped = self
            .db
            .compare_and_swap(entry_key(scope, key), None as Option<&[u8]>, Some(value.as_bytes()))
            .map_err(cache_error)?;

        match swapped {
            Ok(()) => Ok(InsertOutcome::Created),
            Err(_) => Ok(InsertOutcome::AlreadyExists),
        }
    }

    async fn remove(&self, scope: &str, key: &str) -> Result<(), QueryError> {
        self.db.remove(entry_key(scope, key)).map_err(cache_error)?;
        Ok(())
    }
}
