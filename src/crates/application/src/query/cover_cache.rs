use crate::query::QueryError;
use async_trait::async_trait;

/// 仅在 key 不存在时写入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// 另一个写入者已经插入了同一个 key，原值保持不变
    AlreadyExists,
}

/// 按用户隔离的字符串键值缓存，每个 (scope, key) 至多一条记录
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, scope: &str, key: &str) -> Result<Option<String>, QueryError>;

    /// 写入新条目；已存在时返回 `AlreadyExists`，不覆盖
    async fn insert_new(
        &self,
        scope: &str,
        key: &str,
        value: String,
    ) -> Result<InsertOutcome, QueryError>;

    /// 删除条目，不存在时什么也不做
    async fn remove(&self, scope: &str, key: &str) -> Result<(), QueryError>;
}
