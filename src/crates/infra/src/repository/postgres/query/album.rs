use application::query::dao::{AlbumCoverRecord, AlbumLookup};
use application::query::QueryError;
use async_trait::async_trait;
use domain::value::{AlbumId, FileId};
use sea_orm::*;

pub struct AlbumCoverDaoImpl {
    db: DatabaseConnection,
}

impl AlbumCoverDaoImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// 专辑封面配置
#[derive(Debug, Clone, FromQueryResult)]
struct AlbumCoverRow {
    pub id: i64,
    pub cover_file_id: Option<i64>,
}

#[async_trait]
impl AlbumLookup for AlbumCoverDaoImpl {
    async fn find(
        &self,
        album_id: &AlbumId,
        user_id: &str,
    ) -> Result<Option<AlbumCoverRecord>, QueryError> {
        let sql = r#"
            SELECT id, cover_file_id
            FROM album
            WHERE id = $1 AND user_id = $2
        "#;

        let row: Option<AlbumCoverRow> = AlbumCoverRow::find_by_statement(
            Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [album_id.as_i64().into(), user_id.into()],
            ),
        )
        .one(&self.db)
        .await
        .map_err(|e| QueryError::DbError(e.to_string()))?;

        Ok(row.map(|r| AlbumCoverRecord {
            album_id: AlbumId::from(r.id),
            // NULL 视为未配置封面
            cover_file_id: FileId::from(r.cover_file_id.unwrap_or(0)),
        }))
    }
}
