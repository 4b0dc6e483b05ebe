use application::query::dao::FilePathDao;
use application::query::QueryError;
use async_trait::async_trait;
use domain::value::FileId;
use sea_orm::*;

pub struct FilePathDaoImpl {
    db: DatabaseConnection,
}

impl FilePathDaoImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, Clone, FromQueryResult)]
struct FilePathRow {
    pub path: String,
}

#[async_trait]
impl FilePathDao for FilePathDaoImpl {
    async fn get_relative_path(&self, file_id: &FileId) -> Result<Option<String>, QueryError> {
        let sql = r#"
            SELECT path
            FROM file
            WHERE id = $1
        "#;

        let row: Option<FilePathRow> = FilePathRow::find_by_statement(
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [file_id.as_i64().into()]),
        )
        .one(&self.db)
        .await
        .map_err(|e| QueryError::DbError(e.to_string()))?;

        Ok(row.map(|r| r.path))
    }
}
