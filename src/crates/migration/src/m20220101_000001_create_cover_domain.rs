use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 文件表：id -> 用户文件树内的相对路径
        manager
            .create_table(
                Table::create()
                    .table(File::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(File::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(File::Path).string().not_null())
                    .to_owned(),
            )
            .await?;

        // 专辑表：cover_file_id 为空或 0 表示未配置封面
        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Album::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Album::UserId).string().not_null())
                    .col(ColumnDef::new(Album::CoverFileId).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_user_id")
                    .table(Album::Table)
                    .col(Album::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(File::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum File {
    Table,
    Id,
    Path,
}

#[derive(DeriveIden)]
enum Album {
    Table,
    Id,
    UserId,
    CoverFileId,
}
