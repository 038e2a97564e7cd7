//! Initial migration creating the diary entry table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiaryEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiaryEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiaryEntries::OwnerId).string().not_null())
                    // Content
                    .col(ColumnDef::new(DiaryEntries::Title).string().not_null())
                    .col(ColumnDef::new(DiaryEntries::Content).text().not_null())
                    .col(
                        ColumnDef::new(DiaryEntries::Tags)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    // Commit link
                    .col(ColumnDef::new(DiaryEntries::CommitHash).string().null())
                    .col(ColumnDef::new(DiaryEntries::CommitRepo).string().null())
                    // State
                    .col(
                        ColumnDef::new(DiaryEntries::IsDraft)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(DiaryEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiaryEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One entry per commit per owner. NULL hashes never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx_diary_entries_owner_commit")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::OwnerId)
                    .col(DiaryEntries::CommitHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diary_entries_owner_created")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::OwnerId)
                    .col((DiaryEntries::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiaryEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DiaryEntries {
    Table,
    Id,
    OwnerId,
    Title,
    Content,
    Tags,
    CommitHash,
    CommitRepo,
    IsDraft,
    CreatedAt,
    UpdatedAt,
}
