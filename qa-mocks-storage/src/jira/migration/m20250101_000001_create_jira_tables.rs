use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issues::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Issues::Key).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Issues::ProjectKey).string_len(32).not_null())
                    .col(ColumnDef::new(Issues::Number).integer().not_null())
                    .col(ColumnDef::new(Issues::Summary).text().not_null())
                    .col(ColumnDef::new(Issues::Description).json().null())
                    .col(ColumnDef::new(Issues::IssueType).string_len(32).not_null())
                    .col(ColumnDef::new(Issues::Priority).string_len(32).not_null())
                    .col(ColumnDef::new(Issues::Status).string_len(32).not_null())
                    .col(ColumnDef::new(Issues::Assignee).string_len(255).null())
                    .col(ColumnDef::new(Issues::Reporter).string_len(255).null())
                    .col(ColumnDef::new(Issues::Labels).json().not_null())
                    .col(ColumnDef::new(Issues::Components).json().not_null())
                    .col(ColumnDef::new(Issues::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Issues::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attachments::IssueId).integer().not_null())
                    .col(ColumnDef::new(Attachments::Filename).string_len(255).not_null())
                    .col(ColumnDef::new(Attachments::MimeType).string_len(255).not_null())
                    .col(ColumnDef::new(Attachments::Size).big_integer().not_null())
                    .col(ColumnDef::new(Attachments::Author).string_len(255).not_null())
                    .col(ColumnDef::new(Attachments::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_issue_id")
                            .from(Attachments::Table, Attachments::IssueId)
                            .to(Issues::Table, Issues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectCounters::ProjectKey)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectCounters::LastNumber).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issues_project_key")
                    .table(Issues::Table)
                    .col(Issues::ProjectKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attachments_issue_id")
                    .table(Attachments::Table)
                    .col(Attachments::IssueId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectCounters::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Issues::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Issues {
    Table,
    Id,
    Key,
    ProjectKey,
    Number,
    Summary,
    Description,
    IssueType,
    Priority,
    Status,
    Assignee,
    Reporter,
    Labels,
    Components,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    IssueId,
    Filename,
    MimeType,
    Size,
    Author,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProjectCounters {
    Table,
    ProjectKey,
    LastNumber,
}
