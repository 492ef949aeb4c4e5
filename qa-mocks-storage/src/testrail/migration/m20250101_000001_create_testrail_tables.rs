use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_column<T: Iden + 'static>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(id_column(Projects::Id))
                    .col(ColumnDef::new(Projects::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Projects::Announcement).text().null())
                    .col(ColumnDef::new(Projects::ShowAnnouncement).boolean().not_null().default(false))
                    .col(ColumnDef::new(Projects::IsCompleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Projects::CompletedOn).big_integer().null())
                    .col(ColumnDef::new(Projects::CreatedOn).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(id_column(Sections::Id))
                    .col(ColumnDef::new(Sections::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Sections::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Sections::Description).text().null())
                    .col(ColumnDef::new(Sections::ParentId).integer().null())
                    .col(ColumnDef::new(Sections::Depth).integer().not_null().default(0))
                    .col(ColumnDef::new(Sections::DisplayOrder).integer().not_null())
                    .col(ColumnDef::new(Sections::CreatedOn).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sections_project_id")
                            .from(Sections::Table, Sections::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(id_column(Cases::Id))
                    .col(ColumnDef::new(Cases::SectionId).integer().not_null())
                    .col(ColumnDef::new(Cases::Title).string_len(500).not_null())
                    .col(ColumnDef::new(Cases::TemplateId).integer().not_null().default(1))
                    .col(ColumnDef::new(Cases::TypeId).integer().not_null().default(1))
                    .col(ColumnDef::new(Cases::PriorityId).integer().not_null().default(2))
                    .col(ColumnDef::new(Cases::Steps).json().null())
                    .col(ColumnDef::new(Cases::ExpectedResult).text().null())
                    .col(ColumnDef::new(Cases::Preconditions).text().null())
                    .col(ColumnDef::new(Cases::Estimate).string_len(50).null())
                    .col(ColumnDef::new(Cases::Refs).string_len(255).null())
                    .col(ColumnDef::new(Cases::CreatedOn).big_integer().not_null())
                    .col(ColumnDef::new(Cases::UpdatedOn).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cases_section_id")
                            .from(Cases::Table, Cases::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Runs::Table)
                    .if_not_exists()
                    .col(id_column(Runs::Id))
                    .col(ColumnDef::new(Runs::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Runs::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Runs::Description).text().null())
                    .col(ColumnDef::new(Runs::IncludeAll).boolean().not_null().default(true))
                    .col(ColumnDef::new(Runs::IsCompleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Runs::CompletedOn).big_integer().null())
                    .col(ColumnDef::new(Runs::CreatedOn).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_runs_project_id")
                            .from(Runs::Table, Runs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RunEntries::Table)
                    .if_not_exists()
                    .col(id_column(RunEntries::Id))
                    .col(ColumnDef::new(RunEntries::RunId).integer().not_null())
                    .col(ColumnDef::new(RunEntries::CaseId).integer().not_null())
                    .col(ColumnDef::new(RunEntries::Title).string_len(500).not_null())
                    .col(ColumnDef::new(RunEntries::StatusId).integer().not_null().default(3))
                    .col(ColumnDef::new(RunEntries::Comment).text().null())
                    .col(ColumnDef::new(RunEntries::Elapsed).string_len(50).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_run_entries_run_id")
                            .from(RunEntries::Table, RunEntries::RunId)
                            .to(Runs::Table, Runs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_run_entries_case_id")
                            .from(RunEntries::Table, RunEntries::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Results::Table)
                    .if_not_exists()
                    .col(id_column(Results::Id))
                    .col(ColumnDef::new(Results::CaseId).integer().not_null())
                    .col(ColumnDef::new(Results::TestId).integer().null())
                    .col(ColumnDef::new(Results::StatusId).integer().not_null())
                    .col(ColumnDef::new(Results::Comment).text().null())
                    .col(ColumnDef::new(Results::Elapsed).string_len(50).null())
                    .col(ColumnDef::new(Results::Defects).string_len(255).null())
                    .col(ColumnDef::new(Results::CreatedOn).big_integer().not_null())
                    .col(ColumnDef::new(Results::CreatedBy).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_results_case_id")
                            .from(Results::Table, Results::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            ("idx_sections_project_id", "sections", "project_id"),
            ("idx_cases_section_id", "cases", "section_id"),
            ("idx_results_case_id", "results", "case_id"),
            ("idx_runs_project_id", "runs", "project_id"),
            ("idx_run_entries_run_id", "run_entries", "run_id"),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Alias::new(table))
                        .col(Alias::new(column))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["results", "run_entries", "runs", "cases", "sections", "projects"] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    Announcement,
    ShowAnnouncement,
    IsCompleted,
    CompletedOn,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Sections {
    Table,
    Id,
    ProjectId,
    Name,
    Description,
    ParentId,
    Depth,
    DisplayOrder,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Cases {
    Table,
    Id,
    SectionId,
    Title,
    TemplateId,
    TypeId,
    PriorityId,
    Steps,
    ExpectedResult,
    Preconditions,
    Estimate,
    Refs,
    CreatedOn,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum Results {
    Table,
    Id,
    CaseId,
    TestId,
    StatusId,
    Comment,
    Elapsed,
    Defects,
    CreatedOn,
    CreatedBy,
}

#[derive(DeriveIden)]
enum Runs {
    Table,
    Id,
    ProjectId,
    Name,
    Description,
    IncludeAll,
    IsCompleted,
    CompletedOn,
    CreatedOn,
}

#[derive(DeriveIden)]
enum RunEntries {
    Table,
    Id,
    RunId,
    CaseId,
    Title,
    StatusId,
    Comment,
    Elapsed,
}
