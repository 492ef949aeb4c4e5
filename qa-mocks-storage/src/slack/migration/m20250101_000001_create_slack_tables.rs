use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Channels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Channels::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Channels::Name).string_len(80).not_null().unique_key())
                    .col(ColumnDef::new(Channels::Topic).string_len(250).not_null().default(""))
                    .col(ColumnDef::new(Channels::Purpose).string_len(250).not_null().default(""))
                    .col(ColumnDef::new(Channels::IsPrivate).boolean().not_null().default(false))
                    .col(ColumnDef::new(Channels::Created).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Files::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Files::Mimetype).string_len(100).not_null())
                    .col(ColumnDef::new(Files::Filetype).string_len(50).not_null())
                    .col(ColumnDef::new(Files::Size).big_integer().not_null())
                    .col(ColumnDef::new(Files::User).string_len(80).not_null())
                    .col(ColumnDef::new(Files::Channels).json().not_null())
                    .col(ColumnDef::new(Files::Created).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::TsMicros).big_integer().not_null().unique_key())
                    .col(ColumnDef::new(Messages::ChannelId).string_len(32).not_null())
                    .col(ColumnDef::new(Messages::User).string_len(80).not_null())
                    .col(ColumnDef::new(Messages::Text).text().not_null())
                    .col(ColumnDef::new(Messages::ThreadTs).string_len(32).null())
                    .col(ColumnDef::new(Messages::FileId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_channel_id")
                            .from(Messages::Table, Messages::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_file_id")
                            .from(Messages::Table, Messages::FileId)
                            .to(Files::Table, Files::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_messages_channel_id")
                    .table(Messages::Table)
                    .col(Messages::ChannelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_messages_thread_ts")
                    .table(Messages::Table)
                    .col(Messages::ThreadTs)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Channels::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Channels {
    Table,
    Id,
    Name,
    Topic,
    Purpose,
    IsPrivate,
    Created,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    TsMicros,
    ChannelId,
    User,
    Text,
    ThreadTs,
    FileId,
}

#[derive(DeriveIden)]
enum Files {
    Table,
    Id,
    Name,
    Title,
    Mimetype,
    Filetype,
    Size,
    User,
    Channels,
    Created,
}
