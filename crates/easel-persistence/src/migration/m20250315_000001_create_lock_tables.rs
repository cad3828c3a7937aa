use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CanvasLock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CanvasLock::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CanvasLock::ResourceId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CanvasLock::AcquiredAt).big_integer().not_null())
                    .col(ColumnDef::new(CanvasLock::ExpiresAt).big_integer().not_null())
                    .col(ColumnDef::new(CanvasLock::Holder).string_len(64))
                    .to_owned(),
            )
            .await?;

        // The uniqueness of resource_id is what serializes concurrent
        // acquires; everything else depends on this index existing.
        manager
            .create_index(
                Index::create()
                    .name("uk_canvas_lock_resource_id")
                    .table(CanvasLock::Table)
                    .col(CanvasLock::ResourceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Reaper sweeps filter on expiry.
        manager
            .create_index(
                Index::create()
                    .name("idx_canvas_lock_expires_at")
                    .table(CanvasLock::Table)
                    .col(CanvasLock::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Graphic::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Graphic::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Graphic::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Graphic::CanvasJson).text().not_null())
                    .col(ColumnDef::new(Graphic::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Graphic::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Graphic::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CanvasLock::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CanvasLock {
    Table,
    Id,
    ResourceId,
    AcquiredAt,
    ExpiresAt,
    Holder,
}

#[derive(DeriveIden)]
enum Graphic {
    Table,
    Id,
    Name,
    CanvasJson,
    CreatedAt,
    UpdatedAt,
}
