use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Claims::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Claims::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Claims::Ip).string().not_null())
                    .col(ColumnDef::new(Claims::SessionId).string().not_null())
                    .col(ColumnDef::new(Claims::CouponId).uuid())
                    .col(
                        ColumnDef::new(Claims::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Claims::Table, Claims::CouponId)
                            .to(Coupons::Table, Coupons::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Cooldown lookup matches on ip OR session_id within a time window.
        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::Ip)
                    .col(Claims::CreatedAt)
                    .name("idx_claims_ip_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::SessionId)
                    .col(Claims::CreatedAt)
                    .name("idx_claims_session_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Claims::Table)
                    .col(Claims::CouponId)
                    .name("idx_claims_coupon_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Claims::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Claims {
    Table,
    Id,
    Ip,
    SessionId,
    CouponId,
    CreatedAt,
}

#[derive(Iden)]
enum Coupons {
    Table,
    Id,
}
