use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    DisplayName,
    Bio,
    AvatarUrl,
    BannerUrl,
    SocialLinks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ActionCards {
    Table,
    Id,
    CreatorId,
    Title,
    Description,
    PriceCents,
    Icon,
    IsActive,
    IsFeatured,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SupportTransactions {
    Table,
    Id,
    CreatorId,
    FanId,
    ActionCardId,
    AmountCents,
    Message,
    GuestName,
    IsAnonymous,
    Status,
    PaymentReference,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MembershipTiers {
    Table,
    Id,
    CreatorId,
    Name,
    Description,
    PriceCents,
    Perks,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MemberSubscriptions {
    Table,
    Id,
    FanId,
    CreatorId,
    TierId,
    Status,
    CurrentPeriodEnd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    CreatorId,
    Title,
    Body,
    Visibility,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GalleryItems {
    Table,
    Id,
    CreatorId,
    Title,
    MediaUrl,
    Caption,
    Visibility,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("fan"),
                    )
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::Bio).text().null())
                    .col(ColumnDef::new(Users::AvatarUrl).string().null())
                    .col(ColumnDef::new(Users::BannerUrl).string().null())
                    .col(ColumnDef::new(Users::SocialLinks).text().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActionCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActionCards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActionCards::CreatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActionCards::Title).string().not_null())
                    .col(ColumnDef::new(ActionCards::Description).text().null())
                    .col(
                        ColumnDef::new(ActionCards::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActionCards::Icon).string().null())
                    .col(
                        ColumnDef::new(ActionCards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ActionCards::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ActionCards::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ActionCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ActionCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_action_cards_creator")
                            .from(ActionCards::Table, ActionCards::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_action_cards_creator_id")
                    .table(ActionCards::Table)
                    .col(ActionCards::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupportTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::CreatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::FanId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::ActionCardId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupportTransactions::Message).text().null())
                    .col(
                        ColumnDef::new(SupportTransactions::GuestName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::PaymentReference)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SupportTransactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_transactions_creator")
                            .from(SupportTransactions::Table, SupportTransactions::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_transactions_fan")
                            .from(SupportTransactions::Table, SupportTransactions::FanId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_transactions_action_card")
                            .from(SupportTransactions::Table, SupportTransactions::ActionCardId)
                            .to(ActionCards::Table, ActionCards::Id)
                            // 删除卡片时保留历史交易, 仅断开引用
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 结算与聚合读都按 (creator_id, status) 过滤
        manager
            .create_index(
                Index::create()
                    .name("idx_support_transactions_creator_status")
                    .table(SupportTransactions::Table)
                    .col(SupportTransactions::CreatorId)
                    .col(SupportTransactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_support_transactions_fan_id")
                    .table(SupportTransactions::Table)
                    .col(SupportTransactions::FanId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipTiers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MembershipTiers::CreatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MembershipTiers::Name).string().not_null())
                    .col(ColumnDef::new(MembershipTiers::Description).text().null())
                    .col(
                        ColumnDef::new(MembershipTiers::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MembershipTiers::Perks)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(MembershipTiers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(MembershipTiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MembershipTiers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_tiers_creator")
                            .from(MembershipTiers::Table, MembershipTiers::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_membership_tiers_creator_id")
                    .table(MembershipTiers::Table)
                    .col(MembershipTiers::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemberSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MemberSubscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::FanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::CreatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::TierId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MemberSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_subscriptions_fan")
                            .from(MemberSubscriptions::Table, MemberSubscriptions::FanId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_subscriptions_creator")
                            .from(MemberSubscriptions::Table, MemberSubscriptions::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_subscriptions_tier")
                            .from(MemberSubscriptions::Table, MemberSubscriptions::TierId)
                            .to(MembershipTiers::Table, MembershipTiers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个粉丝对同一创作者至多一条订阅记录
        manager
            .create_index(
                Index::create()
                    .name("uq_member_subscriptions_fan_creator")
                    .table(MemberSubscriptions::Table)
                    .col(MemberSubscriptions::FanId)
                    .col(MemberSubscriptions::CreatorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Body).text().not_null())
                    .col(
                        ColumnDef::new(Posts::Visibility)
                            .string()
                            .not_null()
                            .default("public"),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_creator")
                            .from(Posts::Table, Posts::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_creator_id")
                    .table(Posts::Table)
                    .col(Posts::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GalleryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GalleryItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GalleryItems::CreatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GalleryItems::Title).string().null())
                    .col(ColumnDef::new(GalleryItems::MediaUrl).string().not_null())
                    .col(ColumnDef::new(GalleryItems::Caption).text().null())
                    .col(
                        ColumnDef::new(GalleryItems::Visibility)
                            .string()
                            .not_null()
                            .default("public"),
                    )
                    .col(
                        ColumnDef::new(GalleryItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GalleryItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gallery_items_creator")
                            .from(GalleryItems::Table, GalleryItems::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gallery_items_creator_id")
                    .table(GalleryItems::Table)
                    .col(GalleryItems::CreatorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GalleryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MemberSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MembershipTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupportTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActionCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
