use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 支持交易状态机: pending 为初始态, success/cancel 为终态
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "cancel")]
    Cancel,
}

impl SupportStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SupportStatus::Pending)
    }
}

impl std::fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportStatus::Pending => write!(f, "pending"),
            SupportStatus::Success => write!(f, "success"),
            SupportStatus::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "support_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub creator_id: i64,
    /// NULL 表示游客支持
    pub fan_id: Option<i64>,
    /// NULL 表示自由金额支持（不经过 Action Card）
    pub action_card_id: Option<i64>,
    pub amount_cents: i64,
    pub message: Option<String>,
    pub guest_name: Option<String>,
    pub is_anonymous: bool,
    pub status: SupportStatus,
    pub payment_reference: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FanId",
        to = "super::users::Column::Id"
    )]
    Fan,
    #[sea_orm(
        belongs_to = "super::action_cards::Entity",
        from = "Column::ActionCardId",
        to = "super::action_cards::Column::Id"
    )]
    ActionCard,
}

// 支持者列表需要联查粉丝信息, 默认关联走 fan_id
impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
