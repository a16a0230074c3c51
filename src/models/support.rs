use crate::entities::{SupportStatus, support_transaction_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSupportRequest {
    pub creator_id: i64,
    /// 为空时是自由金额支持
    pub action_card_id: Option<i64>,
    /// 选择了 Action Card 时可省略, 默认卡面价格
    pub amount_cents: Option<i64>,
    pub message: Option<String>,
    /// 游客支持时展示的名字
    pub guest_name: Option<String>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSupportResponse {
    pub transaction_id: i64,
    pub status: SupportStatus,
    pub amount_cents: i64,
    pub payment_reference: String,
    pub checkout_url: String,
}

/// 模拟网关回调的结算结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SettlementOutcome {
    Success,
    Cancel,
}

impl SettlementOutcome {
    pub fn target_status(self) -> SupportStatus {
        match self {
            SettlementOutcome::Success => SupportStatus::Success,
            SettlementOutcome::Cancel => SupportStatus::Cancel,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SimulatePaymentRequest {
    pub transaction_id: i64,
    pub outcome: SettlementOutcome,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettlementResponse {
    pub transaction_id: i64,
    pub status: SupportStatus,
    /// false 表示该交易早已是终态, 本次调用未改变任何状态
    pub newly_settled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupportTransactionResponse {
    pub id: i64,
    pub creator_id: i64,
    pub fan_id: Option<i64>,
    pub action_card_id: Option<i64>,
    pub amount_cents: i64,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub status: SupportStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<support_transaction_entity::Model> for SupportTransactionResponse {
    fn from(m: support_transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            fan_id: m.fan_id,
            action_card_id: m.action_card_id,
            amount_cents: m.amount_cents,
            message: m.message,
            is_anonymous: m.is_anonymous,
            status: m.status,
            payment_reference: m.payment_reference,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 创作者主页支持者时间线的一条记录, 匿名/游客的展示名已在服务层解析
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupporterResponse {
    pub display_name: String,
    pub amount_cents: i64,
    pub message: Option<String>,
    pub supported_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EarningsResponse {
    pub total_amount_cents: i64,
    pub total_count: i64,
    pub unique_supporters: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupportHistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<SupportStatus>,
}
