use crate::entities::{SubscriptionStatus, member_subscription_entity, membership_tier_entity};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// perks 在库里是 JSON 数组文本, 模型层只见 Vec<String>
pub fn perks_to_json(perks: &[String]) -> AppResult<String> {
    Ok(serde_json::to_string(perks)?)
}

pub fn perks_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTierRequest {
    #[schema(example = "Studio Insider")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 500)]
    pub price_cents: i64,
    pub perks: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTierRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub perks: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TierResponse {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub perks: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<membership_tier_entity::Model> for TierResponse {
    fn from(m: membership_tier_entity::Model) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            name: m.name,
            description: m.description,
            price_cents: m.price_cents,
            perks: perks_from_json(&m.perks),
            is_active: m.is_active,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub tier_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelSubscriptionRequest {
    pub creator_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub creator_id: i64,
    pub creator_username: Option<String>,
    pub creator_display_name: Option<String>,
    pub tier_id: i64,
    pub tier_name: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<member_subscription_entity::Model> for SubscriptionResponse {
    fn from(m: member_subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            creator_username: None,
            creator_display_name: None,
            tier_id: m.tier_id,
            tier_name: None,
            status: m.status,
            current_period_end: m.current_period_end,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perks_roundtrip() {
        let perks = vec!["Early access".to_string(), "Monthly wallpaper".to_string()];
        let json = perks_to_json(&perks).unwrap();
        assert_eq!(perks_from_json(&json), perks);
    }

    #[test]
    fn test_perks_from_garbage_is_empty() {
        assert!(perks_from_json("not json").is_empty());
        assert!(perks_from_json("{\"a\":1}").is_empty());
    }

    #[test]
    fn test_perks_order_preserved() {
        let perks: Vec<String> = (0..10).map(|i| format!("perk-{i}")).collect();
        let json = perks_to_json(&perks).unwrap();
        assert_eq!(perks_from_json(&json), perks);
    }
}
