use crate::entities::action_card_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateActionCardRequest {
    #[schema(example = "Buy me a coffee")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = 500)]
    pub price_cents: i64,
    #[schema(example = "coffee")]
    pub icon: Option<String>,
    pub is_featured: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateActionCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionCardResponse {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub icon: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<action_card_entity::Model> for ActionCardResponse {
    fn from(m: action_card_entity::Model) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            title: m.title,
            description: m.description,
            price_cents: m.price_cents,
            icon: m.icon,
            is_active: m.is_active,
            is_featured: m.is_featured,
            sort_order: m.sort_order,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}
