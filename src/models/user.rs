use crate::entities::{UserRole, user_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::action_card::ActionCardResponse;
use super::membership::TierResponse;

/// 社交链接在库里存为 JSON 文本, 仅在模型边界解析为结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
}

impl SocialLinks {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| serde_json::from_str(s).ok())
    }

    pub fn to_json(&self) -> crate::error::AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "coffee_painter")]
    pub username: String,
    #[schema(example = "painter@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
    pub role: UserRole,
    #[schema(example = "Coffee Painter")]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 用户名或邮箱
    #[schema(example = "coffee_painter")]
    pub identifier: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub social_links: Option<SocialLinks>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            banner_url: user.banner_url,
            social_links: SocialLinks::parse(user.social_links.as_deref()),
            created_at: user.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 对外公开的创作者资料, 不含邮箱等私有字段
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicCreatorResponse {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for PublicCreatorResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            banner_url: user.banner_url,
            social_links: SocialLinks::parse(user.social_links.as_deref()),
            created_at: user.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatorPageResponse {
    pub creator: PublicCreatorResponse,
    pub action_cards: Vec<ActionCardResponse>,
    pub tiers: Vec<TierResponse>,
    pub supporter_count: i64,
    pub member_count: i64,
}

/// 创作者后台统计, 每次读取均重新聚合
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_earnings_cents: i64,
    pub total_supports: i64,
    pub unique_supporters: i64,
    pub active_members: i64,
    pub total_posts: i64,
    pub total_gallery_items: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_links_parse_roundtrip() {
        let links = SocialLinks {
            website: Some("https://example.com".to_string()),
            twitter: Some("@painter".to_string()),
            instagram: None,
            youtube: None,
        };
        let json = links.to_json().unwrap();
        let parsed = SocialLinks::parse(Some(&json)).unwrap();
        assert_eq!(parsed, links);
    }

    #[test]
    fn test_social_links_parse_garbage() {
        assert!(SocialLinks::parse(Some("not json")).is_none());
        assert!(SocialLinks::parse(None).is_none());
    }
}
