use crate::entities::{Visibility, gallery_item_entity, post_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub visibility: Option<Visibility>,
}

/// 会员内容对未解锁的观众隐藏正文, 以 locked 标记返回
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub visibility: Visibility,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn with_access(m: post_entity::Model, has_access: bool) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            title: m.title,
            body: if has_access { Some(m.body) } else { None },
            visibility: m.visibility,
            locked: !has_access,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateGalleryItemRequest {
    pub title: Option<String>,
    pub media_url: String,
    pub caption: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateGalleryItemRequest {
    pub title: Option<String>,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GalleryItemResponse {
    pub id: i64,
    pub creator_id: i64,
    pub title: Option<String>,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub visibility: Visibility,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl GalleryItemResponse {
    pub fn with_access(m: gallery_item_entity::Model, has_access: bool) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            title: m.title,
            media_url: if has_access { Some(m.media_url) } else { None },
            caption: if has_access { m.caption } else { None },
            visibility: m.visibility,
            locked: !has_access,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(visibility: Visibility) -> post_entity::Model {
        post_entity::Model {
            id: 1,
            creator_id: 10,
            title: "Sketchbook tour".to_string(),
            body: "full text".to_string(),
            visibility,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_post_locked_hides_body() {
        let resp = PostResponse::with_access(post(Visibility::Members), false);
        assert!(resp.locked);
        assert!(resp.body.is_none());
        // 标题仍然可见, 作为内容预告
        assert_eq!(resp.title, "Sketchbook tour");
    }

    #[test]
    fn test_post_unlocked_keeps_body() {
        let resp = PostResponse::with_access(post(Visibility::Members), true);
        assert!(!resp.locked);
        assert_eq!(resp.body.as_deref(), Some("full text"));
    }
}
