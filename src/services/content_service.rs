use crate::entities::{
    UserRole, Visibility, gallery_item_entity as gallery_items, post_entity as posts,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::EntitlementService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct ContentService {
    pool: DatabaseConnection,
    entitlement_service: EntitlementService,
}

impl ContentService {
    pub fn new(pool: DatabaseConnection, entitlement_service: EntitlementService) -> Self {
        Self {
            pool,
            entitlement_service,
        }
    }

    async fn require_creator(&self, user_id: i64) -> AppResult<users::Model> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if user.role != UserRole::Creator {
            return Err(AppError::PermissionDenied);
        }
        Ok(user)
    }

    pub async fn create_post(
        &self,
        creator_id: i64,
        request: CreatePostRequest,
    ) -> AppResult<PostResponse> {
        self.require_creator(creator_id).await?;

        if request.title.trim().is_empty() || request.title.len() > 200 {
            return Err(AppError::ValidationError(
                "Title must be between 1 and 200 characters".to_string(),
            ));
        }
        if request.body.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Post body must not be empty".to_string(),
            ));
        }

        let model = posts::ActiveModel {
            creator_id: Set(creator_id),
            title: Set(request.title.trim().to_string()),
            body: Set(request.body),
            visibility: Set(request.visibility.unwrap_or(Visibility::Public)),
            ..Default::default()
        };
        let inserted = model.insert(&self.pool).await?;

        // 作者视角, 永远未锁定
        Ok(PostResponse::with_access(inserted, true))
    }

    pub async fn update_post(
        &self,
        creator_id: i64,
        post_id: i64,
        request: UpdatePostRequest,
    ) -> AppResult<PostResponse> {
        let post = posts::Entity::find_by_id(post_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        if post.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        if let Some(title) = &request.title {
            if title.trim().is_empty() || title.len() > 200 {
                return Err(AppError::ValidationError(
                    "Title must be between 1 and 200 characters".to_string(),
                ));
            }
        }

        let mut model = post.into_active_model();
        if let Some(title) = request.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(body) = request.body {
            model.body = Set(body);
        }
        if let Some(visibility) = request.visibility {
            model.visibility = Set(visibility);
        }
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        Ok(PostResponse::with_access(updated, true))
    }

    pub async fn delete_post(&self, creator_id: i64, post_id: i64) -> AppResult<()> {
        let post = posts::Entity::find_by_id(post_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        if post.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        posts::Entity::delete_by_id(post_id).exec(&self.pool).await?;
        Ok(())
    }

    /// 单篇读取: 会员内容对未解锁观众以 locked 形式返回, 不是 403
    pub async fn get_post(&self, post_id: i64, viewer: Option<i64>) -> AppResult<PostResponse> {
        let post = posts::Entity::find_by_id(post_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let has_access = self
            .entitlement_service
            .has_access(viewer, post.creator_id, post.visibility)
            .await?;
        Ok(PostResponse::with_access(post, has_access))
    }

    /// 创作者主页的文章列表。整页同一作者, 会员裁决只需解析一次。
    pub async fn list_posts(
        &self,
        creator_id: i64,
        viewer: Option<i64>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PostResponse>> {
        let member_access = self
            .entitlement_service
            .has_access(viewer, creator_id, Visibility::Members)
            .await?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = posts::Entity::find()
            .filter(posts::Column::CreatorId.eq(creator_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let rows = posts::Entity::find()
            .filter(posts::Column::CreatorId.eq(creator_id))
            .order_by_desc(posts::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<PostResponse> = rows
            .into_iter()
            .map(|post| {
                let has_access = post.visibility == Visibility::Public || member_access;
                PostResponse::with_access(post, has_access)
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    pub async fn create_gallery_item(
        &self,
        creator_id: i64,
        request: CreateGalleryItemRequest,
    ) -> AppResult<GalleryItemResponse> {
        self.require_creator(creator_id).await?;

        if request.media_url.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Media URL must not be empty".to_string(),
            ));
        }

        let model = gallery_items::ActiveModel {
            creator_id: Set(creator_id),
            title: Set(request.title),
            media_url: Set(request.media_url),
            caption: Set(request.caption),
            visibility: Set(request.visibility.unwrap_or(Visibility::Public)),
            ..Default::default()
        };
        let inserted = model.insert(&self.pool).await?;

        Ok(GalleryItemResponse::with_access(inserted, true))
    }

    pub async fn update_gallery_item(
        &self,
        creator_id: i64,
        item_id: i64,
        request: UpdateGalleryItemRequest,
    ) -> AppResult<GalleryItemResponse> {
        let item = gallery_items::Entity::find_by_id(item_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;
        if item.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        let mut model = item.into_active_model();
        if let Some(title) = request.title {
            model.title = Set(Some(title));
        }
        if let Some(media_url) = request.media_url {
            if media_url.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Media URL must not be empty".to_string(),
                ));
            }
            model.media_url = Set(media_url);
        }
        if let Some(caption) = request.caption {
            model.caption = Set(Some(caption));
        }
        if let Some(visibility) = request.visibility {
            model.visibility = Set(visibility);
        }
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        Ok(GalleryItemResponse::with_access(updated, true))
    }

    pub async fn delete_gallery_item(&self, creator_id: i64, item_id: i64) -> AppResult<()> {
        let item = gallery_items::Entity::find_by_id(item_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;
        if item.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        gallery_items::Entity::delete_by_id(item_id)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_gallery_item(
        &self,
        item_id: i64,
        viewer: Option<i64>,
    ) -> AppResult<GalleryItemResponse> {
        let item = gallery_items::Entity::find_by_id(item_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;

        let has_access = self
            .entitlement_service
            .has_access(viewer, item.creator_id, item.visibility)
            .await?;
        Ok(GalleryItemResponse::with_access(item, has_access))
    }

    pub async fn list_gallery(
        &self,
        creator_id: i64,
        viewer: Option<i64>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<GalleryItemResponse>> {
        let member_access = self
            .entitlement_service
            .has_access(viewer, creator_id, Visibility::Members)
            .await?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = gallery_items::Entity::find()
            .filter(gallery_items::Column::CreatorId.eq(creator_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let rows = gallery_items::Entity::find()
            .filter(gallery_items::Column::CreatorId.eq(creator_id))
            .order_by_desc(gallery_items::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<GalleryItemResponse> = rows
            .into_iter()
            .map(|item| {
                let has_access = item.visibility == Visibility::Public || member_access;
                GalleryItemResponse::with_access(item, has_access)
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    fn service(db: DatabaseConnection) -> ContentService {
        let entitlement = EntitlementService::new(db.clone());
        ContentService::new(db, entitlement)
    }

    fn post_row(id: i64, creator_id: i64, visibility: Visibility) -> posts::Model {
        posts::Model {
            id,
            creator_id,
            title: "Behind the scenes".to_string(),
            body: "secret sketches".to_string(),
            visibility,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_members_post_locked_for_anonymous() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(1, 5, Visibility::Members)]])
            .into_connection();
        let svc = service(db);

        let resp = svc.get_post(1, None).await.unwrap();
        assert!(resp.locked);
        assert!(resp.body.is_none());
    }

    #[tokio::test]
    async fn test_get_members_post_unlocked_for_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(1, 5, Visibility::Members)]])
            .into_connection();
        let svc = service(db);

        let resp = svc.get_post(1, Some(5)).await.unwrap();
        assert!(!resp.locked);
        assert_eq!(resp.body.as_deref(), Some("secret sketches"));
    }

    #[tokio::test]
    async fn test_get_public_post_open_to_everyone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(1, 5, Visibility::Public)]])
            .into_connection();
        let svc = service(db);

        let resp = svc.get_post(1, None).await.unwrap();
        assert!(!resp.locked);
    }

    #[tokio::test]
    async fn test_update_post_not_owner_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(1, 5, Visibility::Public)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .update_post(
                9,
                1,
                UpdatePostRequest {
                    title: None,
                    body: None,
                    visibility: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }
}
