use crate::entities::{
    SubscriptionStatus, SupportStatus, UserRole, gallery_item_entity as gallery_items,
    member_subscription_entity as member_subscriptions, post_entity as posts,
    support_transaction_entity as support_transactions, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect, Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 个人资料 + 后台统计
    pub async fn get_profile(&self, user_id: i64) -> AppResult<ProfileResponse> {
        let user = self.get_user(user_id).await?;
        let stats = self.get_dashboard_stats(user_id).await?;

        Ok(ProfileResponse {
            user: UserResponse::from(user),
            stats,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        if let Some(display_name) = &request.display_name {
            let trimmed = display_name.trim();
            if trimmed.is_empty() || trimmed.len() > 50 {
                return Err(AppError::ValidationError(
                    "Display name must be between 1 and 50 characters".to_string(),
                ));
            }
        }
        if let Some(bio) = &request.bio {
            if bio.chars().count() > 1000 {
                return Err(AppError::ValidationError(
                    "Bio is limited to 1000 characters".to_string(),
                ));
            }
        }

        let mut model = self.get_user(user_id).await?.into_active_model();
        if let Some(display_name) = request.display_name {
            model.display_name = Set(display_name.trim().to_string());
        }
        if let Some(bio) = request.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = request.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        if let Some(banner_url) = request.banner_url {
            model.banner_url = Set(Some(banner_url));
        }
        if let Some(social_links) = request.social_links {
            // 社交链接作为 JSON 文本落库
            model.social_links = Set(Some(social_links.to_json()?));
        }
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        Ok(UserResponse::from(updated))
    }

    /// 按用户名找创作者, 非 creator 角色一律 404
    pub async fn find_creator_by_username(&self, username: &str) -> AppResult<users::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.pool)
            .await?;

        match user {
            Some(user) if user.role == UserRole::Creator => Ok(user),
            _ => Err(AppError::NotFound("Creator not found".to_string())),
        }
    }

    /// 后台统计: 无任何存量汇总, 全部实时聚合
    async fn get_dashboard_stats(&self, user_id: i64) -> AppResult<DashboardStats> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct SupportStatsRow {
            total_earnings: Option<i64>,
            total_supports: i64,
        }
        let support_stats = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(user_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .select_only()
            .column_as(
                Expr::col(support_transactions::Column::AmountCents).sum(),
                "total_earnings",
            )
            .column_as(Expr::val(1).count(), "total_supports")
            .into_model::<SupportStatsRow>()
            .one(&self.pool)
            .await?;

        let supporter_ids: Vec<i64> = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(user_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .filter(support_transactions::Column::FanId.is_not_null())
            .select_only()
            .column(support_transactions::Column::FanId)
            .distinct()
            .into_tuple()
            .all(&self.pool)
            .await?;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let active_members = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::CreatorId.eq(user_id))
            .filter(member_subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .filter(member_subscriptions::Column::CurrentPeriodEnd.gt(Utc::now()))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let total_posts = posts::Entity::find()
            .filter(posts::Column::CreatorId.eq(user_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let total_gallery_items = gallery_items::Entity::find()
            .filter(gallery_items::Column::CreatorId.eq(user_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        Ok(DashboardStats {
            total_earnings_cents: support_stats
                .as_ref()
                .and_then(|r| r.total_earnings)
                .unwrap_or(0),
            total_supports: support_stats
                .as_ref()
                .map(|r| r.total_supports)
                .unwrap_or(0),
            unique_supporters: supporter_ids.len() as i64,
            active_members,
            total_posts,
            total_gallery_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn creator_row(id: i64, username: &str, role: UserRole) -> users::Model {
        users::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role,
            display_name: username.to_string(),
            bio: None,
            avatar_url: None,
            banner_url: None,
            social_links: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_creator_by_username_hides_fans() {
        // 普通粉丝的用户名不应暴露为创作者主页
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![creator_row(2, "bob", UserRole::Fan)]])
            .into_connection();
        let svc = UserService::new(db);

        let err = svc.find_creator_by_username("bob").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_creator_by_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![creator_row(5, "painter", UserRole::Creator)]])
            .into_connection();
        let svc = UserService::new(db);

        let creator = svc.find_creator_by_username("painter").await.unwrap();
        assert_eq!(creator.id, 5);
    }

    #[tokio::test]
    async fn test_update_profile_validates_display_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = UserService::new(db);

        let err = svc
            .update_profile(
                1,
                UpdateProfileRequest {
                    display_name: Some("   ".to_string()),
                    bio: None,
                    avatar_url: None,
                    banner_url: None,
                    social_links: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
