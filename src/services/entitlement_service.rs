use crate::entities::{SubscriptionStatus, Visibility, member_subscription_entity as member_subscriptions};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// 订阅是否仍在有效期内的纯判定
pub fn subscription_is_current(
    status: SubscriptionStatus,
    current_period_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    status == SubscriptionStatus::Active && current_period_end > now
}

#[derive(Clone)]
pub struct EntitlementService {
    pool: DatabaseConnection,
}

impl EntitlementService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 访问裁决: 每次内容读取都实时查询订阅状态, 不做缓存。
    ///
    /// public 内容任何人可见; members 内容仅作者本人或
    /// 持有 (viewer, owner) 上 active 且未过期订阅的观众可见。
    pub async fn has_access(
        &self,
        viewer: Option<i64>,
        content_owner_id: i64,
        visibility: Visibility,
    ) -> AppResult<bool> {
        if visibility == Visibility::Public {
            return Ok(true);
        }

        // 匿名观众永远看不到会员内容
        let Some(viewer_id) = viewer else {
            return Ok(false);
        };

        // 作者总能看到自己的内容
        if viewer_id == content_owner_id {
            return Ok(true);
        }

        let subscription = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::FanId.eq(viewer_id))
            .filter(member_subscriptions::Column::CreatorId.eq(content_owner_id))
            .one(&self.pool)
            .await?;

        Ok(subscription
            .map(|s| subscription_is_current(s.status, s.current_period_end, Utc::now()))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn subscription_row(
        status: SubscriptionStatus,
        period_end: DateTime<Utc>,
    ) -> member_subscriptions::Model {
        member_subscriptions::Model {
            id: 1,
            fan_id: 2,
            creator_id: 5,
            tier_id: 3,
            status,
            current_period_end: period_end,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_subscription_is_current() {
        let now = Utc::now();
        let future = now + Duration::days(10);
        let past = now - Duration::days(1);

        assert!(subscription_is_current(SubscriptionStatus::Active, future, now));
        assert!(!subscription_is_current(SubscriptionStatus::Active, past, now));
        assert!(!subscription_is_current(SubscriptionStatus::Canceled, future, now));
        assert!(!subscription_is_current(SubscriptionStatus::Expired, future, now));
        // 边界: 恰好到期视为过期
        assert!(!subscription_is_current(SubscriptionStatus::Active, now, now));
    }

    #[tokio::test]
    async fn test_public_content_needs_no_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = EntitlementService::new(db);

        assert!(svc.has_access(None, 5, Visibility::Public).await.unwrap());
        assert!(svc.has_access(Some(99), 5, Visibility::Public).await.unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_never_sees_members_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = EntitlementService::new(db);

        assert!(!svc.has_access(None, 5, Visibility::Members).await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_always_sees_own_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = EntitlementService::new(db);

        assert!(svc.has_access(Some(5), 5, Visibility::Members).await.unwrap());
    }

    #[tokio::test]
    async fn test_active_future_subscription_grants_access() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![subscription_row(
                SubscriptionStatus::Active,
                Utc::now() + Duration::days(15),
            )]])
            .into_connection();
        let svc = EntitlementService::new(db);

        assert!(svc.has_access(Some(2), 5, Visibility::Members).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_subscription_denies_access() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![subscription_row(
                SubscriptionStatus::Active,
                Utc::now() - Duration::hours(1),
            )]])
            .into_connection();
        let svc = EntitlementService::new(db);

        assert!(!svc.has_access(Some(2), 5, Visibility::Members).await.unwrap());
    }

    #[tokio::test]
    async fn test_no_subscription_denies_access() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<member_subscriptions::Model>::new()])
            .into_connection();
        let svc = EntitlementService::new(db);

        assert!(!svc.has_access(Some(2), 5, Visibility::Members).await.unwrap());
    }
}
