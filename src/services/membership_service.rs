use crate::entities::{
    SubscriptionStatus, UserRole, member_subscription_entity as member_subscriptions,
    membership_tier_entity as membership_tiers, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::entitlement_service::subscription_is_current;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

/// 订阅周期固定 30 天, 模拟计费不走网关
const PERIOD_DAYS: i64 = 30;

const MAX_PERKS: usize = 10;
const MAX_PERK_LEN: usize = 100;

#[derive(Clone)]
pub struct MembershipService {
    pool: DatabaseConnection,
}

impl MembershipService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    fn validate_tier_fields(name: Option<&str>, price_cents: Option<i64>, perks: Option<&[String]>) -> AppResult<()> {
        if let Some(name) = name {
            if name.trim().len() < 2 || name.len() > 50 {
                return Err(AppError::ValidationError(
                    "Tier name must be between 2 and 50 characters".to_string(),
                ));
            }
        }
        if let Some(price) = price_cents {
            if price <= 0 {
                return Err(AppError::ValidationError(
                    "Tier price must be positive".to_string(),
                ));
            }
        }
        if let Some(perks) = perks {
            if perks.len() > MAX_PERKS {
                return Err(AppError::ValidationError(format!(
                    "A tier can list at most {MAX_PERKS} perks"
                )));
            }
            if perks.iter().any(|p| p.is_empty() || p.len() > MAX_PERK_LEN) {
                return Err(AppError::ValidationError(format!(
                    "Each perk must be 1-{MAX_PERK_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    pub async fn create_tier(
        &self,
        creator_id: i64,
        request: CreateTierRequest,
    ) -> AppResult<TierResponse> {
        let creator = users::Entity::find_by_id(creator_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if creator.role != UserRole::Creator {
            return Err(AppError::PermissionDenied);
        }

        let perks = request.perks.unwrap_or_default();
        Self::validate_tier_fields(Some(&request.name), Some(request.price_cents), Some(&perks))?;

        let model = membership_tiers::ActiveModel {
            creator_id: Set(creator_id),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            price_cents: Set(request.price_cents),
            perks: Set(perks_to_json(&perks)?),
            is_active: Set(true),
            ..Default::default()
        };
        let inserted = model.insert(&self.pool).await?;

        log::info!("Creator {creator_id} created membership tier {}", inserted.id);
        Ok(TierResponse::from(inserted))
    }

    pub async fn update_tier(
        &self,
        creator_id: i64,
        tier_id: i64,
        request: UpdateTierRequest,
    ) -> AppResult<TierResponse> {
        // 所有权检查: 重新取行并比对 owner
        let tier = membership_tiers::Entity::find_by_id(tier_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership tier not found".to_string()))?;
        if tier.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        Self::validate_tier_fields(
            request.name.as_deref(),
            request.price_cents,
            request.perks.as_deref(),
        )?;

        let mut model = tier.into_active_model();
        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(price_cents) = request.price_cents {
            model.price_cents = Set(price_cents);
        }
        if let Some(perks) = request.perks {
            model.perks = Set(perks_to_json(&perks)?);
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        Ok(TierResponse::from(updated))
    }

    pub async fn delete_tier(&self, creator_id: i64, tier_id: i64) -> AppResult<()> {
        let tier = membership_tiers::Entity::find_by_id(tier_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership tier not found".to_string()))?;
        if tier.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        // 仍有订阅引用的档位不可删除, 先下架
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let subscriber_count = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::TierId.eq(tier_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        if subscriber_count > 0 {
            return Err(AppError::ValidationError(
                "Tier has subscribers; deactivate it instead".to_string(),
            ));
        }

        membership_tiers::Entity::delete_by_id(tier_id)
            .exec(&self.pool)
            .await?;
        log::info!("Creator {creator_id} deleted membership tier {tier_id}");
        Ok(())
    }

    /// 创作者后台列出自己的全部档位
    pub async fn list_tiers(&self, creator_id: i64) -> AppResult<Vec<TierResponse>> {
        let tiers = membership_tiers::Entity::find()
            .filter(membership_tiers::Column::CreatorId.eq(creator_id))
            .order_by_asc(membership_tiers::Column::PriceCents)
            .order_by_asc(membership_tiers::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(tiers.into_iter().map(TierResponse::from).collect())
    }

    /// 创作者主页只展示上架档位
    pub async fn list_public_tiers(&self, creator_id: i64) -> AppResult<Vec<TierResponse>> {
        let tiers = membership_tiers::Entity::find()
            .filter(membership_tiers::Column::CreatorId.eq(creator_id))
            .filter(membership_tiers::Column::IsActive.eq(true))
            .order_by_asc(membership_tiers::Column::PriceCents)
            .order_by_asc(membership_tiers::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(tiers.into_iter().map(TierResponse::from).collect())
    }

    /// 订阅档位。(fan, creator) 上最多一行:
    /// 已有且未过期的订阅顺延 30 天, 过期或新订阅从现在起算。
    pub async fn subscribe(&self, fan_id: i64, tier_id: i64) -> AppResult<SubscriptionResponse> {
        let tier = membership_tiers::Entity::find_by_id(tier_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership tier not found".to_string()))?;
        if !tier.is_active {
            return Err(AppError::ValidationError(
                "Membership tier is not active".to_string(),
            ));
        }
        if tier.creator_id == fan_id {
            return Err(AppError::ValidationError(
                "Creators cannot subscribe to themselves".to_string(),
            ));
        }

        let now = Utc::now();
        let existing = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::FanId.eq(fan_id))
            .filter(member_subscriptions::Column::CreatorId.eq(tier.creator_id))
            .one(&self.pool)
            .await?;

        let subscription = match existing {
            Some(sub) => {
                let base = if subscription_is_current(sub.status, sub.current_period_end, now) {
                    sub.current_period_end
                } else {
                    now
                };
                let mut model = sub.into_active_model();
                model.tier_id = Set(tier.id);
                model.status = Set(SubscriptionStatus::Active);
                model.current_period_end = Set(base + Duration::days(PERIOD_DAYS));
                model.updated_at = Set(Some(now));
                model.update(&self.pool).await?
            }
            None => {
                let model = member_subscriptions::ActiveModel {
                    fan_id: Set(fan_id),
                    creator_id: Set(tier.creator_id),
                    tier_id: Set(tier.id),
                    status: Set(SubscriptionStatus::Active),
                    current_period_end: Set(now + Duration::days(PERIOD_DAYS)),
                    ..Default::default()
                };
                model.insert(&self.pool).await?
            }
        };

        log::info!(
            "Fan {fan_id} subscribed to tier {tier_id} of creator {} until {}",
            tier.creator_id,
            subscription.current_period_end
        );

        let mut response = SubscriptionResponse::from(subscription);
        response.tier_name = Some(tier.name);
        Ok(response)
    }

    /// 取消订阅。行保留, 状态置 canceled 即刻失去会员资格。
    pub async fn cancel(&self, fan_id: i64, creator_id: i64) -> AppResult<SubscriptionResponse> {
        let subscription = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::FanId.eq(fan_id))
            .filter(member_subscriptions::Column::CreatorId.eq(creator_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        let mut model = subscription.into_active_model();
        model.status = Set(SubscriptionStatus::Canceled);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        log::info!("Fan {fan_id} canceled subscription to creator {creator_id}");
        Ok(SubscriptionResponse::from(updated))
    }

    /// 我的订阅列表, 批量补全创作者与档位信息
    pub async fn my_subscriptions(
        &self,
        fan_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<SubscriptionResponse>> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::FanId.eq(fan_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let subscriptions = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::FanId.eq(fan_id))
            .order_by_desc(member_subscriptions::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let creator_ids: Vec<i64> = subscriptions.iter().map(|s| s.creator_id).collect();
        let tier_ids: Vec<i64> = subscriptions.iter().map(|s| s.tier_id).collect();

        let creators: HashMap<i64, users::Model> = if creator_ids.is_empty() {
            HashMap::new()
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(creator_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };
        let tiers: HashMap<i64, membership_tiers::Model> = if tier_ids.is_empty() {
            HashMap::new()
        } else {
            membership_tiers::Entity::find()
                .filter(membership_tiers::Column::Id.is_in(tier_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|t| (t.id, t))
                .collect()
        };

        let items: Vec<SubscriptionResponse> = subscriptions
            .into_iter()
            .map(|sub| {
                let mut response = SubscriptionResponse::from(sub);
                if let Some(creator) = creators.get(&response.creator_id) {
                    response.creator_username = Some(creator.username.clone());
                    response.creator_display_name = Some(creator.display_name.clone());
                }
                if let Some(tier) = tiers.get(&response.tier_id) {
                    response.tier_name = Some(tier.name.clone());
                }
                response
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    /// 当前有效会员数 (active 且未过期)
    pub async fn member_count(&self, creator_id: i64) -> AppResult<i64> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let count = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::CreatorId.eq(creator_id))
            .filter(member_subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .filter(member_subscriptions::Column::CurrentPeriodEnd.gt(Utc::now()))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn tier_row(id: i64, creator_id: i64, is_active: bool) -> membership_tiers::Model {
        membership_tiers::Model {
            id,
            creator_id,
            name: "Studio Insider".to_string(),
            description: None,
            price_cents: 500,
            perks: "[\"Early access\"]".to_string(),
            is_active,
            created_at: None,
            updated_at: None,
        }
    }

    fn subscription_row(
        fan_id: i64,
        creator_id: i64,
        status: SubscriptionStatus,
        period_end: chrono::DateTime<Utc>,
    ) -> member_subscriptions::Model {
        member_subscriptions::Model {
            id: 9,
            fan_id,
            creator_id,
            tier_id: 3,
            status,
            current_period_end: period_end,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_tier_field_validation() {
        assert!(MembershipService::validate_tier_fields(Some("A"), None, None).is_err());
        assert!(MembershipService::validate_tier_fields(Some("Backstage"), Some(0), None).is_err());
        let too_many: Vec<String> = (0..11).map(|i| format!("perk {i}")).collect();
        assert!(MembershipService::validate_tier_fields(None, None, Some(&too_many)).is_err());
        let fine = vec!["Early access".to_string()];
        assert!(
            MembershipService::validate_tier_fields(Some("Backstage"), Some(500), Some(&fine))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_subscribe_rejects_own_tier() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier_row(3, 5, true)]])
            .into_connection();
        let svc = MembershipService::new(db);

        let err = svc.subscribe(5, 3).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_subscribe_rejects_inactive_tier() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier_row(3, 5, false)]])
            .into_connection();
        let svc = MembershipService::new(db);

        let err = svc.subscribe(2, 3).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_subscribe_extends_current_subscription() {
        // 已有未过期订阅: 新周期在原到期日上顺延, 而不是插入第二行
        let now = Utc::now();
        let period_end = now + chrono::Duration::days(10);
        let existing = subscription_row(2, 5, SubscriptionStatus::Active, period_end);
        let mut renewed = existing.clone();
        renewed.current_period_end = period_end + chrono::Duration::days(PERIOD_DAYS);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier_row(3, 5, true)]])
            .append_query_results([vec![existing]])
            .append_query_results([vec![renewed.clone()]])
            .into_connection();
        let svc = MembershipService::new(db);

        let resp = svc.subscribe(2, 3).await.unwrap();
        assert_eq!(resp.status, SubscriptionStatus::Active);
        assert_eq!(resp.current_period_end, renewed.current_period_end);
    }

    #[tokio::test]
    async fn test_cancel_missing_subscription_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<member_subscriptions::Model>::new()])
            .into_connection();
        let svc = MembershipService::new(db);

        let err = svc.cancel(2, 5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_tier_with_subscribers_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier_row(3, 5, true)]])
            .append_query_results([vec![std::collections::BTreeMap::from([(
                "count",
                sea_orm::Value::BigInt(Some(4)),
            )])]])
            .into_connection();
        let svc = MembershipService::new(db);

        let err = svc.delete_tier(5, 3).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_tier_not_owner_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier_row(3, 5, true)]])
            .into_connection();
        let svc = MembershipService::new(db);

        let err = svc.delete_tier(7, 3).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_tier() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tier_row(3, 5, true)]])
            .append_query_results([vec![std::collections::BTreeMap::from([(
                "count",
                sea_orm::Value::BigInt(Some(0)),
            )])]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = MembershipService::new(db);

        assert!(svc.delete_tier(5, 3).await.is_ok());
    }
}
