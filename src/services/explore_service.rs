use crate::entities::{
    SubscriptionStatus, SupportStatus, UserRole, action_card_entity as action_cards,
    member_subscription_entity as member_subscriptions, membership_tier_entity as membership_tiers,
    support_transaction_entity as support_transactions, user_entity as users,
};
use crate::error::AppResult;
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::{Expr, IntoCondition, Query};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct ExploreService {
    pool: DatabaseConnection,
}

impl ExploreService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创作者探索页: 过滤 + 排序 + 固定每页 12 条的只读查询
    pub async fn explore_creators(
        &self,
        query: ExploreQuery,
    ) -> AppResult<PaginatedResponse<ExploreCreatorItem>> {
        let page = query.page.unwrap_or(1).max(1);
        let offset = ((page - 1) * EXPLORE_PAGE_SIZE) as u64;

        let mut find = users::Entity::find().filter(users::Column::Role.eq(UserRole::Creator));

        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            find = find.filter(
                Condition::any()
                    .add(users::Column::Username.contains(q))
                    .add(users::Column::DisplayName.contains(q)),
            );
        }

        // "开通会员" / "有精选卡片" 都按存在性子查询过滤
        if query.has_membership.unwrap_or(false) {
            find = find.filter(
                users::Column::Id.in_subquery(
                    Query::select()
                        .column(membership_tiers::Column::CreatorId)
                        .from(membership_tiers::Entity)
                        .and_where(membership_tiers::Column::IsActive.eq(true))
                        .to_owned(),
                ),
            );
        }
        if query.has_featured.unwrap_or(false) {
            find = find.filter(
                users::Column::Id.in_subquery(
                    Query::select()
                        .column(action_cards::Column::CreatorId)
                        .from(action_cards::Entity)
                        .and_where(action_cards::Column::IsFeatured.eq(true))
                        .and_where(action_cards::Column::IsActive.eq(true))
                        .to_owned(),
                ),
            );
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = find
            .clone()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let find = match query.sort.unwrap_or_default().canonical() {
            ExploreSort::Newest => find
                .order_by_desc(users::Column::CreatedAt)
                .order_by_desc(users::Column::Id),
            // popular: 按收到的 success 支持数倒序 (trending 已折叠到这里)
            _ => find
                .join_rev(
                    JoinType::LeftJoin,
                    support_transactions::Relation::Creator
                        .def()
                        .on_condition(|_left, _right| {
                            support_transactions::Column::Status
                                .eq(SupportStatus::Success)
                                .into_condition()
                        }),
                )
                .group_by(users::Column::Id)
                .order_by_desc(
                    Expr::col((
                        support_transactions::Entity,
                        support_transactions::Column::Id,
                    ))
                    .count(),
                )
                .order_by_desc(users::Column::Id),
        };

        let creators = find
            .limit(EXPLORE_PAGE_SIZE as u64)
            .offset(offset)
            .all(&self.pool)
            .await?;

        let ids: Vec<i64> = creators.iter().map(|u| u.id).collect();
        let supporter_counts = self.success_counts_by_creator(&ids).await?;
        let member_counts = self.member_counts_by_creator(&ids).await?;

        let items: Vec<ExploreCreatorItem> = creators
            .into_iter()
            .map(|u| ExploreCreatorItem {
                supporter_count: supporter_counts.get(&u.id).copied().unwrap_or(0),
                member_count: member_counts.get(&u.id).copied().unwrap_or(0),
                id: u.id,
                username: u.username,
                display_name: u.display_name,
                avatar_url: u.avatar_url,
                bio: u.bio,
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            page,
            EXPLORE_PAGE_SIZE,
            total,
        ))
    }

    /// 当前页创作者的成功支持数, 一次分组查询带回
    async fn success_counts_by_creator(&self, ids: &[i64]) -> AppResult<HashMap<i64, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct GroupCountRow {
            creator_id: i64,
            count: i64,
        }
        let rows = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.is_in(ids.to_vec()))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .select_only()
            .column(support_transactions::Column::CreatorId)
            .column_as(Expr::val(1).count(), "count")
            .group_by(support_transactions::Column::CreatorId)
            .into_model::<GroupCountRow>()
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| (r.creator_id, r.count)).collect())
    }

    async fn member_counts_by_creator(&self, ids: &[i64]) -> AppResult<HashMap<i64, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct GroupCountRow {
            creator_id: i64,
            count: i64,
        }
        let rows = member_subscriptions::Entity::find()
            .filter(member_subscriptions::Column::CreatorId.is_in(ids.to_vec()))
            .filter(member_subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .filter(member_subscriptions::Column::CurrentPeriodEnd.gt(Utc::now()))
            .select_only()
            .column(member_subscriptions::Column::CreatorId)
            .column_as(Expr::val(1).count(), "count")
            .group_by(member_subscriptions::Column::CreatorId)
            .into_model::<GroupCountRow>()
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| (r.creator_id, r.count)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn creator_row(id: i64, username: &str) -> users::Model {
        users::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role: UserRole::Creator,
            display_name: username.to_string(),
            bio: None,
            avatar_url: None,
            banner_url: None,
            social_links: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("count", Value::BigInt(Some(count)))])
    }

    fn group_count_row(creator_id: i64, count: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("creator_id", Value::BigInt(Some(creator_id))),
            ("count", Value::BigInt(Some(count))),
        ])
    }

    #[tokio::test]
    async fn test_explore_maps_counts_onto_items() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(2)]])
            .append_query_results([vec![creator_row(5, "painter"), creator_row(7, "singer")]])
            .append_query_results([vec![group_count_row(5, 4)]])
            .append_query_results([vec![group_count_row(7, 1)]])
            .into_connection();
        let svc = ExploreService::new(db);

        let resp = svc.explore_creators(ExploreQuery::default()).await.unwrap();
        assert_eq!(resp.total, 2);
        assert_eq!(resp.pages, 1);
        assert_eq!(resp.current, 1);
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.items[0].supporter_count, 4);
        assert_eq!(resp.items[0].member_count, 0);
        assert_eq!(resp.items[1].supporter_count, 0);
        assert_eq!(resp.items[1].member_count, 1);
    }

    #[tokio::test]
    async fn test_explore_empty_page_skips_count_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let svc = ExploreService::new(db);

        let resp = svc
            .explore_creators(ExploreQuery {
                q: Some("nobody".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(resp.total, 0);
        assert!(resp.items.is_empty());
        assert_eq!(resp.pages, 0);
    }
}
