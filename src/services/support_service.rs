use crate::config::SupportConfig;
use crate::entities::{
    SupportStatus, UserRole, action_card_entity as action_cards,
    support_transaction_entity as support_transactions, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::PaymentGateway;
use crate::models::*;
use crate::utils::generate_payment_reference;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

const MAX_MESSAGE_LEN: usize = 500;

#[derive(Clone)]
pub struct SupportService {
    pool: DatabaseConnection,
    gateway: PaymentGateway,
    limits: SupportConfig,
}

impl SupportService {
    pub fn new(pool: DatabaseConnection, gateway: PaymentGateway, limits: SupportConfig) -> Self {
        Self {
            pool,
            gateway,
            limits,
        }
    }

    /// 创建一笔 pending 支持交易并生成收银台会话。
    ///
    /// fan_id 来自已认证会话, 为空即游客流程。金额边界在服务端重新校验,
    /// 不信任 UI 的最低金额提示。
    pub async fn create_transaction(
        &self,
        request: CreateSupportRequest,
        fan_id: Option<i64>,
    ) -> AppResult<CreateSupportResponse> {
        let creator = users::Entity::find_by_id(request.creator_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))?;
        if creator.role != UserRole::Creator {
            return Err(AppError::ValidationError(
                "Target user is not a creator".to_string(),
            ));
        }

        // 选卡支持: 卡必须属于该创作者且处于上架状态
        let card = match request.action_card_id {
            Some(card_id) => {
                let card = action_cards::Entity::find_by_id(card_id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Action card not found".to_string()))?;
                if card.creator_id != creator.id {
                    return Err(AppError::ValidationError(
                        "Action card does not belong to this creator".to_string(),
                    ));
                }
                if !card.is_active {
                    return Err(AppError::ValidationError(
                        "Action card is not active".to_string(),
                    ));
                }
                Some(card)
            }
            None => None,
        };

        // 未给金额时默认卡面价格
        let amount_cents = request
            .amount_cents
            .or_else(|| card.as_ref().map(|c| c.price_cents))
            .ok_or_else(|| {
                AppError::ValidationError("Amount is required for free-form support".to_string())
            })?;

        if amount_cents < self.limits.min_amount_cents || amount_cents > self.limits.max_amount_cents
        {
            return Err(AppError::ValidationError(format!(
                "Amount must be between {} and {} cents",
                self.limits.min_amount_cents, self.limits.max_amount_cents
            )));
        }

        if let Some(message) = &request.message {
            if message.chars().count() > MAX_MESSAGE_LEN {
                return Err(AppError::ValidationError(format!(
                    "Message is limited to {MAX_MESSAGE_LEN} characters"
                )));
            }
        }

        let payment_reference = generate_payment_reference();
        let model = support_transactions::ActiveModel {
            creator_id: Set(creator.id),
            fan_id: Set(fan_id),
            action_card_id: Set(card.as_ref().map(|c| c.id)),
            amount_cents: Set(amount_cents),
            message: Set(request.message.clone()),
            guest_name: Set(request.guest_name.clone()),
            is_anonymous: Set(request.is_anonymous.unwrap_or(false)),
            status: Set(SupportStatus::Pending),
            payment_reference: Set(Some(payment_reference.clone())),
            ..Default::default()
        };
        let inserted = model.insert(&self.pool).await?;

        let session =
            self.gateway
                .create_checkout(inserted.id, &payment_reference, inserted.amount_cents);

        log::info!(
            "Support transaction {} created as pending for creator {} ({} cents, reference {})",
            inserted.id,
            creator.id,
            inserted.amount_cents,
            payment_reference
        );

        Ok(CreateSupportResponse {
            transaction_id: inserted.id,
            status: inserted.status,
            amount_cents: inserted.amount_cents,
            payment_reference,
            checkout_url: session.checkout_url,
        })
    }

    /// 网关回调入口: 把交易从 pending 推进到终态。
    ///
    /// 用条件更新 (WHERE status = 'pending') 做结算守卫, 重复回调或
    /// 并发回调只有第一个生效, 其余是无副作用的 no-op, 终态不会被改写。
    pub async fn settle(
        &self,
        transaction_id: i64,
        outcome: SettlementOutcome,
    ) -> AppResult<SettlementResponse> {
        let target = outcome.target_status();

        let result = support_transactions::Entity::update_many()
            .col_expr(support_transactions::Column::Status, Expr::value(target))
            .col_expr(
                support_transactions::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(support_transactions::Column::Id.eq(transaction_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Pending))
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 0 {
            // 没有命中 pending 行: 要么交易不存在, 要么早已终态
            let existing = support_transactions::Entity::find_by_id(transaction_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound("Support transaction not found".to_string())
                })?;

            log::info!(
                "Settlement replay on transaction {} ignored, status stays {}",
                transaction_id,
                existing.status
            );
            return Ok(SettlementResponse {
                transaction_id,
                status: existing.status,
                newly_settled: false,
            });
        }

        log::info!("Support transaction {transaction_id} settled as {target}");
        Ok(SettlementResponse {
            transaction_id,
            status: target,
            newly_settled: true,
        })
    }

    /// 浏览器回跳入口。已经 success 的交易幂等返回, 其余走同一条
    /// pending → success 的守卫转移; 若已被取消则原样报告, 不改写终态。
    pub async fn confirm(&self, transaction_id: i64) -> AppResult<SettlementResponse> {
        let existing = support_transactions::Entity::find_by_id(transaction_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Support transaction not found".to_string()))?;

        if existing.status == SupportStatus::Success {
            return Ok(SettlementResponse {
                transaction_id,
                status: SupportStatus::Success,
                newly_settled: false,
            });
        }

        self.settle(transaction_id, SettlementOutcome::Success).await
    }

    /// 收银台轮询交易状态
    pub async fn get_transaction(
        &self,
        transaction_id: i64,
    ) -> AppResult<SupportTransactionResponse> {
        let tx = support_transactions::Entity::find_by_id(transaction_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Support transaction not found".to_string()))?;
        Ok(SupportTransactionResponse::from(tx))
    }

    /// 创作者收益汇总, 只统计 success 交易, 每次读取重新聚合
    pub async fn earnings(&self, creator_id: i64) -> AppResult<EarningsResponse> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct EarningsRow {
            total_amount: Option<i64>,
            total_count: i64,
        }
        let row = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(creator_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .select_only()
            .column_as(
                Expr::col(support_transactions::Column::AmountCents).sum(),
                "total_amount",
            )
            .column_as(Expr::val(1).count(), "total_count")
            .into_model::<EarningsRow>()
            .one(&self.pool)
            .await?;

        let unique_supporters = self.unique_supporters(creator_id).await?;

        Ok(EarningsResponse {
            total_amount_cents: row.as_ref().and_then(|r| r.total_amount).unwrap_or(0),
            total_count: row.as_ref().map(|r| r.total_count).unwrap_or(0),
            unique_supporters,
        })
    }

    /// 去重后的注册支持者数量 (游客不计入)
    async fn unique_supporters(&self, creator_id: i64) -> AppResult<i64> {
        let fan_ids: Vec<i64> = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(creator_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .filter(support_transactions::Column::FanId.is_not_null())
            .select_only()
            .column(support_transactions::Column::FanId)
            .distinct()
            .into_tuple()
            .all(&self.pool)
            .await?;
        Ok(fan_ids.len() as i64)
    }

    /// 创作者主页的成功支持数
    pub async fn success_count(&self, creator_id: i64) -> AppResult<i64> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let count = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(creator_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count)
    }

    /// 创作者主页支持者时间线: 只展示 success 交易, 匿名与游客在此解析展示名
    pub async fn supporter_feed(
        &self,
        creator_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<SupporterResponse>> {
        let total = self.success_count(creator_id).await?;

        let rows = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(creator_id))
            .filter(support_transactions::Column::Status.eq(SupportStatus::Success))
            .find_also_related(users::Entity)
            .order_by_desc(support_transactions::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<SupporterResponse> = rows
            .into_iter()
            .map(|(tx, fan)| {
                let display_name = if tx.is_anonymous {
                    "Anonymous".to_string()
                } else if let Some(fan) = fan {
                    fan.display_name
                } else {
                    tx.guest_name.clone().unwrap_or_else(|| "Guest".to_string())
                };
                SupporterResponse {
                    display_name,
                    amount_cents: tx.amount_cents,
                    message: tx.message,
                    supported_at: tx.created_at.unwrap_or_else(Utc::now),
                }
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_per_page(),
            total,
        ))
    }

    /// 创作者后台的交易流水, 可按状态过滤
    pub async fn history(
        &self,
        creator_id: i64,
        query: &SupportHistoryQuery,
    ) -> AppResult<PaginatedResponse<SupportTransactionResponse>> {
        let params = PaginationParams {
            page: query.page,
            per_page: query.per_page,
        };

        let mut filter = support_transactions::Entity::find()
            .filter(support_transactions::Column::CreatorId.eq(creator_id));
        if let Some(status) = query.status {
            filter = filter.filter(support_transactions::Column::Status.eq(status));
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = filter
            .clone()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let rows = filter
            .order_by_desc(support_transactions::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let items: Vec<SupportTransactionResponse> = rows
            .into_iter()
            .map(SupportTransactionResponse::from)
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
    use crate::config::GatewayConfig;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn service(db: DatabaseConnection) -> SupportService {
        SupportService::new(
            db,
            PaymentGateway::new(GatewayConfig::default()),
            SupportConfig::default(),
        )
    }

    fn creator_row(id: i64) -> users::Model {
        users::Model {
            id,
            username: format!("creator{id}"),
            email: format!("creator{id}@example.com"),
            password_hash: "hash".to_string(),
            role: UserRole::Creator,
            display_name: format!("Creator {id}"),
            bio: None,
            avatar_url: None,
            banner_url: None,
            social_links: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn pending_tx(id: i64, amount_cents: i64) -> support_transactions::Model {
        support_transactions::Model {
            id,
            creator_id: 5,
            fan_id: None,
            action_card_id: None,
            amount_cents,
            message: None,
            guest_name: None,
            is_anonymous: false,
            status: SupportStatus::Pending,
            payment_reference: Some("FS-TESTTESTAB".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_guest_create_is_pending_with_checkout() {
        let mut inserted = pending_tx(11, 20000);
        inserted.payment_reference = Some("FS-ANYTHING22".to_string());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![creator_row(5)]])
            .append_query_results([vec![inserted]])
            .into_connection();
        let svc = service(db);

        let resp = svc
            .create_transaction(
                CreateSupportRequest {
                    creator_id: 5,
                    action_card_id: None,
                    amount_cents: Some(20000),
                    message: None,
                    guest_name: Some("Passerby".to_string()),
                    is_anonymous: None,
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(resp.transaction_id, 11);
        assert_eq!(resp.status, SupportStatus::Pending);
        assert_eq!(resp.amount_cents, 20000);
        assert!(resp.checkout_url.contains("/11?session="));
    }

    #[tokio::test]
    async fn test_create_rejects_amount_below_minimum() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![creator_row(5)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .create_transaction(
                CreateSupportRequest {
                    creator_id: 5,
                    action_card_id: None,
                    amount_cents: Some(50),
                    message: None,
                    guest_name: None,
                    is_anonymous: None,
                },
                Some(2),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_non_creator_target() {
        let mut fan = creator_row(5);
        fan.role = UserRole::Fan;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fan]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .create_transaction(
                CreateSupportRequest {
                    creator_id: 5,
                    action_card_id: None,
                    amount_cents: Some(500),
                    message: None,
                    guest_name: None,
                    is_anonymous: None,
                },
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_settle_pending_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db);

        let resp = svc.settle(11, SettlementOutcome::Success).await.unwrap();
        assert_eq!(resp.status, SupportStatus::Success);
        assert!(resp.newly_settled);
    }

    #[tokio::test]
    async fn test_settle_replay_does_not_overwrite_terminal_status() {
        // 已 success 的交易再收到 cancel 回调: 条件更新不命中, 状态保持不变
        let mut settled = pending_tx(11, 20000);
        settled.status = SupportStatus::Success;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![settled]])
            .into_connection();
        let svc = service(db);

        let resp = svc.settle(11, SettlementOutcome::Cancel).await.unwrap();
        assert_eq!(resp.status, SupportStatus::Success);
        assert!(!resp.newly_settled);
    }

    #[tokio::test]
    async fn test_settle_unknown_transaction_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<support_transactions::Model>::new()])
            .into_connection();
        let svc = service(db);

        let err = svc.settle(404, SettlementOutcome::Success).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_confirm_is_idempotent_on_success() {
        let mut settled = pending_tx(11, 20000);
        settled.status = SupportStatus::Success;
        // 两次 confirm: 每次都先读到 success, 不再发 update
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![settled.clone()], vec![settled]])
            .into_connection();
        let svc = service(db);

        let first = svc.confirm(11).await.unwrap();
        let second = svc.confirm(11).await.unwrap();
        assert_eq!(first.status, SupportStatus::Success);
        assert_eq!(second.status, SupportStatus::Success);
        assert!(!first.newly_settled);
        assert!(!second.newly_settled);
    }

    #[tokio::test]
    async fn test_confirm_settles_pending_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending_tx(11, 20000)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db);

        let resp = svc.confirm(11).await.unwrap();
        assert_eq!(resp.status, SupportStatus::Success);
        assert!(resp.newly_settled);
    }

    #[tokio::test]
    async fn test_earnings_only_counts_success() {
        // 聚合只在 SQL 里过滤 status = success; 这里验证行映射与游客去重
        let aggregate_row = BTreeMap::from([
            ("total_amount", Value::BigInt(Some(30000))),
            ("total_count", Value::BigInt(Some(1))),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![aggregate_row]])
            .append_query_results([Vec::<support_transactions::Model>::new()])
            .into_connection();
        let svc = service(db);

        let earnings = svc.earnings(5).await.unwrap();
        assert_eq!(earnings.total_amount_cents, 30000);
        assert_eq!(earnings.total_count, 1);
        assert_eq!(earnings.unique_supporters, 0);
    }

    #[tokio::test]
    async fn test_earnings_empty_when_no_success_rows() {
        let aggregate_row = BTreeMap::from([
            ("total_amount", Value::BigInt(None)),
            ("total_count", Value::BigInt(Some(0))),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![aggregate_row]])
            .append_query_results([Vec::<support_transactions::Model>::new()])
            .into_connection();
        let svc = service(db);

        let earnings = svc.earnings(5).await.unwrap();
        assert_eq!(earnings.total_amount_cents, 0);
        assert_eq!(earnings.total_count, 0);
        assert_eq!(earnings.unique_supporters, 0);
    }
}
