use crate::entities::{UserRole, action_card_entity as action_cards, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct ActionCardService {
    pool: DatabaseConnection,
}

impl ActionCardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    fn validate_card_fields(title: Option<&str>, price_cents: Option<i64>) -> AppResult<()> {
        if let Some(title) = title {
            if title.trim().is_empty() || title.len() > 100 {
                return Err(AppError::ValidationError(
                    "Title must be between 1 and 100 characters".to_string(),
                ));
            }
        }
        if let Some(price) = price_cents {
            if price <= 0 {
                return Err(AppError::ValidationError(
                    "Price must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub async fn create_card(
        &self,
        creator_id: i64,
        request: CreateActionCardRequest,
    ) -> AppResult<ActionCardResponse> {
        let creator = users::Entity::find_by_id(creator_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if creator.role != UserRole::Creator {
            return Err(AppError::PermissionDenied);
        }

        Self::validate_card_fields(Some(&request.title), Some(request.price_cents))?;

        let model = action_cards::ActiveModel {
            creator_id: Set(creator_id),
            title: Set(request.title.trim().to_string()),
            description: Set(request.description),
            price_cents: Set(request.price_cents),
            icon: Set(request.icon),
            is_active: Set(true),
            is_featured: Set(request.is_featured.unwrap_or(false)),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            ..Default::default()
        };
        let inserted = model.insert(&self.pool).await?;

        log::info!("Creator {creator_id} created action card {}", inserted.id);
        Ok(ActionCardResponse::from(inserted))
    }

    pub async fn update_card(
        &self,
        creator_id: i64,
        card_id: i64,
        request: UpdateActionCardRequest,
    ) -> AppResult<ActionCardResponse> {
        // 所有权检查: 重新取行并比对 owner
        let card = action_cards::Entity::find_by_id(card_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Action card not found".to_string()))?;
        if card.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        Self::validate_card_fields(request.title.as_deref(), request.price_cents)?;

        let mut model = card.into_active_model();
        if let Some(title) = request.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(price_cents) = request.price_cents {
            model.price_cents = Set(price_cents);
        }
        if let Some(icon) = request.icon {
            model.icon = Set(Some(icon));
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }
        if let Some(is_featured) = request.is_featured {
            model.is_featured = Set(is_featured);
        }
        if let Some(sort_order) = request.sort_order {
            model.sort_order = Set(sort_order);
        }
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        Ok(ActionCardResponse::from(updated))
    }

    /// 历史交易通过 ON DELETE SET NULL 与卡片解耦, 可以安全硬删
    pub async fn delete_card(&self, creator_id: i64, card_id: i64) -> AppResult<()> {
        let card = action_cards::Entity::find_by_id(card_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Action card not found".to_string()))?;
        if card.creator_id != creator_id {
            return Err(AppError::Forbidden);
        }

        action_cards::Entity::delete_by_id(card_id)
            .exec(&self.pool)
            .await?;
        log::info!("Creator {creator_id} deleted action card {card_id}");
        Ok(())
    }

    /// 创作者后台: 含下架卡片
    pub async fn list_cards(&self, creator_id: i64) -> AppResult<Vec<ActionCardResponse>> {
        let cards = action_cards::Entity::find()
            .filter(action_cards::Column::CreatorId.eq(creator_id))
            .order_by_desc(action_cards::Column::IsFeatured)
            .order_by_asc(action_cards::Column::SortOrder)
            .order_by_asc(action_cards::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(cards.into_iter().map(ActionCardResponse::from).collect())
    }

    /// 创作者主页: 仅上架卡片, 精选优先
    pub async fn list_public_cards(&self, creator_id: i64) -> AppResult<Vec<ActionCardResponse>> {
        let cards = action_cards::Entity::find()
            .filter(action_cards::Column::CreatorId.eq(creator_id))
            .filter(action_cards::Column::IsActive.eq(true))
            .order_by_desc(action_cards::Column::IsFeatured)
            .order_by_asc(action_cards::Column::SortOrder)
            .order_by_asc(action_cards::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(cards.into_iter().map(ActionCardResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn card_row(id: i64, creator_id: i64) -> action_cards::Model {
        action_cards::Model {
            id,
            creator_id,
            title: "Buy me a coffee".to_string(),
            description: None,
            price_cents: 500,
            icon: Some("coffee".to_string()),
            is_active: true,
            is_featured: false,
            sort_order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_card_field_validation() {
        assert!(ActionCardService::validate_card_fields(Some("  "), None).is_err());
        assert!(ActionCardService::validate_card_fields(Some("Coffee"), Some(0)).is_err());
        assert!(ActionCardService::validate_card_fields(Some("Coffee"), Some(-5)).is_err());
        assert!(ActionCardService::validate_card_fields(Some("Coffee"), Some(500)).is_ok());
    }

    #[tokio::test]
    async fn test_update_card_not_owner_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![card_row(8, 5)]])
            .into_connection();
        let svc = ActionCardService::new(db);

        let err = svc
            .update_card(
                7,
                8,
                UpdateActionCardRequest {
                    title: None,
                    description: None,
                    price_cents: None,
                    icon: None,
                    is_active: None,
                    is_featured: None,
                    sort_order: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_delete_unknown_card_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<action_cards::Model>::new()])
            .into_connection();
        let svc = ActionCardService::new(db);

        let err = svc.delete_card(5, 404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
