use crate::middlewares::require_identity;
use crate::models::*;
use crate::services::ActionCardService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cards",
    tag = "action_card",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取自己的 Action Card 列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_cards(
    action_card_service: web::Data<ActionCardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match action_card_service.list_cards(identity.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cards",
    tag = "action_card",
    request_body = CreateActionCardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建 Action Card 成功", body = ActionCardResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅创作者可创建"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_card(
    action_card_service: web::Data<ActionCardService>,
    req: HttpRequest,
    request: web::Json<CreateActionCardRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match action_card_service
        .create_card(identity.id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cards/{id}",
    tag = "action_card",
    request_body = UpdateActionCardRequest,
    params(
        ("id" = i64, Path, description = "Action Card ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新 Action Card 成功", body = ActionCardResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是卡片所有者"),
        (status = 404, description = "卡片不存在")
    )
)]
pub async fn update_card(
    action_card_service: web::Data<ActionCardService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateActionCardRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match action_card_service
        .update_card(identity.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cards/{id}",
    tag = "action_card",
    params(
        ("id" = i64, Path, description = "Action Card ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除 Action Card 成功"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是卡片所有者"),
        (status = 404, description = "卡片不存在")
    )
)]
pub async fn delete_card(
    action_card_service: web::Data<ActionCardService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match action_card_service
        .delete_card(identity.id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MessageResponse::new("Action card deleted")
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn action_card_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cards")
            .route("", web::get().to(list_cards))
            .route("", web::post().to(create_card))
            .route("/{id}", web::put().to(update_card))
            .route("/{id}", web::delete().to(delete_card)),
    );
}
