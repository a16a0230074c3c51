use crate::middlewares::require_identity;
use crate::models::*;
use crate::services::MembershipService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/tiers",
    tag = "membership",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取自己的会员档位列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_tiers(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service.list_tiers(identity.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tiers",
    tag = "membership",
    request_body = CreateTierRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建会员档位成功", body = TierResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅创作者可创建"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_tier(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
    request: web::Json<CreateTierRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service
        .create_tier(identity.id, request.into_inner())
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
    path = "/tiers/{id}",
    tag = "membership",
    request_body = UpdateTierRequest,
    params(
        ("id" = i64, Path, description = "会员档位 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新会员档位成功", body = TierResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是档位所有者"),
        (status = 404, description = "档位不存在")
    )
)]
pub async fn update_tier(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateTierRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service
        .update_tier(identity.id, path.into_inner(), request.into_inner())
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
    path = "/tiers/{id}",
    tag = "membership",
    params(
        ("id" = i64, Path, description = "会员档位 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除会员档位成功"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是档位所有者"),
        (status = 400, description = "档位仍有订阅者")
    )
)]
pub async fn delete_tier(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service
        .delete_tier(identity.id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MessageResponse::new("Membership tier deleted")
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/memberships",
    tag = "membership",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取我的订阅列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn my_subscriptions(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service.my_subscriptions(identity.id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/memberships/subscribe",
    tag = "membership",
    request_body = SubscribeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订阅成功", body = SubscriptionResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "档位不存在"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn subscribe(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service
        .subscribe(identity.id, request.tier_id)
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
    post,
    path = "/memberships/cancel",
    tag = "membership",
    request_body = CancelSubscriptionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "取消订阅成功", body = SubscriptionResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "订阅不存在")
    )
)]
pub async fn cancel_subscription(
    membership_service: web::Data<MembershipService>,
    req: HttpRequest,
    request: web::Json<CancelSubscriptionRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match membership_service
        .cancel(identity.id, request.creator_id)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn membership_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tiers")
            .route("", web::get().to(list_tiers))
            .route("", web::post().to(create_tier))
            .route("/{id}", web::put().to(update_tier))
            .route("/{id}", web::delete().to(delete_tier)),
    )
    .service(
        web::scope("/memberships")
            .route("", web::get().to(my_subscriptions))
            .route("/subscribe", web::post().to(subscribe))
            .route("/cancel", web::post().to(cancel_subscription)),
    );
}
