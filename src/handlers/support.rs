use crate::middlewares::{get_identity, require_identity};
use crate::models::*;
use crate::services::SupportService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/support",
    tag = "support",
    request_body = CreateSupportRequest,
    responses(
        (status = 200, description = "创建支持交易成功, 返回收银台地址", body = CreateSupportResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "创作者或卡片不存在")
    )
)]
pub async fn create_support(
    support_service: web::Data<SupportService>,
    req: HttpRequest,
    request: web::Json<CreateSupportRequest>,
) -> Result<HttpResponse> {
    // 已登录用 session 身份, 未登录走游客流程
    let fan_id = get_identity(&req).map(|identity| identity.id);

    match support_service
        .create_transaction(request.into_inner(), fan_id)
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
    get,
    path = "/support/{id}",
    tag = "support",
    params(
        ("id" = i64, Path, description = "支持交易 ID")
    ),
    responses(
        (status = 200, description = "查询交易状态成功", body = SupportTransactionResponse),
        (status = 404, description = "交易不存在")
    )
)]
pub async fn get_support(
    support_service: web::Data<SupportService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match support_service.get_transaction(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/support/earnings",
    tag = "support",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取收益汇总成功", body = EarningsResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_earnings(
    support_service: web::Data<SupportService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match support_service.earnings(identity.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/support/history",
    tag = "support",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "按状态过滤 (pending/success/cancel)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取交易流水成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_history(
    support_service: web::Data<SupportService>,
    req: HttpRequest,
    query: web::Query<SupportHistoryQuery>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match support_service.history(identity.id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn support_config(cfg: &mut web::ServiceConfig) {
    // 字面路由先注册, 避免被 /{id} 吞掉
    cfg.service(
        web::scope("/support")
            .route("", web::post().to(create_support))
            .route("/earnings", web::get().to(get_earnings))
            .route("/history", web::get().to(get_history))
            .route("/{id}", web::get().to(get_support)),
    );
}
