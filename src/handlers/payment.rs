use crate::models::*;
use crate::services::SupportService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use log::info;
use serde_json::json;

/// 模拟支付网关回调。
///
/// 真实系统里这是 PSP 的 webhook, 带签名与事件去重; 这里直接接收
/// (transaction_id, outcome)。重复回调由结算层的条件更新吸收,
/// 已终态的交易不会被改写。
pub async fn simulate_payment(
    support_service: web::Data<SupportService>,
    request: web::Json<SimulatePaymentRequest>,
) -> Result<HttpResponse> {
    info!(
        "Received gateway callback for transaction {}",
        request.transaction_id
    );

    match support_service
        .settle(request.transaction_id, request.outcome)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 支付完成后的浏览器回跳确认。幂等: 重复确认返回同样的 success。
pub async fn confirm_payment(
    support_service: web::Data<SupportService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match support_service.confirm(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payment")
            .route("/simulate", web::post().to(simulate_payment))
            .route("/confirm/{transaction_id}", web::post().to(confirm_payment)),
    );
}
