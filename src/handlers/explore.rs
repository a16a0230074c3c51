use crate::models::*;
use crate::services::ExploreService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/explore",
    tag = "explore",
    params(
        ("q" = Option<String>, Query, description = "按用户名/显示名子串过滤"),
        ("sort" = Option<String>, Query, description = "排序方式 (newest/popular/trending)"),
        ("has_membership" = Option<bool>, Query, description = "只看开通了会员档位的创作者"),
        ("has_featured" = Option<bool>, Query, description = "只看有精选 Action Card 的创作者"),
        ("page" = Option<u32>, Query, description = "页码, 每页固定 12 条")
    ),
    responses(
        (status = 200, description = "获取创作者列表成功")
    )
)]
pub async fn explore_creators(
    explore_service: web::Data<ExploreService>,
    query: web::Query<ExploreQuery>,
) -> Result<HttpResponse> {
    match explore_service.explore_creators(query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn explore_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/explore", web::get().to(explore_creators));
}
