use crate::middlewares::get_identity;
use crate::models::*;
use crate::services::{
    ActionCardService, ContentService, MembershipService, SupportService, UserService,
};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/creators/{username}",
    tag = "creator",
    params(
        ("username" = String, Path, description = "创作者用户名")
    ),
    responses(
        (status = 200, description = "获取创作者主页成功", body = CreatorPageResponse),
        (status = 404, description = "创作者不存在")
    )
)]
pub async fn creator_page(
    user_service: web::Data<UserService>,
    action_card_service: web::Data<ActionCardService>,
    membership_service: web::Data<MembershipService>,
    support_service: web::Data<SupportService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let username = path.into_inner();

    let creator = match user_service.find_creator_by_username(&username).await {
        Ok(creator) => creator,
        Err(e) => return Ok(e.error_response()),
    };

    match build_creator_page(
        creator,
        &action_card_service,
        &membership_service,
        &support_service,
    )
    .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

async fn build_creator_page(
    creator: crate::entities::user_entity::Model,
    action_card_service: &ActionCardService,
    membership_service: &MembershipService,
    support_service: &SupportService,
) -> crate::error::AppResult<CreatorPageResponse> {
    let action_cards = action_card_service.list_public_cards(creator.id).await?;
    let tiers = membership_service.list_public_tiers(creator.id).await?;
    let supporter_count = support_service.success_count(creator.id).await?;
    let member_count = membership_service.member_count(creator.id).await?;

    Ok(CreatorPageResponse {
        creator: PublicCreatorResponse::from(creator),
        action_cards,
        tiers,
        supporter_count,
        member_count,
    })
}

#[utoipa::path(
    get,
    path = "/creators/{username}/supporters",
    tag = "creator",
    params(
        ("username" = String, Path, description = "创作者用户名"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取支持者列表成功"),
        (status = 404, description = "创作者不存在")
    )
)]
pub async fn creator_supporters(
    user_service: web::Data<UserService>,
    support_service: web::Data<SupportService>,
    path: web::Path<String>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let creator = match user_service.find_creator_by_username(&path.into_inner()).await {
        Ok(creator) => creator,
        Err(e) => return Ok(e.error_response()),
    };

    match support_service.supporter_feed(creator.id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/creators/{username}/posts",
    tag = "creator",
    params(
        ("username" = String, Path, description = "创作者用户名"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取文章列表成功, 未解锁的会员内容以 locked 形式返回"),
        (status = 404, description = "创作者不存在")
    )
)]
pub async fn creator_posts(
    user_service: web::Data<UserService>,
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let viewer = get_identity(&req).map(|identity| identity.id);

    let creator = match user_service.find_creator_by_username(&path.into_inner()).await {
        Ok(creator) => creator,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service.list_posts(creator.id, viewer, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/creators/{username}/gallery",
    tag = "creator",
    params(
        ("username" = String, Path, description = "创作者用户名"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取图库成功, 未解锁的会员内容以 locked 形式返回"),
        (status = 404, description = "创作者不存在")
    )
)]
pub async fn creator_gallery(
    user_service: web::Data<UserService>,
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let viewer = get_identity(&req).map(|identity| identity.id);

    let creator = match user_service.find_creator_by_username(&path.into_inner()).await {
        Ok(creator) => creator,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service.list_gallery(creator.id, viewer, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn creator_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/creators")
            .route("/{username}", web::get().to(creator_page))
            .route("/{username}/supporters", web::get().to(creator_supporters))
            .route("/{username}/posts", web::get().to(creator_posts))
            .route("/{username}/gallery", web::get().to(creator_gallery)),
    );
}
