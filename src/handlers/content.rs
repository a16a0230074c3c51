use crate::middlewares::{get_identity, require_identity};
use crate::models::*;
use crate::services::ContentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/posts",
    tag = "content",
    request_body = CreatePostRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发布文章成功", body = PostResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅创作者可发布")
    )
)]
pub async fn create_post(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    request: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service
        .create_post(identity.id, request.into_inner())
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
    path = "/posts/{id}",
    tag = "content",
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    responses(
        (status = 200, description = "读取文章成功, 未解锁的会员内容以 locked 形式返回", body = PostResponse),
        (status = 404, description = "文章不存在")
    )
)]
pub async fn get_post(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let viewer = get_identity(&req).map(|identity| identity.id);

    match content_service.get_post(path.into_inner(), viewer).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "content",
    request_body = UpdatePostRequest,
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新文章成功", body = PostResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是文章作者"),
        (status = 404, description = "文章不存在")
    )
)]
pub async fn update_post(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service
        .update_post(identity.id, path.into_inner(), request.into_inner())
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
    path = "/posts/{id}",
    tag = "content",
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除文章成功"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是文章作者"),
        (status = 404, description = "文章不存在")
    )
)]
pub async fn delete_post(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service
        .delete_post(identity.id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MessageResponse::new("Post deleted")
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/gallery",
    tag = "content",
    request_body = CreateGalleryItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "上传图库条目成功", body = GalleryItemResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅创作者可上传")
    )
)]
pub async fn create_gallery_item(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    request: web::Json<CreateGalleryItemRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service
        .create_gallery_item(identity.id, request.into_inner())
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
    path = "/gallery/{id}",
    tag = "content",
    params(
        ("id" = i64, Path, description = "图库条目 ID")
    ),
    responses(
        (status = 200, description = "读取图库条目成功, 未解锁的会员内容以 locked 形式返回", body = GalleryItemResponse),
        (status = 404, description = "条目不存在")
    )
)]
pub async fn get_gallery_item(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let viewer = get_identity(&req).map(|identity| identity.id);

    match content_service
        .get_gallery_item(path.into_inner(), viewer)
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
    path = "/gallery/{id}",
    tag = "content",
    request_body = UpdateGalleryItemRequest,
    params(
        ("id" = i64, Path, description = "图库条目 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新图库条目成功", body = GalleryItemResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是条目所有者"),
        (status = 404, description = "条目不存在")
    )
)]
pub async fn update_gallery_item(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateGalleryItemRequest>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service
        .update_gallery_item(identity.id, path.into_inner(), request.into_inner())
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
    path = "/gallery/{id}",
    tag = "content",
    params(
        ("id" = i64, Path, description = "图库条目 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除图库条目成功"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是条目所有者"),
        (status = 404, description = "条目不存在")
    )
)]
pub async fn delete_gallery_item(
    content_service: web::Data<ContentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let identity = match require_identity(&req) {
        Ok(identity) => identity,
        Err(e) => return Ok(e.error_response()),
    };

    match content_service
        .delete_gallery_item(identity.id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MessageResponse::new("Gallery item deleted")
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn content_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::post().to(create_post))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}", web::put().to(update_post))
            .route("/{id}", web::delete().to(delete_post)),
    )
    .service(
        web::scope("/gallery")
            .route("", web::post().to(create_gallery_item))
            .route("/{id}", web::get().to(get_gallery_item))
            .route("/{id}", web::put().to(update_gallery_item))
            .route("/{id}", web::delete().to(delete_gallery_item)),
    );
}
