use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{SubscriptionStatus, SupportStatus, UserRole, Visibility};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::creator::creator_page,
        handlers::creator::creator_supporters,
        handlers::creator::creator_posts,
        handlers::creator::creator_gallery,
        handlers::explore::explore_creators,
        handlers::action_card::list_cards,
        handlers::action_card::create_card,
        handlers::action_card::update_card,
        handlers::action_card::delete_card,
        handlers::support::create_support,
        handlers::support::get_support,
        handlers::support::get_earnings,
        handlers::support::get_history,
        handlers::membership::list_tiers,
        handlers::membership::create_tier,
        handlers::membership::update_tier,
        handlers::membership::delete_tier,
        handlers::membership::my_subscriptions,
        handlers::membership::subscribe,
        handlers::membership::cancel_subscription,
        handlers::content::create_post,
        handlers::content::get_post,
        handlers::content::update_post,
        handlers::content::delete_post,
        handlers::content::create_gallery_item,
        handlers::content::get_gallery_item,
        handlers::content::update_gallery_item,
        handlers::content::delete_gallery_item,
    ),
    components(
        schemas(
            UserRole,
            SupportStatus,
            SubscriptionStatus,
            Visibility,
            SocialLinks,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            UpdateProfileRequest,
            UserResponse,
            PublicCreatorResponse,
            CreatorPageResponse,
            DashboardStats,
            ProfileResponse,
            AuthResponse,
            CreateActionCardRequest,
            UpdateActionCardRequest,
            ActionCardResponse,
            CreateSupportRequest,
            CreateSupportResponse,
            SettlementOutcome,
            SimulatePaymentRequest,
            SettlementResponse,
            SupportTransactionResponse,
            SupporterResponse,
            EarningsResponse,
            SupportHistoryQuery,
            CreateTierRequest,
            UpdateTierRequest,
            TierResponse,
            SubscribeRequest,
            CancelSubscriptionRequest,
            SubscriptionResponse,
            CreatePostRequest,
            UpdatePostRequest,
            PostResponse,
            CreateGalleryItemRequest,
            UpdateGalleryItemRequest,
            GalleryItemResponse,
            ExploreSort,
            ExploreQuery,
            ExploreCreatorItem,
            PaginationParams,
            ApiError,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User profile API"),
        (name = "creator", description = "Public creator page API"),
        (name = "explore", description = "Creator discovery API"),
        (name = "action_card", description = "Action card management API"),
        (name = "support", description = "Support transaction API"),
        (name = "membership", description = "Membership tier and subscription API"),
        (name = "content", description = "Post and gallery API"),
    ),
    info(
        title = "FanStage Backend API",
        version = "1.0.0",
        description = "FanStage creator monetization backend REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
