use crate::entities::UserRole;
use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// 请求身份。中间件每个请求解析一次, 核心服务只接显式参数,
/// 不读任何全局会话状态。
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

/// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/explore",
            ],
            // 前缀匹配的公开路径。浏览与结算回调无需登录,
            // 游客也能发起支持; 这些前缀下的变更接口由 require_identity 兜底。
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/v1/auth/",
                "/api/v1/creators/",
                "/api/v1/posts/",
                "/api/v1/gallery/",
                "/api/v1/support",
                "/payment/",
            ],
            // 公开前缀下仍需认证的路径 (创作者后台)
            excluded_paths: vec!["/api/v1/support/earnings", "/api/v1/support/history"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let is_public = self.public_paths.is_public_path(req.path());

        // 提取Authorization header
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        match token {
            Some(token) => match self.jwt_service.verify_access_token(&token) {
                Ok(claims) => {
                    // 公开读也要知道观众是谁, 会员内容据此裁决
                    if let Ok(user_id) = claims.sub.parse::<i64>() {
                        req.extensions_mut().insert(Identity {
                            id: user_id,
                            username: claims.username,
                            role: claims.role,
                        });
                    }
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(_) if is_public => {
                    // 过期令牌不应挡住公开浏览, 按匿名处理
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(_) => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            },
            None if is_public => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 取出中间件解析的请求身份 (匿名时为 None)
pub fn get_identity(req: &HttpRequest) -> Option<Identity> {
    req.extensions().get::<Identity>().cloned()
}

/// 公开前缀下的保护接口用这个兜底
pub fn require_identity(req: &HttpRequest) -> Result<Identity, AppError> {
    get_identity(req).ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/api/v1/explore"));
        assert!(paths.is_public_path("/api/v1/creators/painter"));
        assert!(paths.is_public_path("/api/v1/auth/login"));
        assert!(paths.is_public_path("/payment/simulate"));
        assert!(paths.is_public_path("/api/v1/support"));
        assert!(paths.is_public_path("/api/v1/support/42"));
        assert!(!paths.is_public_path("/api/v1/support/earnings"));
        assert!(!paths.is_public_path("/api/v1/support/history"));
        assert!(!paths.is_public_path("/api/v1/users/me"));
        assert!(!paths.is_public_path("/api/v1/cards"));
    }
}
