use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        validate_username(&request.username)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let email = request.email.to_lowercase();

        // 用户名/邮箱唯一
        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(request.username.clone()))
                    .add(users::Column::Email.eq(email.clone())),
            )
            .one(&self.pool)
            .await?;
        if let Some(existing) = existing {
            let msg = if existing.username == request.username {
                "Username already taken"
            } else {
                "Email already registered"
            };
            return Err(AppError::ValidationError(msg.to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let display_name = request
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| request.username.clone());

        let model = users::ActiveModel {
            username: Set(request.username.clone()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(request.role),
            display_name: Set(display_name),
            ..Default::default()
        };
        let user = model.insert(&self.pool).await?;

        log::info!("User {} registered as {}", user.id, user.role);

        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.username, user.role)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.username, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        // identifier 可以是用户名或邮箱
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(request.identifier.clone()))
                    .add(users::Column::Email.eq(request.identifier.to_lowercase())),
            )
            .one(&self.pool)
            .await?;

        let user = user
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        let is_valid = verify_password(&request.password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.username, user.role)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.username, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.username, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600, 86400)
    }

    fn user_row(id: i64, username: &str, password: &str) -> users::Model {
        users::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(password).unwrap(),
            role: UserRole::Fan,
            display_name: username.to_string(),
            bio: None,
            avatar_url: None,
            banner_url: None,
            social_links: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(1, "alice", "Password123")]])
            .into_connection();
        let svc = AuthService::new(db, jwt());

        let err = svc
            .register(RegisterRequest {
                username: "alice".to_string(),
                email: "new@example.com".to_string(),
                password: "Password123".to_string(),
                role: UserRole::Fan,
                display_name: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(1, "alice", "Password123")]])
            .into_connection();
        let svc = AuthService::new(db, jwt());

        let err = svc
            .login(LoginRequest {
                identifier: "alice".to_string(),
                password: "WrongPassword1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_login_issues_tokens() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(1, "alice", "Password123")]])
            .into_connection();
        let svc = AuthService::new(db, jwt());

        let resp = svc
            .login(LoginRequest {
                identifier: "alice".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(resp.user.username, "alice");
        assert!(jwt().verify_access_token(&resp.access_token).is_ok());
        assert!(jwt().verify_refresh_token(&resp.refresh_token).is_ok());
    }
}
