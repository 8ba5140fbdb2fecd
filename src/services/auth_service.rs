use std::sync::Arc;
use validator::Validate;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        Claims, JwtService,
    },
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::request::{LoginRequest, SignupRequest},
    },
    repositories::{RevokedTokenRepository, UserRepository},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    revoked_tokens: Arc<dyn RevokedTokenRepository>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        revoked_tokens: Arc<dyn RevokedTokenRepository>,
        jwt: JwtService,
    ) -> Self {
        Self {
            users,
            revoked_tokens,
            jwt,
        }
    }

    pub fn token_lifetime_hours(&self) -> i64 {
        self.jwt.expiration_hours()
    }

    pub async fn signup(&self, request: SignupRequest) -> AppResult<(User, String)> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .create(User::new(
                request.name.trim(),
                &email,
                &password_hash,
                request.role,
            ))
            .await?;

        let token = self.jwt.create_token(&user)?;
        log::info!("Registered {} {}", user.role, user.id);

        Ok((user, token))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<(User, String)> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.jwt.create_token(&user)?;
        Ok((user, token))
    }

    /// Revokes `token` until its natural expiry. Tokens that no longer
    /// validate are already useless and are ignored.
    pub async fn logout(&self, token: Option<&str>) -> AppResult<()> {
        let Some(token) = token else {
            return Ok(());
        };

        match self.jwt.validate_token(token) {
            Ok(claims) => {
                self.revoked_tokens.revoke(token, claims.exp as i64).await?;
                log::info!("Revoked token for user {}", claims.sub);
            }
            Err(e) => log::debug!("Logout with unusable token: {}", e),
        }

        Ok(())
    }

    pub async fn authenticate(&self, token: &str) -> AppResult<Claims> {
        let claims = self.jwt.validate_token(token)?;

        if self.revoked_tokens.is_revoked(token).await? {
            return Err(AppError::Unauthorized("Token has been revoked".to_string()));
        }

        Ok(claims)
    }

    pub async fn current_user(&self, claims: &Claims) -> AppResult<User> {
        self.users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
