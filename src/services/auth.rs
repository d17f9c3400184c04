//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by login and return a JWT token
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !verify_password(&user, password)? {
            tracing::info!("Failed login for {}", login);
            return Err(AppError::Authentication("Invalid login or password".to_string()));
        }

        let token = issue_token(&user, &self.config)?;
        Ok((token, user))
    }

    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let Some(ref hash) = user.password else {
        return Ok(false);
    };
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn issue_token(user: &User, config: &AuthConfig) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let exp = now + (config.jwt_expiration_hours as i64 * 3600);

    let claims = UserClaims {
        sub: user.login.clone(),
        user_id: user.id,
        account_type: user.account_type.clone(),
        rights: user.rights.clone(),
        exp,
        iat: now,
    };

    claims
        .create_token(&config.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}
