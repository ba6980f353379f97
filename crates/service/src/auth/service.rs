use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use crate::authz::Caller;

/// Token issuing parameters.
#[derive(Clone)]
pub struct TokenConfig {
    pub jwt_secret: String,
    pub ttl_minutes: i64,
}

impl From<&configs::AuthConfig> for TokenConfig {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self { jwt_secret: cfg.jwt_secret.clone(), ttl_minutes: cfg.token_ttl_minutes }
    }
}

/// Argon2id PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: TokenConfig,
}

impl<R: AuthRepository> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo), cfg: self.cfg.clone() }
    }
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: TokenConfig) -> Self { Self { repo, cfg } }

    /// Check credentials and issue an access token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{hash_password, AuthService, TokenConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{AuthUser, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// repo.insert(AuthUser {
    ///     id: uuid::Uuid::new_v4(),
    ///     username: "jane".into(),
    ///     email: "jane@example.com".into(),
    ///     role: models::UserRole::Employee,
    ///     active: true,
    ///     password_hash: hash_password("Passw0rd!").unwrap(),
    /// });
    /// let svc = AuthService::new(repo, TokenConfig { jwt_secret: "secret".into(), ttl_minutes: 30 });
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "jane".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.token_type, "bearer");
    /// ```
    #[instrument(skip(self, input), fields(login = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let login = input.username.trim();
        if login.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("username and password are required".into()));
        }
        let user = self.repo.find_by_login(login).await?.ok_or_else(|| {
            debug!("unknown login");
            AuthError::Unauthorized
        })?;

        if !verify_password(&input.password, &user.password_hash)? {
            warn!(user_id = %user.id, "password_mismatch");
            return Err(AuthError::Unauthorized);
        }
        if !user.active {
            warn!(user_id = %user.id, "inactive_login");
            return Err(AuthError::Inactive);
        }

        let access_token = self.issue_token(&user)?;
        info!(user_id = %user.id, role = %user.role, "user_logged_in");
        Ok(AuthSession { user_id: user.id, access_token, token_type: "bearer".into() })
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::minutes(self.cfg.ttl_minutes);
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Signature and expiry check only; the account is not consulted.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &validation)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(data.claims)
    }

    /// Resolve a bearer token into the caller it belongs to.
    ///
    /// Role and active flag come from the stored account, not from the
    /// claims, so deactivation and role changes apply to live tokens.
    pub async fn authenticate(&self, token: &str) -> Result<Caller, AuthError> {
        let claims = self.verify_token(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|e| AuthError::TokenError(e.to_string()))?;
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::TokenError("token subject no longer exists".into()))?;
        Ok(Caller { id: user.id, role: user.role, active: user.active })
    }
}
