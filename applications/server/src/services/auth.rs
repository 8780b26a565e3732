/// Authentication service - JWT and password handling
use crate::error::{Result, ServerError};
use cadence_core::{SessionId, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
    bcrypt_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub sid: String, // Server-side session ID
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Identity carried by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl AuthService {
    pub fn new(
        secret: String,
        access_expiration_hours: u64,
        refresh_expiration_days: u64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
            refresh_token_expiration: Duration::days(refresh_expiration_days as i64),
            bcrypt_cost,
        }
    }

    /// How long a login session lives; refresh tokens never outlive it
    pub fn session_ttl_seconds(&self) -> i64 {
        self.refresh_token_expiration.num_seconds()
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_token_expiration.num_seconds()
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Hash on the blocking pool so bcrypt does not stall the runtime
    pub async fn hash_password_blocking(&self, password: String) -> Result<String> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash_password(&password))
            .await
            .map_err(|e| ServerError::Internal(format!("Hashing task failed: {e}")))?
    }

    pub async fn verify_password_blocking(&self, password: String, hash: String) -> Result<bool> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_password(&password, &hash))
            .await
            .map_err(|e| ServerError::Internal(format!("Verification task failed: {e}")))?
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: &UserId, session_id: &SessionId) -> Result<String> {
        self.create_token(
            user_id,
            session_id,
            TokenType::Access,
            self.access_token_expiration,
        )
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, user_id: &UserId, session_id: &SessionId) -> Result<String> {
        self.create_token(
            user_id,
            session_id,
            TokenType::Refresh,
            self.refresh_token_expiration,
        )
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify that a token is an access token
    pub fn verify_access_token(&self, token: &str) -> Result<TokenIdentity> {
        self.verify_typed(token, TokenType::Access)
    }

    /// Verify that a token is a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenIdentity> {
        self.verify_typed(token, TokenType::Refresh)
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> Result<TokenIdentity> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(TokenIdentity {
            user_id: UserId::new(claims.sub),
            session_id: SessionId::new(claims.sid),
        })
    }

    fn create_token(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        token_type: TokenType,
        expiration: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            sid: session_id.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}
