use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    db::admin_store::AdminStore,
    error::{AppError, Result},
    models::auth::{AdminDto, Claims, LoginResponse},
};

/// Hash a password into an argon2 PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("salt encoding failed: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Check a password against a stored argon2 PHC string
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("stored password hash is malformed: {e}");
            false
        }
    }
}

/// Issues and validates the bearer tokens guarding the API
#[derive(Clone)]
pub struct AuthService {
    admins: AdminStore,
    jwt_secret: String,
    expiration_hours: i64,
}

impl AuthService {
    pub fn new(admins: AdminStore, jwt_secret: String, expiration_hours: i64) -> Self {
        Self {
            admins,
            jwt_secret,
            expiration_hours,
        }
    }

    /// Verify credentials and issue a token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let Some(admin) = self.admins.find_by_email(email).await? else {
            tracing::warn!(%email, "login attempt for unknown account");
            return Err(AppError::Auth("Invalid email or password".into()));
        };

        if !verify_password(password, &admin.password_hash) {
            tracing::warn!(%email, "login attempt with wrong password");
            return Err(AppError::Auth("Invalid email or password".into()));
        }

        let user = AdminDto::from(admin);
        let token = self.issue_token(&user)?;
        tracing::info!(id = user.id, email = %user.email, "admin logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.expiration_hours * 3600,
            user,
        })
    }

    pub fn issue_token(&self, user: &AdminDto) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiration_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token creation failed: {e}")))
    }

    /// Decode a token, rejecting bad signatures and expired tokens
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Auth("Token expired".into()),
            _ => AppError::Auth("Invalid token".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original_password() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-hash"));
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("password123", &first));
        assert!(verify_password("password123", &second));
    }
}
