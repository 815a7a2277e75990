use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::model::Role;
use crate::models::{Claims, TokenType};

fn now() -> usize {
    usize::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Identity carried inside both token kinds.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    pub department_id: Option<u64>,
}

impl TokenSubject {
    fn claims(&self, token_type: TokenType, ttl: usize) -> Claims {
        Claims {
            user_id: self.user_id,
            sub: self.username.clone(),
            role: self.role.id(),
            exp: now() + ttl,
            jti: Uuid::new_v4().to_string(),
            token_type,
            department_id: self.department_id,
        }
    }
}

impl TryFrom<&Claims> for TokenSubject {
    type Error = u8;

    /// Fails with the offending role id.
    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let role = Role::from_id(claims.role).ok_or(claims.role)?;
        Ok(Self {
            user_id: claims.user_id,
            username: claims.sub.clone(),
            role,
            department_id: claims.department_id,
        })
    }
}

pub fn generate_access_token(
    subject: &TokenSubject,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    encode(
        &Header::default(),
        &subject.claims(TokenType::Access, ttl),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_refresh_token(
    subject: &TokenSubject,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = subject.claims(TokenType::Refresh, ttl);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
