use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token claims. `sid` names the server-side session row, `sub` is the account
/// e-mail (session principal) and `uid` the cloud session user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sid: String,
    pub sub: String,
    pub uid: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sid: String, sub: String, uid: i64, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sid,
            sub,
            uid,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
    InvalidToken(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    decode_with(token, secret, Validation::default())
}

/// Decode that still accepts a token up to `grace_secs` past its `exp`, for session renewal.
pub fn validate_jwt_within_grace(token: &str, secret: &str, grace_secs: u64) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.leeway = grace_secs;
    decode_with(token, secret, validation)
}

fn decode_with(token: &str, secret: &str, validation: Validation) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip() {
        let claims = Claims::new("sid-1".into(), "ada@example.org".into(), 17, 1);
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert_eq!(validate_jwt(&token, SECRET).unwrap(), claims);
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_only_pass_within_grace() {
        let mut claims = Claims::new("sid-2".into(), "ada@example.org".into(), 17, 1);
        claims.iat -= 7_200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt(&claims, SECRET).unwrap();

        assert!(validate_jwt(&token, SECRET).is_err());
        assert_eq!(validate_jwt_within_grace(&token, SECRET, 3_600 * 3).unwrap().sid, "sid-2");
        // Expired roughly two hours ago; a one hour grace is not enough.
        assert!(validate_jwt_within_grace(&token, SECRET, 3_600).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new("sid".into(), "x@y.org".into(), 1, 1);
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }
}
