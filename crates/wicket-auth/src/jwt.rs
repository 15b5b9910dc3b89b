//! JWT (JSON Web Token) handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which half of a token pair a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        })
    }
}

/// JWT claims for an authenticated league user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Custom: login name at issue time
    pub username: String,
    /// Custom: role at issue time (ADMIN, ORGANISER, CAPTAIN, PLAYER)
    pub role: String,
    /// Custom: access or refresh
    pub token_type: TokenKind,
}

impl JwtClaims {
    pub fn new(
        user_id: i32,
        username: String,
        role: String,
        token_type: TokenKind,
        issuer: String,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer,
            username,
            role,
            token_type,
        }
    }

    pub fn user_id(&self) -> Result<i32, JwtError> {
        self.sub.parse().map_err(|_| JwtError::MalformedSubject)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Token subject is not a user id")]
    MalformedSubject,
}

/// JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JWT validator using HMAC-SHA256 (symmetric secret)
    ///
    /// Validates the signature and expiration. The issuer is only checked
    /// once `with_issuer` is called.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, JwtError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Validate a token and require it to be of the given kind
    pub fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<JwtClaims, JwtError> {
        let claims = self.validate(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }

    /// Encode JWT using HMAC-SHA256 (symmetric secret)
    pub fn encode(secret: &[u8], claims: &JwtClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

/// Freshly issued access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signs access and refresh tokens with one shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.to_vec(),
            issuer: "wicket".to_string(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Validator accepting exactly the tokens this issuer signs
    pub fn validator(&self) -> JwtValidator {
        JwtValidator::new(&self.secret).with_issuer(self.issuer.clone())
    }

    pub fn issue(
        &self,
        kind: TokenKind,
        user_id: i32,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        let validity = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = JwtClaims::new(
            user_id,
            username.to_string(),
            role.to_string(),
            kind,
            self.issuer.clone(),
            validity,
        );

        JwtValidator::encode(&self.secret, &claims)
    }

    pub fn issue_pair(&self, user_id: i32, username: &str, role: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access: self.issue(TokenKind::Access, user_id, username, role)?,
            refresh: self.issue(TokenKind::Refresh, user_id, username, role)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TEST_SECRET, Duration::minutes(60), Duration::hours(24))
    }

    #[test]
    fn test_jwt_encode_decode() {
        let claims = JwtClaims::new(
            42,
            "captain".to_string(),
            "CAPTAIN".to_string(),
            TokenKind::Access,
            "test-issuer".to_string(),
            Duration::hours(1),
        );

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET).with_issuer("test-issuer".to_string());
        let decoded = validator.validate(&token).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id().unwrap(), 42);
    }

    #[test]
    fn test_expired_token() {
        let claims = JwtClaims::new(
            1,
            "u".to_string(),
            "PLAYER".to_string(),
            TokenKind::Access,
            "wicket".to_string(),
            Duration::seconds(-10), // Already expired
        );

        assert!(claims.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let result = JwtValidator::new(TEST_SECRET).validate(&token);

        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = issuer().issue_pair(1, "u", "ADMIN").unwrap();

        let result = JwtValidator::new(b"another_secret").validate(&pair.access);
        assert!(matches!(result, Err(JwtError::EncodingError(_))));
    }

    #[test]
    fn test_pair_kinds_are_not_interchangeable() {
        let issuer = issuer();
        let validator = issuer.validator();
        let pair = issuer.issue_pair(7, "organiser", "ORGANISER").unwrap();

        let access = validator.validate_kind(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(access.username, "organiser");
        assert_eq!(access.role, "ORGANISER");

        let refresh = validator
            .validate_kind(&pair.refresh, TokenKind::Refresh)
            .unwrap();
        assert!(refresh.exp > access.exp);

        let err = validator
            .validate_kind(&pair.refresh, TokenKind::Access)
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::WrongTokenType {
                expected: TokenKind::Access,
                actual: TokenKind::Refresh
            }
        ));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let other = issuer().with_issuer("someone-else".to_string());
        let token = other.issue(TokenKind::Access, 1, "u", "ADMIN").unwrap();

        assert!(issuer().validator().validate(&token).is_err());
    }

    #[test]
    fn test_malformed_subject() {
        let mut claims = JwtClaims::new(
            1,
            "u".to_string(),
            "PLAYER".to_string(),
            TokenKind::Access,
            "wicket".to_string(),
            Duration::hours(1),
        );
        claims.sub = "not-a-number".to_string();

        assert!(matches!(claims.user_id(), Err(JwtError::MalformedSubject)));
    }

    #[test]
    fn test_token_type_serialized_lowercase() {
        let claims = JwtClaims::new(
            1,
            "u".to_string(),
            "PLAYER".to_string(),
            TokenKind::Refresh,
            "wicket".to_string(),
            Duration::hours(1),
        );

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"token_type\":\"refresh\""));
    }
}
