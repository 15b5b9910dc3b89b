//! Authentication for the league API: JWT access/refresh tokens and
//! Argon2id password handling

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, TokenIssuer, TokenKind, TokenPair};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};

// Re-export useful types
pub use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
