//! Authentication primitives library
//!
//! Provides the credential-handling building blocks shared by the platform
//! services:
//! - Password hashing (Argon2id)
//! - Signed token issuance and verification (HS256 JWTs) with typed
//!   rejection reasons
//!
//! Each service defines its own authentication flows on top of these
//! primitives. This keeps token and password handling in one place without
//! coupling services through shared domain logic.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::AccessClaims;
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = AccessClaims::new("user123", Duration::minutes(15));
//! let token = codec.issue(&claims).unwrap();
//! let decoded: AccessClaims = codec.verify(&token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! ```
//!
//! ## Typed verification failures
//! ```
//! use auth::AccessClaims;
//! use auth::TokenCodec;
//! use auth::TokenRejection;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let result = codec.verify::<AccessClaims>("not.a.token");
//! assert_eq!(result.unwrap_err(), TokenRejection::Malformed);
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::AccessClaims;
pub use token::RecoveryClaims;
pub use token::RefreshClaims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TokenRejection;
