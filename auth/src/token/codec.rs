use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;
use super::errors::TokenRejection;

/// Signs and verifies the platform's tokens.
///
/// Generic over the claims type so one codec serves access, refresh, and
/// recovery tokens. Uses HS256 with a single shared secret; expiry is
/// checked with zero leeway, so clock skew between issuer and verifier is
/// not compensated for.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec from a signing secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign claims into a token string.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claim serialization or signing failed
    pub fn issue<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a presented token and decode its claims.
    ///
    /// # Errors
    /// * `Expired` - `exp` lies in the past
    /// * `InvalidSignature` - Well-formed token signed with another key
    /// * `Malformed` - Not decodable as one of our tokens
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenRejection> {
        let token_data = decode::<T>(token, &self.decoding_key, &self.validation())
            .map_err(|e| Self::rejection(&e))?;

        Ok(token_data.claims)
    }

    /// Verify a token and extract only its expiration timestamp.
    ///
    /// Used to mirror a freshly minted refresh token's expiry into its
    /// session row without interpreting the rest of the payload.
    ///
    /// # Errors
    /// Same rejections as [`TokenCodec::verify`].
    pub fn expiration_of(&self, token: &str) -> Result<DateTime<Utc>, TokenRejection> {
        let expiry: ExpiryOnly = self.verify(token)?;

        DateTime::from_timestamp(expiry.exp, 0).ok_or(TokenRejection::Malformed)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation
    }

    fn rejection(error: &jsonwebtoken::errors::Error) -> TokenRejection {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
            _ => TokenRejection::Malformed,
        }
    }
}

/// Minimal claim view for expiry extraction.
#[derive(Debug, Deserialize)]
struct ExpiryOnly {
    exp: i64,
}
