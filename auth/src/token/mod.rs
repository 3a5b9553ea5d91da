pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::AccessClaims;
pub use claims::RecoveryClaims;
pub use claims::RefreshClaims;
pub use codec::TokenCodec;
pub use errors::TokenError;
pub use errors::TokenRejection;
