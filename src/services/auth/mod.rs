pub mod account;
pub mod factory;
pub mod identity;
pub mod password;
pub mod signing_key;
pub mod token_codec;

pub use account::{AccountService, IssuedToken};
pub use factory::{CodecBuildError, build_token_codec};
pub use identity::{Identity, UserRole};
pub use signing_key::SigningKey;
pub use token_codec::{TokenCodec, TokenError};
