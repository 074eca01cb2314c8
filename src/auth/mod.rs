pub mod tokens;

pub use tokens::{AuthToken, AuthTokens, TokenKind};
