//! トークンリゾルバの実装

pub mod static_tokens;

pub use static_tokens::{StaticTokenResolver, TokenStore, TokenStoreError};
