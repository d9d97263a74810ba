//! UseCase 層
//!
//! 接続の認可・メッセージ転送・切断処理のビジネスロジックを提供します。

pub mod authorize_connection;
pub mod disconnect_connection;
pub mod error;
pub mod relay_message;

pub use authorize_connection::AuthorizeConnectionUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{AuthorizeError, RelayError};
pub use relay_message::RelayMessageUseCase;
