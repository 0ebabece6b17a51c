mod auth_guard;
mod post_service;
mod session_service;
mod token_codec;

pub use auth_guard::*;
pub use post_service::*;
pub use session_service::*;
pub use token_codec::*;
