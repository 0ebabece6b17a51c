mod auth_guard_impl;
mod post_service_impl;
mod session_service_impl;
mod token_codec_jwt;

pub use auth_guard_impl::*;
pub use post_service_impl::*;
pub use session_service_impl::*;
pub use token_codec_jwt::*;
