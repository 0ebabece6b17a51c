mod claims;
mod post;
mod secret;
mod token;

pub use claims::*;
pub use post::*;
pub use secret::*;
pub use token::*;
